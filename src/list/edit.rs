//! Triple deltas for list surgery.
//!
//! Every mutating list operation is split into a pure planning step that
//! reads the store and returns a `ListEdit`, and `apply`, which writes it.
//! The planned delta is exactly what the operation will change.

use tracing::debug;

use crate::Result;
use crate::model::{Node, Triple};
use crate::resolver::ViewResolver;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListEdit {
    /// Deleted first, in order.
    pub removed: Vec<Triple>,
    /// Added after every removal.
    pub added: Vec<Triple>,
    /// Head of the handle after the edit.
    pub new_head: Option<Node>,
    /// Nodes whose cached views are dropped.
    pub evicted: Vec<Node>,
}

impl ListEdit {
    pub fn is_noop(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }

    pub(crate) fn remove(&mut self, t: Triple) {
        self.removed.push(t);
    }

    pub(crate) fn add(&mut self, t: Triple) {
        self.added.push(t);
    }

    pub(crate) fn extend(&mut self, (removed, added): (Vec<Triple>, Vec<Triple>)) {
        self.removed.extend(removed);
        self.added.extend(added);
    }

    /// Write the delta and drop stale cache entries.
    ///
    /// Not atomic: concurrent writers must be excluded by the caller.
    pub(crate) fn apply(&self, resolver: &ViewResolver) -> Result<()> {
        let store = resolver.store();
        for t in &self.removed {
            store.delete(t)?;
        }
        for t in &self.added {
            store.add(t.clone())?;
        }
        for n in &self.evicted {
            resolver.evict(n);
        }
        debug!(
            removed = self.removed.len(),
            added = self.added.len(),
            evicted = self.evicted.len(),
            "list edit applied"
        );
        Ok(())
    }
}
