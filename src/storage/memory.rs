//! In-memory triple store.
//!
//! This is the reference implementation of `TripleStore`.
//! It keeps one primary set plus subject/predicate/object indexes, all
//! behind a single `RwLock`.
//!
//! ## Limitations
//!
//! - **No transactions**: every `add()`/`delete()` is applied immediately.
//! - **Single-triple atomicity only**: a multi-step edit (such as a list
//!   splice) can be observed half-applied by another thread unless the
//!   caller serialises access.
//! - **Sorted snapshots**: `find()` copies and sorts matches so iteration
//!   order is stable across runs. Fine for tests and embedding, not for
//!   very large graphs.

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;

use crate::Result;
use crate::model::{Node, Triple, TriplePattern};
use super::TripleStore;

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory triple store. Cloning shares the same underlying graph.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryInner>>,
}

#[derive(Default)]
struct MemoryInner {
    triples: HashSet<Triple>,
    /// subject → triples with that subject
    by_subject: HashMap<Node, HashSet<Triple>>,
    /// predicate → triples with that predicate
    by_predicate: HashMap<Node, HashSet<Triple>>,
    /// object → triples with that object
    by_object: HashMap<Node, HashSet<Triple>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with the given triples.
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.write();
            for t in triples {
                inner.insert(t);
            }
        }
        store
    }

    /// Every triple, sorted.
    pub fn all(&self) -> Vec<Triple> {
        self.find(&TriplePattern::any())
    }
}

impl MemoryInner {
    fn insert(&mut self, t: Triple) -> bool {
        if !self.triples.insert(t.clone()) {
            return false;
        }
        self.by_subject.entry(t.subject.clone()).or_default().insert(t.clone());
        self.by_predicate.entry(t.predicate.clone()).or_default().insert(t.clone());
        self.by_object.entry(t.object.clone()).or_default().insert(t);
        true
    }

    fn remove(&mut self, t: &Triple) -> bool {
        if !self.triples.remove(t) {
            return false;
        }
        unindex(&mut self.by_subject, &t.subject, t);
        unindex(&mut self.by_predicate, &t.predicate, t);
        unindex(&mut self.by_object, &t.object, t);
        true
    }

    /// Pick the smallest candidate set for the pattern.
    fn candidates(&self, pattern: &TriplePattern) -> Option<&HashSet<Triple>> {
        let indexed = [
            pattern.subject.as_ref().map(|s| self.by_subject.get(s)),
            pattern.object.as_ref().map(|o| self.by_object.get(o)),
            pattern.predicate.as_ref().map(|p| self.by_predicate.get(p)),
        ];
        let mut best: Option<&HashSet<Triple>> = None;
        for slot in indexed.into_iter().flatten() {
            // A fixed position with no index entry means nothing can match.
            let set = slot?;
            if best.is_none_or(|b| set.len() < b.len()) {
                best = Some(set);
            }
        }
        Some(best.unwrap_or(&self.triples))
    }
}

fn unindex(index: &mut HashMap<Node, HashSet<Triple>>, key: &Node, t: &Triple) {
    if let Some(set) = index.get_mut(key) {
        set.remove(t);
        if set.is_empty() {
            index.remove(key);
        }
    }
}

// ============================================================================
// TripleStore impl
// ============================================================================

impl TripleStore for MemoryStore {
    fn find(&self, pattern: &TriplePattern) -> Vec<Triple> {
        let inner = self.inner.read();
        if let (Some(s), Some(p), Some(o)) = (&pattern.subject, &pattern.predicate, &pattern.object) {
            let t = Triple::new(s.clone(), p.clone(), o.clone());
            return if inner.triples.contains(&t) { vec![t] } else { Vec::new() };
        }
        let Some(candidates) = inner.candidates(pattern) else {
            return Vec::new();
        };
        let mut out: Vec<Triple> = candidates
            .iter()
            .filter(|t| t.matches(pattern))
            .cloned()
            .collect();
        out.sort();
        out
    }

    fn add(&self, triple: Triple) -> Result<bool> {
        Ok(self.inner.write().insert(triple))
    }

    fn delete(&self, triple: &Triple) -> Result<bool> {
        Ok(self.inner.write().remove(triple))
    }

    fn len(&self) -> usize {
        self.inner.read().triples.len()
    }

    fn contains(&self, triple: &Triple) -> bool {
        self.inner.read().triples.contains(triple)
    }
}

// ============================================================================
// Tests
// ============================================================================
