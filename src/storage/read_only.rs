//! Read-only store wrapper.
//!
//! Reads pass through; every mutation fails with `Error::Unsupported`
//! before touching the inner store.

use crate::model::{Triple, TriplePattern};
use crate::{Error, Result};
use super::TripleStore;

pub struct ReadOnlyStore<S> {
    inner: S,
}

impl<S: TripleStore> ReadOnlyStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: TripleStore> TripleStore for ReadOnlyStore<S> {
    fn find(&self, pattern: &TriplePattern) -> Vec<Triple> {
        self.inner.find(pattern)
    }

    fn add(&self, triple: Triple) -> Result<bool> {
        Err(Error::Unsupported(format!("add {triple} on a read-only store")))
    }

    fn delete(&self, triple: &Triple) -> Result<bool> {
        Err(Error::Unsupported(format!("delete {triple} on a read-only store")))
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn contains(&self, triple: &Triple) -> bool {
        self.inner.contains(triple)
    }

    fn replace(&self, old: &Triple, _new: Triple) -> Result<()> {
        Err(Error::Unsupported(format!("replace {old} on a read-only store")))
    }
}
