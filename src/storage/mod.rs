//! # Triple Store Trait
//!
//! This is THE contract between the view layer and any triple store.
//! Indexing, persistence and transactions belong to the implementation;
//! the view layer only needs pattern lookup and single-triple edits.
//!
//! ## Implementations
//!
//! | Store | Module | Description |
//! |-------|--------|-------------|
//! | `MemoryStore` | `memory` | In-memory indexed store for testing/embedding |
//! | `ReadOnlyStore` | `read_only` | Wrapper rejecting every mutation |

pub mod memory;
pub mod read_only;

use crate::Result;
use crate::model::{Node, Triple, TriplePattern, vocab};

pub use memory::MemoryStore;
pub use read_only::ReadOnlyStore;

// ============================================================================
// TripleStore Trait
// ============================================================================

/// The mutable multigraph of triples that views are laid over.
///
/// Methods take `&self`: stores are shared behind `Arc` by every view,
/// resolver and list handle, and synchronise internally. Multi-step edits
/// are not atomic; callers that need isolation hold their own lock.
pub trait TripleStore: Send + Sync + 'static {
    /// All triples matching the pattern. The result is a snapshot.
    fn find(&self, pattern: &TriplePattern) -> Vec<Triple>;

    /// Insert a triple. Returns true if the store changed.
    fn add(&self, triple: Triple) -> Result<bool>;

    /// Remove a triple. Returns true if the store changed.
    fn delete(&self, triple: &Triple) -> Result<bool>;

    /// Number of triples.
    fn len(&self) -> usize;

    fn contains(&self, triple: &Triple) -> bool {
        let pattern = TriplePattern::new(
            Some(&triple.subject),
            Some(&triple.predicate),
            Some(&triple.object),
        );
        !self.find(&pattern).is_empty()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Conveniences
    // ========================================================================

    /// Delete `old` and add `new`.
    fn replace(&self, old: &Triple, new: Triple) -> Result<()> {
        self.delete(old)?;
        self.add(new)?;
        Ok(())
    }

    /// Objects of `(subject, predicate, ?)`.
    fn objects(&self, subject: &Node, predicate: &Node) -> Vec<Node> {
        self.find(&TriplePattern::new(Some(subject), Some(predicate), None))
            .into_iter()
            .map(|t| t.object)
            .collect()
    }

    /// Subjects of `(?, predicate, object)`.
    fn subjects(&self, predicate: &Node, object: &Node) -> Vec<Node> {
        self.find(&TriplePattern::new(None, Some(predicate), Some(object)))
            .into_iter()
            .map(|t| t.subject)
            .collect()
    }

    /// Some object of `(subject, predicate, ?)`, if any.
    fn object(&self, subject: &Node, predicate: &Node) -> Option<Node> {
        self.objects(subject, predicate).into_iter().next()
    }

    /// `rdf:type` objects of a node.
    fn types(&self, node: &Node) -> Vec<Node> {
        self.objects(node, &Node::iri(vocab::rdf::TYPE))
    }

    /// True if `node` appears as subject or object of any triple.
    fn mentions(&self, node: &Node) -> bool {
        !self.find(&TriplePattern::new(Some(node), None, None)).is_empty()
            || !self.find(&TriplePattern::new(None, None, Some(node))).is_empty()
    }

    /// A blank node no triple in this store uses yet.
    ///
    /// Labels come from `Node::fresh_blank`, which knows nothing about
    /// caller-chosen labels such as `_:b1`; taken labels are skipped.
    fn fresh_blank(&self) -> Node {
        loop {
            let candidate = Node::fresh_blank();
            if !self.mentions(&candidate) {
                return candidate;
            }
        }
    }

    fn has_type(&self, node: &Node, type_iri: &str) -> bool {
        self.contains(&Triple::new(
            node.clone(),
            Node::iri(vocab::rdf::TYPE),
            Node::iri(type_iri),
        ))
    }
}
