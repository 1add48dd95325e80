//! Bulk candidate enumeration.
//!
//! A finder only narrows the search: every candidate is still run through
//! the factory's filter. Over-reporting is fine, missing a node is not.

use std::sync::Arc;

use hashbrown::HashSet;

use crate::model::{Node, TriplePattern, vocab};
use crate::resolver::ViewResolver;

pub trait Finder: Send + Sync {
    /// Candidate nodes, without duplicates.
    fn candidates(&self, graph: &ViewResolver) -> Vec<Node>;
}

pub type FinderRef = Arc<dyn Finder>;

struct FnFinder<F>(F);

impl<F> Finder for FnFinder<F>
where
    F: Fn(&ViewResolver) -> Vec<Node> + Send + Sync,
{
    fn candidates(&self, graph: &ViewResolver) -> Vec<Node> {
        dedup((self.0)(graph))
    }
}

pub fn from_fn<F>(f: F) -> FinderRef
where
    F: Fn(&ViewResolver) -> Vec<Node> + Send + Sync + 'static,
{
    Arc::new(FnFinder(f))
}

/// Keep the first occurrence of every node, preserving order.
pub fn dedup(nodes: Vec<Node>) -> Vec<Node> {
    let mut seen = HashSet::with_capacity(nodes.len());
    nodes.into_iter().filter(|n| seen.insert(n.clone())).collect()
}

/// Subjects of `(?, rdf:type, T)` for any of the given types.
pub fn by_type(type_iris: &'static [&'static str]) -> FinderRef {
    from_fn(move |g| {
        let rdf_type = Node::iri(vocab::rdf::TYPE);
        type_iris
            .iter()
            .flat_map(|t| g.store().subjects(&rdf_type, &Node::iri(t)))
            .collect()
    })
}

/// Subjects of any `(?, predicate, ?)` triple.
pub fn by_predicate(predicate: &'static str) -> FinderRef {
    from_fn(move |g| {
        g.store()
            .find(&TriplePattern::any().with_predicate(Node::iri(predicate)))
            .into_iter()
            .map(|t| t.subject)
            .collect()
    })
}

/// A fixed set of named nodes, e.g. built-in vocabulary.
pub fn fixed(iris: &'static [&'static str]) -> FinderRef {
    from_fn(move |_| iris.iter().map(Node::iri).collect())
}

/// Every literal in object position.
pub fn literals() -> FinderRef {
    from_fn(|g| {
        g.store()
            .find(&TriplePattern::any())
            .into_iter()
            .map(|t| t.object)
            .filter(Node::is_literal)
            .collect()
    })
}

/// Concatenation of several finders, deduplicated.
pub fn union(finders: Vec<FinderRef>) -> FinderRef {
    from_fn(move |g| finders.iter().flat_map(|f| f.candidates(g)).collect())
}
