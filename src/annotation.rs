//! Statement annotations.
//!
//! Metadata about one triple `(owner, predicate, target)` lives on a
//! separate axiom node:
//!
//! ```text
//! _:x rdf:type              owl:Axiom
//! _:x owl:annotatedSource   owner
//! _:x owl:annotatedProperty predicate
//! _:x owl:annotatedTarget   target
//! _:x <property>            value
//! ```
//!
//! When a list head moves, the owner triple changes and its annotations
//! have to follow; `retarget_delta` computes that rewrite.

use crate::model::{Node, Triple, vocab::{owl, rdf}};
use crate::storage::TripleStore;
use crate::{Error, Result};

/// Attach `(property, value)` to the statement `(owner, predicate, target)`.
/// Returns the axiom node.
pub fn annotate(
    store: &dyn TripleStore,
    owner: &Node,
    predicate: &Node,
    target: &Node,
    property: &Node,
    value: Node,
) -> Result<Node> {
    if !property.is_iri() {
        return Err(Error::IllegalArgument(format!("annotation property {property} must be named")));
    }
    let axiom = store.fresh_blank();
    for t in [
        Triple::new(axiom.clone(), Node::iri(rdf::TYPE), Node::iri(owl::AXIOM)),
        Triple::new(axiom.clone(), Node::iri(owl::ANNOTATED_SOURCE), owner.clone()),
        Triple::new(axiom.clone(), Node::iri(owl::ANNOTATED_PROPERTY), predicate.clone()),
        Triple::new(axiom.clone(), Node::iri(owl::ANNOTATED_TARGET), target.clone()),
        Triple::new(axiom.clone(), property.clone(), value),
    ] {
        store.add(t)?;
    }
    Ok(axiom)
}

/// Axiom nodes annotating `(owner, predicate, target)`.
pub fn axioms(store: &dyn TripleStore, owner: &Node, predicate: &Node, target: &Node) -> Vec<Node> {
    let source = Node::iri(owl::ANNOTATED_SOURCE);
    let property = Node::iri(owl::ANNOTATED_PROPERTY);
    store
        .subjects(&Node::iri(owl::ANNOTATED_TARGET), target)
        .into_iter()
        .filter(|x| {
            store.contains(&Triple::new(x.clone(), source.clone(), owner.clone()))
                && store.contains(&Triple::new(x.clone(), property.clone(), predicate.clone()))
        })
        .collect()
}

/// Triples to remove and add so that every annotation of
/// `(owner, predicate, old)` points at `(owner, predicate, new)` instead.
pub fn retarget_delta(
    store: &dyn TripleStore,
    owner: &Node,
    predicate: &Node,
    old: &Node,
    new: &Node,
) -> (Vec<Triple>, Vec<Triple>) {
    let target = Node::iri(owl::ANNOTATED_TARGET);
    axioms(store, owner, predicate, old)
        .into_iter()
        .map(|x| {
            (
                Triple::new(x.clone(), target.clone(), old.clone()),
                Triple::new(x, target.clone(), new.clone()),
            )
        })
        .unzip()
}

/// Move annotations from `old` to `new`. Returns how many axioms moved.
pub fn retarget(store: &dyn TripleStore, owner: &Node, predicate: &Node, old: &Node, new: &Node) -> Result<usize> {
    let (removed, added) = retarget_delta(store, owner, predicate, old, new);
    for t in &removed {
        store.delete(t)?;
    }
    for t in added {
        store.add(t)?;
    }
    Ok(removed.len())
}
