//! Single-node match tests and their combinators.
//!
//! Filters are trait objects so a factory's structural rule can be put
//! together from small predicates: `has_type(..).and(is_iri())`,
//! `banned_types(..)` for punning restrictions, `object_as(..)` to recurse
//! into a neighbour through the resolver.

use std::sync::Arc;

use crate::list::walk;
use crate::model::{Node, vocab};
use crate::resolver::ViewResolver;
use crate::view::ViewType;
use crate::{Error, Result};

pub trait Filter: Send + Sync {
    fn test(&self, node: &Node, graph: &ViewResolver) -> Result<bool>;
}

pub type FilterRef = Arc<dyn Filter>;

// ============================================================================
// Combinators
// ============================================================================

struct AllOf(Vec<FilterRef>);

impl Filter for AllOf {
    fn test(&self, node: &Node, graph: &ViewResolver) -> Result<bool> {
        for f in &self.0 {
            if !f.test(node, graph)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

struct AnyOf(Vec<FilterRef>);

impl Filter for AnyOf {
    fn test(&self, node: &Node, graph: &ViewResolver) -> Result<bool> {
        for f in &self.0 {
            if f.test(node, graph)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

struct Not(FilterRef);

impl Filter for Not {
    fn test(&self, node: &Node, graph: &ViewResolver) -> Result<bool> {
        Ok(!self.0.test(node, graph)?)
    }
}

struct FnFilter<F>(F);

impl<F> Filter for FnFilter<F>
where
    F: Fn(&Node, &ViewResolver) -> Result<bool> + Send + Sync,
{
    fn test(&self, node: &Node, graph: &ViewResolver) -> Result<bool> {
        (self.0)(node, graph)
    }
}

/// Logical AND, short-circuiting left to right.
pub fn all_of(filters: Vec<FilterRef>) -> FilterRef {
    Arc::new(AllOf(filters))
}

/// Logical OR, short-circuiting left to right.
pub fn any_of(filters: Vec<FilterRef>) -> FilterRef {
    Arc::new(AnyOf(filters))
}

pub fn not(filter: FilterRef) -> FilterRef {
    Arc::new(Not(filter))
}

pub fn from_fn<F>(f: F) -> FilterRef
where
    F: Fn(&Node, &ViewResolver) -> Result<bool> + Send + Sync + 'static,
{
    Arc::new(FnFilter(f))
}

/// Always matches.
pub fn any() -> FilterRef {
    from_fn(|_, _| Ok(true))
}

pub trait FilterExt {
    fn and(self, other: FilterRef) -> FilterRef;
    fn or(self, other: FilterRef) -> FilterRef;
    fn negate(self) -> FilterRef;
}

impl FilterExt for FilterRef {
    fn and(self, other: FilterRef) -> FilterRef {
        all_of(vec![self, other])
    }

    fn or(self, other: FilterRef) -> FilterRef {
        any_of(vec![self, other])
    }

    fn negate(self) -> FilterRef {
        not(self)
    }
}

// ============================================================================
// Node kind
// ============================================================================

pub fn is_iri() -> FilterRef {
    from_fn(|n, _| Ok(n.is_iri()))
}

pub fn is_blank() -> FilterRef {
    from_fn(|n, _| Ok(n.is_blank()))
}

pub fn is_literal() -> FilterRef {
    from_fn(|n, _| Ok(n.is_literal()))
}

/// Node is one of the given IRIs.
pub fn one_of_iris(iris: &'static [&'static str]) -> FilterRef {
    from_fn(move |n, _| Ok(n.as_iri().is_some_and(|iri| iris.iter().any(|i| *i == iri))))
}

// ============================================================================
// Neighbourhood
// ============================================================================

pub fn has_type(type_iri: &'static str) -> FilterRef {
    from_fn(move |n, g| Ok(n.is_resource() && g.store().has_type(n, type_iri)))
}

pub fn has_any_type(type_iris: &'static [&'static str]) -> FilterRef {
    from_fn(move |n, g| {
        Ok(n.is_resource() && type_iris.iter().any(|t| g.store().has_type(n, t)))
    })
}

/// Punning restriction: the node must carry none of these co-types.
pub fn banned_types(type_iris: &'static [&'static str]) -> FilterRef {
    not(has_any_type(type_iris))
}

/// Node is the subject of at least one `predicate` triple.
pub fn has_predicate(predicate: &'static str) -> FilterRef {
    from_fn(move |n, g| Ok(n.is_resource() && g.store().object(n, &Node::iri(predicate)).is_some()))
}

/// Some object of `(node, predicate, ?)` resolves as `view_type`.
///
/// Resolution goes through `fetch_as`, so a self-referential structure
/// surfaces as `Error::Recursion` instead of looping.
pub fn object_as(predicate: &'static str, view_type: ViewType) -> FilterRef {
    from_fn(move |n, g| {
        if n.is_literal() {
            return Ok(false);
        }
        for o in g.store().objects(n, &Node::iri(predicate)) {
            if g.fetch_as(&o, view_type)?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    })
}

/// Some object of `(node, predicate, ?)` is a well-formed list whose every
/// element resolves as `view_type`.
pub fn list_of(predicate: &'static str, view_type: ViewType) -> FilterRef {
    from_fn(move |n, g| {
        if n.is_literal() {
            return Ok(false);
        }
        'heads: for head in g.store().objects(n, &Node::iri(predicate)) {
            let elements = match walk::element_nodes(&**g.store(), &head, None) {
                Ok(elements) => elements,
                Err(Error::IllegalState(_)) => continue,
                Err(e) => return Err(e),
            };
            for e in &elements {
                if g.fetch_as(e, view_type)?.is_none() {
                    continue 'heads;
                }
            }
            return Ok(true);
        }
        Ok(false)
    })
}

/// Node's `rdf:type` objects contain something resolving as `view_type`.
pub fn typed_as(view_type: ViewType) -> FilterRef {
    object_as(vocab::rdf::TYPE, view_type)
}
