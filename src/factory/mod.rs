//! # View Factories
//!
//! A factory decides whether a node can be seen as one view type and builds
//! the view. It is assembled from three pluggable parts:
//!
//! | Part | Trait | Job |
//! |------|-------|-----|
//! | Finder | `Finder` | cheap bulk enumeration of candidate nodes |
//! | Filter | `Filter` | exact single-node test against the neighbourhood |
//! | Maker  | `Maker`  | writes the triples that make a node match |
//!
//! `CommonFactory` wires one of each together. `MultiFactory` unions several
//! factories under one view type with first-match-wins precedence.
//!
//! Every method receives the `ViewResolver` as its graph context so filters
//! can recurse into neighbouring nodes through the cycle-safe `fetch_as`.

pub mod filter;
pub mod finder;
pub mod maker;
pub mod multi;

use std::sync::Arc;

use crate::model::Node;
use crate::resolver::ViewResolver;
use crate::view::{View, ViewType};
use crate::{Error, Result};

pub use filter::{Filter, FilterExt, FilterRef};
pub use finder::{Finder, FinderRef};
pub use maker::{Maker, MakerRef};
pub use multi::MultiFactory;

// ============================================================================
// ViewFactory Trait
// ============================================================================

pub trait ViewFactory: Send + Sync {
    /// The view type this factory produces.
    fn view_type(&self) -> ViewType;

    /// Does `node` currently satisfy this view type?
    ///
    /// `Err` is reserved for failures that must propagate, such as
    /// `Error::Recursion`; "does not match" is `Ok(false)`.
    fn matches(&self, node: &Node, graph: &ViewResolver) -> Result<bool>;

    /// All nodes in the store that match, without duplicates.
    fn find(&self, graph: &ViewResolver) -> Result<Vec<Node>>;

    /// Write the backing triples for `node` and return its view.
    fn create(&self, node: &Node, graph: &ViewResolver) -> Result<Arc<View>>;

    /// Wrap an existing node. Fails with `Error::Conversion` when the node
    /// does not match.
    fn wrap(&self, node: &Node, graph: &ViewResolver) -> Result<Arc<View>>;
}

pub type FactoryRef = Arc<dyn ViewFactory>;

pub(crate) fn conversion(node: &Node, view_type: ViewType, reason: impl Into<String>) -> Error {
    Error::Conversion {
        node: node.to_string(),
        view_type: view_type.to_string(),
        reason: reason.into(),
    }
}

// ============================================================================
// CommonFactory
// ============================================================================

/// Finder + Filter + optional Maker.
pub struct CommonFactory {
    view_type: ViewType,
    finder: FinderRef,
    filter: FilterRef,
    maker: Option<MakerRef>,
}

impl CommonFactory {
    pub fn new(view_type: ViewType, finder: FinderRef, filter: FilterRef) -> Self {
        Self { view_type, finder, filter, maker: None }
    }

    pub fn with_maker(mut self, maker: MakerRef) -> Self {
        self.maker = Some(maker);
        self
    }

    pub fn into_ref(self) -> FactoryRef {
        Arc::new(self)
    }
}

impl ViewFactory for CommonFactory {
    fn view_type(&self) -> ViewType {
        self.view_type
    }

    fn matches(&self, node: &Node, graph: &ViewResolver) -> Result<bool> {
        self.filter.test(node, graph)
    }

    fn find(&self, graph: &ViewResolver) -> Result<Vec<Node>> {
        let mut out = Vec::new();
        for node in self.finder.candidates(graph) {
            if self.filter.test(&node, graph)? {
                out.push(node);
            }
        }
        Ok(out)
    }

    fn create(&self, node: &Node, graph: &ViewResolver) -> Result<Arc<View>> {
        let maker = self.maker.as_ref().ok_or_else(|| {
            Error::Unsupported(format!("{} views cannot be created directly", self.view_type))
        })?;
        maker.make(node, graph)?;
        Ok(Arc::new(View::new(
            node.clone(),
            self.view_type,
            self.view_type,
            graph.store().clone(),
        )))
    }

    fn wrap(&self, node: &Node, graph: &ViewResolver) -> Result<Arc<View>> {
        if !self.filter.test(node, graph)? {
            return Err(conversion(node, self.view_type, "filter rejected node"));
        }
        Ok(Arc::new(View::new(
            node.clone(),
            self.view_type,
            self.view_type,
            graph.store().clone(),
        )))
    }
}

// ============================================================================
// Tests
// ============================================================================
