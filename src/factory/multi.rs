//! Union of factories under one view type.

use std::sync::Arc;

use crate::model::Node;
use crate::resolver::ViewResolver;
use crate::view::{View, ViewType};
use crate::{Error, Result};
use super::{FactoryRef, ViewFactory, conversion, finder};

/// Ordered list of sub-factories.
///
/// - `matches`: any sub-factory matches.
/// - `wrap`: the first matching sub-factory in registration order builds
///   the view; the result carries this factory's view type and the
///   sub-factory's kind.
/// - `find`: concatenation of the sub-factories' results, deduplicated by
///   node, first occurrence wins.
pub struct MultiFactory {
    view_type: ViewType,
    parts: Vec<FactoryRef>,
}

impl MultiFactory {
    pub fn new(view_type: ViewType, parts: Vec<FactoryRef>) -> Self {
        Self { view_type, parts }
    }

    pub fn parts(&self) -> &[FactoryRef] {
        &self.parts
    }

    pub fn into_ref(self) -> FactoryRef {
        Arc::new(self)
    }
}

impl ViewFactory for MultiFactory {
    fn view_type(&self) -> ViewType {
        self.view_type
    }

    fn matches(&self, node: &Node, graph: &ViewResolver) -> Result<bool> {
        for part in &self.parts {
            if part.matches(node, graph)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn find(&self, graph: &ViewResolver) -> Result<Vec<Node>> {
        let mut all = Vec::new();
        for part in &self.parts {
            all.extend(part.find(graph)?);
        }
        Ok(finder::dedup(all))
    }

    fn create(&self, node: &Node, _graph: &ViewResolver) -> Result<Arc<View>> {
        Err(Error::Unsupported(format!(
            "{} is a union type; create {node} through one of its parts",
            self.view_type
        )))
    }

    fn wrap(&self, node: &Node, graph: &ViewResolver) -> Result<Arc<View>> {
        for part in &self.parts {
            // a rejecting part reports Conversion; anything else propagates
            let inner = match part.wrap(node, graph) {
                Ok(inner) => inner,
                Err(e) if e.is_conversion() => continue,
                Err(e) => return Err(e),
            };
            return Ok(Arc::new(View::new(
                node.clone(),
                self.view_type,
                inner.kind(),
                graph.store().clone(),
            )));
        }
        Err(conversion(node, self.view_type, "no sub-factory matched"))
    }
}
