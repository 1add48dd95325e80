//! Triple writers behind `ViewFactory::create`.

use std::sync::Arc;

use crate::model::{Node, Triple, vocab};
use crate::resolver::ViewResolver;
use crate::{Error, Result};

pub trait Maker: Send + Sync {
    /// Add whatever triples make `node` match the factory's filter.
    fn make(&self, node: &Node, graph: &ViewResolver) -> Result<()>;
}

pub type MakerRef = Arc<dyn Maker>;

/// Writes `(node, rdf:type, type_iri)`.
struct Declaring(&'static str);

impl Maker for Declaring {
    fn make(&self, node: &Node, graph: &ViewResolver) -> Result<()> {
        if node.is_literal() {
            return Err(Error::IllegalArgument(format!("cannot declare literal {node}")));
        }
        graph.store().add(Triple::new(
            node.clone(),
            Node::iri(vocab::rdf::TYPE),
            Node::iri(self.0),
        ))?;
        Ok(())
    }
}

pub fn declaring(type_iri: &'static str) -> MakerRef {
    Arc::new(Declaring(type_iri))
}

/// Entity declarations only apply to named nodes.
pub fn declaring_named(type_iri: &'static str) -> MakerRef {
    Arc::new(NamedOnly(Declaring(type_iri)))
}

struct NamedOnly<M>(M);

impl<M: Maker> Maker for NamedOnly<M> {
    fn make(&self, node: &Node, graph: &ViewResolver) -> Result<()> {
        if !node.is_iri() {
            return Err(Error::IllegalArgument(format!("{node} is not a named node")));
        }
        self.0.make(node, graph)
    }
}
