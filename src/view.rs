//! Typed views over graph nodes.
//!
//! A `View` binds one node and one view type to a store. The type is not
//! stored anywhere in the graph: it is whatever the factory that produced
//! the view decided by looking at the node's neighbourhood, so the same
//! node can be wrapped by several views of different types at once.

use std::fmt;
use std::sync::Arc;

use crate::model::{Node, vocab};
use crate::storage::TripleStore;

/// Key of a view factory in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewType {
    // Entities
    Class,
    Datatype,
    ObjectProperty,
    DataProperty,
    AnnotationProperty,
    NamedIndividual,
    AnonymousIndividual,
    Individual,
    Entity,

    // Class expressions
    ObjectSomeValuesFrom,
    ObjectAllValuesFrom,
    DataSomeValuesFrom,
    ObjectUnionOf,
    ObjectIntersectionOf,
    ObjectComplementOf,
    ObjectOneOf,
    ClassExpression,

    Literal,

    /// Caller-registered type.
    Custom(&'static str),
}

impl ViewType {
    pub fn name(&self) -> &'static str {
        match self {
            ViewType::Class => "Class",
            ViewType::Datatype => "Datatype",
            ViewType::ObjectProperty => "ObjectProperty",
            ViewType::DataProperty => "DataProperty",
            ViewType::AnnotationProperty => "AnnotationProperty",
            ViewType::NamedIndividual => "NamedIndividual",
            ViewType::AnonymousIndividual => "AnonymousIndividual",
            ViewType::Individual => "Individual",
            ViewType::Entity => "Entity",
            ViewType::ObjectSomeValuesFrom => "ObjectSomeValuesFrom",
            ViewType::ObjectAllValuesFrom => "ObjectAllValuesFrom",
            ViewType::DataSomeValuesFrom => "DataSomeValuesFrom",
            ViewType::ObjectUnionOf => "ObjectUnionOf",
            ViewType::ObjectIntersectionOf => "ObjectIntersectionOf",
            ViewType::ObjectComplementOf => "ObjectComplementOf",
            ViewType::ObjectOneOf => "ObjectOneOf",
            ViewType::ClassExpression => "ClassExpression",
            ViewType::Literal => "Literal",
            ViewType::Custom(name) => *name,
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node seen through one view type.
///
/// `view_type` is the type that was asked for; `kind` is the concrete
/// factory that matched. They differ for union types: a node resolved as
/// `ClassExpression` may have kind `ObjectSomeValuesFrom`.
pub struct View {
    node: Node,
    view_type: ViewType,
    kind: ViewType,
    store: Arc<dyn TripleStore>,
}

impl View {
    pub fn new(node: Node, view_type: ViewType, kind: ViewType, store: Arc<dyn TripleStore>) -> Self {
        Self { node, view_type, kind, store }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn view_type(&self) -> ViewType {
        self.view_type
    }

    pub fn kind(&self) -> ViewType {
        self.kind
    }

    pub fn store(&self) -> &Arc<dyn TripleStore> {
        &self.store
    }

    /// Objects of `(node, predicate, ?)` in the current store state.
    pub fn objects(&self, predicate: &str) -> Vec<Node> {
        if self.node.is_literal() {
            return Vec::new();
        }
        self.store.objects(&self.node, &Node::iri(predicate))
    }

    pub fn object(&self, predicate: &str) -> Option<Node> {
        self.objects(predicate).into_iter().next()
    }

    pub fn types(&self) -> Vec<Node> {
        self.objects(vocab::rdf::TYPE)
    }

    pub fn has_type(&self, type_iri: &str) -> bool {
        !self.node.is_literal() && self.store.has_type(&self.node, type_iri)
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("node", &self.node)
            .field("view_type", &self.view_type)
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == self.view_type {
            write!(f, "{}[{}]", self.node, self.view_type)
        } else {
            write!(f, "{}[{}:{}]", self.node, self.view_type, self.kind)
        }
    }
}
