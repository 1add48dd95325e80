//! # ontgraph — Structural Views over a Triple Graph
//!
//! A mutable graph of subject–predicate–object facts, seen through typed
//! views whose type is decided by the triples around a node rather than by
//! a stored tag, plus persistent `rdf:first`/`rdf:rest` lists built on top.
//!
//! ## Design Principles
//!
//! 1. **Store-agnostic**: `TripleStore` is the contract with storage
//! 2. **Structural typing**: a `ViewFactory` is a finder, a filter and a maker
//! 3. **Immutable configuration**: one `FactoryRegistry` per `Mode`, chosen
//!    when the graph is opened
//! 4. **Cycle-safe resolution**: recursive casts go through `fetch_as` and
//!    fail with `Error::Recursion` instead of looping
//!
//! ## Quick Start
//!
//! ```rust
//! use ontgraph::{Graph, ListKind, Node, ViewType};
//!
//! # fn example() -> ontgraph::Result<()> {
//! let graph = Graph::open_memory();
//! let a = Node::iri("http://example.org/A");
//! graph.create(&a, ViewType::Class)?;
//!
//! let view = graph.resolve(&a, ViewType::ClassExpression)?;
//! assert_eq!(view.kind(), ViewType::Class);
//!
//! let list = graph.create_list(
//!     &Node::iri("http://example.org/s"),
//!     &Node::iri("http://example.org/p"),
//!     ListKind::of(ViewType::Class),
//!     [a.clone()],
//! )?;
//! assert_eq!(list.size()?, 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Layers
//!
//! | Layer | Module | Description |
//! |-------|--------|-------------|
//! | Model | `model` | nodes, triples, vocabulary |
//! | Storage | `storage` | `TripleStore` trait, in-memory and read-only stores |
//! | Factories | `factory` | finder / filter / maker, `MultiFactory` |
//! | Registry | `registry` | per-mode factory snapshots |
//! | Resolver | `resolver` | view cache and cycle guard |
//! | Lists | `list` | `ListHandle`, walkers, edit planning |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod config;
pub mod view;
pub mod factory;
pub mod registry;
pub mod resolver;
pub mod list;
pub mod annotation;

use std::sync::Arc;

use smallvec::SmallVec;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{Node, Triple, TriplePattern, vocab};
pub use storage::{TripleStore, MemoryStore, ReadOnlyStore};
pub use config::{GraphConfig, Mode};
pub use view::{View, ViewType};
pub use factory::{ViewFactory, CommonFactory, MultiFactory, Filter, Finder, Maker};
pub use registry::FactoryRegistry;
pub use resolver::ViewResolver;
pub use list::{ListHandle, ListKind, ListEdit, Members};

// ============================================================================
// Top-level Graph handle
// ============================================================================

/// The primary entry point. A `Graph` binds a store to the factory
/// registry of its configured `Mode` and owns the view cache.
///
/// Cloning is cheap and shares the store and the cache.
#[derive(Clone)]
pub struct Graph {
    config: GraphConfig,
    resolver: Arc<ViewResolver>,
}

impl Graph {
    /// Open a graph over `store` with the standard registry for
    /// `config.mode`.
    pub fn with_store(store: Arc<dyn TripleStore>, config: GraphConfig) -> Self {
        let registry = FactoryRegistry::shared(config.mode);
        Self::with_registry(store, registry, config)
    }

    /// Open a graph with a caller-built registry. `config.mode` is
    /// replaced by the registry's mode.
    pub fn with_registry(
        store: Arc<dyn TripleStore>,
        registry: Arc<FactoryRegistry>,
        mut config: GraphConfig,
    ) -> Self {
        config.mode = registry.mode();
        let resolver = ViewResolver::new(store, registry).with_cache(config.cache_views);
        tracing::debug!(mode = ?config.mode, cache = config.cache_views, "graph opened");
        Self { config, resolver: Arc::new(resolver) }
    }

    /// Empty in-memory graph, strict mode.
    pub fn open_memory() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), GraphConfig::default())
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.config.mode
    }

    pub fn store(&self) -> &Arc<dyn TripleStore> {
        self.resolver.store()
    }

    /// Access the resolver (for advanced use).
    pub fn resolver(&self) -> &Arc<ViewResolver> {
        &self.resolver
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Cast `node` to `view_type`, or fail with `Error::Conversion`.
    pub fn resolve(&self, node: &Node, view_type: ViewType) -> Result<Arc<View>> {
        self.resolver.get_as(node, view_type)
    }

    /// Cast `node` to `view_type` if it matches.
    pub fn find_view(&self, node: &Node, view_type: ViewType) -> Result<Option<Arc<View>>> {
        self.resolver.find_as(node, view_type)
    }

    pub fn all_of_type(&self, view_type: ViewType) -> Result<Vec<Arc<View>>> {
        self.resolver.all_of_type(view_type)
    }

    pub fn classify(&self, node: &Node) -> Result<SmallVec<[ViewType; 4]>> {
        self.resolver.classify(node)
    }

    /// Declare `node` as `view_type` and return its view.
    pub fn create(&self, node: &Node, view_type: ViewType) -> Result<Arc<View>> {
        self.resolver.create(node, view_type)
    }

    // ========================================================================
    // Triples
    // ========================================================================

    /// Add a triple and drop cached views of its subject.
    pub fn add(&self, triple: Triple) -> Result<bool> {
        let subject = triple.subject.clone();
        let changed = self.store().add(triple)?;
        if changed {
            self.resolver.evict(&subject);
        }
        Ok(changed)
    }

    /// Delete a triple and drop cached views of its subject.
    pub fn delete(&self, triple: &Triple) -> Result<bool> {
        let changed = self.store().delete(triple)?;
        if changed {
            self.resolver.evict(&triple.subject);
        }
        Ok(changed)
    }

    // ========================================================================
    // Lists
    // ========================================================================

    pub fn create_list(
        &self,
        owner: &Node,
        predicate: &Node,
        kind: ListKind,
        elements: impl IntoIterator<Item = Node>,
    ) -> Result<ListHandle> {
        ListHandle::create(self.resolver.clone(), owner, predicate, kind, elements)
    }

    /// Every list attached by `(owner, predicate, ?)`.
    pub fn lists(&self, owner: &Node, predicate: &Node, kind: ListKind) -> Result<Vec<ListHandle>> {
        self.store()
            .objects(owner, predicate)
            .into_iter()
            .filter(|head| head.is_resource())
            .map(|head| ListHandle::wrap(self.resolver.clone(), head, owner, predicate, kind.clone()))
            .collect()
    }

    /// The list attached by `(owner, predicate, ?)`. Fails with
    /// `Error::IllegalState` when more than one is attached.
    pub fn list(&self, owner: &Node, predicate: &Node, kind: ListKind) -> Result<Option<ListHandle>> {
        let mut lists = self.lists(owner, predicate, kind)?;
        if lists.len() > 1 {
            return Err(Error::IllegalState(format!(
                "{} lists attached by ({owner}, {predicate})",
                lists.len()
            )));
        }
        Ok(lists.pop())
    }

    // ========================================================================
    // Annotations
    // ========================================================================

    /// Annotate the statement `(owner, predicate, target)`.
    pub fn annotate(
        &self,
        owner: &Node,
        predicate: &Node,
        target: &Node,
        property: &Node,
        value: Node,
    ) -> Result<Node> {
        annotation::annotate(&**self.store(), owner, predicate, target, property, value)
    }

    /// Axiom nodes annotating `(owner, predicate, target)`.
    pub fn annotations(&self, owner: &Node, predicate: &Node, target: &Node) -> Vec<Node> {
        annotation::axioms(&**self.store(), owner, predicate, target)
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot convert {node} to {view_type}: {reason}")]
    Conversion { node: String, view_type: String, reason: String },

    #[error("Recursion detected resolving {node} as {view_type}")]
    Recursion { node: String, view_type: String },

    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    #[error("Index {index} out of range ({available} available)")]
    IndexOutOfRange { index: usize, available: usize },

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    pub fn is_recursion(&self) -> bool {
        matches!(self, Error::Recursion { .. })
    }

    pub fn is_conversion(&self) -> bool {
        matches!(self, Error::Conversion { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
