//! # View Resolver
//!
//! The single entry point for casting a node to a view type. Used by
//! external callers (`get_as`, `find_as`) and by factory filters that
//! recurse into neighbouring nodes (`fetch_as`).
//!
//! ## Cache
//!
//! Successful resolutions are cached per `(node, view type)`. Failures are
//! never cached, so a node that becomes valid after an edit is picked up on
//! the next call. The cache is not invalidated by edits made directly on the
//! store: callers that bypass `Graph`/`ListHandle` must `evict` the nodes
//! they touch or `clear_cache`.
//!
//! ## Cycle guard
//!
//! `fetch_as` records the node in a thread-local in-flight set for the
//! duration of the call. Meeting the same node again on the same thread is
//! a cycle and fails with `Error::Recursion`. The entry is released by a
//! drop guard on every exit path. Other threads never see it.

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::{HashMap, HashSet};
use parking_lot::RwLock;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::factory::FactoryRef;
use crate::model::Node;
use crate::registry::FactoryRegistry;
use crate::storage::TripleStore;
use crate::view::{View, ViewType};
use crate::{Error, Result};

static NEXT_RESOLVER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static IN_FLIGHT: RefCell<HashSet<(u64, Node)>> = RefCell::new(HashSet::new());
}

/// Holds one node in this thread's in-flight set until dropped.
struct InFlight {
    key: (u64, Node),
}

impl InFlight {
    /// `None` if the node is already being resolved on this thread.
    fn acquire(resolver: u64, node: &Node) -> Option<Self> {
        let key = (resolver, node.clone());
        let fresh = IN_FLIGHT.with(|set| set.borrow_mut().insert(key.clone()));
        fresh.then_some(InFlight { key })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        IN_FLIGHT.with(|set| {
            set.borrow_mut().remove(&self.key);
        });
    }
}

type CacheSlot = SmallVec<[(ViewType, Arc<View>); 2]>;

pub struct ViewResolver {
    id: u64,
    store: Arc<dyn TripleStore>,
    registry: Arc<FactoryRegistry>,
    cache_views: bool,
    cache: RwLock<HashMap<Node, CacheSlot>>,
}

impl ViewResolver {
    pub fn new(store: Arc<dyn TripleStore>, registry: Arc<FactoryRegistry>) -> Self {
        Self {
            id: NEXT_RESOLVER.fetch_add(1, Ordering::Relaxed),
            store,
            registry,
            cache_views: true,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_cache(mut self, cache_views: bool) -> Self {
        self.cache_views = cache_views;
        self
    }

    pub fn store(&self) -> &Arc<dyn TripleStore> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<FactoryRegistry> {
        &self.registry
    }

    fn factory(&self, view_type: ViewType) -> Result<&FactoryRef> {
        self.registry.resolve(view_type)
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Cast `node` to `view_type`, failing with `Error::Conversion` if no
    /// factory matches.
    pub fn get_as(&self, node: &Node, view_type: ViewType) -> Result<Arc<View>> {
        if let Some(view) = self.cached(node, view_type) {
            trace!(%node, %view_type, "view cache hit");
            return Ok(view);
        }
        let factory = self.factory(view_type)?;
        let view = factory.wrap(node, self)?;
        Ok(self.remember(view))
    }

    /// Like `get_as`, but a failed cast is `Ok(None)`.
    ///
    /// `Error::Recursion` still propagates.
    pub fn find_as(&self, node: &Node, view_type: ViewType) -> Result<Option<Arc<View>>> {
        lenient(node, view_type, self.get_as(node, view_type))
    }

    /// Cycle-safe cast used for structural expansion.
    ///
    /// Fails with `Error::Recursion` if `node` is already being fetched on
    /// this thread; any other failure is "no match".
    pub fn fetch_as(&self, node: &Node, view_type: ViewType) -> Result<Option<Arc<View>>> {
        let Some(_guard) = InFlight::acquire(self.id, node) else {
            debug!(%node, %view_type, "recursion detected");
            return Err(Error::Recursion {
                node: node.to_string(),
                view_type: view_type.to_string(),
            });
        };
        lenient(node, view_type, self.get_as(node, view_type))
    }

    /// Every node of the store that resolves as `view_type`.
    ///
    /// Candidates that fail to convert are dropped; recursion propagates.
    pub fn all_of_type(&self, view_type: ViewType) -> Result<Vec<Arc<View>>> {
        let factory = self.factory(view_type)?;
        let mut out = Vec::new();
        for node in factory.find(self)? {
            if let Some(view) = self.find_as(&node, view_type)? {
                out.push(view);
            }
        }
        Ok(out)
    }

    /// All registered view types `node` currently matches, in registry order.
    pub fn classify(&self, node: &Node) -> Result<SmallVec<[ViewType; 4]>> {
        let mut out = SmallVec::new();
        for vt in self.registry.view_types() {
            if self.factory(*vt)?.matches(node, self)? {
                out.push(*vt);
            }
        }
        Ok(out)
    }

    /// Write the backing triples for `node` as `view_type` and return the view.
    pub fn create(&self, node: &Node, view_type: ViewType) -> Result<Arc<View>> {
        let view = self.factory(view_type)?.create(node, self)?;
        // The node's neighbourhood changed; earlier casts may now be wrong.
        self.evict(node);
        Ok(self.remember(view))
    }

    // ========================================================================
    // Cache
    // ========================================================================

    fn cached(&self, node: &Node, view_type: ViewType) -> Option<Arc<View>> {
        if !self.cache_views {
            return None;
        }
        let cache = self.cache.read();
        cache
            .get(node)?
            .iter()
            .find(|(vt, _)| *vt == view_type)
            .map(|(_, v)| v.clone())
    }

    /// Insert unless another thread got there first; return the cached view.
    fn remember(&self, view: Arc<View>) -> Arc<View> {
        if !self.cache_views {
            return view;
        }
        let mut cache = self.cache.write();
        let slot = cache.entry(view.node().clone()).or_default();
        if let Some((_, existing)) = slot.iter().find(|(vt, _)| *vt == view.view_type()) {
            return existing.clone();
        }
        trace!(node = %view.node(), view_type = %view.view_type(), "view cached");
        slot.push((view.view_type(), view.clone()));
        view
    }

    /// Drop every cached view of `node`.
    pub fn evict(&self, node: &Node) {
        if self.cache.write().remove(node).is_some() {
            trace!(%node, "view cache evicted");
        }
    }

    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }

    /// Number of cached views.
    pub fn cached_len(&self) -> usize {
        self.cache.read().values().map(|slot| slot.len()).sum()
    }
}

fn lenient(node: &Node, view_type: ViewType, result: Result<Arc<View>>) -> Result<Option<Arc<View>>> {
    match result {
        Ok(view) => Ok(Some(view)),
        Err(e) if e.is_recursion() => Err(e),
        Err(e) => {
            trace!(%node, %view_type, error = %e, "no match");
            Ok(None)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;
    use crate::factory::{CommonFactory, FilterExt, filter, finder};
    use crate::model::{Triple, vocab};
    use crate::storage::MemoryStore;

    const LINK: &str = "http://x/link";

    /// A node matches "Chain" when it has no `link` or its `link` target
    /// is itself a Chain.
    fn chain_registry() -> Arc<FactoryRegistry> {
        let chain = CommonFactory::new(
            ViewType::Custom("Chain"),
            finder::by_predicate(LINK),
            filter::has_predicate(LINK)
                .negate()
                .or(filter::object_as(LINK, ViewType::Custom("Chain"))),
        );
        Arc::new(
            FactoryRegistry::builder(Mode::Lax)
                .register(ViewType::Custom("Chain"), chain.into_ref())
                .build(),
        )
    }

    fn link(a: &str, b: &str) -> Triple {
        Triple::new(Node::iri(a), Node::iri(LINK), Node::iri(b))
    }

    #[test]
    fn test_get_as_is_cached() {
        let store = MemoryStore::from_triples([link("http://x/a", "http://x/b")]);
        let r = ViewResolver::new(Arc::new(store), chain_registry());
        let a = Node::iri("http://x/a");

        let v1 = r.get_as(&a, ViewType::Custom("Chain")).unwrap();
        let v2 = r.get_as(&a, ViewType::Custom("Chain")).unwrap();
        assert!(Arc::ptr_eq(&v1, &v2));
        // b was resolved on the way through fetch_as
        assert_eq!(r.cached_len(), 2);
    }

    #[test]
    fn test_cache_disabled() {
        let store = MemoryStore::from_triples([link("http://x/a", "http://x/b")]);
        let r = ViewResolver::new(Arc::new(store), chain_registry()).with_cache(false);
        let a = Node::iri("http://x/a");
        let v1 = r.get_as(&a, ViewType::Custom("Chain")).unwrap();
        let v2 = r.get_as(&a, ViewType::Custom("Chain")).unwrap();
        assert!(!Arc::ptr_eq(&v1, &v2));
        assert_eq!(r.cached_len(), 0);
    }

    #[test]
    fn test_self_loop_is_recursion() {
        let store = MemoryStore::from_triples([link("http://x/a", "http://x/a")]);
        let r = ViewResolver::new(Arc::new(store), chain_registry());
        let a = Node::iri("http://x/a");

        let err = r.fetch_as(&a, ViewType::Custom("Chain")).unwrap_err();
        assert!(err.is_recursion());
        let err = r.get_as(&a, ViewType::Custom("Chain")).unwrap_err();
        assert!(err.is_recursion());
        let err = r.find_as(&a, ViewType::Custom("Chain")).unwrap_err();
        assert!(err.is_recursion());

        // guard released on the error path
        IN_FLIGHT.with(|set| assert!(set.borrow().is_empty()));
        assert_eq!(r.cached_len(), 0);
    }

    #[test]
    fn test_long_cycle_is_recursion() {
        let store = MemoryStore::from_triples([
            link("http://x/a", "http://x/b"),
            link("http://x/b", "http://x/c"),
            link("http://x/c", "http://x/a"),
        ]);
        let r = ViewResolver::new(Arc::new(store), chain_registry());
        let err = r.fetch_as(&Node::iri("http://x/b"), ViewType::Custom("Chain")).unwrap_err();
        assert!(err.is_recursion());
        IN_FLIGHT.with(|set| assert!(set.borrow().is_empty()));
    }

    #[test]
    fn test_negatives_not_cached() {
        let store = MemoryStore::new();
        let r = ViewResolver::new(Arc::new(store.clone()), FactoryRegistry::shared(Mode::Strict));
        let a = Node::iri("http://x/A");
        assert!(r.fetch_as(&a, ViewType::Class).unwrap().is_none());
        assert!(r.get_as(&a, ViewType::Class).unwrap_err().is_conversion());

        store
            .add(Triple::new(a.clone(), Node::iri(vocab::rdf::TYPE), Node::iri(vocab::owl::CLASS)))
            .unwrap();
        assert!(r.fetch_as(&a, ViewType::Class).unwrap().is_some());
    }

    #[test]
    fn test_evict() {
        let store = MemoryStore::from_triples([link("http://x/a", "http://x/b")]);
        let r = ViewResolver::new(Arc::new(store), chain_registry());
        let a = Node::iri("http://x/a");
        let v1 = r.get_as(&a, ViewType::Custom("Chain")).unwrap();
        r.evict(&a);
        let v2 = r.get_as(&a, ViewType::Custom("Chain")).unwrap();
        assert!(!Arc::ptr_eq(&v1, &v2));

        r.clear_cache();
        assert_eq!(r.cached_len(), 0);
    }

    #[test]
    fn test_unregistered_type_is_conversion() {
        let r = ViewResolver::new(Arc::new(MemoryStore::new()), chain_registry());
        let err = r.get_as(&Node::iri("http://x/a"), ViewType::Class).unwrap_err();
        assert!(err.is_conversion());
    }

    #[test]
    fn test_in_flight_is_per_thread() {
        let store = MemoryStore::from_triples([link("http://x/a", "http://x/b")]);
        let r = Arc::new(ViewResolver::new(Arc::new(store), chain_registry()));
        let a = Node::iri("http://x/a");
        let _held = InFlight::acquire(r.id, &a).unwrap();

        let other = {
            let r = r.clone();
            let a = a.clone();
            std::thread::spawn(move || r.fetch_as(&a, ViewType::Custom("Chain")).map(|v| v.is_some()))
                .join()
                .unwrap()
        };
        assert!(other.unwrap());
        assert!(r.fetch_as(&a, ViewType::Custom("Chain")).unwrap_err().is_recursion());
    }
}
