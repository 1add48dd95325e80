//! End-to-end tests for persistent lists.
//!
//! Lists are created and edited through `Graph` / `ListHandle` and checked
//! against the raw triples left in the store.

use std::sync::Arc;

use ontgraph::factory::{filter, finder};
use ontgraph::vocab::{owl, rdf, rdfs};
use ontgraph::{
    CommonFactory, Error, FactoryRegistry, Graph, GraphConfig, ListHandle, ListKind, MemoryStore, Mode, Node,
    ReadOnlyStore, Triple, TripleStore, ViewType,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn owner() -> Node {
    Node::iri("http://example.org/S")
}

fn pred() -> Node {
    Node::iri("http://example.org/P")
}

fn lit(s: &str) -> Node {
    Node::literal(s)
}

fn literals() -> ListKind {
    ListKind::of(ViewType::Literal)
}

fn values(list: &ListHandle) -> Vec<String> {
    list.members()
        .map(|m| m.map(|v| v.node().as_str().to_string()))
        .collect::<ontgraph::Result<_>>()
        .unwrap()
}

fn new_list(graph: &Graph, elems: &[&str]) -> ListHandle {
    graph
        .create_list(&owner(), &pred(), literals(), elems.iter().map(|e| lit(e)))
        .unwrap()
}

// ============================================================================
// 1. Round trip
// ============================================================================

#[test]
fn test_list_round_trip() {
    let graph = Graph::open_memory();
    let list = new_list(&graph, &[]);

    list.add_last(&lit("e1")).unwrap();
    list.add_last(&lit("e2")).unwrap();
    assert_eq!(values(&list), vec!["e1", "e2"]);

    list.remove_first().unwrap();
    assert_eq!(values(&list), vec!["e2"]);

    list.clear().unwrap();
    assert_eq!(values(&list), Vec::<String>::new());
    assert!(list.is_empty());

    // only the owner triple pointing at nil remains
    assert_eq!(
        graph.store().find(&ontgraph::TriplePattern::any()),
        vec![Triple::new(owner(), pred(), Node::iri(rdf::NIL))]
    );
}

#[test]
fn test_members_is_restartable() {
    let graph = Graph::open_memory();
    let list = new_list(&graph, &["a", "b"]);
    assert_eq!(values(&list), values(&list));
    assert_eq!(list.members().count(), 2);
    assert_eq!(list.members().count(), 2);
}

#[test]
fn test_wrap_existing_list() {
    let graph = Graph::open_memory();
    new_list(&graph, &["a", "b"]);

    let found = graph.list(&owner(), &pred(), literals()).unwrap().unwrap();
    assert_eq!(values(&found), vec!["a", "b"]);
    assert!(graph.list(&owner(), &Node::iri("http://example.org/Q"), literals()).unwrap().is_none());

    new_list(&graph, &["c"]);
    assert!(matches!(graph.list(&owner(), &pred(), literals()), Err(Error::IllegalState(_))));
    assert_eq!(graph.lists(&owner(), &pred(), literals()).unwrap().len(), 2);
}

#[test]
fn test_edit_wrapped_chain_with_low_blank_labels() {
    // `_:b1 first "a"; _:b1 rest nil; S P _:b1`, plus the labels the
    // process-wide counter hands out next
    let b1 = Node::blank("b1");
    let store = MemoryStore::from_triples([
        Triple::new(b1.clone(), Node::iri(rdf::FIRST), lit("a")),
        Triple::new(b1.clone(), Node::iri(rdf::REST), Node::iri(rdf::NIL)),
        Triple::new(owner(), pred(), b1.clone()),
    ]);
    let next: u64 = Node::fresh_blank().as_str()[1..].parse().unwrap();
    for n in next + 1..next + 17 {
        let taken = Node::blank(format!("b{n}"));
        store.add(Triple::new(taken, Node::iri(rdfs::LABEL), lit("taken"))).unwrap();
    }
    let graph = Graph::with_store(Arc::new(store.clone()), GraphConfig::default());

    let list = graph.list(&owner(), &pred(), literals()).unwrap().unwrap();
    list.add_first(&lit("z")).unwrap();
    assert_ne!(list.head(), b1);
    list.add_last(&lit("y")).unwrap();
    graph.create_list(&Node::iri("http://example.org/T"), &pred(), literals(), [lit("w")]).unwrap();
    let axiom = graph
        .annotate(&owner(), &pred(), &list.head(), &Node::iri(rdfs::COMMENT), lit("note"))
        .unwrap();

    assert_eq!(values(&list), vec!["z", "a", "y"]);
    let outgoing = |n: &Node| store.find(&ontgraph::TriplePattern::any().with_subject(n.clone())).len();
    // first + rest and nothing else
    for cell in list.cells().unwrap() {
        assert_eq!(outgoing(&cell.node), 2, "{} shares its label", cell.node);
    }
    assert_eq!(outgoing(&axiom), 5);
}

#[test]
fn test_list_of_classes_skips_non_classes() {
    let graph = Graph::open_memory();
    let a = Node::iri("http://example.org/A");
    graph.create(&a, ViewType::Class).unwrap();

    let list = graph
        .create_list(
            &owner(),
            &pred(),
            ListKind::of(ViewType::Class),
            [a.clone(), Node::iri("http://example.org/undeclared"), lit("x")],
        )
        .unwrap();
    let members: Vec<Node> = list.members().map(|m| m.unwrap().node().clone()).collect();
    assert_eq!(members, vec![a]);
    assert_eq!(list.member_nodes().unwrap().len(), 3);
}

// ============================================================================
// 2. Indexing
// ============================================================================

#[test]
fn test_list_indexing() {
    let graph = Graph::open_memory();
    let list = new_list(&graph, &["e0", "e1", "e2"]);

    assert_eq!(values(&list.get(0).unwrap()), vec!["e0", "e1", "e2"]);
    assert_eq!(values(&list.get(1).unwrap()), vec!["e1", "e2"]);
    assert!(matches!(list.get(3), Err(Error::IndexOutOfRange { .. })));
    assert!(matches!(list.get(-1), Err(Error::IllegalArgument(_))));
}

#[test]
fn test_derived_handle_inserts_mid_list() {
    let graph = Graph::open_memory();
    let list = new_list(&graph, &["a", "c"]);
    list.get(1).unwrap().add_first(&lit("b")).unwrap();
    assert_eq!(values(&list), vec!["a", "b", "c"]);
}

// ============================================================================
// 3. Derived handle after truncation
// ============================================================================

#[test]
fn test_derived_handle_after_remove_last() {
    let graph = Graph::open_memory();
    let list = new_list(&graph, &["A", "B"]);
    let tail = list.get(1).unwrap();
    assert_eq!(values(&tail), vec!["B"]);

    list.remove_last().unwrap();
    assert_eq!(values(&list), vec!["A"]);

    // the tail's head cell was deleted
    assert!(matches!(tail.members().next(), Some(Err(Error::IllegalState(_)))));
    assert!(matches!(tail.size(), Err(Error::IllegalState(_))));
    assert!(matches!(tail.add_first(&lit("X")), Err(Error::IllegalState(_))));
    assert_eq!(tail.safe_members().count(), 0);
    assert_eq!(values(&list), vec!["A"]);
}

// ============================================================================
// 4. Annotation migration
// ============================================================================

#[test]
fn test_annotations_follow_head() {
    let graph = Graph::open_memory();
    let list = new_list(&graph, &["a", "b"]);
    let old_head = list.head();
    let axiom = graph
        .annotate(&owner(), &pred(), &old_head, &Node::iri(rdfs::COMMENT), lit("ordered"))
        .unwrap();

    list.add_first(&lit("z")).unwrap();
    let new_head = list.head();
    assert_ne!(new_head, old_head);
    assert_eq!(graph.annotations(&owner(), &pred(), &new_head), vec![axiom.clone()]);
    assert!(graph.annotations(&owner(), &pred(), &old_head).is_empty());

    list.remove_first().unwrap();
    assert_eq!(list.head(), old_head);
    assert_eq!(graph.annotations(&owner(), &pred(), &old_head), vec![axiom.clone()]);

    list.clear().unwrap();
    let nil = Node::iri(rdf::NIL);
    assert_eq!(graph.annotations(&owner(), &pred(), &nil), vec![axiom]);
}

#[test]
fn test_add_last_leaves_annotations_alone() {
    let graph = Graph::open_memory();
    let list = new_list(&graph, &["a"]);
    let head = list.head();
    let axiom = graph
        .annotate(&owner(), &pred(), &head, &Node::iri(rdfs::LABEL), lit("l"))
        .unwrap();
    list.add_last(&lit("b")).unwrap();
    assert_eq!(graph.annotations(&owner(), &pred(), &head), vec![axiom]);
}

// ============================================================================
// 5. Read-only
// ============================================================================

#[test]
fn test_read_only_store_rejects_edits_without_partial_apply() {
    let base = MemoryStore::new();
    let writable = Graph::with_store(Arc::new(base.clone()), GraphConfig::default());
    new_list(&writable, &["a", "b"]);
    let before = base.all();

    let graph = Graph::with_store(Arc::new(ReadOnlyStore::new(base.clone())), GraphConfig::default());
    let list = graph.list(&owner(), &pred(), literals()).unwrap().unwrap();
    assert_eq!(values(&list), vec!["a", "b"]);

    assert!(matches!(list.add_first(&lit("x")), Err(Error::Unsupported(_))));
    assert!(matches!(list.add_last(&lit("x")), Err(Error::Unsupported(_))));
    assert!(matches!(list.remove_first(), Err(Error::Unsupported(_))));
    assert!(matches!(list.remove_last(), Err(Error::Unsupported(_))));
    assert!(matches!(list.clear(), Err(Error::Unsupported(_))));

    assert_eq!(base.all(), before);
    assert_eq!(values(&list), vec!["a", "b"]);
}

#[test]
fn test_read_only_handle() {
    let graph = Graph::open_memory();
    let list = new_list(&graph, &["a"]);
    let ro = list.as_read_only();
    let before = graph.store().len();

    assert!(matches!(ro.add_last(&lit("b")), Err(Error::Unsupported(_))));
    assert_eq!(graph.store().len(), before);

    // the writable handle is unaffected
    list.add_last(&lit("b")).unwrap();
    assert_eq!(values(&ro), vec!["a", "b"]);
}

// ============================================================================
// 6. Cache eviction
// ============================================================================

const CELL: ViewType = ViewType::Custom("ListCell");

/// Standard strict registry plus a view type matching any list cell.
fn cell_graph() -> Graph {
    let registry = FactoryRegistry::builder(Mode::Strict)
        .extend_from(&FactoryRegistry::shared(Mode::Strict))
        .register(
            CELL,
            CommonFactory::new(CELL, finder::by_predicate(rdf::FIRST), filter::has_predicate(rdf::FIRST)).into_ref(),
        )
        .build();
    Graph::with_registry(Arc::new(MemoryStore::new()), Arc::new(registry), GraphConfig::default())
}

#[test]
fn test_remove_first_evicts_removed_cell() {
    let graph = cell_graph();
    let list = new_list(&graph, &["a", "b", "c"]);
    let cells = list.cells().unwrap();
    for c in &cells {
        graph.resolve(&c.node, CELL).unwrap();
    }
    let cached = graph.resolver().cached_len();

    list.remove_first().unwrap();
    assert!(graph.find_view(&cells[0].node, CELL).unwrap().is_none());
    assert!(graph.resolver().cached_len() < cached);
    // surviving cells still resolve
    assert!(graph.find_view(&cells[1].node, CELL).unwrap().is_some());
}

#[test]
fn test_clear_evicts_every_cell() {
    let graph = cell_graph();
    let list = new_list(&graph, &["a", "b"]);
    let cells = list.cells().unwrap();
    let before: Vec<_> = cells.iter().map(|c| graph.resolve(&c.node, CELL).unwrap()).collect();
    assert!(Arc::ptr_eq(&before[0], &graph.resolve(&cells[0].node, CELL).unwrap()));

    list.clear().unwrap();
    for c in &cells {
        assert!(graph.find_view(&c.node, CELL).unwrap().is_none());
    }

    // a re-added cell is a new node with a new view
    list.add_first(&lit("a")).unwrap();
    let fresh = graph.resolve(&list.head(), CELL).unwrap();
    assert!(before.iter().all(|v| !Arc::ptr_eq(v, &fresh)));
}

fn union_graph() -> (Graph, Node, ListHandle) {
    let graph = Graph::with_store(
        Arc::new(MemoryStore::new()),
        GraphConfig::default().with_mode(Mode::Lax),
    );
    let a = Node::iri("http://example.org/A");
    let b = Node::iri("http://example.org/B");
    graph.create(&a, ViewType::Class).unwrap();
    graph.create(&b, ViewType::Class).unwrap();

    let u = Node::blank("u");
    graph.add(Triple::new(u.clone(), Node::iri(rdf::TYPE), Node::iri(owl::CLASS))).unwrap();
    let list = graph
        .create_list(&u, &Node::iri(owl::UNION_OF), ListKind::of(ViewType::ClassExpression), [a, b])
        .unwrap();
    (graph, u, list)
}

#[test]
fn test_list_edit_evicts_owner_view() {
    let (graph, u, list) = union_graph();
    assert_eq!(graph.resolve(&u, ViewType::ClassExpression).unwrap().kind(), ViewType::ObjectUnionOf);
    assert!(graph.find_view(&u, ViewType::ObjectUnionOf).unwrap().is_some());

    list.add_last(&lit("not a class")).unwrap();
    assert!(graph.find_view(&u, ViewType::ObjectUnionOf).unwrap().is_none());

    list.remove_last().unwrap();
    assert!(graph.find_view(&u, ViewType::ObjectUnionOf).unwrap().is_some());
}

#[test]
fn test_derived_handle_edit_evicts_owner_view() {
    let (graph, u, list) = union_graph();
    assert!(graph.find_view(&u, ViewType::ObjectUnionOf).unwrap().is_some());

    list.get(1).unwrap().add_first(&lit("not a class")).unwrap();
    assert!(graph.find_view(&u, ViewType::ObjectUnionOf).unwrap().is_none());
}

// ============================================================================
// 7. Model-based property test
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    AddFirst(u8),
    AddLast(u8),
    RemoveFirst,
    RemoveLast,
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => any::<u8>().prop_map(Op::AddFirst),
        3 => any::<u8>().prop_map(Op::AddLast),
        2 => Just(Op::RemoveFirst),
        2 => Just(Op::RemoveLast),
        1 => Just(Op::Clear),
    ]
}

proptest! {
    #[test]
    fn prop_list_matches_vec_model(ops in prop::collection::vec(op(), 0..40)) {
        let graph = Graph::with_store(
            Arc::new(MemoryStore::new()),
            GraphConfig::default().with_mode(Mode::Lax),
        );
        let list = graph.create_list(&owner(), &pred(), literals(), Vec::<Node>::new()).unwrap();
        let mut model: Vec<String> = Vec::new();

        for op in ops {
            match op {
                Op::AddFirst(v) => {
                    list.add_first(&lit(&v.to_string())).unwrap();
                    model.insert(0, v.to_string());
                }
                Op::AddLast(v) => {
                    list.add_last(&lit(&v.to_string())).unwrap();
                    model.push(v.to_string());
                }
                Op::RemoveFirst => {
                    list.remove_first().unwrap();
                    if !model.is_empty() {
                        model.remove(0);
                    }
                }
                Op::RemoveLast => {
                    list.remove_last().unwrap();
                    model.pop();
                }
                Op::Clear => {
                    list.clear().unwrap();
                    model.clear();
                }
            }

            prop_assert_eq!(values(&list), model.clone());
            prop_assert_eq!(list.size().unwrap(), model.len());
            prop_assert_eq!(list.is_empty(), model.is_empty());
            // owner triple always points at the current head
            prop_assert_eq!(graph.store().objects(&owner(), &pred()), vec![list.head()]);
            // two triples per cell plus the owner triple
            prop_assert_eq!(graph.store().len(), 1 + 2 * model.len());
        }
    }
}
