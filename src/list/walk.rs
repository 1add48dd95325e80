//! Chain walkers.
//!
//! Two modes over the same cell reader:
//!
//! - **Strict**: a malformed cell (missing or duplicated `rdf:first` /
//!   `rdf:rest`, missing cell type, repeated cell) yields one
//!   `Error::IllegalState` and ends the walk.
//! - **Safe**: the same conditions end the walk quietly. Used where the
//!   chain may be truncated underneath the reader.

use hashbrown::HashSet;
use tracing::warn;

use crate::model::{Node, Triple, vocab};
use crate::storage::TripleStore;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkMode {
    Strict,
    Safe,
}

/// One link of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub node: Node,
    pub first: Node,
    pub rest: Node,
}

impl Cell {
    /// The triples that make up this cell.
    pub fn triples(&self, cell_type: Option<&Node>) -> Vec<Triple> {
        let mut out = vec![
            Triple::new(self.node.clone(), Node::iri(vocab::rdf::FIRST), self.first.clone()),
            Triple::new(self.node.clone(), Node::iri(vocab::rdf::REST), self.rest.clone()),
        ];
        if let Some(t) = cell_type {
            out.push(Triple::new(self.node.clone(), Node::iri(vocab::rdf::TYPE), t.clone()));
        }
        out
    }
}

/// Read one cell, checking the exactly-one-first / exactly-one-rest rule.
pub fn read_cell(store: &dyn TripleStore, node: &Node, cell_type: Option<&Node>) -> Result<Cell> {
    if !node.is_resource() {
        return Err(Error::IllegalState(format!("{node} cannot be a list cell")));
    }
    let firsts = store.objects(node, &Node::iri(vocab::rdf::FIRST));
    let rests = store.objects(node, &Node::iri(vocab::rdf::REST));
    let (first, rest) = match (firsts.as_slice(), rests.as_slice()) {
        ([first], [rest]) => (first.clone(), rest.clone()),
        _ => {
            return Err(Error::IllegalState(format!(
                "malformed list cell {node}: {} rdf:first, {} rdf:rest",
                firsts.len(),
                rests.len()
            )));
        }
    };
    if let Some(t) = cell_type {
        let typed = Triple::new(node.clone(), Node::iri(vocab::rdf::TYPE), t.clone());
        if !store.contains(&typed) {
            return Err(Error::IllegalState(format!("list cell {node} is not typed {t}")));
        }
    }
    Ok(Cell { node: node.clone(), first, rest })
}

/// Iterator over the cells of a chain, head first.
pub struct Cells<'a> {
    store: &'a dyn TripleStore,
    cell_type: Option<&'a Node>,
    mode: WalkMode,
    next: Option<Node>,
    seen: HashSet<Node>,
}

impl<'a> Cells<'a> {
    pub fn new(store: &'a dyn TripleStore, head: &Node, cell_type: Option<&'a Node>, mode: WalkMode) -> Self {
        Self {
            store,
            cell_type,
            mode,
            next: Some(head.clone()),
            seen: HashSet::new(),
        }
    }

    fn fail(&mut self, err: Error) -> Option<Result<Cell>> {
        self.next = None;
        match self.mode {
            WalkMode::Strict => Some(Err(err)),
            WalkMode::Safe => {
                warn!(error = %err, "list walk stopped at malformed remainder");
                None
            }
        }
    }
}

impl Iterator for Cells<'_> {
    type Item = Result<Cell>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if current.is_nil() {
            return None;
        }
        if !self.seen.insert(current.clone()) {
            return self.fail(Error::IllegalState(format!("list cell {current} repeats")));
        }
        match read_cell(self.store, &current, self.cell_type) {
            Ok(cell) => {
                self.next = Some(cell.rest.clone());
                Some(Ok(cell))
            }
            Err(e) => self.fail(e),
        }
    }
}

/// All cells, strict.
pub fn cells(store: &dyn TripleStore, head: &Node, cell_type: Option<&Node>) -> Result<Vec<Cell>> {
    Cells::new(store, head, cell_type, WalkMode::Strict).collect()
}

/// All element nodes, strict.
pub fn element_nodes(store: &dyn TripleStore, head: &Node, cell_type: Option<&Node>) -> Result<Vec<Node>> {
    Cells::new(store, head, cell_type, WalkMode::Strict)
        .map(|c| c.map(|c| c.first))
        .collect()
}
