//! # Persistent Lists
//!
//! A `ListHandle` is a typed view over an `rdf:first`/`rdf:rest` chain
//! hanging off one owner triple:
//!
//! ```text
//! owner --predicate--> c1 --rest--> c2 --rest--> rdf:nil
//!                      |first       |first
//!                      e1           e2
//! ```
//!
//! Elements are cast to the list's element view type through the resolver;
//! elements that fail the cast (or the handle's validity predicate) are
//! skipped, not errors.
//!
//! Mutations rewrite the minimum number of triples: one rest triple for an
//! append, the anchor triple when the head moves. The anchor is the owner
//! triple for a root handle and the predecessor's rest triple for a handle
//! derived with `get(i)`. When the head of a root handle moves, annotations
//! on the owner triple are moved to the new head. Every edit evicts the
//! cached views of the owner and of each cell it removes or relinks.
//!
//! New cells are blank nodes the store does not mention yet, so a wrapped
//! chain with caller-chosen labels never shares a node with them.
//!
//! Edits are not transactional: callers that share a store across threads
//! hold their own lock around multi-step edits.

pub mod edit;
pub mod walk;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::annotation;
use crate::model::{Node, Triple, vocab};
use crate::resolver::ViewResolver;
use crate::view::{View, ViewType};
use crate::{Error, Result};

pub use edit::ListEdit;
pub use walk::{Cell, Cells, WalkMode};

/// Decides which raw elements are in range for a handle.
pub type Validity = Arc<dyn Fn(&Node) -> bool + Send + Sync>;

/// Element type, optional cell type and validity predicate of a list.
#[derive(Clone)]
pub struct ListKind {
    pub element_type: ViewType,
    pub cell_type: Option<Node>,
    pub validity: Validity,
}

impl ListKind {
    pub fn of(element_type: ViewType) -> Self {
        Self { element_type, cell_type: None, validity: Arc::new(|_| true) }
    }

    /// Every cell also carries `(cell, rdf:type, cell_type)`.
    pub fn typed(mut self, cell_type: Node) -> Self {
        self.cell_type = Some(cell_type);
        self
    }

    pub fn with_validity<F>(mut self, validity: F) -> Self
    where
        F: Fn(&Node) -> bool + Send + Sync + 'static,
    {
        self.validity = Arc::new(validity);
        self
    }
}

impl fmt::Debug for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListKind")
            .field("element_type", &self.element_type)
            .field("cell_type", &self.cell_type)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// ListHandle
// ============================================================================

/// Handle over a chain of cells. Clones share the current head, so every
/// clone of a handle sees the head moves made through any of them.
#[derive(Clone)]
pub struct ListHandle {
    resolver: Arc<ViewResolver>,
    owner: Node,
    predicate: Node,
    kind: ListKind,
    head: Arc<RwLock<Node>>,
    /// Predecessor cell for handles derived with `get(i)`, `None` for the
    /// root handle anchored on the owner triple.
    prev: Option<Node>,
    read_only: bool,
}

impl ListHandle {
    /// Build a fresh chain of `elements` and attach it with a single
    /// `(owner, predicate, head)` triple.
    pub fn create(
        resolver: Arc<ViewResolver>,
        owner: &Node,
        predicate: &Node,
        kind: ListKind,
        elements: impl IntoIterator<Item = Node>,
    ) -> Result<Self> {
        check_anchor_nodes(owner, predicate)?;
        let elements: Vec<Node> = elements.into_iter().collect();

        let mut edit = ListEdit::default();
        let mut head = nil();
        for element in elements.into_iter().rev() {
            let cell = Cell { node: resolver.store().fresh_blank(), first: element, rest: head };
            for t in cell.triples(kind.cell_type.as_ref()) {
                edit.add(t);
            }
            head = cell.node;
        }
        edit.add(Triple::new(owner.clone(), predicate.clone(), head.clone()));
        edit.new_head = Some(head.clone());
        edit.evicted.push(owner.clone());
        edit.apply(&resolver)?;

        Ok(Self {
            resolver,
            owner: owner.clone(),
            predicate: predicate.clone(),
            kind,
            head: Arc::new(RwLock::new(head)),
            prev: None,
            read_only: false,
        })
    }

    /// Wrap an existing chain whose head is attached by
    /// `(owner, predicate, head)`.
    pub fn wrap(
        resolver: Arc<ViewResolver>,
        head: Node,
        owner: &Node,
        predicate: &Node,
        kind: ListKind,
    ) -> Result<Self> {
        check_anchor_nodes(owner, predicate)?;
        let anchor = Triple::new(owner.clone(), predicate.clone(), head.clone());
        if !resolver.store().contains(&anchor) {
            return Err(Error::IllegalState(format!("{anchor} is not in the store")));
        }
        Ok(Self {
            resolver,
            owner: owner.clone(),
            predicate: predicate.clone(),
            kind,
            head: Arc::new(RwLock::new(head)),
            prev: None,
            read_only: false,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn head(&self) -> Node {
        self.head.read().clone()
    }

    pub fn owner(&self) -> &Node {
        &self.owner
    }

    pub fn predicate(&self) -> &Node {
        &self.predicate
    }

    pub fn kind(&self) -> &ListKind {
        &self.kind
    }

    pub fn element_type(&self) -> ViewType {
        self.kind.element_type
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Same list; every mutation fails with `Error::Unsupported`.
    pub fn as_read_only(&self) -> Self {
        Self { read_only: true, ..self.clone() }
    }

    pub fn is_empty(&self) -> bool {
        self.head().is_nil()
    }

    // ========================================================================
    // Reading
    // ========================================================================

    fn walk(&self, mode: WalkMode) -> Cells<'_> {
        Cells::new(&**self.resolver.store(), &self.head(), self.kind.cell_type.as_ref(), mode)
    }

    /// Elements as views of the element type, head first.
    ///
    /// Every call re-walks the chain from the current head. A malformed
    /// chain yields one `Error::IllegalState`.
    pub fn members(&self) -> Members<'_> {
        Members { cells: self.walk(WalkMode::Strict), handle: self }
    }

    /// Like `members`, but a malformed remainder ends the sequence.
    pub fn safe_members(&self) -> Members<'_> {
        Members { cells: self.walk(WalkMode::Safe), handle: self }
    }

    /// Raw element nodes, no casting or validity check.
    pub fn member_nodes(&self) -> Result<Vec<Node>> {
        self.walk(WalkMode::Strict).map(|c| c.map(|c| c.first)).collect()
    }

    pub fn cells(&self) -> Result<Vec<Cell>> {
        self.walk(WalkMode::Strict).collect()
    }

    /// Number of members.
    pub fn size(&self) -> Result<usize> {
        self.members().try_fold(0, |n, m| m.map(|_| n + 1))
    }

    pub fn first(&self) -> Result<Option<Arc<View>>> {
        self.members().next().transpose()
    }

    pub fn last(&self) -> Result<Option<Arc<View>>> {
        let mut last = None;
        for m in self.members() {
            last = Some(m?);
        }
        Ok(last)
    }

    /// Sub-list starting `index` cells after the head. `get(0)` is this
    /// handle; the derived handle shares this handle's element type and
    /// validity predicate.
    pub fn get(&self, index: i64) -> Result<ListHandle> {
        if index < 0 {
            return Err(Error::IllegalArgument(format!("negative list index {index}")));
        }
        if index == 0 {
            return Ok(self.clone());
        }
        // only fails where usize is narrower than i64
        let Ok(index) = usize::try_from(index) else {
            return Err(Error::IndexOutOfRange { index: usize::MAX, available: self.cells()?.len() });
        };
        let store = &**self.resolver.store();
        let mut prev = None;
        let mut current = self.head();
        for hop in 0..index {
            if current.is_nil() {
                return Err(Error::IndexOutOfRange { index, available: hop });
            }
            let cell = walk::read_cell(store, &current, self.kind.cell_type.as_ref())?;
            prev = Some(current);
            current = cell.rest;
        }
        if current.is_nil() {
            return Err(Error::IndexOutOfRange { index, available: index });
        }
        Ok(ListHandle {
            head: Arc::new(RwLock::new(current)),
            prev,
            ..self.clone()
        })
    }

    // ========================================================================
    // Edit planning
    // ========================================================================

    /// The triple this handle hangs from.
    fn anchor(&self) -> Result<Triple> {
        let head = self.head();
        let anchor = match &self.prev {
            None => Triple::new(self.owner.clone(), self.predicate.clone(), head),
            Some(prev) => Triple::new(prev.clone(), Node::iri(vocab::rdf::REST), head),
        };
        if !self.resolver.store().contains(&anchor) {
            return Err(Error::IllegalState(format!("list handle is detached: {anchor} is not in the store")));
        }
        Ok(anchor)
    }

    /// Point the anchor at `new_head`, carrying owner-triple annotations
    /// along for root handles.
    fn relink(&self, anchor: &Triple, new_head: &Node, edit: &mut ListEdit) {
        edit.remove(anchor.clone());
        edit.add(Triple::new(anchor.subject.clone(), anchor.predicate.clone(), new_head.clone()));
        if self.prev.is_none() {
            edit.extend(annotation::retarget_delta(
                &**self.resolver.store(),
                &self.owner,
                &self.predicate,
                &anchor.object,
                new_head,
            ));
        }
        edit.new_head = Some(new_head.clone());
    }

    fn add_cell(&self, element: &Node, rest: Node, edit: &mut ListEdit) -> Node {
        let cell = Cell { node: self.resolver.store().fresh_blank(), first: element.clone(), rest };
        for t in cell.triples(self.kind.cell_type.as_ref()) {
            edit.add(t);
        }
        cell.node
    }

    fn drop_cell(&self, cell: &Cell, edit: &mut ListEdit) {
        for t in cell.triples(self.kind.cell_type.as_ref()) {
            edit.remove(t);
        }
        edit.evicted.push(cell.node.clone());
    }

    /// Evict the nodes whose structure every non-empty edit changes: the
    /// owner, and the predecessor cell of a derived handle.
    fn finish(&self, mut edit: ListEdit) -> ListEdit {
        if !edit.is_noop() {
            edit.evicted.push(self.owner.clone());
            edit.evicted.extend(self.prev.clone());
        }
        edit
    }

    pub fn plan_add_first(&self, element: &Node) -> Result<ListEdit> {
        let anchor = self.anchor()?;
        let mut edit = ListEdit::default();
        let cell = self.add_cell(element, anchor.object.clone(), &mut edit);
        self.relink(&anchor, &cell, &mut edit);
        Ok(self.finish(edit))
    }

    pub fn plan_add_last(&self, element: &Node) -> Result<ListEdit> {
        let anchor = self.anchor()?;
        let cells = walk::cells(&**self.resolver.store(), &anchor.object, self.kind.cell_type.as_ref())?;
        let Some(last) = cells.last() else {
            return self.plan_add_first(element);
        };
        let mut edit = ListEdit::default();
        let rest = Node::iri(vocab::rdf::REST);
        let cell = self.add_cell(element, nil(), &mut edit);
        edit.remove(Triple::new(last.node.clone(), rest.clone(), nil()));
        edit.add(Triple::new(last.node.clone(), rest, cell));
        edit.evicted.push(last.node.clone());
        Ok(self.finish(edit))
    }

    pub fn plan_remove_first(&self) -> Result<ListEdit> {
        let anchor = self.anchor()?;
        let mut edit = ListEdit::default();
        if anchor.object.is_nil() {
            return Ok(edit);
        }
        let cell = walk::read_cell(&**self.resolver.store(), &anchor.object, self.kind.cell_type.as_ref())?;
        self.drop_cell(&cell, &mut edit);
        self.relink(&anchor, &cell.rest, &mut edit);
        Ok(self.finish(edit))
    }

    pub fn plan_remove_last(&self) -> Result<ListEdit> {
        let anchor = self.anchor()?;
        let cells = walk::cells(&**self.resolver.store(), &anchor.object, self.kind.cell_type.as_ref())?;
        match cells.as_slice() {
            [] => Ok(ListEdit::default()),
            [_] => self.plan_remove_first(),
            [.., prev, last] => {
                let mut edit = ListEdit::default();
                let rest = Node::iri(vocab::rdf::REST);
                self.drop_cell(last, &mut edit);
                edit.remove(Triple::new(prev.node.clone(), rest.clone(), last.node.clone()));
                edit.add(Triple::new(prev.node.clone(), rest, nil()));
                edit.evicted.push(prev.node.clone());
                Ok(self.finish(edit))
            }
        }
    }

    pub fn plan_clear(&self) -> Result<ListEdit> {
        let anchor = self.anchor()?;
        let mut edit = ListEdit::default();
        if anchor.object.is_nil() {
            return Ok(edit);
        }
        let cells = walk::cells(&**self.resolver.store(), &anchor.object, self.kind.cell_type.as_ref())?;
        for cell in &cells {
            self.drop_cell(cell, &mut edit);
        }
        self.relink(&anchor, &nil(), &mut edit);
        Ok(self.finish(edit))
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    fn ensure_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(Error::Unsupported(format!(
                "list ({}, {}) is read-only",
                self.owner, self.predicate
            )));
        }
        Ok(())
    }

    fn commit(&self, edit: ListEdit) -> Result<ListHandle> {
        edit.apply(&self.resolver)?;
        if let Some(head) = edit.new_head {
            *self.head.write() = head;
        }
        Ok(self.clone())
    }

    pub fn add_first(&self, element: &Node) -> Result<ListHandle> {
        self.ensure_writable()?;
        let edit = self.plan_add_first(element)?;
        self.commit(edit)
    }

    pub fn add_last(&self, element: &Node) -> Result<ListHandle> {
        self.ensure_writable()?;
        let edit = self.plan_add_last(element)?;
        self.commit(edit)
    }

    pub fn add_all<'e>(&self, elements: impl IntoIterator<Item = &'e Node>) -> Result<ListHandle> {
        self.ensure_writable()?;
        for e in elements {
            self.add_last(e)?;
        }
        Ok(self.clone())
    }

    /// No-op on an empty list.
    pub fn remove_first(&self) -> Result<ListHandle> {
        self.ensure_writable()?;
        let edit = self.plan_remove_first()?;
        self.commit(edit)
    }

    /// No-op on an empty list.
    pub fn remove_last(&self) -> Result<ListHandle> {
        self.ensure_writable()?;
        let edit = self.plan_remove_last()?;
        self.commit(edit)
    }

    pub fn clear(&self) -> Result<ListHandle> {
        self.ensure_writable()?;
        let edit = self.plan_clear()?;
        self.commit(edit)
    }
}

impl fmt::Debug for ListHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListHandle")
            .field("owner", &self.owner)
            .field("predicate", &self.predicate)
            .field("head", &self.head())
            .field("kind", &self.kind)
            .field("derived", &self.prev.is_some())
            .field("read_only", &self.read_only)
            .finish()
    }
}

fn nil() -> Node {
    Node::iri(vocab::rdf::NIL)
}

fn check_anchor_nodes(owner: &Node, predicate: &Node) -> Result<()> {
    if !owner.is_resource() {
        return Err(Error::IllegalArgument(format!("list owner {owner} must not be a literal")));
    }
    if !predicate.is_iri() {
        return Err(Error::IllegalArgument(format!("list predicate {predicate} must be named")));
    }
    Ok(())
}

// ============================================================================
// Members
// ============================================================================

/// Lazy sequence of a list's elements cast to the element type.
pub struct Members<'a> {
    cells: Cells<'a>,
    handle: &'a ListHandle,
}

impl Iterator for Members<'_> {
    type Item = Result<Arc<View>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let cell = match self.cells.next()? {
                Ok(cell) => cell,
                Err(e) => return Some(Err(e)),
            };
            if !(self.handle.kind.validity)(&cell.first) {
                continue;
            }
            match self.handle.resolver.find_as(&cell.first, self.handle.kind.element_type) {
                Ok(Some(view)) => return Some(Ok(view)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
