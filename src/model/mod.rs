//! # Triple Graph Model
//!
//! Plain data shared by every layer: nodes, triples, lookup patterns and
//! the vocabulary IRIs the standard factories recognise.
//!
//! Design rule: no store handles and no locking here. This module is pure
//! data.

pub mod node;
pub mod triple;
pub mod vocab;

pub use node::Node;
pub use triple::{Triple, TriplePattern};
