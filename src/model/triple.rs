//! Triple (subject, predicate, object) and lookup patterns.

use std::fmt;

use serde::{Deserialize, Serialize};
use super::Node;

/// A single fact in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Node,
    pub predicate: Node,
    pub object: Node,
}

impl Triple {
    pub fn new(subject: Node, predicate: Node, object: Node) -> Self {
        Self { subject, predicate, object }
    }

    pub fn matches(&self, pattern: &TriplePattern) -> bool {
        pattern.subject.as_ref().is_none_or(|s| *s == self.subject)
            && pattern.predicate.as_ref().is_none_or(|p| *p == self.predicate)
            && pattern.object.as_ref().is_none_or(|o| *o == self.object)
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// `find(s?, p?, o?)` pattern. `None` is a wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TriplePattern {
    pub subject: Option<Node>,
    pub predicate: Option<Node>,
    pub object: Option<Node>,
}

impl TriplePattern {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn new(subject: Option<&Node>, predicate: Option<&Node>, object: Option<&Node>) -> Self {
        Self {
            subject: subject.cloned(),
            predicate: predicate.cloned(),
            object: object.cloned(),
        }
    }

    pub fn with_subject(mut self, subject: Node) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn with_predicate(mut self, predicate: Node) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn with_object(mut self, object: Node) -> Self {
        self.object = Some(object);
        self
    }

    /// True when every position is fixed.
    pub fn is_concrete(&self) -> bool {
        self.subject.is_some() && self.predicate.is_some() && self.object.is_some()
    }
}
