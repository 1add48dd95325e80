//! Node in the triple graph.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::vocab;

static NEXT_BLANK: AtomicU64 = AtomicU64::new(1);

/// Opaque graph node.
///
/// Equality is by identity value: two `Iri` nodes with the same string are
/// the same node, whatever views currently wrap them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Node {
    /// Named node.
    Iri(Arc<str>),
    /// Anonymous, locally scoped node.
    Blank(Arc<str>),
    /// Literal value.
    Literal {
        lexical: Arc<str>,
        datatype: Arc<str>,
        lang: Option<Arc<str>>,
    },
}

impl Node {
    pub fn iri(iri: impl AsRef<str>) -> Self {
        Node::Iri(Arc::from(iri.as_ref()))
    }

    pub fn blank(label: impl AsRef<str>) -> Self {
        Node::Blank(Arc::from(label.as_ref()))
    }

    /// A blank node that no other call in this process will return.
    ///
    /// The label may still collide with one a caller chose; use
    /// `TripleStore::fresh_blank` for nodes written into a store.
    pub fn fresh_blank() -> Self {
        let n = NEXT_BLANK.fetch_add(1, Ordering::Relaxed);
        Node::Blank(Arc::from(format!("b{n}")))
    }

    /// Plain `xsd:string` literal.
    pub fn literal(lexical: impl AsRef<str>) -> Self {
        Self::typed_literal(lexical, vocab::xsd::STRING)
    }

    pub fn typed_literal(lexical: impl AsRef<str>, datatype: impl AsRef<str>) -> Self {
        Node::Literal {
            lexical: Arc::from(lexical.as_ref()),
            datatype: Arc::from(datatype.as_ref()),
            lang: None,
        }
    }

    pub fn lang_literal(lexical: impl AsRef<str>, lang: impl AsRef<str>) -> Self {
        Node::Literal {
            lexical: Arc::from(lexical.as_ref()),
            datatype: Arc::from(vocab::rdf::LANG_STRING),
            lang: Some(Arc::from(lang.as_ref())),
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Node::Iri(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Node::Blank(_))
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Node::Literal { .. })
    }

    /// Named or anonymous, i.e. anything that may stand in subject position.
    pub fn is_resource(&self) -> bool {
        !self.is_literal()
    }

    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Node::Iri(iri) => Some(&**iri),
            _ => None,
        }
    }

    /// Lexical form for literals, IRI or label otherwise.
    pub fn as_str(&self) -> &str {
        match self {
            Node::Iri(s) | Node::Blank(s) => &**s,
            Node::Literal { lexical, .. } => &**lexical,
        }
    }

    /// True for the `rdf:nil` list terminator.
    pub fn is_nil(&self) -> bool {
        self.as_iri() == Some(vocab::rdf::NIL)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Iri(iri) => write!(f, "<{iri}>"),
            Node::Blank(label) => write!(f, "_:{label}"),
            Node::Literal { lexical, lang: Some(lang), .. } => write!(f, "\"{lexical}\"@{lang}"),
            Node::Literal { lexical, datatype, lang: None } => {
                write!(f, "\"{lexical}\"^^<{datatype}>")
            }
        }
    }
}

impl From<&str> for Node {
    fn from(iri: &str) -> Self {
        Node::iri(iri)
    }
}
