use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::expr::SyntaxKind;

/// Failures of a single `resolve_type` call. None of them are recoverable
/// within that call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown type: {kind}: {text}")]
    UnsupportedType { kind: SyntaxKind, text: String },

    #[error("no matching model found for referenced type {name}")]
    UnresolvedType { name: String },

    #[error("{count} declarations named {name} found; please make names unique")]
    AmbiguousType { name: String, count: usize },

    #[error("invalid enum {name}: value {member} is not a literal")]
    InvalidEnum { name: String, member: String },

    #[error("only string indexers are supported in {owner}, found {found}")]
    UnsupportedIndex { owner: String, found: String },

    #[error("no type annotation found for {owner}.{member}")]
    MissingTypeAnnotation { owner: String, member: String },
}

impl ResolveError {
    pub(crate) fn unsupported(kind: SyntaxKind, text: impl Into<String>) -> Self {
        ResolveError::UnsupportedType { kind, text: text.into() }
    }
}

/// Accepted approximations, reported to callers instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Warning {
    /// A union whose branches differ in kind was rendered as an empty object.
    HeterogeneousUnion { text: String },
    /// A cycle-break placeholder never found its definition.
    UnresolvedPlaceholder { name: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::HeterogeneousUnion { text } => {
                write!(f, "union `{text}` mixes kinds and was rendered as an empty object")
            }
            Warning::UnresolvedPlaceholder { name } => {
                write!(f, "reference {name} was never resolved; its definition is empty")
            }
        }
    }
}
