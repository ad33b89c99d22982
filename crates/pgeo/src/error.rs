//! Error types for the attribute store and the text codec.

use thiserror::Error;

use crate::model::{AttribSchema, EntityKind};

/// Error from the attribute store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttribError {
    /// An attribute was reassigned with a different type or arity than
    /// its first definition. The schema is fixed at first set.
    #[error("{kind} attribute {name:?} already has schema {existing}, cannot set as {requested}")]
    SchemaConflict {
        kind: EntityKind,
        name: String,
        existing: AttribSchema,
        requested: AttribSchema,
    },

    /// A query referenced an attribute name never defined for the kind.
    #[error("no such {kind} attribute {name:?}")]
    NotFound { kind: EntityKind, name: String },
}

/// Error during parsing of PGEOMETRY text.
///
/// All variants are fatal: the parser performs no partial recovery, and
/// the first structural violation aborts the whole read.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("line {line_no}: malformed header: {line:?}")]
    MalformedHeader { line_no: usize, line: String },

    #[error("line {line_no}: malformed {context} line: {line:?}")]
    MalformedLine {
        line_no: usize,
        context: &'static str,
        line: String,
    },

    #[error("line {line_no}: expected {expected} attribute tokens, found {found}")]
    TokenCountMismatch {
        line_no: usize,
        expected: usize,
        found: usize,
    },

    #[error(
        "line {line_no}: string attribute {name:?} index {index} out of bounds (table size: {size})"
    )]
    StringIndexOutOfBounds {
        line_no: usize,
        name: String,
        index: usize,
        size: usize,
    },

    #[error("unexpected end of input while reading {context}")]
    UnexpectedEof { context: &'static str },

    #[error(transparent)]
    Attrib(#[from] AttribError),
}
