//! Error types for schema derivation and document building.
//!
//! Failures split into two domains: [`SchemaError`] covers everything that can go
//! wrong while deriving a schema tree from a type definition, and [`BuildError`]
//! covers shape and transformation failures while building a document against a
//! derived schema.

use thiserror::Error;

/// Errors raised while deriving a schema tree from a type definition.
///
/// Any schema error aborts the derivation; no partial tree is returned or cached.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The `default` tag literal could not be parsed as the field's scalar kind.
    #[error("invalid default literal {literal:?} for field {field}")]
    InvalidDefaultLiteral {
        /// Source field name the literal was declared on.
        field: String,
        /// The raw literal that failed to parse.
        literal: String,
    },
    /// A default literal was declared on a field kind that does not support one.
    #[error("default values are not supported for field {field}")]
    UnsupportedDefault {
        /// Source field name the literal was declared on.
        field: String,
    },
}

/// Errors raised while building a document against a schema tree.
///
/// A build error aborts the whole build call immediately. The document may have
/// been partially transformed at that point and must be discarded by the caller.
#[derive(Error, Debug)]
pub enum BuildError {
    /// A document key has no matching schema node (store direction only).
    #[error("no schema node found at path {0}")]
    UnknownField(String),
    /// A required field without a default is absent from the document.
    #[error("required field at path {0} is missing")]
    RequiredField(String),
    /// An identifier value is not a valid 24-character hex string.
    #[error("invalid object id hex string {0:?}")]
    InvalidObjectId(String),
    /// A timestamp value is not a valid ISO-8601 string.
    #[error("invalid ISO-8601 timestamp {0:?}")]
    InvalidTimestamp(String),
    /// A transformer received a value of the wrong shape.
    #[error("expected {expected}, got {got}")]
    UnexpectedValue {
        /// What the transformer can consume.
        expected: &'static str,
        /// BSON type of the value it received.
        got: &'static str,
    },
}
