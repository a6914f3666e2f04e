//! Convenient re-exports of commonly used types from docmodel.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use docmodel::prelude::*;
//! ```

pub use docmodel_core::{
    bsondoc::{Direction, build},
    cache::{SchemaCache, schema_cache_key, schema_for_document},
    error::{BuildError, SchemaError},
    fieldopt::FieldOptions,
    metafield::{MetaField, apply_meta_fields},
    schema::{FieldKind, ModelSchema, SchemaNode, build_schema, build_schema_for_spec},
    schemaopt::SchemaOptions,
    transform::Transformer,
    typespec::{FieldSpec, FieldTags, Model, ScalarKind, SpecKind, TypeSpec},
};

pub use docmodel_macros::Model;
