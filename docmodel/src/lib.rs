//! Schema-driven mapping between typed records and BSON documents.
//!
//! This crate is the primary entry point for users of the docmodel project.
//! It re-exports the schema derivation and document transformation core
//! together with the `Model` derive macro.
//!
//! A model type describes its document shape through `#[derive(Model)]` and
//! `#[model(...)]` field attributes. Deriving a schema once yields an ordered
//! schema tree, which then drives both directions of document building:
//! record → store (strict, identifier-generating) and store → record
//! (tolerant, transformer-reversing).
//!
//! # Quick Start
//!
//! ```ignore
//! use bson::doc;
//! use docmodel::prelude::*;
//!
//! #[derive(Model)]
//! struct User {
//!     #[model(bson = "_id", hint = "id")]
//!     id: String,
//!     name: String,
//!     #[model(bson = ",omitempty", default = "18")]
//!     age: Option<i64>,
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = SchemaOptions::new("users");
//!     let schema = build_schema::<User>(&options)?;
//!
//!     // record representation → store representation
//!     let mut doc = doc! {
//!         "_id": "65f1d9c1a2b3c4d5e6f70a1b",
//!         "name": "Alice",
//!     };
//!     build(&mut doc, &schema, Direction::ToStore)?;
//!
//!     // `_id` is now an ObjectId and `age` defaulted to 18
//!     Ok(())
//! }
//! ```
//!
//! # Schema caching and union types
//!
//! Derived schemas are immutable; share them through a [`SchemaCache`]
//! constructed at startup:
//!
//! ```ignore
//! use std::sync::Arc;
//! use docmodel::prelude::*;
//!
//! let cache = SchemaCache::new();
//! let key = schema_cache_key("users", User::model_name());
//!
//! let schema = match cache.get(&key) {
//!     Some(schema) => schema,
//!     None => {
//!         let schema = Arc::new(build_schema::<User>(&options)?);
//!         cache.set(key, Arc::clone(&schema));
//!         schema
//!     }
//! };
//! ```
//!
//! For union-type models, register each concrete schema under its
//! discriminator value and let [`schema_for_document`] pick the right one
//! while decoding.
//!
//! [`SchemaCache`]: cache::SchemaCache
//! [`schema_for_document`]: cache::schema_for_document

pub mod prelude;

pub use docmodel_core::{
    bsondoc, cache, datetime, error, fieldopt, metafield, schema, schemaopt, transform, typespec,
};

pub use docmodel_core::typespec::Model;
pub use docmodel_macros::Model;

// Re-export BSON types for convenience
pub use bson;
