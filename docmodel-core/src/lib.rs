//! Core schema derivation and document transformation for the docmodel project.
//!
//! This crate turns a model type definition into an ordered schema tree and
//! uses that tree to move BSON documents between their typed-record and
//! store representations:
//!
//! - **Type definitions** ([`typespec`]) - The `Model` trait and the field
//!   metadata emitted by `#[derive(Model)]`
//! - **Schema derivation** ([`schema`]) - Building the ordered schema tree from
//!   a type definition
//! - **Field options** ([`fieldopt`]) - Required/nested-identifier/default
//!   resolution per field
//! - **Value transformers** ([`transform`]) - Identifier and timestamp
//!   conversions applied at schema leaves
//! - **Meta fields** ([`metafield`]) - `createdAt`/`updatedAt`/`__v` audit
//!   field reconciliation
//! - **Document building** ([`bsondoc`]) - The direction-aware co-traversal of
//!   a schema tree and a document
//! - **Schema cache** ([`cache`]) - Concurrent schema reuse and union-type
//!   dispatch
//! - **Error handling** ([`error`]) - Schema and build error types
//!
//! # Example
//!
//! ```ignore
//! use docmodel_core::bsondoc::{Direction, build};
//! use docmodel_core::schema::build_schema;
//! use docmodel_core::schemaopt::SchemaOptions;
//!
//! let options = SchemaOptions::new("users");
//! let schema = build_schema::<User>(&options)?;
//!
//! let mut doc = bson::doc! { "_id": "65f1d9c1a2b3c4d5e6f70a1b", "name": "Alice" };
//! build(&mut doc, &schema, Direction::ToStore)?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docmodel_core;

pub mod bsondoc;
pub mod cache;
pub mod datetime;
pub mod error;
pub mod fieldopt;
pub mod metafield;
pub mod schema;
pub mod schemaopt;
pub mod transform;
pub mod typespec;
