//! Audit meta fields reconciled on documents outside the declared model fields.
//!
//! Meta fields track document state: creation and update timestamps, and a
//! version counter. They are appended to the derived schema as non-required
//! nodes (so their absence never fails a build), and reconciled explicitly on
//! the document by [`apply_meta_fields`] ahead of a store-direction build.

use bson::{Bson, Document};

use crate::datetime;
use crate::error::BuildError;
use crate::schemaopt::SchemaOptions;
use crate::transform::Transformer;
use crate::typespec::ScalarKind;

/// The closed set of audit meta fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaField {
    /// `createdAt` - set once when the document is first stored.
    CreatedAt,
    /// `updatedAt` - refreshed on every store.
    UpdatedAt,
    /// `__v` - incremented on every store.
    DocVersion,
}

/// State of a meta field found on a document.
enum FieldState {
    PresentValid,
    PresentInvalid,
    Absent,
}

impl MetaField {
    /// All meta fields, in reconciliation order.
    pub const ALL: [MetaField; 3] = [
        MetaField::CreatedAt,
        MetaField::UpdatedAt,
        MetaField::DocVersion,
    ];

    /// Document key of this meta field.
    pub fn key(self) -> &'static str {
        match self {
            MetaField::CreatedAt => "createdAt",
            MetaField::UpdatedAt => "updatedAt",
            MetaField::DocVersion => "__v",
        }
    }

    /// Scalar kind of the meta field's record representation.
    pub fn scalar_kind(self) -> ScalarKind {
        match self {
            MetaField::CreatedAt | MetaField::UpdatedAt => ScalarKind::String,
            MetaField::DocVersion => ScalarKind::Int,
        }
    }

    /// Transformers applied to the meta field during builds.
    pub fn transformers(self) -> Vec<Transformer> {
        match self {
            MetaField::CreatedAt | MetaField::UpdatedAt => vec![Transformer::DateTime],
            MetaField::DocVersion => Vec::new(),
        }
    }

    /// Reports whether this meta field is maintained under the given options.
    pub fn is_applicable(self, options: &SchemaOptions) -> bool {
        match self {
            MetaField::CreatedAt | MetaField::UpdatedAt => options.timestamps,
            MetaField::DocVersion => options.version_key.unwrap_or(true),
        }
    }

    fn is_valid_value(self, value: &Bson) -> bool {
        match self {
            MetaField::CreatedAt | MetaField::UpdatedAt => {
                matches!(value, Bson::String(text) if !text.is_empty())
            }
            MetaField::DocVersion => matches!(value, Bson::Int32(_) | Bson::Int64(_)),
        }
    }

    fn on_present_valid(self, doc: &mut Document) {
        match self {
            MetaField::CreatedAt => {}
            MetaField::UpdatedAt => {
                doc.insert(self.key(), datetime::now_iso_string());
            }
            MetaField::DocVersion => {
                let bumped = match doc.get(self.key()) {
                    Some(Bson::Int32(version)) => Some(Bson::Int32(version + 1)),
                    Some(Bson::Int64(version)) => Some(Bson::Int64(version + 1)),
                    _ => None,
                };

                if let Some(bumped) = bumped {
                    doc.insert(self.key(), bumped);
                }
            }
        }
    }

    fn on_present_invalid(self, doc: &mut Document) -> Result<(), BuildError> {
        match self {
            MetaField::CreatedAt | MetaField::UpdatedAt => {
                doc.insert(self.key(), datetime::now_iso_string());
            }
            MetaField::DocVersion => {
                doc.insert(self.key(), Bson::Int64(0));
            }
        }

        Ok(())
    }

    fn on_absent(self, doc: &mut Document) {
        match self {
            MetaField::CreatedAt | MetaField::UpdatedAt => {
                doc.insert(self.key(), datetime::now_iso_string());
            }
            MetaField::DocVersion => {
                doc.insert(self.key(), Bson::Int64(0));
            }
        }
    }

    /// Reconciles this meta field on the document.
    ///
    /// Present with a valid value: the field's update rule runs (no-op for
    /// `createdAt`, refresh for `updatedAt`, increment for `__v`). Present with
    /// the wrong type: the value is reset to a fresh one. Absent: a fresh value
    /// is appended at the document tail.
    fn reconcile(self, doc: &mut Document) -> Result<(), BuildError> {
        let state = match doc.get(self.key()) {
            None => FieldState::Absent,
            Some(value) if self.is_valid_value(value) => FieldState::PresentValid,
            Some(_) => FieldState::PresentInvalid,
        };

        match state {
            FieldState::PresentValid => self.on_present_valid(doc),
            FieldState::PresentInvalid => self.on_present_invalid(doc)?,
            FieldState::Absent => self.on_absent(doc),
        }

        Ok(())
    }
}

/// Reconciles every applicable meta field on the document.
///
/// Intended to run on the record-side document before a store-direction build,
/// so that the timestamps are still ISO strings when the build transforms them.
///
/// # Errors
///
/// Propagates any failure from an individual field's reconciliation.
pub fn apply_meta_fields(doc: &mut Document, options: &SchemaOptions) -> Result<(), BuildError> {
    for field in MetaField::ALL {
        if !field.is_applicable(options) {
            continue;
        }

        field.reconcile(doc)?;
    }

    Ok(())
}
