//! Type definitions consumed by the schema deriver.
//!
//! Rust has no runtime reflection, so the shape of a model type is described by a
//! [`TypeSpec`] value emitted at compile time by `#[derive(Model)]` (or written by
//! hand). Field metadata travels as raw tag strings in [`FieldTags`], keeping the
//! tag grammar itself as the contract:
//!
//! - `bson`: `name[,omitempty][,inline]` - an empty name falls back to the
//!   lower-cased field name, the name `-` drops the field entirely, `omitempty`
//!   makes the field non-required and `inline` folds a struct field's children
//!   into its parent.
//! - `hint`: `"id"` or `"date"`, selecting a value transformer.
//! - `nested_id`: `"true"`/`"false"`, controlling identifier injection for
//!   struct fields. Defaults to `"true"`.
//! - `default`: a raw literal parsed according to the field's scalar kind.

/// A type that can describe its own document shape.
///
/// Usually implemented through `#[derive(Model)]`, which builds the
/// [`TypeSpec`] from the struct's fields and `#[model(...)]` attributes.
pub trait Model {
    /// Name of the model type, used to form schema cache keys.
    fn model_name() -> &'static str;

    /// The type definition the schema deriver consumes.
    fn type_spec() -> TypeSpec;
}

/// Scalar value kinds a field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Int,
    Float,
    Bool,
}

/// The underlying kind of a field, after unwrapping one level of `Option`.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecKind {
    /// A scalar leaf value.
    Scalar(ScalarKind),
    /// A nested struct with its own type definition.
    Struct(TypeSpec),
    /// A sequence of elements of the inner kind.
    Slice(Box<SpecKind>),
}

/// Raw field tags, mirroring the serialized-name/flags tag grammar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldTags {
    /// `name[,omitempty][,inline]` tag value.
    pub bson: Option<String>,
    /// Transformer type-hint (`"id"` / `"date"`).
    pub hint: Option<String>,
    /// Nested-identifier override (`"true"` / `"false"`), struct fields only.
    pub nested_id: Option<String>,
    /// Default literal, parsed per scalar kind.
    pub default: Option<String>,
}

impl FieldTags {
    /// Reports whether the `bson` tag carries the given flag (e.g. `omitempty`).
    pub fn has_flag(&self, flag: &str) -> bool {
        match self.bson.as_deref() {
            Some(tag) if !tag.is_empty() && tag != "-" => {
                tag.split(',').skip(1).any(|candidate| candidate == flag)
            }
            _ => false,
        }
    }
}

/// One declared field of a model type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Source field name.
    pub name: String,
    /// Underlying kind, with any `Option` wrapper already removed.
    pub kind: SpecKind,
    /// Whether the source field was an `Option`.
    pub optional: bool,
    /// Raw field tags.
    pub tags: FieldTags,
}

impl FieldSpec {
    /// Resolved document key for this field.
    ///
    /// Returns the tag name when one is given, the lower-cased field name when the
    /// tag has no name part, or `None` when the field is ignored (`-`).
    pub fn doc_key(&self) -> Option<String> {
        let tag = match self.tags.bson.as_deref() {
            None | Some("") => return Some(self.name.to_lowercase()),
            Some(tag) => tag,
        };

        match tag.split(',').next().unwrap_or("") {
            "-" => None,
            "" => Some(self.name.to_lowercase()),
            name => Some(name.to_string()),
        }
    }

    /// Reports whether this struct field folds its children into the parent level.
    pub fn is_inline(&self) -> bool {
        self.tags.has_flag("inline")
    }
}

/// A model type definition: the declared fields, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    /// Name of the source type.
    pub name: String,
    /// Declared fields, in declaration order.
    pub fields: Vec<FieldSpec>,
}
