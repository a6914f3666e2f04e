//! Schema-level options for a mapped collection.

use serde::{Deserialize, Serialize};

/// Default document key distinguishing concrete types of a union-type model.
pub const DEFAULT_DISCRIMINATOR_KEY: &str = "__t";

/// Collection-level options applied when deriving and using a schema.
///
/// These options name the backing collection, enable audit meta fields and
/// describe union-type behavior. They do not affect individual field shapes;
/// see the field tag grammar for those.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaOptions {
    /// Name of the collection the mapped documents live in. Opaque to this
    /// crate; it only participates in schema cache keys.
    pub collection: String,
    /// Whether to maintain `createdAt`/`updatedAt` meta fields.
    pub timestamps: bool,
    /// Whether to maintain the `__v` version meta field. `None` means enabled.
    pub version_key: Option<bool>,
    /// Whether the model is a union type decoded through a discriminator field.
    pub is_union_type: bool,
    /// Override for the discriminator document key.
    pub discriminator_key: Option<String>,
}

impl SchemaOptions {
    /// Creates options for the given collection with everything else defaulted.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Default::default()
        }
    }

    /// The discriminator document key, defaulting to `__t`.
    pub fn discriminator_key(&self) -> &str {
        self.discriminator_key
            .as_deref()
            .unwrap_or(DEFAULT_DISCRIMINATOR_KEY)
    }
}
