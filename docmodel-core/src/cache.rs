//! Concurrent schema cache and union-type schema dispatch.
//!
//! Derived schema trees are immutable and live for the process lifetime, so
//! they are shared through `Arc` behind a reader/writer lock. Racing callers
//! may derive the same schema twice; derivation is idempotent and the last
//! insert wins.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use bson::{Bson, Document};

use crate::schema::ModelSchema;
use crate::schemaopt::SchemaOptions;

/// Concurrent store of derived schema trees.
///
/// The cache serves two purposes: it avoids re-deriving a schema for a type
/// already seen for a collection, and it holds concrete-type schemas keyed by
/// discriminator value so that union-type documents decode against the right
/// shape (see [`schema_for_document`]).
///
/// Construct one at startup and pass it wherever schemas are derived; there is
/// no global instance.
#[derive(Debug, Default)]
pub struct SchemaCache {
    inner: RwLock<HashMap<String, Arc<ModelSchema>>>,
}

impl SchemaCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached schema for `key`, if any. A miss is a normal signal
    /// for the caller to derive and [`set`](Self::set), never an error.
    pub fn get(&self, key: &str) -> Option<Arc<ModelSchema>> {
        let guard = self
            .inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        guard.get(key).cloned()
    }

    /// Stores a schema under `key`, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, schema: Arc<ModelSchema>) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        guard.insert(key.into(), schema);
    }
}

/// Cache key for a schema: `<collection>_<type name or discriminator value>`.
pub fn schema_cache_key(collection: &str, model_name: &str) -> String {
    format!("{collection}_{model_name}")
}

/// Picks the schema that should drive decoding of `doc`.
///
/// For union-type models the document's discriminator value selects the
/// concrete schema from the cache. Anything short of a cached hit (the model
/// not being a union type, a missing or non-string discriminator, or a cache
/// miss) falls back to the declared schema.
pub fn schema_for_document(
    doc: &Document,
    declared: &Arc<ModelSchema>,
    options: &SchemaOptions,
    cache: &SchemaCache,
) -> Arc<ModelSchema> {
    if !options.is_union_type {
        return Arc::clone(declared);
    }

    let Some(Bson::String(discriminator)) = doc.get(options.discriminator_key()) else {
        return Arc::clone(declared);
    };

    cache
        .get(&schema_cache_key(&options.collection, discriminator))
        .unwrap_or_else(|| Arc::clone(declared))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::build_schema_for_spec;
    use crate::typespec::{FieldSpec, FieldTags, ScalarKind, SpecKind, TypeSpec};
    use bson::doc;
    use std::thread;

    fn schema_named(name: &str) -> Arc<ModelSchema> {
        let spec = TypeSpec {
            name: name.to_string(),
            fields: vec![FieldSpec {
                name: "Name".to_string(),
                kind: SpecKind::Scalar(ScalarKind::String),
                optional: false,
                tags: FieldTags::default(),
            }],
        };

        Arc::new(build_schema_for_spec(&spec, &SchemaOptions::default()).unwrap())
    }

    #[test]
    fn get_returns_what_set_stored() {
        let cache = SchemaCache::new();
        assert!(cache.get("users_User").is_none());

        let schema = schema_named("User");
        cache.set("users_User", Arc::clone(&schema));

        let cached = cache.get("users_User").unwrap();
        assert!(Arc::ptr_eq(&cached, &schema));
    }

    #[test]
    fn cache_key_joins_collection_and_name() {
        assert_eq!(schema_cache_key("users", "User"), "users_User");
        assert_eq!(schema_cache_key("shapes", "circle"), "shapes_circle");
    }

    #[test]
    fn concurrent_readers_and_writers_settle_on_the_last_set() {
        let cache = Arc::new(SchemaCache::new());

        thread::scope(|scope| {
            for _ in 0..8 {
                let cache = Arc::clone(&cache);
                scope.spawn(move || {
                    let schema = schema_named("User");
                    cache.set("users_User", schema);
                    let _ = cache.get("users_User");
                });
            }
        });

        assert!(cache.get("users_User").is_some());
    }

    #[test]
    fn union_dispatch_prefers_the_discriminator_schema() {
        let cache = SchemaCache::new();
        let declared = schema_named("Shape");
        let circle = schema_named("Circle");
        cache.set(schema_cache_key("shapes", "Circle"), Arc::clone(&circle));

        let options = SchemaOptions {
            collection: "shapes".to_string(),
            is_union_type: true,
            ..Default::default()
        };

        let doc = doc! { "__t": "Circle", "radius": 3.0 };
        let picked = schema_for_document(&doc, &declared, &options, &cache);
        assert!(Arc::ptr_eq(&picked, &circle));
    }

    #[test]
    fn union_dispatch_falls_back_to_the_declared_schema() {
        let cache = SchemaCache::new();
        let declared = schema_named("Shape");

        let options = SchemaOptions {
            collection: "shapes".to_string(),
            is_union_type: true,
            ..Default::default()
        };

        // unknown discriminator value
        let doc = doc! { "__t": "Square" };
        let picked = schema_for_document(&doc, &declared, &options, &cache);
        assert!(Arc::ptr_eq(&picked, &declared));

        // missing discriminator field
        let doc = doc! { "radius": 3.0 };
        let picked = schema_for_document(&doc, &declared, &options, &cache);
        assert!(Arc::ptr_eq(&picked, &declared));

        // non-string discriminator value
        let doc = doc! { "__t": 7 };
        let picked = schema_for_document(&doc, &declared, &options, &cache);
        assert!(Arc::ptr_eq(&picked, &declared));
    }

    #[test]
    fn union_dispatch_honors_the_key_override() {
        let cache = SchemaCache::new();
        let declared = schema_named("Shape");
        let circle = schema_named("Circle");
        cache.set(schema_cache_key("shapes", "Circle"), Arc::clone(&circle));

        let options = SchemaOptions {
            collection: "shapes".to_string(),
            is_union_type: true,
            discriminator_key: Some("kind".to_string()),
            ..Default::default()
        };

        let doc = doc! { "kind": "Circle" };
        let picked = schema_for_document(&doc, &declared, &options, &cache);
        assert!(Arc::ptr_eq(&picked, &circle));

        // the default key is not consulted once overridden
        let doc = doc! { "__t": "Circle" };
        let picked = schema_for_document(&doc, &declared, &options, &cache);
        assert!(Arc::ptr_eq(&picked, &declared));
    }

    #[test]
    fn non_union_models_ignore_the_discriminator() {
        let cache = SchemaCache::new();
        let declared = schema_named("Shape");
        let circle = schema_named("Circle");
        cache.set(schema_cache_key("shapes", "Circle"), circle);

        let options = SchemaOptions {
            collection: "shapes".to_string(),
            ..Default::default()
        };

        let doc = doc! { "__t": "Circle" };
        let picked = schema_for_document(&doc, &declared, &options, &cache);
        assert!(Arc::ptr_eq(&picked, &declared));
    }
}
