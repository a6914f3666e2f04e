//! Document building against a derived schema tree.
//!
//! [`build`] co-traverses a mutable BSON document and a [`ModelSchema`],
//! validating shape, injecting identifiers and defaults, and applying value
//! transformers in the requested direction. The traversal is a single
//! synchronous depth-first pass keyed by dotted schema paths; existing field
//! order is preserved and anything injected lands at the document tail.

use bson::oid::ObjectId;
use bson::{Bson, Document};
use tracing::error;

use crate::error::BuildError;
use crate::schema::{ELEMENT_KEY, ID_KEY, ModelSchema, SchemaNode, node_path};

/// Direction of a build pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Record representation → store representation. Unknown fields are
    /// rejected; a missing identifier is freshly generated.
    ToStore,
    /// Store representation → record representation. Unknown fields pass
    /// through untouched; a missing identifier becomes an empty placeholder.
    ToRecord,
}

/// Builds `doc` in place against the schema, in the given direction.
///
/// Field order is preserved exactly as encountered; schema children missing
/// from the document are appended at the tail, in schema order.
///
/// # Errors
///
/// Returns a [`BuildError`] on the first shape or transformer failure. The
/// document may have been partially transformed at that point and must be
/// discarded by the caller.
pub fn build(doc: &mut Document, schema: &ModelSchema, direction: Direction) -> Result<(), BuildError> {
    let root = schema.root();
    if doc.is_empty() && root.children.is_empty() {
        return Ok(());
    }

    visit_document(doc, schema, root, direction)
}

fn visit_document(
    doc: &mut Document,
    schema: &ModelSchema,
    node: &SchemaNode,
    direction: Direction,
) -> Result<(), BuildError> {
    let keys: Vec<String> = doc.keys().map(|key| key.to_string()).collect();
    let mut visited: Vec<String> = Vec::with_capacity(keys.len());

    for key in keys {
        let path = node_path(&key, &node.path);
        visited.push(path.clone());

        let Some(child) = schema.node_at(&path) else {
            match direction {
                // stored documents may carry fields the model no longer
                // declares; pass them through untouched.
                Direction::ToRecord => continue,
                Direction::ToStore => {
                    error!(path = %path, "document field has no schema node");
                    return Err(BuildError::UnknownField(path));
                }
            }
        };

        if let Some(value) = doc.get_mut(&key) {
            visit_value(value, schema, child, direction)?;
        }
    }

    // reconcile schema children missing from the document, in schema order.
    for child_id in &node.children {
        let child = schema.node(*child_id);
        if visited.iter().any(|path| path == &child.path) {
            continue;
        }

        append_missing(doc, child, direction)?;
    }

    Ok(())
}

fn visit_value(
    value: &mut Bson,
    schema: &ModelSchema,
    node: &SchemaNode,
    direction: Direction,
) -> Result<(), BuildError> {
    match value {
        Bson::Document(doc) => visit_document(doc, schema, node, direction),
        Bson::Array(items) => {
            if items.is_empty() {
                return Ok(());
            }

            let element_path = node_path(ELEMENT_KEY, &node.path);
            let Some(element) = schema.node_at(&element_path) else {
                return match direction {
                    Direction::ToRecord => Ok(()),
                    Direction::ToStore => {
                        error!(path = %element_path, "array elements have no schema node");
                        Err(BuildError::UnknownField(element_path))
                    }
                };
            };

            for item in items.iter_mut() {
                visit_value(item, schema, element, direction)?;
            }

            Ok(())
        }
        // a null optional field has nothing to transform
        Bson::Null => Ok(()),
        _ => {
            for transformer in &node.transformers {
                let current = std::mem::replace(value, Bson::Null);
                *value = match direction {
                    Direction::ToStore => transformer.to_store(current)?,
                    Direction::ToRecord => transformer.to_record(current)?,
                };
            }

            Ok(())
        }
    }
}

fn append_missing(
    doc: &mut Document,
    child: &SchemaNode,
    direction: Direction,
) -> Result<(), BuildError> {
    if !child.options.required && child.options.default.is_none() {
        // optional and absent
        return Ok(());
    }

    let is_id = child.key == ID_KEY;
    if !is_id && child.options.default.is_none() {
        return Err(BuildError::RequiredField(child.path.clone()));
    }

    if is_id {
        // a document headed for the store gets a fresh identifier; decoding
        // appends an empty placeholder instead, so the same stored object can
        // never decode to two different identities.
        let value = match direction {
            Direction::ToStore => Bson::ObjectId(ObjectId::new()),
            Direction::ToRecord => Bson::String(String::new()),
        };
        doc.insert(child.key.clone(), value);
    } else if let Some(default) = &child.options.default {
        doc.insert(child.key.clone(), default.clone());
    }

    Ok(())
}
