//! Schema tree derivation from type definitions.
//!
//! A [`ModelSchema`] is the ordered description of the document shape expected
//! for a model type. It is derived once per (collection, type) pair, cached,
//! and then co-traversed with concrete documents by the build engine.
//!
//! Nodes live in an index-addressed arena; child links and the path index are
//! plain indices, so the tree can grow freely while it is being built and is
//! trivially shareable once finished.

use std::collections::HashMap;

use crate::error::SchemaError;
use crate::fieldopt::{self, FieldOptions};
use crate::metafield::MetaField;
use crate::schemaopt::SchemaOptions;
use crate::transform::Transformer;
use crate::typespec::{FieldSpec, Model, ScalarKind, SpecKind, TypeSpec};

/// Path of the synthetic root node. Document traversal starts at its children.
pub const ROOT_PATH: &str = "$root";

/// Document key of the identifier field.
pub const ID_KEY: &str = "_id";

/// Path segment standing for the elements of an array.
pub const ELEMENT_KEY: &str = "$";

/// Index of a node within a [`ModelSchema`] arena.
pub type NodeId = usize;

/// Kind of value a schema node describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Struct,
    Slice,
    Scalar(ScalarKind),
}

/// One position in the schema tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Dotted ancestor chain identifying this node. Array element positions use
    /// a literal `$` segment. Unique within a tree.
    pub path: String,
    /// Serialized document key.
    pub key: String,
    /// Source field name, kept for diagnostics.
    pub field_name: String,
    /// Kind of value this node describes.
    pub kind: FieldKind,
    /// Whether the source field was optional.
    pub is_pointer: bool,
    /// Value transformers applied at this node, in order. Always empty for
    /// struct and slice nodes; a slice's transformers move to its `$` child.
    pub transformers: Vec<Transformer>,
    /// Resolved field options.
    pub options: FieldOptions,
    /// Child nodes in declaration order. Document field order is reconciled
    /// against this order when missing fields are appended.
    pub children: Vec<NodeId>,
}

/// A derived, immutable schema tree.
#[derive(Debug, Clone)]
pub struct ModelSchema {
    nodes: Vec<SchemaNode>,
    index: HashMap<String, NodeId>,
    root: NodeId,
}

impl ModelSchema {
    /// The synthetic root node.
    pub fn root(&self) -> &SchemaNode {
        &self.nodes[self.root]
    }

    /// The node with the given arena id.
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id]
    }

    /// Looks a node up by its tree path.
    pub fn node_at(&self, path: &str) -> Option<&SchemaNode> {
        self.index.get(path).map(|id| &self.nodes[*id])
    }

    /// Child nodes of `node`, in declaration order.
    pub fn children<'a>(&'a self, node: &'a SchemaNode) -> impl Iterator<Item = &'a SchemaNode> {
        node.children.iter().map(|id| &self.nodes[*id])
    }

    /// Total number of nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Returns the schema tree path for a field under `parent`.
pub fn node_path(field: &str, parent: &str) -> String {
    if parent.is_empty() {
        field.to_string()
    } else {
        format!("{parent}.{field}")
    }
}

/// Derives the schema tree for a model type.
///
/// # Errors
///
/// Returns a [`SchemaError`] when a field carries an unusable default literal.
/// No partial tree is returned on failure.
pub fn build_schema<M: Model>(options: &SchemaOptions) -> Result<ModelSchema, SchemaError> {
    build_schema_for_spec(&M::type_spec(), options)
}

/// Derives the schema tree from an explicit type definition.
///
/// This is the worker behind [`build_schema`]; it exists separately so that
/// schemas can be derived from hand-written type definitions.
///
/// # Errors
///
/// Returns a [`SchemaError`] when a field carries an unusable default literal.
pub fn build_schema_for_spec(
    spec: &TypeSpec,
    options: &SchemaOptions,
) -> Result<ModelSchema, SchemaError> {
    let mut builder = SchemaBuilder::default();
    let root = builder.push(root_node());

    let state = LevelState {
        nested_id_required: true,
        ..Default::default()
    };
    let mut children = builder.build_level(spec, ROOT_PATH, state, true)?;
    builder.append_meta_fields(spec, options, ROOT_PATH, &mut children);
    builder.nodes[root].children = children;

    Ok(ModelSchema {
        nodes: builder.nodes,
        index: builder.index,
        root,
    })
}

/// Per-level derivation state threaded through the recursion.
#[derive(Debug, Clone, Default)]
struct LevelState {
    /// Whether an `_id` node is synthesized at this level when none is declared.
    nested_id_required: bool,
    /// Whether this level is being folded into an ancestor (inline struct).
    inline_parent: bool,
    /// Keys already claimed by the ancestor levels of an inline fold.
    parent_keys: Vec<String>,
}

#[derive(Debug, Default)]
struct SchemaBuilder {
    nodes: Vec<SchemaNode>,
    index: HashMap<String, NodeId>,
}

impl SchemaBuilder {
    fn push(&mut self, node: SchemaNode) -> NodeId {
        let id = self.nodes.len();
        self.index.insert(node.path.clone(), id);
        self.nodes.push(node);
        id
    }

    fn build_level(
        &mut self,
        spec: &TypeSpec,
        parent: &str,
        state: LevelState,
        is_root: bool,
    ) -> Result<Vec<NodeId>, SchemaError> {
        let mut out = Vec::new();
        let level_keys = level_doc_keys(spec);
        let mut id_found = false;

        for field in &spec.fields {
            let Some(key) = field.doc_key() else {
                // ignored field
                continue;
            };

            // when folding an inline struct, keys already claimed by the parent
            // levels win over the folded struct's fields.
            if state.inline_parent && state.parent_keys.iter().any(|claimed| claimed == &key) {
                continue;
            }

            if key == ID_KEY {
                id_found = true;
            }

            let transformers = Transformer::for_tags(&field.tags);
            let options = fieldopt::resolve_options(field)?;
            let path = node_path(&key, parent);

            match &field.kind {
                SpecKind::Struct(sub) if field.is_inline() => {
                    let mut parent_keys = level_keys.clone();
                    parent_keys.extend(state.parent_keys.iter().cloned());

                    let inline_state = LevelState {
                        nested_id_required: false,
                        inline_parent: true,
                        parent_keys,
                    };
                    let folded = self.build_level(sub, parent, inline_state, false)?;
                    out.extend(folded);

                    // the folded struct itself contributes no node
                }
                SpecKind::Struct(sub) => {
                    let child_state = LevelState {
                        nested_id_required: options.nested_id,
                        ..Default::default()
                    };
                    let children = self.build_level(sub, &path, child_state, false)?;

                    out.push(self.push(SchemaNode {
                        path,
                        key,
                        field_name: field.name.clone(),
                        kind: FieldKind::Struct,
                        is_pointer: field.optional,
                        transformers,
                        options,
                        children,
                    }));
                }
                SpecKind::Slice(element) => {
                    // value transformers apply to the elements, the options to
                    // the slice itself.
                    let element_id =
                        self.build_slice_element(element, &path, transformers, &options)?;

                    out.push(self.push(SchemaNode {
                        path,
                        key,
                        field_name: field.name.clone(),
                        kind: FieldKind::Slice,
                        is_pointer: field.optional,
                        transformers: Vec::new(),
                        options,
                        children: vec![element_id],
                    }));
                }
                SpecKind::Scalar(kind) => {
                    out.push(self.push(SchemaNode {
                        path,
                        key,
                        field_name: field.name.clone(),
                        kind: FieldKind::Scalar(*kind),
                        is_pointer: field.optional,
                        transformers,
                        options,
                        children: Vec::new(),
                    }));
                }
            }
        }

        if state.nested_id_required && !id_found {
            let id = self.push(identifier_node(parent));
            if is_root {
                out.insert(0, id);
            } else {
                out.push(id);
            }
        }

        Ok(out)
    }

    fn build_slice_element(
        &mut self,
        element: &SpecKind,
        slice_path: &str,
        transformers: Vec<Transformer>,
        slice_options: &FieldOptions,
    ) -> Result<NodeId, SchemaError> {
        let path = node_path(ELEMENT_KEY, slice_path);

        let children = match element {
            SpecKind::Struct(sub) => {
                let state = LevelState {
                    nested_id_required: slice_options.nested_id,
                    ..Default::default()
                };
                self.build_level(sub, &path, state, false)?
            }
            _ => Vec::new(),
        };

        let kind = match element {
            SpecKind::Struct(_) => FieldKind::Struct,
            SpecKind::Slice(_) => FieldKind::Slice,
            SpecKind::Scalar(kind) => FieldKind::Scalar(*kind),
        };

        Ok(self.push(SchemaNode {
            path,
            key: ELEMENT_KEY.to_string(),
            field_name: ELEMENT_KEY.to_string(),
            kind,
            is_pointer: false,
            transformers,
            options: FieldOptions {
                required: false,
                nested_id: false,
                default: None,
            },
            children,
        }))
    }

    fn append_meta_fields(
        &mut self,
        spec: &TypeSpec,
        options: &SchemaOptions,
        parent: &str,
        out: &mut Vec<NodeId>,
    ) {
        let declared_keys = level_doc_keys(spec);

        for meta in MetaField::ALL {
            if !meta.is_applicable(options) {
                continue;
            }

            if declared_keys.iter().any(|key| key == meta.key()) {
                // the model declares the field itself
                continue;
            }

            // never required, so a missing meta field cannot fail a build; the
            // reconciliation helper adds them to documents explicitly.
            out.push(self.push(SchemaNode {
                path: node_path(meta.key(), parent),
                key: meta.key().to_string(),
                field_name: meta.key().to_string(),
                kind: FieldKind::Scalar(meta.scalar_kind()),
                is_pointer: false,
                transformers: meta.transformers(),
                options: FieldOptions {
                    required: false,
                    nested_id: false,
                    default: None,
                },
                children: Vec::new(),
            }));
        }
    }
}

fn level_doc_keys(spec: &TypeSpec) -> Vec<String> {
    spec.fields
        .iter()
        .filter_map(FieldSpec::doc_key)
        .collect()
}

fn root_node() -> SchemaNode {
    SchemaNode {
        path: ROOT_PATH.to_string(),
        key: ROOT_PATH.to_string(),
        field_name: ROOT_PATH.to_string(),
        kind: FieldKind::Struct,
        is_pointer: false,
        transformers: Vec::new(),
        options: FieldOptions {
            required: false,
            // an identifier is always required at the document root
            nested_id: true,
            default: None,
        },
        children: Vec::new(),
    }
}

fn identifier_node(parent: &str) -> SchemaNode {
    SchemaNode {
        path: node_path(ID_KEY, parent),
        key: ID_KEY.to_string(),
        field_name: ID_KEY.to_string(),
        kind: FieldKind::Scalar(ScalarKind::String),
        is_pointer: false,
        transformers: vec![Transformer::ObjectId],
        options: FieldOptions {
            required: true,
            nested_id: false,
            default: None,
        },
        children: Vec::new(),
    }
}
