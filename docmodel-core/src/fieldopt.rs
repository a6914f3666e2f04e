//! Field-level schema options and their resolvers.
//!
//! Every declared field resolves to a [`FieldOptions`] value during schema
//! derivation. The resolvers form a closed set: each one knows which field
//! kinds it applies to, how to read its tag, and what to fall back to when it
//! does not apply.

use bson::Bson;

use crate::error::SchemaError;
use crate::typespec::{FieldSpec, ScalarKind, SpecKind};

/// Resolved schema options for a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOptions {
    /// Whether the field must be present in the document. Defaults to `true`;
    /// disabled by the `omitempty` flag.
    pub required: bool,
    /// Whether an `_id` field is injected into the nested object this field
    /// holds. Only meaningful for struct fields, where it defaults to `true`.
    pub nested_id: bool,
    /// Value appended for the field when it is absent from the document.
    pub default: Option<Bson>,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            required: true,
            nested_id: false,
            default: None,
        }
    }
}

/// The closed set of field options understood by the deriver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldOption {
    Required,
    NestedId,
    Default,
}

impl FieldOption {
    const ALL: [FieldOption; 3] = [
        FieldOption::Required,
        FieldOption::NestedId,
        FieldOption::Default,
    ];

    fn applies_to(self, field: &FieldSpec) -> bool {
        match self {
            FieldOption::Required => true,
            FieldOption::NestedId => matches!(field.kind, SpecKind::Struct(_)),
            FieldOption::Default => field.tags.default.is_some(),
        }
    }

    fn resolve(self, field: &FieldSpec, options: &mut FieldOptions) -> Result<(), SchemaError> {
        match self {
            FieldOption::Required => options.required = !field.tags.has_flag("omitempty"),
            FieldOption::NestedId => {
                options.nested_id = field.tags.nested_id.as_deref() != Some("false");
            }
            FieldOption::Default => options.default = parse_default_literal(field)?,
        }

        Ok(())
    }

    fn fallback(self, options: &mut FieldOptions) {
        match self {
            FieldOption::Required => options.required = true,
            FieldOption::NestedId => options.nested_id = false,
            FieldOption::Default => options.default = None,
        }
    }
}

/// Resolves all applicable field options for the given field.
///
/// # Errors
///
/// Returns a [`SchemaError`] when the field carries a default literal that does
/// not parse as its scalar kind, or a default on a kind that cannot have one.
pub fn resolve_options(field: &FieldSpec) -> Result<FieldOptions, SchemaError> {
    let mut options = FieldOptions::default();

    for option in FieldOption::ALL {
        if option.applies_to(field) {
            option.resolve(field, &mut options)?;
        } else {
            option.fallback(&mut options);
        }
    }

    Ok(options)
}

fn parse_default_literal(field: &FieldSpec) -> Result<Option<Bson>, SchemaError> {
    let Some(literal) = field.tags.default.as_deref() else {
        return Ok(None);
    };

    let invalid = || SchemaError::InvalidDefaultLiteral {
        field: field.name.clone(),
        literal: literal.to_string(),
    };

    let value = match &field.kind {
        SpecKind::Scalar(ScalarKind::String) => Bson::String(literal.to_string()),
        SpecKind::Scalar(ScalarKind::Int) => {
            Bson::Int64(literal.parse::<i64>().map_err(|_| invalid())?)
        }
        SpecKind::Scalar(ScalarKind::Float) => {
            Bson::Double(literal.parse::<f64>().map_err(|_| invalid())?)
        }
        SpecKind::Scalar(ScalarKind::Bool) => {
            Bson::Boolean(literal.parse::<bool>().map_err(|_| invalid())?)
        }
        SpecKind::Slice(_) => Bson::Array(Vec::new()),
        SpecKind::Struct(_) => {
            return Err(SchemaError::UnsupportedDefault {
                field: field.name.clone(),
            });
        }
    };

    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typespec::{FieldTags, TypeSpec};

    fn field(kind: SpecKind, tags: FieldTags) -> FieldSpec {
        FieldSpec {
            name: "Field".to_string(),
            kind,
            optional: false,
            tags,
        }
    }

    #[test]
    fn required_by_default_disabled_by_omitempty() {
        let plain = field(SpecKind::Scalar(ScalarKind::String), FieldTags::default());
        assert!(resolve_options(&plain).unwrap().required);

        let tags = FieldTags {
            bson: Some(",omitempty".to_string()),
            ..Default::default()
        };
        let optional = field(SpecKind::Scalar(ScalarKind::String), tags);
        assert!(!resolve_options(&optional).unwrap().required);
    }

    #[test]
    fn nested_id_applies_to_structs_only() {
        let nested = TypeSpec {
            name: "Nested".to_string(),
            fields: Vec::new(),
        };

        let plain = field(SpecKind::Struct(nested.clone()), FieldTags::default());
        assert!(resolve_options(&plain).unwrap().nested_id);

        let tags = FieldTags {
            nested_id: Some("false".to_string()),
            ..Default::default()
        };
        let disabled = field(SpecKind::Struct(nested), tags);
        assert!(!resolve_options(&disabled).unwrap().nested_id);

        // the override tag is ignored outside struct fields
        let tags = FieldTags {
            nested_id: Some("true".to_string()),
            ..Default::default()
        };
        let scalar = field(SpecKind::Scalar(ScalarKind::String), tags);
        assert!(!resolve_options(&scalar).unwrap().nested_id);
    }

    #[test]
    fn default_literals_parse_per_scalar_kind() {
        let with_default = |kind: SpecKind, literal: &str| {
            let tags = FieldTags {
                default: Some(literal.to_string()),
                ..Default::default()
            };
            resolve_options(&field(kind, tags)).map(|options| options.default)
        };

        assert_eq!(
            with_default(SpecKind::Scalar(ScalarKind::String), "user").unwrap(),
            Some(Bson::String("user".to_string()))
        );
        assert_eq!(
            with_default(SpecKind::Scalar(ScalarKind::Int), "18").unwrap(),
            Some(Bson::Int64(18))
        );
        assert_eq!(
            with_default(SpecKind::Scalar(ScalarKind::Float), "1.5").unwrap(),
            Some(Bson::Double(1.5))
        );
        assert_eq!(
            with_default(SpecKind::Scalar(ScalarKind::Bool), "true").unwrap(),
            Some(Bson::Boolean(true))
        );
        assert_eq!(
            with_default(
                SpecKind::Slice(Box::new(SpecKind::Scalar(ScalarKind::String))),
                "[]"
            )
            .unwrap(),
            Some(Bson::Array(Vec::new()))
        );
    }

    #[test]
    fn malformed_default_literal_is_an_error() {
        let tags = FieldTags {
            default: Some("eighteen".to_string()),
            ..Default::default()
        };
        let result = resolve_options(&field(SpecKind::Scalar(ScalarKind::Int), tags));
        assert!(matches!(
            result,
            Err(SchemaError::InvalidDefaultLiteral { .. })
        ));
    }

    #[test]
    fn default_on_a_struct_field_is_unsupported() {
        let nested = TypeSpec {
            name: "Nested".to_string(),
            fields: Vec::new(),
        };
        let tags = FieldTags {
            default: Some("{}".to_string()),
            ..Default::default()
        };

        let result = resolve_options(&field(SpecKind::Struct(nested), tags));
        assert!(matches!(result, Err(SchemaError::UnsupportedDefault { .. })));
    }

    #[test]
    fn missing_default_tag_resolves_to_none() {
        let plain = field(SpecKind::Scalar(ScalarKind::Int), FieldTags::default());
        assert_eq!(resolve_options(&plain).unwrap().default, None);
    }
}
