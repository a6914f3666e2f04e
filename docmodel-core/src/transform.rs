//! Bidirectional value transformers applied at schema leaves.
//!
//! A transformer converts a scalar between its record representation (plain
//! strings) and its store representation (driver-native BSON values). The set
//! is closed; a field selects transformers through its type-hint tag, and the
//! build engine applies them in list order.

use bson::Bson;
use bson::oid::ObjectId;

use crate::datetime;
use crate::error::BuildError;
use crate::typespec::FieldTags;

const TYPE_HINT_ID: &str = "id";
const TYPE_HINT_DATE: &str = "date";

/// A reversible scalar value transformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transformer {
    /// 24-character hex string ⇄ `ObjectId`.
    ObjectId,
    /// ISO-8601 string ⇄ millisecond-precision datetime.
    DateTime,
}

impl Transformer {
    const ALL: [Transformer; 2] = [Transformer::ObjectId, Transformer::DateTime];

    /// Transformers required for a field, selected by its type-hint tag.
    pub fn for_tags(tags: &FieldTags) -> Vec<Transformer> {
        Transformer::ALL
            .into_iter()
            .filter(|transformer| transformer.is_required_for(tags))
            .collect()
    }

    fn is_required_for(self, tags: &FieldTags) -> bool {
        match self {
            Transformer::ObjectId => tags.hint.as_deref() == Some(TYPE_HINT_ID),
            Transformer::DateTime => tags.hint.as_deref() == Some(TYPE_HINT_DATE),
        }
    }

    /// Converts a record value into its store representation.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when the value is not a string or does not parse
    /// as the store type.
    pub fn to_store(self, value: Bson) -> Result<Bson, BuildError> {
        match self {
            Transformer::ObjectId => match value {
                Bson::String(hex) => ObjectId::parse_str(&hex)
                    .map(Bson::ObjectId)
                    .map_err(|_| BuildError::InvalidObjectId(hex)),
                other => Err(unexpected("hex string", &other)),
            },
            Transformer::DateTime => match value {
                Bson::String(iso) => Ok(Bson::DateTime(datetime::parse_iso_string(&iso)?)),
                other => Err(unexpected("ISO-8601 string", &other)),
            },
        }
    }

    /// Converts a store value back into its record representation.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when the value is not of the expected store type.
    pub fn to_record(self, value: Bson) -> Result<Bson, BuildError> {
        match self {
            Transformer::ObjectId => match value {
                Bson::ObjectId(id) => Ok(Bson::String(id.to_hex())),
                other => Err(unexpected("object id", &other)),
            },
            Transformer::DateTime => match value {
                Bson::DateTime(timestamp) => Ok(Bson::String(datetime::to_iso_string(timestamp))),
                other => Err(unexpected("datetime", &other)),
            },
        }
    }
}

fn unexpected(expected: &'static str, got: &Bson) -> BuildError {
    BuildError::UnexpectedValue {
        expected,
        got: bson_type_name(got),
    }
}

fn bson_type_name(value: &Bson) -> &'static str {
    match value {
        Bson::Double(_) => "double",
        Bson::String(_) => "string",
        Bson::Array(_) => "array",
        Bson::Document(_) => "document",
        Bson::Boolean(_) => "boolean",
        Bson::Null => "null",
        Bson::Int32(_) => "int32",
        Bson::Int64(_) => "int64",
        Bson::ObjectId(_) => "object id",
        Bson::DateTime(_) => "datetime",
        _ => "value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags_with_hint(hint: &str) -> FieldTags {
        FieldTags {
            hint: Some(hint.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn selection_follows_the_type_hint() {
        assert_eq!(
            Transformer::for_tags(&tags_with_hint("id")),
            vec![Transformer::ObjectId]
        );
        assert_eq!(
            Transformer::for_tags(&tags_with_hint("date")),
            vec![Transformer::DateTime]
        );
        assert!(Transformer::for_tags(&FieldTags::default()).is_empty());
        assert!(Transformer::for_tags(&tags_with_hint("unknown")).is_empty());
    }

    #[test]
    fn object_id_round_trips_through_hex() {
        let id = ObjectId::new();

        let stored = Transformer::ObjectId
            .to_store(Bson::String(id.to_hex()))
            .unwrap();
        assert_eq!(stored, Bson::ObjectId(id));

        let record = Transformer::ObjectId.to_record(stored).unwrap();
        assert_eq!(record, Bson::String(id.to_hex()));
    }

    #[test]
    fn malformed_hex_is_a_hard_error() {
        let result = Transformer::ObjectId.to_store(Bson::String("nothex".to_string()));
        assert!(matches!(result, Err(BuildError::InvalidObjectId(_))));
    }

    #[test]
    fn datetime_round_trips_through_iso_strings() {
        let stored = Transformer::DateTime
            .to_store(Bson::String("2023-01-01T10:10:10.123Z".to_string()))
            .unwrap();
        assert!(matches!(stored, Bson::DateTime(_)));

        let record = Transformer::DateTime.to_record(stored).unwrap();
        assert_eq!(record, Bson::String("2023-01-01T10:10:10.123Z".to_string()));
    }

    #[test]
    fn malformed_timestamp_is_a_hard_error() {
        let result = Transformer::DateTime.to_store(Bson::String("yesterday".to_string()));
        assert!(matches!(result, Err(BuildError::InvalidTimestamp(_))));
    }

    #[test]
    fn wrong_value_shapes_are_rejected() {
        let result = Transformer::ObjectId.to_store(Bson::Int32(7));
        assert!(matches!(result, Err(BuildError::UnexpectedValue { .. })));

        let result = Transformer::DateTime.to_record(Bson::String("already".to_string()));
        assert!(matches!(result, Err(BuildError::UnexpectedValue { .. })));
    }
}
