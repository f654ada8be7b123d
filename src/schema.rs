//! Column type tags and their mapping to BigQuery field schemas.
//!
//! Tables are declared with a flat mapping of column name to type tag.
//! Singular tags declare plain nullable columns; the plural spelling of
//! each tag declares the REPEATED variant of the same type.

use gcp_bigquery_client::model::field_type::FieldType;
use gcp_bigquery_client::model::table_field_schema::TableFieldSchema;

/// Recognized column type tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldTag {
    String,
    Integer,
    Float,
    Boolean,
    Timestamp,
    Record,
    /// Repeated string column
    Strings,
    /// Repeated integer column
    Integers,
    /// Repeated float column
    Floats,
    /// Repeated boolean column
    Booleans,
    /// Repeated timestamp column
    Timestamps,
    /// Repeated record column
    Records,
}

impl FieldTag {
    /// Every recognized tag, singular before repeated
    pub const ALL: [FieldTag; 12] = [
        FieldTag::String,
        FieldTag::Integer,
        FieldTag::Float,
        FieldTag::Boolean,
        FieldTag::Timestamp,
        FieldTag::Record,
        FieldTag::Strings,
        FieldTag::Integers,
        FieldTag::Floats,
        FieldTag::Booleans,
        FieldTag::Timestamps,
        FieldTag::Records,
    ];

    /// Parse a tag string. Returns `None` for anything outside the
    /// recognized set; the caller decides how to reject it.
    pub fn parse(tag: &str) -> Option<FieldTag> {
        let tag = match tag {
            "STRING" => FieldTag::String,
            "INTEGER" => FieldTag::Integer,
            "FLOAT" => FieldTag::Float,
            "BOOLEAN" => FieldTag::Boolean,
            "TIMESTAMP" => FieldTag::Timestamp,
            "RECORD" => FieldTag::Record,
            "STRINGS" => FieldTag::Strings,
            "INTEGERS" => FieldTag::Integers,
            "FLOATS" => FieldTag::Floats,
            "BOOLEANS" => FieldTag::Booleans,
            "TIMESTAMPS" => FieldTag::Timestamps,
            "RECORDS" => FieldTag::Records,
            _ => return None,
        };
        Some(tag)
    }

    /// Canonical tag string
    pub fn as_str(self) -> &'static str {
        match self {
            FieldTag::String => "STRING",
            FieldTag::Integer => "INTEGER",
            FieldTag::Float => "FLOAT",
            FieldTag::Boolean => "BOOLEAN",
            FieldTag::Timestamp => "TIMESTAMP",
            FieldTag::Record => "RECORD",
            FieldTag::Strings => "STRINGS",
            FieldTag::Integers => "INTEGERS",
            FieldTag::Floats => "FLOATS",
            FieldTag::Booleans => "BOOLEANS",
            FieldTag::Timestamps => "TIMESTAMPS",
            FieldTag::Records => "RECORDS",
        }
    }

    /// True for the plural (REPEATED) tag variants
    pub fn is_repeated(self) -> bool {
        matches!(
            self,
            FieldTag::Strings
                | FieldTag::Integers
                | FieldTag::Floats
                | FieldTag::Booleans
                | FieldTag::Timestamps
                | FieldTag::Records
        )
    }

    /// Build the BigQuery field schema for a column with this tag
    pub(crate) fn field_schema(self, column: &str) -> TableFieldSchema {
        let mut field = match self {
            FieldTag::String | FieldTag::Strings => TableFieldSchema::string(column),
            FieldTag::Integer | FieldTag::Integers => TableFieldSchema::integer(column),
            FieldTag::Float | FieldTag::Floats => TableFieldSchema::float(column),
            // The legacy type name, not standard-SQL BOOL
            FieldTag::Boolean | FieldTag::Booleans => {
                TableFieldSchema::new(column, FieldType::Boolean)
            }
            FieldTag::Timestamp | FieldTag::Timestamps => TableFieldSchema::timestamp(column),
            // Record subfields are declared by the caller through nested
            // row values; the schema itself starts empty.
            FieldTag::Record | FieldTag::Records => TableFieldSchema::record(column, Vec::new()),
        };
        if self.is_repeated() {
            field.mode = Some("REPEATED".to_string());
        }
        field
    }
}

impl std::fmt::Display for FieldTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Serialized form is the stable surface of TableFieldSchema: the
    // "type" key holds the BigQuery field type, "mode" is present only
    // when set.
    fn field_json(tag: FieldTag) -> serde_json::Value {
        serde_json::to_value(tag.field_schema("col")).unwrap()
    }

    #[test]
    fn test_singular_tags_map_to_plain_fields() {
        let cases = [
            (FieldTag::String, "STRING"),
            (FieldTag::Integer, "INTEGER"),
            (FieldTag::Float, "FLOAT"),
            (FieldTag::Boolean, "BOOLEAN"),
            (FieldTag::Timestamp, "TIMESTAMP"),
            (FieldTag::Record, "RECORD"),
        ];
        for (tag, expected) in cases {
            let json = field_json(tag);
            assert_eq!(json["name"], "col");
            assert_eq!(json["type"], expected, "tag {tag}");
            assert!(json.get("mode").is_none(), "tag {tag} must not be repeated");
        }
    }

    #[test]
    fn test_plural_tags_map_to_repeated_fields() {
        let cases = [
            (FieldTag::Strings, "STRING"),
            (FieldTag::Integers, "INTEGER"),
            (FieldTag::Floats, "FLOAT"),
            (FieldTag::Booleans, "BOOLEAN"),
            (FieldTag::Timestamps, "TIMESTAMP"),
            (FieldTag::Records, "RECORD"),
        ];
        for (tag, expected) in cases {
            let field = tag.field_schema("col");
            assert_eq!(field.mode.as_deref(), Some("REPEATED"), "tag {tag}");
            assert_eq!(field_json(tag)["type"], expected, "tag {tag}");
        }
    }

    #[test]
    fn test_parse_round_trips_every_tag() {
        for tag in FieldTag::ALL {
            assert_eq!(FieldTag::parse(tag.as_str()), Some(tag));
        }
    }

    #[test]
    fn test_parse_rejects_unknown_tags() {
        assert_eq!(FieldTag::parse("INT"), None);
        assert_eq!(FieldTag::parse("string"), None);
        assert_eq!(FieldTag::parse(""), None);
        assert_eq!(FieldTag::parse("VARCHAR"), None);
    }

    #[test]
    fn test_repeated_flag_matches_plural_spelling() {
        for tag in FieldTag::ALL {
            assert_eq!(tag.is_repeated(), tag.as_str().ends_with('S'), "tag {tag}");
        }
    }
}
