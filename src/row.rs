//! Generic row representation for streaming inserts.
//!
//! A [`Row`] maps column names to JSON values, the tagged variant that
//! covers every scalar and nested-record shape the warehouse accepts.
//! An [`IdentifiedRow`] additionally carries a dedup insert ID so
//! retried batches do not create duplicate rows server-side.

use serde::Serialize;

/// Column value: any JSON-representable scalar or nested structure
pub type Value = serde_json::Value;

/// A single row, keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    values: serde_json::Map<String, Value>,
}

impl Row {
    pub fn new() -> Row {
        Row::default()
    }

    /// Builder-style column setter
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Row {
        self.set(column, value);
        self
    }

    /// Set a column value, replacing any previous value for that column
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<serde_json::Map<String, Value>> for Row {
    fn from(values: serde_json::Map<String, Value>) -> Row {
        Row { values }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Row {
        let mut row = Row::new();
        for (column, value) in iter {
            row.set(column, value);
        }
        row
    }
}

/// A row paired with an explicit dedup insert ID.
///
/// The ID, when non-empty, must be unique per logical row: the service
/// uses it to suppress duplicates when the same batch is retried.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifiedRow {
    pub row: Row,
    pub insert_id: String,
}

impl IdentifiedRow {
    pub fn new(row: Row, insert_id: impl Into<String>) -> IdentifiedRow {
        IdentifiedRow {
            row,
            insert_id: insert_id.into(),
        }
    }

    /// Pair a row with a freshly minted UUID insert ID
    pub fn generated(row: Row) -> IdentifiedRow {
        IdentifiedRow {
            row,
            insert_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_builder_serializes_to_flat_object() {
        let row = Row::new().with("stuff", "Blah0").with("age", 0);
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            json!({"stuff": "Blah0", "age": 0})
        );
    }

    #[test]
    fn test_row_set_replaces_existing_column() {
        let mut row = Row::new().with("age", 1);
        row.set("age", 2);
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("age"), Some(&json!(2)));
    }

    #[test]
    fn test_row_accepts_nested_record_values() {
        let row = Row::new()
            .with("name", "a")
            .with("address", json!({"city": "Utrecht", "zip": "3511"}))
            .with("tags", json!(["x", "y"]));
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["address"]["city"], "Utrecht");
        assert_eq!(value["tags"], json!(["x", "y"]));
    }

    #[test]
    fn test_row_from_iterator() {
        let row: Row = vec![("stuff", "Blah1"), ("more", "Blah2")]
            .into_iter()
            .collect();
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("stuff"), Some(&json!("Blah1")));
    }

    #[test]
    fn test_generated_insert_ids_are_unique() {
        let a = IdentifiedRow::generated(Row::new());
        let b = IdentifiedRow::generated(Row::new());
        assert!(!a.insert_id.is_empty());
        assert!(!b.insert_id.is_empty());
        assert_ne!(a.insert_id, b.insert_id);
    }
}
