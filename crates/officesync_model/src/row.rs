//! Backend row representation and column helpers.

use crate::error::{CodecError, CodecResult};
use serde_json::{Map, Value};

/// A backend row: a flat map of snake_case column names to JSON values.
///
/// Array- and object-valued columns hold native JSON values; the backend
/// is expected to store them in structured columns.
pub type Row = Map<String, Value>;

/// Name of the primary key column present on every row.
pub const PRIMARY_KEY: &str = "id";

/// Read-side view over a row with default-on-absence accessors.
///
/// Every accessor treats a missing column, a `null` and a value of the
/// wrong JSON type the same way: the caller's default is returned.
#[derive(Debug, Clone, Copy)]
pub struct RowReader<'a> {
    table: &'static str,
    row: &'a Row,
}

impl<'a> RowReader<'a> {
    /// Creates a reader for a row of the given table.
    pub fn new(table: &'static str, row: &'a Row) -> Self {
        Self { table, row }
    }

    /// Returns the table name.
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Returns the primary key.
    ///
    /// Numeric keys are accepted and rendered as strings.
    pub fn id(&self) -> CodecResult<String> {
        match self.row.get(PRIMARY_KEY) {
            None | Some(Value::Null) => Err(CodecError::MissingPrimaryKey { table: self.table }),
            Some(Value::String(s)) if s.is_empty() => {
                Err(CodecError::MissingPrimaryKey { table: self.table })
            }
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(_) => Err(CodecError::InvalidColumn {
                table: self.table,
                column: PRIMARY_KEY,
                expected: "string or number",
            }),
        }
    }

    /// Returns a raw column value, ignoring `null`.
    pub fn value(&self, column: &str) -> Option<&'a Value> {
        match self.row.get(column) {
            None | Some(Value::Null) => None,
            Some(v) => Some(v),
        }
    }

    /// Returns a text column, or `""` when absent.
    pub fn text(&self, column: &str) -> String {
        self.text_or(column, "")
    }

    /// Returns a text column, or `default` when absent.
    pub fn text_or(&self, column: &str, default: &str) -> String {
        self.opt_text(column)
            .unwrap_or_else(|| default.to_string())
    }

    /// Returns a nullable text column.
    pub fn opt_text(&self, column: &str) -> Option<String> {
        self.value(column)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Returns a boolean column, or `default` when absent.
    pub fn bool_or(&self, column: &str, default: bool) -> bool {
        self.value(column)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    /// Returns a numeric column, or `default` when absent.
    pub fn f64_or(&self, column: &str, default: f64) -> f64 {
        self.value(column)
            .and_then(Value::as_f64)
            .unwrap_or(default)
    }

    /// Returns an unsigned integer column, or `default` when absent.
    pub fn u64_or(&self, column: &str, default: u64) -> u64 {
        self.value(column)
            .and_then(Value::as_u64)
            .unwrap_or(default)
    }

    /// Returns a JSON array of strings; non-string elements are skipped.
    pub fn text_list(&self, column: &str) -> Vec<String> {
        self.value(column)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns a JSON object column.
    pub fn object(&self, column: &str) -> Option<&'a Map<String, Value>> {
        self.value(column).and_then(Value::as_object)
    }

    /// Returns a JSON array column, or an empty slice when absent.
    pub fn array(&self, column: &str) -> &'a [Value] {
        self.value(column)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Write-side builder producing a [`Row`].
#[derive(Debug, Default)]
pub struct RowWriter {
    row: Row,
}

impl RowWriter {
    /// Starts a row with the given primary key.
    pub fn new(id: &str) -> Self {
        let mut row = Row::new();
        row.insert(PRIMARY_KEY.to_string(), Value::String(id.to_string()));
        Self { row }
    }

    /// Writes a text column.
    pub fn text(mut self, column: &str, value: &str) -> Self {
        self.row
            .insert(column.to_string(), Value::String(value.to_string()));
        self
    }

    /// Writes a nullable text column; `None` becomes `null`.
    pub fn opt_text(mut self, column: &str, value: Option<&str>) -> Self {
        let value = value.map_or(Value::Null, |v| Value::String(v.to_string()));
        self.row.insert(column.to_string(), value);
        self
    }

    /// Writes a boolean column.
    pub fn bool(mut self, column: &str, value: bool) -> Self {
        self.row.insert(column.to_string(), Value::Bool(value));
        self
    }

    /// Writes a numeric column. Non-finite values become `null`.
    pub fn f64(mut self, column: &str, value: f64) -> Self {
        self.row.insert(column.to_string(), Value::from(value));
        self
    }

    /// Writes an unsigned integer column.
    pub fn u64(mut self, column: &str, value: u64) -> Self {
        self.row.insert(column.to_string(), Value::from(value));
        self
    }

    /// Writes a list of strings as a JSON array.
    pub fn text_list(mut self, column: &str, values: &[String]) -> Self {
        let items = values.iter().cloned().map(Value::String).collect();
        self.row.insert(column.to_string(), Value::Array(items));
        self
    }

    /// Writes a structured JSON value.
    pub fn value(mut self, column: &str, value: Value) -> Self {
        self.row.insert(column.to_string(), value);
        self
    }

    /// Finishes the row.
    pub fn finish(self) -> Row {
        self.row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn id_rules() {
        let r = row(json!({"id": "a"}));
        assert_eq!(RowReader::new("t", &r).id().unwrap(), "a");

        let r = row(json!({"id": 42}));
        assert_eq!(RowReader::new("t", &r).id().unwrap(), "42");

        let r = row(json!({"id": ""}));
        assert!(matches!(
            RowReader::new("t", &r).id(),
            Err(CodecError::MissingPrimaryKey { .. })
        ));

        let r = row(json!({"name": "x"}));
        assert!(RowReader::new("t", &r).id().is_err());

        let r = row(json!({"id": {"nested": true}}));
        assert!(matches!(
            RowReader::new("t", &r).id(),
            Err(CodecError::InvalidColumn { column: "id", .. })
        ));
    }

    #[test]
    fn absent_and_ill_typed_columns_use_defaults() {
        let r = row(json!({
            "id": "x",
            "title": null,
            "done": "yes",
            "weight": "heavy",
            "tags": ["a", 1, "b"],
        }));
        let reader = RowReader::new("t", &r);

        assert_eq!(reader.text("title"), "");
        assert_eq!(reader.text_or("missing", "fallback"), "fallback");
        assert_eq!(reader.opt_text("title"), None);
        assert!(reader.bool_or("done", true));
        assert_eq!(reader.f64_or("weight", 1.5), 1.5);
        assert_eq!(reader.text_list("tags"), vec!["a", "b"]);
        assert!(reader.text_list("missing").is_empty());
        assert!(reader.array("missing").is_empty());
    }

    #[test]
    fn writer_builds_snake_case_row() {
        let r = RowWriter::new("r1")
            .text("name", "Lab")
            .opt_text("project_id", None)
            .bool("show_grid", true)
            .f64("camera_speed", 1.25)
            .text_list("features", &["desk".to_string()])
            .finish();

        assert_eq!(r["id"], json!("r1"));
        assert_eq!(r["project_id"], Value::Null);
        assert_eq!(r["features"], json!(["desk"]));
        assert_eq!(r["camera_speed"], json!(1.25));
    }
}
