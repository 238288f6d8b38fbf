//! Row normalization

use serde_json::{Map, Value};

use crate::error::{CdcError, Result};

/// Delete-sign column Doris uses for merge-on-write unique tables.
pub const DEFAULT_DELETE_SIGN: &str = "__DORIS_DELETE_SIGN__";

/// A flat column-name → value map taken from a `before` or `after` tree.
///
/// Values keep their JSON form: numbers stay numbers with all their digits,
/// nested JSON columns stay nested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Map<String, Value>,
}

impl Row {
    /// Flatten a row tree. An absent or `null` tree is an empty row.
    pub fn from_tree(tree: Option<&Value>) -> Result<Self> {
        match tree {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::Object(columns)) => Ok(Self {
                columns: columns.clone(),
            }),
            Some(other) => Err(CdcError::MalformedField {
                field: "row".to_string(),
                message: format!("expected an object, got {}", json_kind(other)),
            }),
        }
    }

    /// Set the delete-sign column to `"1"` or `"0"`.
    pub fn mark_deleted(&mut self, delete_sign_column: &str, deleted: bool) {
        let sign = if deleted { "1" } else { "0" };
        self.columns
            .insert(delete_sign_column.to_string(), Value::String(sign.to_string()));
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Serialize as a single JSON line.
    pub fn to_json_line(&self) -> Result<String> {
        serde_json::to_string(&self.columns).map_err(CdcError::Serialization)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
