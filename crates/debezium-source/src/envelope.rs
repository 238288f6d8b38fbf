//! Debezium change envelope decoding

use serde_json::{Map, Value};
use std::fmt;

use crate::error::{CdcError, Result};
use crate::table::table_identity;

/// Row operation code carried in the envelope's `op` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Snapshot read (`r`)
    Read,
    /// Insert (`c`)
    Create,
    /// Update (`u`)
    Update,
    /// Delete (`d`)
    Delete,
    /// Any other code, e.g. truncate (`t`)
    Unknown(String),
}

impl Operation {
    pub fn from_code(code: &str) -> Self {
        match code {
            "r" => Operation::Read,
            "c" => Operation::Create,
            "u" => Operation::Update,
            "d" => Operation::Delete,
            other => Operation::Unknown(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Operation::Read => "r",
            Operation::Create => "c",
            Operation::Update => "u",
            Operation::Delete => "d",
            Operation::Unknown(code) => code,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => write!(f, "Read"),
            Operation::Create => write!(f, "Create"),
            Operation::Update => write!(f, "Update"),
            Operation::Delete => write!(f, "Delete"),
            Operation::Unknown(code) => write!(f, "Unknown({code})"),
        }
    }
}

/// The `source` block of an envelope
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceInfo {
    pub db: Option<String>,
    pub schema: Option<String>,
    pub table: Option<String>,
}

impl SourceInfo {
    fn from_node(node: Option<&Value>) -> Self {
        Self {
            db: extract_text(node, "db"),
            schema: extract_text(node, "schema"),
            table: extract_text(node, "table"),
        }
    }

    /// Identity used for table mapping: `db[.schema].table`, blank parts skipped.
    pub fn identity(&self) -> String {
        table_identity(
            self.db.as_deref(),
            self.schema.as_deref(),
            self.table.as_deref(),
        )
    }

    /// `schema.table` when a schema is present, otherwise `db.table`.
    ///
    /// Returns `None` when either part is missing.
    pub fn database_table(&self) -> Option<String> {
        let database = self.schema.as_deref().or(self.db.as_deref())?;
        let table = self.table.as_deref()?;
        Some(format!("{database}.{table}"))
    }
}

/// What an envelope asks the pipeline to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeKind {
    Row(Operation),
    SchemaHistory,
    /// Neither an `op` nor a `historyRecord`
    Invalid,
}

/// A decoded Debezium change envelope
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEnvelope {
    pub op: Option<Operation>,
    pub source: SourceInfo,
    pub before: Option<Value>,
    pub after: Option<Value>,
    /// Either the embedded JSON string Debezium emits or an inline object
    pub history_record: Option<Value>,
}

impl ChangeEnvelope {
    /// Decode a raw payload.
    ///
    /// Envelopes produced with `schemas.enable=true` are unwrapped from their
    /// `{"schema": .., "payload": ..}` wrapper.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let root: Value = serde_json::from_slice(bytes).map_err(CdcError::MalformedPayload)?;
        Self::from_value(root)
    }

    /// Build an envelope from an already parsed JSON tree.
    pub fn from_value(root: Value) -> Result<Self> {
        let Value::Object(obj) = root else {
            return Err(CdcError::MalformedField {
                field: "$".to_string(),
                message: "change envelope must be a JSON object".to_string(),
            });
        };
        let obj = unwrap_payload(obj);
        let node = Some(&obj);

        Ok(Self {
            op: extract_text_map(node, "op").map(|code| Operation::from_code(&code)),
            source: SourceInfo::from_node(obj.get("source")),
            before: non_null(obj.get("before")),
            after: non_null(obj.get("after")),
            history_record: non_null(obj.get("historyRecord")),
        })
    }

    pub fn kind(&self) -> EnvelopeKind {
        match (&self.op, &self.history_record) {
            (Some(op), _) => EnvelopeKind::Row(op.clone()),
            (None, Some(_)) => EnvelopeKind::SchemaHistory,
            (None, None) => EnvelopeKind::Invalid,
        }
    }
}

fn unwrap_payload(mut obj: Map<String, Value>) -> Map<String, Value> {
    let wrapped = !obj.contains_key("op")
        && !obj.contains_key("historyRecord")
        && matches!(obj.get("payload"), Some(Value::Object(_)));
    if wrapped {
        if let Some(Value::Object(payload)) = obj.remove("payload") {
            return payload;
        }
    }
    obj
}

fn non_null(value: Option<&Value>) -> Option<Value> {
    value.filter(|v| !v.is_null()).cloned()
}

/// Read `key` from a JSON object as text.
///
/// A missing node, a missing key or an explicit `null` all yield `None`.
pub(crate) fn extract_text(node: Option<&Value>, key: &str) -> Option<String> {
    extract_text_map(node.and_then(Value::as_object), key)
}

fn extract_text_map(node: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    match node?.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_row_envelope() {
        let payload = br#"{"op":"c","before":null,"after":{"id":1},"source":{"db":"d","table":"t"}}"#;
        let envelope = ChangeEnvelope::decode(payload).unwrap();
        assert_eq!(envelope.op, Some(Operation::Create));
        assert_eq!(envelope.before, None);
        assert_eq!(envelope.after, Some(json!({"id": 1})));
        assert_eq!(envelope.source.identity(), "d.t");
        assert_eq!(envelope.kind(), EnvelopeKind::Row(Operation::Create));
    }

    #[test]
    fn test_decode_malformed_payload() {
        let err = ChangeEnvelope::decode(b"{not json").unwrap_err();
        assert!(matches!(err, CdcError::MalformedPayload(_)));
    }

    #[test]
    fn test_decode_non_object() {
        let err = ChangeEnvelope::decode(b"[1,2,3]").unwrap_err();
        assert!(matches!(err, CdcError::MalformedField { .. }));
    }

    #[test]
    fn test_null_op_is_schema_history() {
        let payload = br#"{"op":null,"source":{"db":"d","table":"t"},"historyRecord":"{}"}"#;
        let envelope = ChangeEnvelope::decode(payload).unwrap();
        assert_eq!(envelope.op, None);
        assert_eq!(envelope.kind(), EnvelopeKind::SchemaHistory);
    }

    #[test]
    fn test_envelope_without_op_or_history_is_invalid() {
        let envelope = ChangeEnvelope::decode(br#"{"source":{"db":"d"}}"#).unwrap();
        assert_eq!(envelope.kind(), EnvelopeKind::Invalid);
    }

    #[test]
    fn test_unknown_operation_code() {
        let envelope = ChangeEnvelope::decode(br#"{"op":"t","source":{}}"#).unwrap();
        assert_eq!(envelope.op, Some(Operation::Unknown("t".to_string())));
        assert_eq!(envelope.op.as_ref().map(Operation::code), Some("t"));
    }

    #[test]
    fn test_missing_source_is_null_safe() {
        let envelope = ChangeEnvelope::decode(br#"{"op":"r","after":{}}"#).unwrap();
        assert_eq!(envelope.source, SourceInfo::default());
        assert_eq!(envelope.source.identity(), "");
        assert_eq!(envelope.source.database_table(), None);
    }

    #[test]
    fn test_unwraps_schema_payload_wrapper() {
        let payload = br#"{"schema":{"type":"struct"},"payload":{"op":"d","before":{"id":7},"source":{"db":"d","table":"t"}}}"#;
        let envelope = ChangeEnvelope::decode(payload).unwrap();
        assert_eq!(envelope.op, Some(Operation::Delete));
        assert_eq!(envelope.before, Some(json!({"id": 7})));
    }

    #[test]
    fn test_identity_with_schema() {
        let source = SourceInfo {
            db: Some("inventory".to_string()),
            schema: Some("public".to_string()),
            table: Some("orders".to_string()),
        };
        assert_eq!(source.identity(), "inventory.public.orders");
        assert_eq!(source.database_table().as_deref(), Some("public.orders"));
    }

    #[test]
    fn test_database_table_without_schema() {
        let source = SourceInfo {
            db: Some("inventory".to_string()),
            schema: None,
            table: Some("orders".to_string()),
        };
        assert_eq!(source.database_table().as_deref(), Some("inventory.orders"));
    }

    #[test]
    fn test_extract_text_renders_scalars() {
        let node = json!({"s": "x", "n": 12, "b": true, "z": null});
        assert_eq!(extract_text(Some(&node), "s").as_deref(), Some("x"));
        assert_eq!(extract_text(Some(&node), "n").as_deref(), Some("12"));
        assert_eq!(extract_text(Some(&node), "b").as_deref(), Some("true"));
        assert_eq!(extract_text(Some(&node), "z"), None);
        assert_eq!(extract_text(Some(&node), "missing"), None);
        assert_eq!(extract_text(None, "s"), None);
        assert_eq!(extract_text(Some(&json!("scalar")), "s"), None);
    }
}
