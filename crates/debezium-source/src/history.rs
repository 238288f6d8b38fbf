//! Schema history → Doris DDL translation
//!
//! Debezium's MySQL connector emits schema history entries carrying both the
//! raw DDL text and a structured description of the table after the change.
//! The raw text is only matched for the verb and a first-pass column name;
//! type, length, scale, default and comment of an added column come from the
//! structured description.
//!
//! Only one column per statement is supported. For a statement such as
//! `ALTER TABLE t ADD COLUMN a INT, ADD COLUMN b INT` only the first column
//! is seen by the pattern.

use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

use doris_types::{mysql_to_doris_type, ColumnOperation, DorisDdl, SchemaChangeIntent};

use crate::envelope::{extract_text, ChangeEnvelope};
use crate::error::{CdcError, Result};
use crate::table::{split_table_identifier, TableResolver};

/// Matches single-column ADD/DROP statements.
///
/// Group 1 is the verb, group 3 the column.
pub const DEFAULT_DDL_PATTERN: &str =
    r"(?i)ALTER\s+TABLE\s+[^\s]+\s+(ADD|DROP)\s+(COLUMN\s+)?([^\s]+)(\s+([^\s]+))?.*";

const ALTER: &str = "ALTER";

/// The parts of a schema history record the translator reads
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub ddl: Option<String>,
    /// First entry of `tableChanges`
    pub table_change: Option<Value>,
}

impl HistoryRecord {
    /// Parse a `historyRecord` value, either an embedded JSON string or an object.
    pub fn parse(raw: &Value) -> Result<Self> {
        let parsed;
        let root = match raw {
            Value::String(text) => {
                parsed = serde_json::from_str::<Value>(text)
                    .map_err(|e| CdcError::MalformedHistory(e.to_string()))?;
                &parsed
            }
            Value::Object(_) => raw,
            _ => {
                return Err(CdcError::MalformedHistory(
                    "historyRecord must be a JSON object or string".to_string(),
                ))
            }
        };

        Ok(Self {
            ddl: extract_text(Some(root), "ddl"),
            table_change: root
                .get("tableChanges")
                .and_then(Value::as_array)
                .and_then(|changes| changes.first())
                .filter(|change| !change.is_null())
                .cloned(),
        })
    }

    pub fn change_type(&self) -> Option<String> {
        extract_text(self.table_change.as_ref(), "type")
    }

    pub fn is_alter(&self) -> bool {
        self.change_type().as_deref() == Some(ALTER)
    }

    /// The last column of the changed table, which is the one an ADD appends.
    pub fn last_column(&self) -> Option<ColumnDescription> {
        self.table_change
            .as_ref()?
            .get("table")?
            .get("columns")?
            .as_array()?
            .last()
            .map(ColumnDescription::from_node)
    }
}

/// Structured description of one column in a table change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnDescription {
    pub name: Option<String>,
    pub type_name: Option<String>,
    pub length: u32,
    pub scale: u32,
    pub default_value_expression: Option<String>,
    pub comment: Option<String>,
}

impl ColumnDescription {
    fn from_node(node: &Value) -> Self {
        Self {
            name: extract_text(Some(node), "name"),
            type_name: extract_text(Some(node), "typeName"),
            length: extract_u32(node, "length"),
            scale: extract_u32(node, "scale"),
            default_value_expression: extract_text(Some(node), "defaultValueExpression"),
            comment: extract_text(Some(node), "comment"),
        }
    }
}

fn extract_u32(node: &Value, key: &str) -> u32 {
    node.get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

/// A translated schema change, ready for the Doris frontend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaChange {
    pub database: String,
    pub table: String,
    pub intent: SchemaChangeIntent,
    pub statement: String,
}

impl SchemaChange {
    pub fn target_table(&self) -> String {
        format!("{}.{}", self.database, self.table)
    }
}

/// Translates schema history envelopes into Doris DDL
#[derive(Debug, Clone)]
pub struct DdlTranslator {
    pattern: Regex,
    source_table_name: Option<String>,
    resolver: Arc<TableResolver>,
}

impl DdlTranslator {
    pub fn builder(resolver: Arc<TableResolver>) -> DdlTranslatorBuilder {
        DdlTranslatorBuilder {
            resolver,
            pattern: None,
            source_table_name: None,
        }
    }

    /// Translate a schema history envelope.
    ///
    /// Returns `Ok(None)` when there is nothing to apply: the envelope belongs
    /// to another captured table, the entry is not an ALTER, the DDL is not a
    /// single-column ADD/DROP, or the table has no Doris target.
    pub fn translate(&self, envelope: &ChangeEnvelope) -> Result<Option<SchemaChange>> {
        if let Some(filter) = &self.source_table_name {
            if envelope.source.database_table().as_deref() != Some(filter.as_str()) {
                tracing::debug!(
                    "Skipping schema change of {:?}, only {filter} is synced",
                    envelope.source.database_table()
                );
                return Ok(None);
            }
        }

        let Some(raw) = &envelope.history_record else {
            return Ok(None);
        };
        let history = HistoryRecord::parse(raw)?;
        let Some(intent) = self.extract_intent(&history)? else {
            return Ok(None);
        };

        let source_identity = envelope.source.identity();
        let Some(target) = self.resolver.resolve(&source_identity) else {
            tracing::warn!(
                "Skipping schema change of '{source_identity}': it is not mapped to a Doris table"
            );
            return Ok(None);
        };
        let (database, table) = split_table_identifier(target)?;

        let statement = DorisDdl::alter_column(target, &intent)?;
        tracing::info!("Parsed alter DDL: {statement}");

        Ok(Some(SchemaChange {
            database: database.to_string(),
            table: table.to_string(),
            intent,
            statement,
        }))
    }

    /// Derive the column change described by a history record.
    pub fn extract_intent(&self, history: &HistoryRecord) -> Result<Option<SchemaChangeIntent>> {
        if !history.is_alter() {
            return Ok(None);
        }
        let Some(ddl) = history.ddl.as_deref() else {
            return Ok(None);
        };
        tracing::debug!("Received debezium DDL: {ddl}");

        let Some(captures) = self.pattern.captures(ddl) else {
            tracing::info!("DDL can not do schema change: {ddl}");
            return Ok(None);
        };
        let verb = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let Some(operation) = ColumnOperation::parse(verb) else {
            tracing::info!("DDL verb '{verb}' can not do schema change: {ddl}");
            return Ok(None);
        };
        // `a,` in multi-column statements, `` `age` `` for quoted identifiers
        let matched_column = captures.get(3).map(|m| {
            m.as_str()
                .trim_end_matches(',')
                .trim_matches('`')
                .to_string()
        });

        match operation {
            ColumnOperation::Drop => Ok(matched_column.map(SchemaChangeIntent::drop)),
            ColumnOperation::Add => {
                let column = history.last_column().ok_or_else(|| {
                    CdcError::MalformedHistory("ALTER entry has no column descriptions".to_string())
                })?;
                let name = column.name.clone().or(matched_column).ok_or_else(|| {
                    CdcError::MalformedHistory("added column has no name".to_string())
                })?;
                let type_name = column.type_name.as_deref().ok_or_else(|| {
                    CdcError::MalformedHistory(format!("column '{name}' has no typeName"))
                })?;
                let column_type = mysql_to_doris_type(type_name, column.length, column.scale)?;

                Ok(Some(
                    SchemaChangeIntent::add(name, column_type)
                        .with_raw_default(column.default_value_expression.as_deref())
                        .with_comment(column.comment.as_deref()),
                ))
            }
        }
    }
}

/// Builder for [`DdlTranslator`]
#[derive(Debug)]
pub struct DdlTranslatorBuilder {
    resolver: Arc<TableResolver>,
    pattern: Option<String>,
    source_table_name: Option<String>,
}

impl DdlTranslatorBuilder {
    /// Override the DDL pattern. Group 1 must capture the verb and group 3 the column.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Only translate changes of this captured `database.table`.
    pub fn source_table_name(mut self, name: impl Into<String>) -> Self {
        self.source_table_name = Some(name.into());
        self
    }

    pub fn build(self) -> Result<DdlTranslator> {
        let pattern = Regex::new(self.pattern.as_deref().unwrap_or(DEFAULT_DDL_PATTERN))?;
        Ok(DdlTranslator {
            pattern,
            source_table_name: self.source_table_name.filter(|s| !s.trim().is_empty()),
            resolver: self.resolver,
        })
    }
}
