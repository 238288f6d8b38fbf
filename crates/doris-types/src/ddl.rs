//! Doris ALTER TABLE generation for single-column schema changes.
//!
//! Only one column may be added or dropped per statement. Statements touching
//! several columns are not translated.

use std::fmt;

use crate::error::{Result, TypeMappingError};
use crate::schema::DorisType;

/// Default value Debezium reports for `DEFAULT CURRENT_TIMESTAMP` columns.
const ZERO_EPOCH_TIMESTAMP: &str = "1970-01-01 00:00:00";

/// Doris keyword substituted for [`ZERO_EPOCH_TIMESTAMP`].
const CURRENT_TIMESTAMP: &str = "current_timestamp";

/// Column-level operation carried by a schema change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnOperation {
    Add,
    Drop,
}

impl ColumnOperation {
    /// Parse a DDL verb, ignoring case.
    pub fn parse(verb: &str) -> Option<Self> {
        if verb.eq_ignore_ascii_case("ADD") {
            Some(Self::Add)
        } else if verb.eq_ignore_ascii_case("DROP") {
            Some(Self::Drop)
        } else {
            None
        }
    }

    pub fn is_drop(&self) -> bool {
        matches!(self, Self::Drop)
    }
}

impl fmt::Display for ColumnOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "ADD"),
            Self::Drop => write!(f, "DROP"),
        }
    }
}

/// A single-column schema change derived from a schema history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaChangeIntent {
    pub operation: ColumnOperation,
    pub column_name: String,
    /// Target column type; required for ADD, ignored for DROP.
    pub column_type: Option<DorisType>,
    /// Already-quoted default value expression.
    pub default_value: Option<String>,
    pub comment: Option<String>,
}

impl SchemaChangeIntent {
    /// Intent to add `column_name` with the given type.
    pub fn add(column_name: impl Into<String>, column_type: DorisType) -> Self {
        Self {
            operation: ColumnOperation::Add,
            column_name: column_name.into(),
            column_type: Some(column_type),
            default_value: None,
            comment: None,
        }
    }

    /// Intent to drop `column_name`.
    pub fn drop(column_name: impl Into<String>) -> Self {
        Self {
            operation: ColumnOperation::Drop,
            column_name: column_name.into(),
            column_type: None,
            default_value: None,
            comment: None,
        }
    }

    /// Attach a raw default value, quoted per [`quote_default_value`].
    pub fn with_raw_default(mut self, raw: Option<&str>) -> Self {
        self.default_value = raw.and_then(quote_default_value);
        self
    }

    /// Attach a column comment; blank comments are dropped.
    pub fn with_comment(mut self, comment: Option<&str>) -> Self {
        self.comment = comment
            .filter(|c| !c.trim().is_empty())
            .map(str::to_string);
        self
    }

    pub fn is_drop_column(&self) -> bool {
        self.operation.is_drop()
    }

    /// Check the intent's invariants before it is rendered.
    pub fn validate(&self) -> Result<()> {
        if self.column_name.trim().is_empty() {
            return Err(TypeMappingError::InvalidIntent {
                column: self.column_name.clone(),
                message: "column name is empty".to_string(),
            });
        }
        if self.operation == ColumnOperation::Add && self.column_type.is_none() {
            return Err(TypeMappingError::InvalidIntent {
                column: self.column_name.clone(),
                message: "ADD COLUMN requires a column type".to_string(),
            });
        }
        Ok(())
    }
}

/// Quote a default value expression the way Doris expects it.
///
/// - blank → `None`
/// - already wrapped in matching `'` or `"` → unchanged
/// - `1970-01-01 00:00:00` → `current_timestamp`
/// - anything else → wrapped in single quotes, embedded `'` doubled
///
/// # Example
///
/// ```
/// use doris_types::quote_default_value;
///
/// assert_eq!(quote_default_value("abc").as_deref(), Some("'abc'"));
/// assert_eq!(quote_default_value("'x'").as_deref(), Some("'x'"));
/// assert_eq!(quote_default_value("  "), None);
/// ```
pub fn quote_default_value(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }
    if is_quoted(raw) {
        return Some(raw.to_string());
    }
    if raw == ZERO_EPOCH_TIMESTAMP {
        return Some(CURRENT_TIMESTAMP.to_string());
    }
    Some(format!("'{}'", raw.replace('\'', "''")))
}

fn is_quoted(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2
        && matches!(bytes[0], b'\'' | b'"')
        && bytes[bytes.len() - 1] == bytes[0]
}

/// Doris DDL generator.
pub struct DorisDdl;

impl DorisDdl {
    /// Render `ALTER TABLE <table> <ADD|DROP> COLUMN <name>[ <type>][ default ..][ comment ..]`.
    pub fn alter_column(table: &str, intent: &SchemaChangeIntent) -> Result<String> {
        intent.validate()?;

        let mut stmt = format!(
            "ALTER TABLE {} {} COLUMN {}",
            table, intent.operation, intent.column_name
        );
        if intent.operation == ColumnOperation::Drop {
            return Ok(stmt);
        }

        if let Some(column_type) = &intent.column_type {
            stmt.push(' ');
            stmt.push_str(&column_type.to_string());
        }
        if let Some(default_value) = intent.default_value.as_deref() {
            if !default_value.trim().is_empty() {
                stmt.push_str(" default ");
                stmt.push_str(default_value);
            }
        }
        if let Some(comment) = intent.comment.as_deref() {
            if !comment.trim().is_empty() {
                stmt.push_str(" comment '");
                stmt.push_str(&comment.replace('\'', "''"));
                stmt.push('\'');
            }
        }
        Ok(stmt)
    }
}
