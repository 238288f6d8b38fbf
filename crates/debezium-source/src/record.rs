//! Doris stream-load records built from row envelopes

use std::sync::Arc;

use crate::envelope::{ChangeEnvelope, Operation};
use crate::error::Result;
use crate::row::{Row, DEFAULT_DELETE_SIGN};
use crate::table::TableResolver;

/// A payload addressed to one Doris table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    /// Target table as `database.table`
    pub target_table: String,
    /// Delimiter-joined UTF-8 JSON lines
    pub payload: Vec<u8>,
}

impl OutputRecord {
    pub fn new(target_table: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            target_table: target_table.into(),
            payload,
        }
    }

    /// The payload as text; payloads are always built from UTF-8 strings.
    pub fn payload_str(&self) -> &str {
        std::str::from_utf8(&self.payload).unwrap_or_default()
    }
}

/// Options controlling how row envelopes become records
#[derive(Debug, Clone)]
pub struct RecordOptions {
    /// Emit only the `after` image of updates instead of delete + insert
    pub ignore_update_before: bool,
    /// Separator between the lines of a split update
    pub line_delimiter: String,
    /// Name of the delete-sign column
    pub delete_sign_column: String,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            ignore_update_before: false,
            line_delimiter: "\n".to_string(),
            delete_sign_column: DEFAULT_DELETE_SIGN.to_string(),
        }
    }
}

/// Builds [`OutputRecord`]s from row envelopes
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    resolver: Arc<TableResolver>,
    options: RecordOptions,
}

impl RecordBuilder {
    pub fn new(resolver: Arc<TableResolver>, options: RecordOptions) -> Self {
        Self { resolver, options }
    }

    pub fn options(&self) -> &RecordOptions {
        &self.options
    }

    /// Build the record for a row envelope.
    ///
    /// Returns `Ok(None)` when the envelope is dropped: its table is not
    /// mapped, it carries no row operation, or the operation is unknown.
    pub fn build(&self, envelope: &ChangeEnvelope) -> Result<Option<OutputRecord>> {
        let Some(op) = &envelope.op else {
            tracing::debug!("Envelope carries no row operation, skipping");
            return Ok(None);
        };

        let source_identity = envelope.source.identity();
        let Some(target_table) = self.resolver.resolve(&source_identity) else {
            tracing::warn!(
                "Filtering table '{source_identity}': it is not mapped to a Doris table"
            );
            return Ok(None);
        };

        let payload = match op {
            Operation::Read | Operation::Create => {
                self.line(envelope.after.as_ref(), false)?
            }
            Operation::Update => self.update_lines(envelope)?,
            Operation::Delete => self.line(envelope.before.as_ref(), true)?,
            Operation::Unknown(code) => {
                tracing::error!(
                    "Failed to parse record of '{source_identity}': unknown op '{code}'"
                );
                return Ok(None);
            }
        };

        tracing::trace!("Built {op} record for {target_table}");
        Ok(Some(OutputRecord::new(target_table, payload.into_bytes())))
    }

    /// Split an update into delete(before) + insert(after) unless the
    /// before image is ignored.
    fn update_lines(&self, envelope: &ChangeEnvelope) -> Result<String> {
        let after = self.line(envelope.after.as_ref(), false)?;
        if self.options.ignore_update_before {
            return Ok(after);
        }
        let before = self.line(envelope.before.as_ref(), true)?;
        Ok(format!("{before}{}{after}", self.options.line_delimiter))
    }

    fn line(&self, tree: Option<&serde_json::Value>, deleted: bool) -> Result<String> {
        let mut row = Row::from_tree(tree)?;
        row.mark_deleted(&self.options.delete_sign_column, deleted);
        row.to_json_line()
    }
}
