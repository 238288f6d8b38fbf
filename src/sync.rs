//! JSONL envelope stream processing
//!
//! Reads one Debezium envelope per line, serializes it, and writes every
//! produced record as one JSON line:
//!
//! ```json
//! {"target_table":"d2.t2","payload":"{\"id\":1,\"__DORIS_DELETE_SIGN__\":\"0\"}"}
//! ```
//!
//! Schema history envelopes produce no output line; their schema changes are
//! applied by the serializer as they are encountered, so row events that
//! follow an ALTER see the new column.

use anyhow::Context;
use doris_cdc_debezium_source::CdcError;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::serializer::JsonDebeziumSerializer;

/// Counters for one sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Non-blank input lines
    pub envelopes: usize,
    /// Output records written
    pub records: usize,
    /// Envelopes that produced no record
    pub skipped: usize,
    /// Row envelopes whose record could not be built
    pub failed: usize,
}

#[derive(Serialize)]
struct RecordLine<'a> {
    target_table: &'a str,
    payload: &'a str,
}

/// Serialize every envelope from `reader` and write the records to `writer`.
///
/// Stops at the first line that is not valid JSON. A row that cannot be turned
/// into a record is logged and counted in [`SyncStats::failed`].
pub async fn run_sync<R, W>(
    serializer: &JsonDebeziumSerializer,
    reader: R,
    writer: &mut W,
) -> anyhow::Result<SyncStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut stats = SyncStats::default();
    let mut lines = reader.lines();
    let mut line_number = 0usize;

    while let Some(line) = lines
        .next_line()
        .await
        .context("Failed to read envelope input")?
    {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }
        stats.envelopes += 1;

        let record = match serializer.serialize(line.as_bytes()).await {
            Ok(record) => record,
            Err(e @ CdcError::MalformedPayload(_)) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("Failed to serialize envelope on line {line_number}")));
            }
            Err(e) => {
                tracing::error!("Dropping envelope on line {line_number}: {e}");
                stats.failed += 1;
                continue;
            }
        };

        let Some(record) = record else {
            stats.skipped += 1;
            continue;
        };

        let mut output = serde_json::to_vec(&RecordLine {
            target_table: &record.target_table,
            payload: record.payload_str(),
        })?;
        output.push(b'\n');
        writer
            .write_all(&output)
            .await
            .context("Failed to write output record")?;
        stats.records += 1;

        if stats.envelopes % 10_000 == 0 {
            tracing::debug!("Processed {} envelopes", stats.envelopes);
        }
    }

    writer.flush().await.context("Failed to flush output")?;
    tracing::info!(
        "Sync completed: {} envelopes, {} records written, {} skipped, {} failed",
        stats.envelopes,
        stats.records,
        stats.skipped,
        stats.failed
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use doris_cdc_debezium_source::TableResolver;
    use serde_json::Value;

    fn serializer() -> JsonDebeziumSerializer {
        JsonDebeziumSerializer::builder()
            .table_resolver(TableResolver::builder().mapping("d.t", "d2.t2").build())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_run_sync_writes_records() {
        let input = concat!(
            r#"{"op":"c","after":{"id":1},"source":{"db":"d","table":"t"}}"#,
            "\n\n",
            r#"{"op":"c","after":{"id":2},"source":{"db":"x","table":"y"}}"#,
            "\n",
            r#"{"op":"d","before":{"id":1},"source":{"db":"d","table":"t"}}"#,
            "\n",
        );
        let mut output = Vec::new();
        let stats = run_sync(&serializer(), input.as_bytes(), &mut output)
            .await
            .unwrap();

        assert_eq!(
            stats,
            SyncStats {
                envelopes: 3,
                records: 2,
                skipped: 1,
                failed: 0,
            }
        );
        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["target_table"], "d2.t2");
        assert_eq!(lines[0]["payload"], r#"{"id":1,"__DORIS_DELETE_SIGN__":"0"}"#);
        assert_eq!(lines[1]["payload"], r#"{"id":1,"__DORIS_DELETE_SIGN__":"1"}"#);
    }

    #[tokio::test]
    async fn test_run_sync_continues_after_bad_row() {
        let input = concat!(
            r#"{"op":"c","after":"oops","source":{"db":"d","table":"t"}}"#,
            "\n",
            r#"{"op":"c","after":{"id":2},"source":{"db":"d","table":"t"}}"#,
            "\n",
        );
        let mut output = Vec::new();
        let stats = run_sync(&serializer(), input.as_bytes(), &mut output)
            .await
            .unwrap();

        assert_eq!(stats.envelopes, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.records, 1);
        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["payload"], r#"{"id":2,"__DORIS_DELETE_SIGN__":"0"}"#);
    }

    #[tokio::test]
    async fn test_run_sync_reports_bad_line() {
        let input = "{\"op\":\"c\",\"after\":{\"id\":1},\"source\":{\"db\":\"d\",\"table\":\"t\"}}\nnot json\n";
        let mut output = Vec::new();
        let err = run_sync(&serializer(), input.as_bytes(), &mut output)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("line 2"));
    }
}
