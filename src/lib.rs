//! Doris CDC Sync Library
//!
//! Serializes Debezium JSON change envelopes into Doris stream-load records and
//! replays single-column MySQL schema changes against Doris using light schema
//! change.
//!
//! # Crates
//!
//! - `doris_types` - Doris column types, MySQL type mapping and DDL rendering
//! - `doris_cdc_debezium_source` - envelope decoding, row records and DDL translation
//! - `doris_sink` - Doris frontend client for the capability check and DDL execution
//!
//! # CLI Usage
//!
//! ```bash
//! # Serialize a JSONL file of envelopes, applying schema changes
//! doris-cdc-sync sync --input changes.jsonl --output records.jsonl \
//!   --table-mapping inventory.customers=ods.customers \
//!   --doris-fenodes 127.0.0.1:8030 --doris-username root
//!
//! # Translate one schema history envelope without touching Doris
//! doris-cdc-sync ddl --input history.json --table-identifier ods.customers
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use doris_cdc_debezium_source::{RecordOptions, TableResolver};
use doris_sink::DorisConnection;

pub mod config;
pub mod serializer;
pub mod sync;

pub use serializer::{JsonDebeziumSerializer, JsonDebeziumSerializerBuilder};
pub use sync::{run_sync, SyncStats};

/// Doris frontend connection options
#[derive(Parser, Clone, Debug)]
pub struct DorisOptions {
    /// Doris frontend HTTP endpoints (comma-separated host:port)
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "127.0.0.1:8030",
        env = "DORIS_FENODES"
    )]
    pub doris_fenodes: Vec<String>,

    /// Doris username
    #[arg(long, default_value = "root", env = "DORIS_USERNAME")]
    pub doris_username: String,

    /// Doris password
    #[arg(long, default_value = "", env = "DORIS_PASSWORD")]
    pub doris_password: String,

    /// Timeout for each frontend request (e.g. "30s", "2m", "1500ms")
    #[arg(
        long,
        default_value = "30s",
        value_parser = config::parse_duration,
        env = "DORIS_REQUEST_TIMEOUT"
    )]
    pub doris_request_timeout: Duration,
}

impl DorisOptions {
    pub fn connection(&self) -> DorisConnection {
        DorisConnection::new(
            self.doris_fenodes.clone(),
            self.doris_username.clone(),
            self.doris_password.clone(),
        )
        .with_request_timeout(self.doris_request_timeout)
    }
}

/// Envelope serialization options
#[derive(Parser, Clone, Debug)]
pub struct SerializerOptions {
    /// Send every event to this Doris table (db.table), ignoring the mapping
    #[arg(long, env = "DORIS_TABLE_IDENTIFIER")]
    pub table_identifier: Option<String>,

    /// Map a source table to a Doris table (format: 'source=db.table', repeatable)
    #[arg(
        long = "table-mapping",
        value_name = "MAPPING",
        value_parser = config::parse_table_mapping,
        value_delimiter = ',',
        env = "DORIS_TABLE_MAPPING"
    )]
    pub table_mappings: Vec<(String, String)>,

    /// YAML file mapping source tables to Doris tables
    #[arg(long, env = "DORIS_TABLE_MAPPING_FILE")]
    pub table_mapping_file: Option<PathBuf>,

    /// Emit only the after image for updates
    #[arg(long, env = "DORIS_IGNORE_UPDATE_BEFORE")]
    pub ignore_update_before: bool,

    /// Delimiter between rows of one record (escapes like \n, \t, \x01 are decoded)
    #[arg(
        long,
        default_value = "\\n",
        value_parser = config::decode_delimiter,
        env = "DORIS_LINE_DELIMITER"
    )]
    pub line_delimiter: String,

    /// Only translate schema changes of this source table (db.table)
    #[arg(long, env = "DORIS_SOURCE_TABLE_NAME")]
    pub source_table_name: Option<String>,

    /// Override the regular expression used to match ALTER TABLE statements
    #[arg(long, env = "DORIS_DDL_PATTERN")]
    pub ddl_pattern: Option<String>,

    /// Name of the delete-sign column added to every row
    #[arg(long, default_value = "__DORIS_DELETE_SIGN__", env = "DORIS_DELETE_SIGN_COLUMN")]
    pub delete_sign_column: String,
}

impl SerializerOptions {
    /// Build the table resolver. Flag mappings override entries from the file.
    pub fn table_resolver(&self) -> anyhow::Result<TableResolver> {
        let mut builder = TableResolver::builder();
        if let Some(path) = &self.table_mapping_file {
            builder = builder.mappings(config::load_table_mapping_file(path)?);
        }
        builder = builder.mappings(self.table_mappings.iter().cloned());
        if let Some(target) = &self.table_identifier {
            builder = builder.fixed_target(target.clone());
        }
        Ok(builder.build())
    }

    pub fn record_options(&self) -> RecordOptions {
        RecordOptions {
            ignore_update_before: self.ignore_update_before,
            line_delimiter: self.line_delimiter.clone(),
            delete_sign_column: self.delete_sign_column.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        serializer: SerializerOptions,
        #[command(flatten)]
        doris: DorisOptions,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::try_parse_from(["test"]).unwrap();
        assert_eq!(cli.serializer.line_delimiter, "\n");
        assert_eq!(cli.serializer.delete_sign_column, "__DORIS_DELETE_SIGN__");
        assert!(!cli.serializer.ignore_update_before);
        assert_eq!(cli.doris.doris_request_timeout, Duration::from_secs(30));
        assert_eq!(cli.doris.doris_username, "root");
    }

    #[test]
    fn test_mapping_flags_build_resolver() {
        let cli = TestCli::try_parse_from([
            "test",
            "--table-mapping",
            "d.t=d2.t2",
            "--table-mapping",
            "d.u=d2.u2",
            "--line-delimiter",
            "\\x01",
            "--doris-fenodes",
            "fe1:8030,fe2:8030",
        ])
        .unwrap();

        let resolver = cli.serializer.table_resolver().unwrap();
        assert_eq!(resolver.resolve("d.t"), Some("d2.t2"));
        assert_eq!(resolver.resolve("d.u"), Some("d2.u2"));
        assert_eq!(resolver.resolve("d.v"), None);
        assert_eq!(cli.serializer.record_options().line_delimiter, "\u{1}");

        let connection = cli.doris.connection();
        assert_eq!(connection.fenodes, vec!["fe1:8030", "fe2:8030"]);
    }

    #[test]
    fn test_table_identifier_overrides_mapping() {
        let cli = TestCli::try_parse_from([
            "test",
            "--table-identifier",
            "ods.all",
            "--table-mapping",
            "d.t=d2.t2",
        ])
        .unwrap();
        let resolver = cli.serializer.table_resolver().unwrap();
        assert_eq!(resolver.resolve("d.t"), Some("ods.all"));
        assert_eq!(resolver.resolve("x.y"), Some("ods.all"));
    }

    #[test]
    fn test_invalid_flags() {
        assert!(TestCli::try_parse_from(["test", "--table-mapping", "nodest"]).is_err());
        assert!(TestCli::try_parse_from(["test", "--doris-request-timeout", "soon"]).is_err());
    }
}
