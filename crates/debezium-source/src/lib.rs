//! Debezium JSON change envelopes for Doris
//!
//! This library turns Debezium JSON change events into the JSON-lines payload
//! used by Doris stream load, and turns MySQL schema history entries into
//! Doris `ALTER TABLE` statements.
//!
//! # Row events
//!
//! Row events (`op` is `r`, `c`, `u` or `d`) are normalized into flat column
//! maps carrying a delete-sign column, and addressed to a Doris table through
//! a [`TableResolver`]:
//!
//! ```ignore
//! use doris_cdc_debezium_source::{ChangeEnvelope, RecordBuilder, RecordOptions, TableResolver};
//!
//! let resolver = TableResolver::builder().mapping("d.t", "d2.t2").build();
//! let builder = RecordBuilder::new(resolver.into(), RecordOptions::default());
//!
//! let envelope = ChangeEnvelope::decode(payload)?;
//! if let Some(record) = builder.build(&envelope)? {
//!     sink.load(&record.target_table, &record.payload)?;
//! }
//! ```
//!
//! # Schema history events
//!
//! Envelopes without an `op` carry a `historyRecord`. A [`DdlTranslator`]
//! extracts the single added or dropped column and renders the Doris DDL:
//!
//! ```ignore
//! let translator = DdlTranslator::builder(resolver).build()?;
//! if let Some(change) = translator.translate(&envelope)? {
//!     println!("{}", change.statement);
//! }
//! ```

mod envelope;
mod error;
mod history;
mod record;
mod row;
mod table;

pub use envelope::{ChangeEnvelope, EnvelopeKind, Operation, SourceInfo};
pub use error::{CdcError, Result};
pub use history::{
    ColumnDescription, DdlTranslator, DdlTranslatorBuilder, HistoryRecord, SchemaChange,
    DEFAULT_DDL_PATTERN,
};
pub use record::{OutputRecord, RecordBuilder, RecordOptions};
pub use row::{Row, DEFAULT_DELETE_SIGN};
pub use table::{split_table_identifier, table_identity, TableResolver, TableResolverBuilder};
