//! Debezium JSON serializer for Doris
//!
//! [`JsonDebeziumSerializer`] is the single entry point for one change
//! envelope at a time. Row events become [`OutputRecord`]s; schema history
//! events are translated into Doris DDL and, when a frontend client is
//! configured, applied through the light schema change check.

use std::sync::Arc;

use doris_cdc_debezium_source::{
    ChangeEnvelope, DdlTranslator, EnvelopeKind, OutputRecord, RecordBuilder, RecordOptions,
    SchemaChange, TableResolver,
};
use doris_sink::DorisClient;

use crate::{DorisOptions, SerializerOptions};

pub struct JsonDebeziumSerializer {
    record_builder: RecordBuilder,
    translator: DdlTranslator,
    /// `None` translates schema changes without applying them.
    client: Option<DorisClient>,
}

impl JsonDebeziumSerializer {
    pub fn builder() -> JsonDebeziumSerializerBuilder {
        JsonDebeziumSerializerBuilder::default()
    }

    /// Build from CLI options. `doris` is `None` for a dry run.
    pub fn from_options(
        serializer: &SerializerOptions,
        doris: Option<&DorisOptions>,
    ) -> anyhow::Result<Self> {
        let mut builder = Self::builder()
            .table_resolver(serializer.table_resolver()?)
            .record_options(serializer.record_options());
        if let Some(pattern) = &serializer.ddl_pattern {
            builder = builder.ddl_pattern(pattern.clone());
        }
        if let Some(name) = &serializer.source_table_name {
            builder = builder.source_table_name(name.clone());
        }
        if let Some(doris) = doris {
            builder = builder.doris_client(DorisClient::new(doris.connection()));
        }
        builder.build()
    }

    /// Serialize one raw envelope.
    ///
    /// Returns `Ok(None)` for schema history envelopes (after attempting the
    /// schema change), for invalid envelopes and for rows that resolve to no
    /// Doris table. A payload that is not JSON is an error.
    pub async fn serialize(
        &self,
        payload: &[u8],
    ) -> doris_cdc_debezium_source::Result<Option<OutputRecord>> {
        let envelope = ChangeEnvelope::decode(payload)?;
        match envelope.kind() {
            EnvelopeKind::Row(_) => self.record_builder.build(&envelope),
            EnvelopeKind::SchemaHistory => {
                let applied = self.schema_change(&envelope).await;
                tracing::info!("Schema change status: {applied}");
                Ok(None)
            }
            EnvelopeKind::Invalid => {
                tracing::warn!(
                    "Ignoring envelope without op or historyRecord from {}",
                    envelope.source.identity()
                );
                Ok(None)
            }
        }
    }

    /// Translate a schema history envelope and apply it.
    ///
    /// Returns `true` only when the frontend accepted both the capability check
    /// and the statement. Failures are logged, never returned.
    pub async fn schema_change(&self, envelope: &ChangeEnvelope) -> bool {
        let change = match self.translate_ddl(envelope) {
            Ok(Some(change)) => change,
            Ok(None) => return false,
            Err(e) => {
                tracing::error!("Failed to translate schema change: {e}");
                return false;
            }
        };

        let Some(client) = &self.client else {
            tracing::info!("Dry run, not applying: {}", change.statement);
            return false;
        };

        client
            .apply(
                &change.database,
                &change.table,
                &change.intent,
                &change.statement,
            )
            .await
    }

    /// Translate a schema history envelope into a Doris statement without
    /// contacting Doris.
    pub fn translate_ddl(
        &self,
        envelope: &ChangeEnvelope,
    ) -> doris_cdc_debezium_source::Result<Option<SchemaChange>> {
        self.translator.translate(envelope)
    }

    pub fn is_dry_run(&self) -> bool {
        self.client.is_none()
    }
}

/// Builder for [`JsonDebeziumSerializer`]
#[derive(Default)]
pub struct JsonDebeziumSerializerBuilder {
    resolver: Option<TableResolver>,
    record_options: RecordOptions,
    ddl_pattern: Option<String>,
    source_table_name: Option<String>,
    client: Option<DorisClient>,
}

impl JsonDebeziumSerializerBuilder {
    pub fn table_resolver(mut self, resolver: TableResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn record_options(mut self, options: RecordOptions) -> Self {
        self.record_options = options;
        self
    }

    pub fn ddl_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.ddl_pattern = Some(pattern.into());
        self
    }

    pub fn source_table_name(mut self, name: impl Into<String>) -> Self {
        self.source_table_name = Some(name.into());
        self
    }

    pub fn doris_client(mut self, client: DorisClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<JsonDebeziumSerializer> {
        let resolver = Arc::new(self.resolver.unwrap_or_default());
        if resolver.fixed_target().is_none() && resolver.mapping().is_empty() {
            tracing::warn!("No target table or table mapping configured, every row will be dropped");
        }

        let mut translator = DdlTranslator::builder(Arc::clone(&resolver));
        if let Some(pattern) = self.ddl_pattern {
            translator = translator.pattern(pattern);
        }
        if let Some(name) = self.source_table_name {
            translator = translator.source_table_name(name);
        }

        Ok(JsonDebeziumSerializer {
            record_builder: RecordBuilder::new(resolver, self.record_options),
            translator: translator.build()?,
            client: self.client,
        })
    }
}
