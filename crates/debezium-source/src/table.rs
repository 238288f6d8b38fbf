//! Source table → Doris table resolution

use std::collections::HashMap;

use crate::error::{CdcError, Result};

/// Join the non-blank parts of a table identity with `.`.
///
/// ```
/// use doris_cdc_debezium_source::table_identity;
///
/// assert_eq!(table_identity(Some("db"), None, Some("t")), "db.t");
/// assert_eq!(table_identity(Some("db"), Some("public"), Some("t")), "db.public.t");
/// assert_eq!(table_identity(Some("db"), Some(" "), Some("t")), "db.t");
/// ```
pub fn table_identity(database: Option<&str>, schema: Option<&str>, table: Option<&str>) -> String {
    [database, schema, table]
        .into_iter()
        .flatten()
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

/// Split `database.table` into its two parts.
pub fn split_table_identifier(identifier: &str) -> Result<(&str, &str)> {
    match identifier.split_once('.') {
        Some((database, table)) if !database.is_empty() && !table.is_empty() => {
            Ok((database, table))
        }
        _ => Err(CdcError::InvalidTableIdentifier(identifier.to_string())),
    }
}

/// Maps captured tables onto Doris tables.
///
/// A fixed target table, when configured, wins over the mapping so that a
/// single-table sink accepts every captured table routed to it.
#[derive(Debug, Clone, Default)]
pub struct TableResolver {
    fixed_target: Option<String>,
    mapping: HashMap<String, String>,
}

impl TableResolver {
    pub fn new(fixed_target: Option<String>, mapping: HashMap<String, String>) -> Self {
        Self {
            fixed_target: fixed_target.filter(|t| !t.trim().is_empty()),
            mapping,
        }
    }

    pub fn builder() -> TableResolverBuilder {
        TableResolverBuilder::default()
    }

    /// Resolve a source identity to a Doris `database.table`.
    ///
    /// `None` means the envelope should be dropped.
    pub fn resolve(&self, source_identity: &str) -> Option<&str> {
        if let Some(target) = &self.fixed_target {
            return Some(target);
        }
        if self.mapping.is_empty() || source_identity.trim().is_empty() {
            return None;
        }
        self.mapping.get(source_identity).map(String::as_str)
    }

    pub fn fixed_target(&self) -> Option<&str> {
        self.fixed_target.as_deref()
    }

    pub fn mapping(&self) -> &HashMap<String, String> {
        &self.mapping
    }
}

/// Builder for [`TableResolver`]
#[derive(Debug, Default)]
pub struct TableResolverBuilder {
    fixed_target: Option<String>,
    mapping: HashMap<String, String>,
}

impl TableResolverBuilder {
    pub fn fixed_target(mut self, target: impl Into<String>) -> Self {
        self.fixed_target = Some(target.into());
        self
    }

    pub fn mapping(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.mapping.insert(source.into(), target.into());
        self
    }

    pub fn mappings<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.mapping
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn build(self) -> TableResolver {
        TableResolver::new(self.fixed_target, self.mapping)
    }
}
