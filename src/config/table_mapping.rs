//! Source-to-Doris table mapping from flags and YAML files.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

/// Parse one `--table-mapping` value of the form `source=target`.
///
/// Source is a table identity (`db.table` or `db.schema.table`), target is a
/// Doris `db.table`.
pub fn parse_table_mapping(s: &str) -> anyhow::Result<(String, String)> {
    let (source, target) = s
        .split_once('=')
        .with_context(|| format!("Invalid table mapping '{s}'. Expected 'source=target'"))?;
    let (source, target) = (source.trim(), target.trim());
    if source.is_empty() || target.is_empty() {
        anyhow::bail!("Invalid table mapping '{s}'. Source and target must not be empty");
    }
    Ok((source.to_string(), target.to_string()))
}

/// Load a YAML map of source identity to Doris table.
///
/// ```yaml
/// inventory.customers: ods.customers
/// inventory.public.orders: ods.orders
/// ```
pub fn load_table_mapping_file(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read table mapping file: {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(HashMap::new());
    }
    let mapping: HashMap<String, String> = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse table mapping file: {}", path.display()))?;
    tracing::debug!(
        "Loaded {} table mappings from {}",
        mapping.len(),
        path.display()
    );
    Ok(mapping)
}
