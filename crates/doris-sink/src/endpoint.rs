//! Frontend endpoint selection

use rand::seq::IndexedRandom;

use crate::error::{DorisSinkError, Result};

/// Pick one frontend `host:port` at random.
///
/// Entries may carry an `http://` prefix or a trailing `/`; both are stripped.
/// Blank entries are ignored.
pub fn random_endpoint(fenodes: &[String]) -> Result<String> {
    let candidates: Vec<&str> = fenodes
        .iter()
        .map(|node| normalize(node))
        .filter(|node| !node.is_empty())
        .collect();

    let endpoint = candidates
        .choose(&mut rand::rng())
        .ok_or(DorisSinkError::NoEndpoint)?;
    tracing::debug!("Using Doris frontend {endpoint}");
    Ok(endpoint.to_string())
}

fn normalize(node: &str) -> &str {
    let node = node.trim();
    let node = node.strip_prefix("http://").unwrap_or(node);
    node.trim_end_matches('/')
}
