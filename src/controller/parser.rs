//! # Env Parser
//!
//! Parses the env-style file the external-config ConfigMap is built from.
//!
//! - Blank lines and lines starting with `#` are ignored
//! - `KEY=VALUE` splits on the first `=`; key and value are trimmed
//! - A value wrapped in a matching pair of `"` or `'` is unwrapped
//! - Lines without `=` are skipped with a warning

use super::desired::ConfigData;
use crate::error::ParseError;
use std::path::Path;
use tracing::{debug, warn};

/// Parse env-style content into a mapping
///
/// Later duplicates of a key win.
pub fn parse_env_content(content: &str) -> ConfigData {
    let mut data = ConfigData::new();

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            warn!("Skipping invalid line {} in config file: {}", index + 1, line);
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            warn!("Skipping line {} in config file: empty key", index + 1);
            continue;
        }

        data.insert(key.to_string(), strip_quotes(value.trim()).to_string());
    }

    data
}

/// Read and parse the config file
///
/// Fails when the path is unreadable, is a directory, or yields no entries.
pub async fn load_env_file(path: &Path) -> Result<ConfigData, ParseError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    if metadata.is_dir() {
        return Err(ParseError::NotAFile(path.to_path_buf()));
    }

    debug!("Parsing config from: {}", path.display());
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let data = parse_env_content(&content);
    if data.is_empty() {
        return Err(ParseError::NoEntries(path.to_path_buf()));
    }
    Ok(data)
}

fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
