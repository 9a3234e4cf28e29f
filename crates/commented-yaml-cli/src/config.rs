use std::path::Path;

use anyhow::Context;
use commented_yaml::{ReadOptions, WriteOptions};
use serde::Deserialize;

/// Options loaded from `--config`.
///
/// ```toml
/// [read]
/// max-non-scalar-aliases = 50
/// duplicate-keys = "error"
///
/// [write]
/// indent = 2
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub read: ReadOptions,
    pub write: WriteOptions,
}

/// Load the config at `path`, or the defaults when no path was given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid config.
pub fn load(path: Option<&Path>) -> Result<Config, anyhow::Error> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse {}: {e}", path.display()))?;
    tracing::debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}
