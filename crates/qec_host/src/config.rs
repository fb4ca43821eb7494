//! Engine configuration file loading.

use anyhow::{Context, Result};
use qec_core::EngineConfig;
use std::path::Path;

/// Reads an [`EngineConfig`] from YAML, or the defaults when no file is given.
pub fn load(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = parse(&text).with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(?config, "loaded engine config");
    Ok(config)
}

fn parse(text: &str) -> Result<EngineConfig> {
    let config: EngineConfig = serde_yaml_ng::from_str(text)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_defaults() {
        let config = parse("bp:\n  max_iterations: 40\n").unwrap();
        assert_eq!(config.bp.max_iterations, 40);
        assert_eq!(config.bp.scaling, EngineConfig::default().bp.scaling);
        assert_eq!(config.union_find.max_rounds, None);
    }

    #[test]
    fn unknown_keys_and_bad_values_are_rejected() {
        assert!(parse("bogus: 1\n").is_err());
        assert!(parse("bp:\n  prior_error_rate: 0.7\n").is_err());
        assert!(parse("union_find:\n  max_rounds: 0\n").is_err());
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(parse("{}").unwrap(), EngineConfig::default());
    }
}
