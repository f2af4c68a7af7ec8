//! Configuration loading for the CLI.

use crate::error::{CliError, Result};
use aegis_gate::GateConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Get the default configuration file path.
pub fn default_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
    Ok(home.join(".aegis").join("config.toml"))
}

/// Load configuration from `path`, else the default path if it exists, else defaults.
pub fn load(path: Option<&Path>) -> Result<GateConfig> {
    if let Some(path) = path {
        debug!("Loading config from {}", path.display());
        return Ok(GateConfig::from_file(path)?);
    }

    match default_path() {
        Ok(path) if path.exists() => {
            debug!("Loading config from {}", path.display());
            Ok(GateConfig::from_file(&path)?)
        }
        _ => Ok(GateConfig::default()),
    }
}

/// Apply command-line overrides and re-validate.
pub fn apply_overrides(
    mut config: GateConfig,
    endpoint: Option<String>,
    always_show: bool,
) -> Result<GateConfig> {
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }
    if always_show {
        config.always_show_banner = true;
    }
    config.validate().map_err(CliError::Config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_path() {
        // No home directory in some CI sandboxes
        if let Ok(path) = default_path() {
            assert!(path.ends_with(".aegis/config.toml"));
        }
    }

    #[test]
    fn test_load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "min_length = 20").unwrap();
        writeln!(file, "always_show_banner = true").unwrap();

        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.min_length, 20);
        assert!(config.always_show_banner);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load(Some(dir.path().join("missing.toml").as_path()));
        assert!(matches!(result, Err(CliError::Gate(_))));
    }

    #[test]
    fn test_overrides() {
        let config = apply_overrides(
            GateConfig::default(),
            Some("https://scanner.internal/analyze".to_string()),
            true,
        )
        .unwrap();
        assert_eq!(config.endpoint, "https://scanner.internal/analyze");
        assert!(config.always_show_banner);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let result = apply_overrides(GateConfig::default(), Some("ftp://x".to_string()), false);
        assert!(matches!(result, Err(CliError::Config(_))));
    }
}
