//! Configuration file loading for the CLI
//!
//! This module defines the CLI configuration and handles finding and loading
//! TOML configuration files from various locations (explicit path, local
//! directory, system directory).
//!
//! ```toml
//! [check]
//! recurse = true
//! known_names = ["GeneratedByMacro"]
//! skip_remote_templates = true
//!
//! [output]
//! format = "short"
//! fail_on_warnings = true
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use cfn_xref::{CfnXrefError, config::CheckConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),
}

impl From<ConfigError> for CfnXrefError {
    fn from(err: ConfigError) -> Self {
        let path = match &err {
            ConfigError::Parse { path, .. } | ConfigError::MissingFile(path) => path.clone(),
        };
        CfnXrefError::new_io_error(path, io::Error::other(err.to_string()))
    }
}

/// How diagnostics are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Source snippets with labels.
    #[default]
    Pretty,
    /// One `path:line:column: message` line per diagnostic.
    Short,
}

/// Top-level CLI configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CliConfig {
    /// Check settings section.
    #[serde(default)]
    check: CheckConfig,

    /// Output settings section.
    #[serde(default)]
    output: OutputConfig,
}

impl CliConfig {
    /// Returns the check configuration.
    pub fn check(&self) -> &CheckConfig {
        &self.check
    }

    /// Returns the output configuration.
    pub fn output(&self) -> &OutputConfig {
        &self.output
    }
}

/// Output settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    format: OutputFormat,

    /// Treat warnings as a failure for the exit status.
    #[serde(default)]
    fail_on_warnings: bool,
}

impl OutputConfig {
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn fail_on_warnings(&self) -> bool {
        self.fail_on_warnings
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (cfn-xref/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<CliConfig, CfnXrefError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("cfn-xref/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "cfn-xref", "cfn-xref") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(CliConfig::default())
}

/// Load configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<CliConfig, CfnXrefError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content =
        fs::read_to_string(path).map_err(|err| CfnXrefError::new_io_error(path, err))?;

    toml::from_str(&content).map_err(|err| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_load_explicit_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[check]\nrecurse = true\nknown_names = [\"Injected\"]\n\n[output]\nformat = \"short\"\n",
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert!(config.check().recurse());
        assert_eq!(config.check().known_names(), ["Injected".to_string()]);
        assert!(config.check().skip_remote_templates());
        assert_eq!(config.output().format(), OutputFormat::Short);
        assert!(!config.output().fail_on_warnings());
    }

    #[test]
    fn test_missing_explicit_config() {
        let dir = tempdir().unwrap();
        let err = load_config(Some(dir.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("Missing configuration file"));
    }

    #[test]
    fn test_invalid_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[output]\nformat = \"fancy\"\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML configuration"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config.output().format(), OutputFormat::Pretty);
        assert!(!config.check().recurse());
    }
}
