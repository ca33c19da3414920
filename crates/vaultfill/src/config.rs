//! Settings file handling
//!
//! Settings live in `~/.config/vaultfill/config.toml` unless `--config` points
//! elsewhere. Every key is optional; command line flags and `VAULT_EXE` take
//! precedence over the file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::format::Format;

/// Input path used when neither the CLI nor the settings file name one
pub const DEFAULT_INPUT: &str = "./gateway/automate/gw-ssl-vault.yaml";

/// Output path used when neither the CLI nor the settings file name one
pub const DEFAULT_OUTPUT: &str = "kong-config-resolved.yaml";

/// Contents of the settings file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Path to the `vault` executable (`~` is expanded)
    pub vault_exe: Option<String>,

    /// Document to resolve
    pub input: Option<PathBuf>,

    /// Where to write the resolved document (`-` for stdout)
    pub output: Option<PathBuf>,

    /// Output format, overriding the output file extension
    pub output_format: Option<Format>,
}

impl Settings {
    /// Get the default config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vaultfill")
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load settings from a specific path
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file '{}'", path.display()))?;
        let settings: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid settings file '{}'", path.display()))?;
        Ok(settings)
    }

    /// Load settings from `path`, or from the default location when `None`.
    ///
    /// A missing default file yields empty settings; an explicitly named file
    /// must exist.
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load(&path)
                } else {
                    tracing::debug!("No settings file at {:?}", path);
                    Ok(Self::default())
                }
            }
        }
    }

    /// The configured vault executable with `~` and `$VAR` expanded
    pub fn vault_exe_expanded(&self) -> anyhow::Result<Option<PathBuf>> {
        self.vault_exe
            .as_deref()
            .map(expand_path)
            .transpose()
    }
}

/// Expand `~` and environment variables in a path setting
pub fn expand_path(raw: &str) -> anyhow::Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .with_context(|| format!("Failed to expand path '{}'", raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
