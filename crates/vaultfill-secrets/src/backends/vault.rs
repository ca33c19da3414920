//! HashiCorp Vault CLI backend
//!
//! Uses the `vault` CLI tool to read KV v2 secrets:
//! `vault kv get -format=json <path>`.
//! Requires the CLI to be installed and authenticated (`VAULT_ADDR`,
//! `VAULT_TOKEN` etc. are inherited from the calling process).
//!
//! See: https://developer.hashicorp.com/vault/docs/commands/kv/get

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde_json::Value;

use crate::backends::SecretStore;
use crate::error::SecretError;

/// Reads secrets by shelling out to the Vault CLI
#[derive(Debug, Clone)]
pub struct VaultCli {
    exe: PathBuf,
}

impl VaultCli {
    /// Create a backend that runs the given `vault` executable
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }

    /// Path of the executable this backend runs
    pub fn exe(&self) -> &Path {
        &self.exe
    }

    /// Read every field stored at `path`
    pub fn read(&self, path: &str) -> Result<serde_json::Map<String, Value>, SecretError> {
        tracing::debug!(path, exe = %self.exe.display(), "Reading secret from Vault");

        let output = Command::new(&self.exe)
            .args(["kv", "get", "-format=json", path])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SecretError::backend(
                        "vault",
                        format!(
                            "Vault CLI ('{}') not found. Set VAULT_EXE to the vault binary",
                            self.exe.display()
                        ),
                    )
                } else {
                    SecretError::backend("vault", format!("Failed to execute Vault CLI: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let error_msg = stderr.trim();

            if error_msg.contains("No value found at") {
                return Err(SecretError::NotFound(format!("Vault path '{}'", path)));
            }

            if error_msg.contains("permission denied") || error_msg.contains("missing client token")
            {
                return Err(SecretError::backend(
                    "vault",
                    format!("Access to '{}' denied. Run 'vault login' or set VAULT_TOKEN", path),
                ));
            }

            return Err(SecretError::backend(
                "vault",
                format!("Vault CLI command failed: {}", error_msg),
            ));
        }

        parse_kv_response(path, &output.stdout)
    }
}

impl SecretStore for VaultCli {
    fn fetch(&self, store_path: &str, field: &str) -> Result<Option<String>, SecretError> {
        let secrets = self.read(store_path)?;
        Ok(secrets.get(field).and_then(field_text))
    }
}

/// Extract the `data.data` map of a KV v2 response
///
/// A response without `data.data` is treated as an empty collection.
fn parse_kv_response(path: &str, stdout: &[u8]) -> Result<serde_json::Map<String, Value>, SecretError> {
    let response: Value = serde_json::from_slice(stdout)
        .map_err(|e| SecretError::invalid_response(path, format!("not JSON: {}", e)))?;

    match response.get("data").and_then(|d| d.get("data")) {
        None | Some(Value::Null) => Ok(serde_json::Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(SecretError::invalid_response(
            path,
            format!("expected an object under data.data, got {}", other),
        )),
    }
}

/// Text of a field value; JSON null counts as absent
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
