//! Mock Vault CLI for E2E tests
//!
//! Writes a small shell script that answers `vault kv get -format=json <path>`
//! from JSON files in a temp directory, the way the real CLI answers for a
//! KV v2 mount. Every invocation is appended to a call log for assertions.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use serde_json::{json, Map, Value};
use tempfile::TempDir;

const SCRIPT: &str = r#"#!/bin/sh
dir="$(dirname "$0")"
echo "$*" >> "$dir/calls.log"
if [ "$1" != "kv" ] || [ "$2" != "get" ] || [ "$3" != "-format=json" ]; then
  echo "Usage: vault kv get -format=json <path>" >&2
  exit 1
fi
key="$(printf '%s' "$4" | sed 's#/#__#g')"
if [ -f "$dir/errors/$key" ]; then
  cat "$dir/errors/$key" >&2
  exit 2
fi
if [ -f "$dir/data/$key.json" ]; then
  cat "$dir/data/$key.json"
  exit 0
fi
echo "No value found at secret/data/$4" >&2
exit 2
"#;

/// A fake `vault` executable backed by files in a temp directory
pub struct MockVault {
    dir: TempDir,
    secrets: BTreeMap<String, Map<String, Value>>,
}

impl MockVault {
    /// Install the mock executable in a fresh temp directory
    pub fn start() -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("data"))?;
        fs::create_dir(dir.path().join("errors"))?;

        let exe = dir.path().join("vault");
        fs::write(&exe, SCRIPT)?;
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755))?;

        tracing::debug!(exe = %exe.display(), "Mock vault installed");

        Ok(Self {
            dir,
            secrets: BTreeMap::new(),
        })
    }

    /// Path of the mock executable
    pub fn exe(&self) -> PathBuf {
        self.dir.path().join("vault")
    }

    /// Store `field = value` at `path`
    pub fn set_secret(&mut self, path: &str, field: &str, value: impl Into<Value>) -> io::Result<()> {
        let fields = self.secrets.entry(path.to_string()).or_default();
        fields.insert(field.to_string(), value.into());

        let response = json!({
            "request_id": "00000000-0000-0000-0000-000000000000",
            "data": {
                "data": fields,
                "metadata": {"version": 1}
            }
        });
        fs::write(
            self.data_dir().join(format!("{}.json", file_key(path))),
            serde_json::to_vec_pretty(&response)?,
        )
    }

    /// Make reads of `path` fail with `stderr` and a non-zero exit status
    pub fn fail_path(&self, path: &str, stderr: &str) -> io::Result<()> {
        fs::write(self.dir.path().join("errors").join(file_key(path)), stderr)
    }

    /// Arguments of every invocation so far, one string per call
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("calls.log"))
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }
}

fn file_key(path: &str) -> String {
    path.replace('/', "__")
}
