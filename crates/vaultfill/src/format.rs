//! Document reading and writing

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use vaultfill_secrets::{Node, Scalar};

/// Serialization format of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Yaml,
    Json,
    Toml,
}

impl Format {
    /// Pick a format from a file extension, defaulting to YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Format::Json,
            Some("toml") => Format::Toml,
            _ => Format::Yaml,
        }
    }

    /// Parse a document
    pub fn parse(self, content: &str) -> Result<Node> {
        let node = match self {
            Format::Yaml => from_yaml(serde_yaml::from_str(content)?)?,
            Format::Json => serde_json::from_str(content)?,
            Format::Toml => from_toml_table(toml::from_str(content)?),
        };
        Ok(node)
    }

    /// Render a document
    pub fn render(self, node: &Node) -> Result<String> {
        let mut out = match self {
            Format::Yaml => serde_yaml::to_string(node)?,
            Format::Json => serde_json::to_string_pretty(node)?,
            Format::Toml => toml::to_string_pretty(node)?,
        };
        if !out.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }
}

fn from_yaml(value: serde_yaml::Value) -> Result<Node> {
    use serde_yaml::Value;

    let node = match value {
        Value::Null => Scalar::Null.into(),
        Value::Bool(b) => Scalar::Bool(b).into(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Scalar::Int(i).into()
            } else if let Some(u) = n.as_u64() {
                Scalar::UInt(u).into()
            } else {
                Scalar::Float(n.as_f64().unwrap_or(f64::NAN)).into()
            }
        }
        Value::String(s) => Node::string(s),
        Value::Sequence(items) => {
            Node::Sequence(items.into_iter().map(from_yaml).collect::<Result<_>>()?)
        }
        Value::Mapping(entries) => {
            let mut mapping = indexmap::IndexMap::with_capacity(entries.len());
            for (key, value) in entries {
                let Value::String(key) = key else {
                    bail!("mapping keys must be strings, found key {}", yaml_key_text(&key));
                };
                mapping.insert(key, from_yaml(value)?);
            }
            Node::Mapping(mapping)
        }
        // Tags carry no meaning for resolution
        Value::Tagged(tagged) => from_yaml(tagged.value)?,
    };
    Ok(node)
}

fn yaml_key_text(key: &serde_yaml::Value) -> String {
    serde_yaml::to_string(key)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_else(|_| format!("{:?}", key))
}

fn from_toml_table(table: toml::Table) -> Node {
    table.into_iter().map(|(k, v)| (k, from_toml(v))).collect()
}

fn from_toml(value: toml::Value) -> Node {
    use toml::Value;

    match value {
        Value::String(s) => Node::string(s),
        Value::Integer(i) => Scalar::Int(i).into(),
        Value::Float(f) => Scalar::Float(f).into(),
        Value::Boolean(b) => Scalar::Bool(b).into(),
        Value::Datetime(dt) => Node::string(dt.to_string()),
        Value::Array(items) => Node::Sequence(items.into_iter().map(from_toml).collect()),
        Value::Table(table) => from_toml_table(table),
    }
}

/// Read and parse the document at `path`
pub fn read_document(path: &Path) -> Result<Node> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;

    Format::from_path(path)
        .parse(&content)
        .with_context(|| format!("Failed to parse '{}'", path.display()))
}

/// Render `node` and write it to `path` (`-` writes to stdout)
pub fn write_document(node: &Node, path: &Path, format: Format) -> Result<()> {
    let rendered = format
        .render(node)
        .with_context(|| format!("Failed to render document as {:?}", format))?;

    if path == Path::new("-") {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(rendered.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create '{}'", parent.display()))?;
    }

    std::fs::write(path, rendered).with_context(|| format!("Failed to write '{}'", path.display()))
}
