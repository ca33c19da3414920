use std::convert::Infallible;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

/// Sigil that marks an environment variable reference
pub const ENV_SIGIL: char = '$';

/// Classification of a string leaf found in a document.
///
/// Recognized forms, checked in this order:
/// - `path/to/secret/field` - secret store reference (last segment is the field)
/// - `$VAR_NAME` - environment variable
/// - anything else - literal, left untouched
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    /// Secret store: `store/path/field`
    Secret { store_path: String, field: String },

    /// Environment variable: `$VAR_NAME`
    Env { var_name: String },

    /// Literal text
    Literal(String),
}

fn secret_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?P<path>[\w\-/]+)/(?P<field>[\w\-]+)$").expect("secret path pattern is valid")
    })
}

impl Reference {
    /// Classify a string leaf
    pub fn classify(s: &str) -> Self {
        if let Some(caps) = secret_path_pattern().captures(s) {
            return Reference::Secret {
                store_path: caps["path"].to_string(),
                field: caps["field"].to_string(),
            };
        }

        if let Some(var_name) = s.strip_prefix(ENV_SIGIL) {
            return Reference::Env {
                var_name: var_name.to_string(),
            };
        }

        Reference::Literal(s.to_string())
    }

    /// Get the reference kind for logging
    pub fn kind_name(&self) -> &'static str {
        match self {
            Reference::Secret { .. } => "secret",
            Reference::Env { .. } => "env",
            Reference::Literal(_) => "literal",
        }
    }
}

impl FromStr for Reference {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Reference::classify(s))
    }
}
