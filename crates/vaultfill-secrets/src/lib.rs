//! Secret and environment reference resolution for structured config documents
//!
//! This crate walks a configuration document and replaces string leaves that
//! look like references with the values they point at:
//!
//! - **Secret store paths** (`kong/certs/gateway/tls_cert`): the last segment is
//!   the field, everything before it the secret path. PEM keys and certificates
//!   are flattened to a single line with `\n` escapes.
//! - **Environment variables** (`$KONG_ADMIN_PORT`): the value is coerced to a
//!   bool or integer when it reads as one.
//! - **Literals**: anything else is left as-is.
//!
//! A reference that cannot be resolved keeps its original text. Failed secret
//! lookups are reported in the [`Resolution`] instead of aborting the run.
//!
//! # Example
//!
//! ```rust,ignore
//! use vaultfill_secrets::{resolve, Node, ProcessEnv, VaultCli};
//!
//! let document: Node = serde_yaml::from_str(&content)?;
//! let vault = VaultCli::new("/usr/local/bin/vault");
//! let resolution = resolve(&document, &vault, &ProcessEnv);
//! ```
//!
//! # Features
//!
//! - `vault` (default): Enable the Vault CLI backend
//! - `env` (default): Enable the process environment backend

mod backends;
mod document;
mod error;
mod reference;
mod resolver;

pub use backends::{Environment, SecretStore};
pub use document::{Node, Scalar};
pub use error::SecretError;
pub use reference::{Reference, ENV_SIGIL};
pub use resolver::{coerce, encode_pem, is_pem, resolve, LookupFailure, Resolution, Resolver};

#[cfg(feature = "env")]
pub use backends::env::ProcessEnv;

#[cfg(feature = "vault")]
pub use backends::vault::VaultCli;
