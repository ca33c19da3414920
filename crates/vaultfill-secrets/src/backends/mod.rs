//! Lookup capabilities the resolver depends on, and their implementations

use crate::error::SecretError;

#[cfg(feature = "env")]
pub mod env;

#[cfg(feature = "vault")]
pub mod vault;

/// Fetches a single field from a secret collection
///
/// `Ok(None)` means the collection was read but has no such field. Any other
/// failure (transport, auth, unknown path) is an `Err`.
pub trait SecretStore {
    fn fetch(&self, store_path: &str, field: &str) -> Result<Option<String>, SecretError>;
}

impl<F> SecretStore for F
where
    F: Fn(&str, &str) -> Result<Option<String>, SecretError>,
{
    fn fetch(&self, store_path: &str, field: &str) -> Result<Option<String>, SecretError> {
        self(store_path, field)
    }
}

/// Read access to process-scoped variables
pub trait Environment {
    fn var(&self, name: &str) -> Option<String>;
}

impl<F> Environment for F
where
    F: Fn(&str) -> Option<String>,
{
    fn var(&self, name: &str) -> Option<String> {
        self(name)
    }
}
