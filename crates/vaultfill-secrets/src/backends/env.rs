//! Process environment backend

use crate::backends::Environment;

/// The environment of the current process
///
/// Unset variables and values that are not valid UTF-8 both read as absent.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}
