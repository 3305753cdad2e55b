//! Access to process environment variables.
//!
//! Everything that reads the environment (default providers, credential
//! checks, `docker login`) goes through [`EnvSource`] so tests can supply a
//! fixed map instead of mutating the process environment.

use std::collections::HashMap;

/// Registry host used as the default for `--docker-host`.
pub const REGISTRY_HOST: &str = "REGISTRY_HOST";
/// Registry user passed to `docker login -u`.
pub const REGISTRY_USERNAME: &str = "REGISTRY_USERNAME";
/// Registry password written to `docker login --password-stdin`.
pub const REGISTRY_PASSWORD: &str = "REGISTRY_PASSWORD";
/// Overrides the chart install root.
pub const CHART_ROOT: &str = "DOCKWRIGHT_CHART_ROOT";

/// Source of environment variables.
///
/// Implementations return `None` for unset *and* empty variables, so callers
/// only need a single presence check.
pub trait EnvSource: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        match std::env::var(key) {
            Ok(value) if !value.is_empty() => Some(value),
            Ok(_) | Err(std::env::VarError::NotPresent) => None,
            Err(e) => {
                tracing::warn!(key, error = %e, "ignoring environment variable");
                None
            }
        }
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty()).cloned()
    }
}
