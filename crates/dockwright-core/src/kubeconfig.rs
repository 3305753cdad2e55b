//! Minimal kubeconfig reader: only the context names and the current
//! context are needed.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

#[derive(Debug, Default, Deserialize)]
pub struct KubeConfig {
    #[serde(rename = "current-context", default)]
    pub current_context: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contexts: Vec<NamedContext>,
}

#[derive(Debug, Deserialize)]
pub struct NamedContext {
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum KubeConfigError {
    #[error("failed to read kubeconfig file at path '{}'", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(
        "failed to parse kubeconfig file at '{}'; the file may be corrupted or not in valid YAML format",
        path.display()
    )]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

impl KubeConfig {
    pub fn load(path: &Path) -> Result<Self, KubeConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| KubeConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content).map_err(|e| KubeConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to a struct.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn has_context(&self, name: &str) -> bool {
        self.contexts.iter().any(|c| c.name == name)
    }
}

/// kubectl writes `contexts: null` once the last context is deleted.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// `$HOME/.kube/config`, or `None` when no home directory is known.
pub fn default_path(home_dir: Option<&Path>) -> Option<PathBuf> {
    home_dir.map(|home| home.join(".kube").join("config"))
}
