use std::path::{Path, PathBuf};

use crate::env::{CHART_ROOT, EnvSource};

/// Where `dockwright install` places the chart flavours.
pub const DEFAULT_CHART_ROOT: &str = "/usr/local/share/dockwright/charts";

const PROJECT_DIR: &str = ".dockwright";
const CONFIG_FILE: &str = "config.yaml";
const HELM_DIR: &str = "helm";
const BASE_VALUES_FILE: &str = "values.yaml";
const VALUES_SUFFIX: &str = ".values.yaml";
const DOCKERFILE: &str = "Dockerfile";

/// Filesystem locations for one run: the service directory being deployed
/// and the read-only chart store.
///
/// ```text
/// <project>/
///   Dockerfile                      (optional, enables the image workflow)
///   .dockwright/
///     config.yaml                   (optional)
///     helm/
///       values.yaml                 (optional base values)
///       <env>.values.yaml           (one per requested environment)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    project_dir: PathBuf,
    chart_root: PathBuf,
}

impl Layout {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            chart_root: PathBuf::from(DEFAULT_CHART_ROOT),
        }
    }

    /// Layout for `project_dir`, honouring `DOCKWRIGHT_CHART_ROOT`.
    pub fn from_env(project_dir: impl Into<PathBuf>, env: &dyn EnvSource) -> Self {
        let layout = Self::new(project_dir);
        match env.var(CHART_ROOT) {
            Some(root) => layout.with_chart_root(root),
            None => layout,
        }
    }

    pub fn with_chart_root(mut self, chart_root: impl Into<PathBuf>) -> Self {
        self.chart_root = chart_root.into();
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn chart_root(&self) -> &Path {
        &self.chart_root
    }

    pub fn config_file(&self) -> PathBuf {
        self.project_dir.join(PROJECT_DIR).join(CONFIG_FILE)
    }

    pub fn values_dir(&self) -> PathBuf {
        self.project_dir.join(PROJECT_DIR).join(HELM_DIR)
    }

    pub fn base_values_file(&self) -> PathBuf {
        self.values_dir().join(BASE_VALUES_FILE)
    }

    pub fn env_values_file(&self, env: &str) -> PathBuf {
        self.values_dir().join(format!("{env}{VALUES_SUFFIX}"))
    }

    pub fn dockerfile(&self) -> PathBuf {
        self.project_dir.join(DOCKERFILE)
    }

    pub fn has_dockerfile(&self) -> bool {
        self.dockerfile().exists()
    }

    pub fn chart_path(&self, flavour: &str) -> PathBuf {
        self.chart_root.join(flavour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn values_files_live_under_dockwright_helm() {
        let layout = Layout::new("/srv/api");
        assert_eq!(
            layout.env_values_file("staging"),
            PathBuf::from("/srv/api/.dockwright/helm/staging.values.yaml")
        );
        assert_eq!(
            layout.base_values_file(),
            PathBuf::from("/srv/api/.dockwright/helm/values.yaml")
        );
        assert_eq!(
            layout.config_file(),
            PathBuf::from("/srv/api/.dockwright/config.yaml")
        );
    }

    #[test]
    fn chart_root_env_override() {
        let env = HashMap::from([(CHART_ROOT.to_owned(), "/opt/charts".to_owned())]);
        let layout = Layout::from_env(".", &env);
        assert_eq!(layout.chart_path("stateful"), PathBuf::from("/opt/charts/stateful"));

        let layout = Layout::from_env(".", &HashMap::<String, String>::new());
        assert_eq!(layout.chart_root(), Path::new(DEFAULT_CHART_ROOT));
    }

    #[test]
    fn any_dockerfile_entry_counts() {
        let tmp = tempfile::TempDir::new().unwrap();
        let layout = Layout::new(tmp.path());
        assert!(!layout.has_dockerfile());

        // A symlinked or generated Dockerfile may not be a regular file.
        std::fs::create_dir(layout.dockerfile()).unwrap();
        assert!(layout.has_dockerfile());
    }
}
