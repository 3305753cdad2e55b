#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;

use dockwright_core::{DeployConfig, Layout};
use dockwright_runner::{ToolCommand, ToolError, ToolExecutor};
use mockall::mock;
use tempfile::TempDir;

mock! {
    pub Executor {}

    impl ToolExecutor for Executor {
        fn locate(&self, program: &str) -> Result<PathBuf, ToolError>;
        async fn exec(&self, command: &ToolCommand) -> Result<String, ToolError>;
        async fn exec_streaming(&self, command: &ToolCommand) -> Result<(), ToolError>;
        async fn exec_with_stdin(
            &self,
            command: &ToolCommand,
            stdin_data: &[u8],
        ) -> Result<String, ToolError>;
    }
}

/// An executor that fails the test on any call.
pub fn silent_executor() -> MockExecutor {
    let mut mock = MockExecutor::new();
    mock.expect_locate().never();
    mock.expect_exec().never();
    mock.expect_exec_streaming().never();
    mock.expect_exec_with_stdin().never();
    mock
}

pub fn failed(command: &ToolCommand) -> ToolError {
    ToolError::CommandFailed {
        command: command.clone(),
        stderr: "exit code: exit status: 1".to_owned(),
    }
}

pub const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: kind-dev
contexts:
  - name: kind-dev
    context:
      cluster: kind-dev
  - name: prod-eu
    context:
      cluster: prod-eu
"#;

/// A service directory and a chart store, both temporary.
pub struct Project {
    pub dir: TempDir,
    pub charts: TempDir,
    pub layout: Layout,
}

impl Project {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let charts = TempDir::new().unwrap();
        std::fs::create_dir_all(charts.path().join("stateless")).unwrap();
        std::fs::create_dir_all(charts.path().join("stateful")).unwrap();
        std::fs::create_dir_all(dir.path().join(".dockwright/helm")).unwrap();
        std::fs::write(dir.path().join("kubeconfig"), KUBECONFIG).unwrap();
        let layout = Layout::new(dir.path()).with_chart_root(charts.path());
        Self { dir, charts, layout }
    }

    pub fn with_dockerfile(self) -> Self {
        std::fs::write(self.dir.path().join("Dockerfile"), "FROM scratch\n").unwrap();
        self
    }

    pub fn with_values(self, name: &str) -> Self {
        std::fs::write(
            self.dir.path().join(".dockwright/helm").join(name),
            "replicaCount: 1\n",
        )
        .unwrap();
        self
    }

    pub fn with_config(self, yaml: &str) -> Self {
        std::fs::write(self.dir.path().join(".dockwright/config.yaml"), yaml).unwrap();
        self
    }

    pub fn kubeconfig(&self) -> PathBuf {
        self.dir.path().join("kubeconfig")
    }

    pub fn chart(&self, flavour: &str) -> PathBuf {
        self.charts.path().join(flavour)
    }

    pub fn values(&self, name: &str) -> PathBuf {
        self.layout.values_dir().join(name)
    }

    /// A configuration that passes every check.
    pub fn config(&self) -> DeployConfig {
        DeployConfig {
            artifact_name: "orders".to_owned(),
            helm_flavour: "stateless".to_owned(),
            docker_namespace: "acme".to_owned(),
            docker_host: "registry.example.com".to_owned(),
            kubernetes_config: self.kubeconfig().display().to_string(),
            kubernetes_context: "kind-dev".to_owned(),
            env: Vec::new(),
            dry_run: false,
            run_docker_build: true,
            auto_approve: false,
        }
    }
}

pub fn credentials() -> HashMap<String, String> {
    HashMap::from([
        ("REGISTRY_USERNAME".to_owned(), "ci-bot".to_owned()),
        ("REGISTRY_PASSWORD".to_owned(), "hunter2".to_owned()),
    ])
}

pub fn path_arg(path: &std::path::Path) -> String {
    path.display().to_string()
}
