//! Pre-deployment checks.
//!
//! Checks run in a fixed order and stop at the first failure, so the same
//! broken setup always reports the same problem.

use std::fmt;
use std::path::{Path, PathBuf};

use dockwright_core::env::{REGISTRY_PASSWORD, REGISTRY_USERNAME};
use dockwright_core::{InvalidFlavour, KubeConfig, KubeConfigError, fields};

use crate::context::RunContext;
use crate::executor::ToolExecutor;
use crate::tool::{DOCKER, HELM, ToolCommand, ToolError};

/// One named precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Configuration,
    HelmFlavour,
    EnvironmentVariables,
    ValuesFiles,
    KubernetesContext,
    SystemTools,
}

impl Check {
    /// Execution order.
    pub const ALL: [Check; 6] = [
        Check::Configuration,
        Check::HelmFlavour,
        Check::EnvironmentVariables,
        Check::ValuesFiles,
        Check::KubernetesContext,
        Check::SystemTools,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Check::Configuration => "Configuration",
            Check::HelmFlavour => "Helm flavour",
            Check::EnvironmentVariables => "Environment variables",
            Check::ValuesFiles => "Environment values files",
            Check::KubernetesContext => "Kubernetes context",
            Check::SystemTools => "System tools",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Check::Configuration => "✅",
            Check::HelmFlavour => "⎈ ",
            Check::EnvironmentVariables => "🔐",
            Check::ValuesFiles => "📄",
            Check::KubernetesContext => "☸️ ",
            Check::SystemTools => "🛠️ ",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug)]
pub struct ValidationResult {
    pub check: Check,
    /// Success line; only shown for checks that passed.
    pub message: String,
    pub error: Option<ValidationError>,
}

impl ValidationResult {
    fn new(check: Check, error: Option<ValidationError>) -> Self {
        Self {
            check,
            message: format!("{} Validated - {}", check.icon(), check.name()),
            error,
        }
    }

    pub fn name(&self) -> &'static str {
        self.check.name()
    }

    pub fn icon(&self) -> &'static str {
        self.check.icon()
    }

    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// Ordered results; at most the last entry carries an error.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub results: Vec<ValidationResult>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.results.iter().all(ValidationResult::passed)
    }

    pub fn first_error(&self) -> Option<&ValidationResult> {
        self.results.iter().find(|r| !r.passed())
    }

    /// Split into the passed results or the first failure.
    pub fn into_result(mut self) -> Result<Vec<ValidationResult>, ValidationError> {
        match self.results.iter_mut().find_map(|r| r.error.take()) {
            Some(error) => Err(error),
            None => Ok(self.results),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("configuration error: required field '{field}' (flag: --{flag}) is not set")]
    MissingField {
        field: &'static str,
        flag: &'static str,
    },

    #[error(transparent)]
    InvalidFlavour(#[from] InvalidFlavour),

    #[error(
        "required environment variable '{0}' is not set. Please export {0} before running dockwright"
    )]
    MissingEnvVar(&'static str),

    #[error(
        "environment values file not found at path: {}. Please ensure the file exists in the .dockwright/helm directory",
        path.display()
    )]
    ValuesFileMissing { path: PathBuf },

    #[error(transparent)]
    KubeConfig(#[from] KubeConfigError),

    #[error(
        "kubernetes context '{context}' not found in kubeconfig at '{}'. Use 'kubectl config get-contexts' to see available contexts",
        path.display()
    )]
    ContextNotFound { context: String, path: PathBuf },

    #[error(
        "required tool '{tool}' is not installed or not found in PATH. Please install {tool} to proceed"
    )]
    ToolMissing {
        tool: &'static str,
        source: ToolError,
    },

    #[error(
        "docker daemon is not running. Please start Docker Desktop or the Docker daemon and try again"
    )]
    DaemonNotRunning { source: ToolError },
}

/// Runs every [`Check`] against a resolved configuration.
pub struct Validator<'a, E: ToolExecutor> {
    ctx: RunContext<'a>,
    executor: &'a E,
}

impl<'a, E: ToolExecutor> Validator<'a, E> {
    pub fn new(ctx: RunContext<'a>, executor: &'a E) -> Self {
        Self { ctx, executor }
    }

    pub async fn validate_all(&self) -> ValidationReport {
        let mut report = ValidationReport::default();
        for check in Check::ALL {
            match self.run(check).await {
                Ok(()) => report.results.push(ValidationResult::new(check, None)),
                Err(e) => {
                    report.results.push(ValidationResult::new(check, Some(e)));
                    break;
                }
            }
        }
        report
    }

    pub async fn run(&self, check: Check) -> Result<(), ValidationError> {
        match check {
            Check::Configuration => self.required_fields(),
            Check::HelmFlavour => self.helm_flavour(),
            Check::EnvironmentVariables => self.registry_credentials(),
            Check::ValuesFiles => self.values_files(),
            Check::KubernetesContext => self.kube_context(),
            Check::SystemTools => self.system_tools().await,
        }
    }

    fn required_fields(&self) -> Result<(), ValidationError> {
        for field in fields().iter().filter(|f| f.required) {
            match self.ctx.config.field_value(field.name) {
                Some(value) if value.is_set() => {}
                _ => {
                    return Err(ValidationError::MissingField {
                        field: field.name,
                        flag: field.flag,
                    });
                }
            }
        }
        Ok(())
    }

    fn helm_flavour(&self) -> Result<(), ValidationError> {
        self.ctx.config.flavour()?;
        Ok(())
    }

    fn registry_credentials(&self) -> Result<(), ValidationError> {
        for var in [REGISTRY_USERNAME, REGISTRY_PASSWORD] {
            if self.ctx.env.var(var).is_none() {
                return Err(ValidationError::MissingEnvVar(var));
            }
        }
        Ok(())
    }

    fn values_files(&self) -> Result<(), ValidationError> {
        for env in &self.ctx.config.env {
            let path = self.ctx.layout.env_values_file(env);
            if !path.exists() {
                return Err(ValidationError::ValuesFileMissing { path });
            }
        }
        Ok(())
    }

    fn kube_context(&self) -> Result<(), ValidationError> {
        let context = &self.ctx.config.kubernetes_context;
        if context.is_empty() {
            return Ok(());
        }

        let path = Path::new(&self.ctx.config.kubernetes_config);
        let kubeconfig = KubeConfig::load(path)?;
        if kubeconfig.has_context(context) {
            Ok(())
        } else {
            Err(ValidationError::ContextNotFound {
                context: context.clone(),
                path: path.to_path_buf(),
            })
        }
    }

    async fn system_tools(&self) -> Result<(), ValidationError> {
        for tool in [DOCKER, HELM] {
            self.executor
                .locate(tool)
                .map_err(|e| ValidationError::ToolMissing { tool, source: e })?;
        }

        self.executor
            .exec(&ToolCommand::new(DOCKER, ["info"]))
            .await
            .map_err(|e| ValidationError::DaemonNotRunning { source: e })?;

        Ok(())
    }
}
