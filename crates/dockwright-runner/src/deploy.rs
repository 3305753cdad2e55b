use std::path::{Path, PathBuf};

use crate::context::RunContext;
use crate::executor::ToolExecutor;
use crate::tool::{HELM, ToolCommand, ToolError};

const DRY_RUN_FLAG: &str = "--dry-run";

/// Everything the deploy step will do, computed without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    pub chart_path: PathBuf,
    pub values_files: Vec<PathBuf>,
    /// `helm upgrade --install ...` without the dry-run marker.
    pub command: ToolCommand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    /// The command that ran, or would have run (with `--dry-run`).
    pub command: ToolCommand,
    pub simulated: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error(
        "helm chart not found at path: {}. Please ensure the chart directory exists",
        path.display()
    )]
    ChartNotFound { path: PathBuf },

    #[error(
        "environment values file not found at path: {}. Please ensure the file exists",
        path.display()
    )]
    ValuesFileMissing { path: PathBuf },

    #[error("path is not valid UTF-8: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("cannot derive image repository")]
    Reference(#[from] dockwright_core::Error),

    #[error("helm deployment failed")]
    Helm { source: ToolError },
}

/// Installs or upgrades the release with `helm upgrade --install`.
pub struct DeployWorkflow<'a, E: ToolExecutor> {
    ctx: RunContext<'a>,
    executor: &'a E,
}

impl<'a, E: ToolExecutor> DeployWorkflow<'a, E> {
    pub fn new(ctx: RunContext<'a>, executor: &'a E) -> Self {
        Self { ctx, executor }
    }

    pub async fn run(&self) -> Result<DeployOutcome, DeployError> {
        let plan = self.plan()?;
        let artifact = &self.ctx.config.artifact_name;

        if self.ctx.dry_run() {
            let command = plan.command.arg(DRY_RUN_FLAG);
            tracing::info!("   🧪 [DRY-RUN] Would run: {HELM}");
            log_args(&command.args);
            return Ok(DeployOutcome {
                command,
                simulated: true,
            });
        }

        tracing::info!("🚀 Executing Helm deployment for artifact: {artifact}");
        tracing::info!("   Kubeconfig: {}", self.ctx.config.kubernetes_config);
        if !self.ctx.config.kubernetes_context.is_empty() {
            tracing::info!("   Context: {}", self.ctx.config.kubernetes_context);
        }
        tracing::info!("   Running: {HELM}");
        log_args(&plan.command.args);

        self.executor
            .exec_streaming(&plan.command)
            .await
            .map_err(|e| DeployError::Helm { source: e })?;

        tracing::info!("✓  Successfully deployed {artifact} with Helm");
        Ok(DeployOutcome {
            command: plan.command,
            simulated: false,
        })
    }

    /// Resolve the chart, collect values files and build the argument vector.
    pub fn plan(&self) -> Result<DeployPlan, DeployError> {
        let chart_path = self.chart_path()?;
        let values_files = self.collect_values_files()?;

        let config = self.ctx.config;
        let mut command = ToolCommand::new(
            HELM,
            [
                "upgrade",
                "--install",
                config.artifact_name.as_str(),
                path_str(&chart_path)?,
                "--kubeconfig",
                config.kubernetes_config.as_str(),
            ],
        );

        if !config.kubernetes_context.is_empty() {
            command = command
                .arg("--kube-context")
                .arg(config.kubernetes_context.as_str());
        }

        for file in &values_files {
            command = command.arg("--values").arg(path_str(file)?);
        }

        // Last, so they override anything in the values files.
        command.args.extend(self.image_overrides()?);

        Ok(DeployPlan {
            chart_path,
            values_files,
            command,
        })
    }

    pub fn chart_path(&self) -> Result<PathBuf, DeployError> {
        let path = self.ctx.config.chart_path(self.ctx.layout);
        if !path.exists() {
            return Err(DeployError::ChartNotFound { path });
        }
        tracing::info!("✅ Helm chart found at: {}", path.display());
        Ok(path)
    }

    /// Optional base values file, then one file per environment in order.
    pub fn collect_values_files(&self) -> Result<Vec<PathBuf>, DeployError> {
        let layout = self.ctx.layout;
        let mut files = Vec::with_capacity(self.ctx.config.env.len() + 1);

        let base = layout.base_values_file();
        if base.exists() {
            tracing::info!("📄 Found base values file: {}", base.display());
            files.push(base);
        }

        for env in &self.ctx.config.env {
            let path = layout.env_values_file(env);
            if !path.exists() {
                return Err(DeployError::ValuesFileMissing { path });
            }
            tracing::info!("📄 Found environment values file: {}", path.display());
            files.push(path);
        }

        tracing::info!("✅ Collected {} values file(s) for deployment", files.len());
        Ok(files)
    }

    /// `--set image.repository=... --set image.tag=latest` when the image
    /// workflow builds and pushes; empty otherwise.
    pub fn image_overrides(&self) -> Result<Vec<String>, DeployError> {
        if !self.ctx.should_build_image() {
            return Ok(Vec::new());
        }

        let repository = self.ctx.config.image_repository()?;
        tracing::info!("💉 Injecting image configuration into Helm deployment");
        tracing::info!("   Repository: {repository}");
        tracing::info!("   Tag: latest");

        Ok(vec![
            "--set".to_owned(),
            format!("image.repository={repository}"),
            "--set".to_owned(),
            "image.tag=latest".to_owned(),
        ])
    }
}

fn path_str(path: &Path) -> Result<&str, DeployError> {
    path.to_str()
        .ok_or_else(|| DeployError::InvalidPath(path.to_path_buf()))
}

/// Log arguments one per line, pairing each `--flag` with its value.
fn log_args(args: &[String]) {
    tracing::info!("   Arguments:");
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        match iter.peek() {
            Some(value) if arg.starts_with("--") && !value.starts_with("--") => {
                tracing::info!("     {arg} = {value}");
                iter.next();
            }
            _ => tracing::info!("     {arg}"),
        }
    }
}
