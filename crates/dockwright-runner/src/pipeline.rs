//! Fixed-order driver: configure, confirm, validate, image, deploy.

use std::io::{self, BufRead, StdinLock, Stdout, Write};
use std::path::PathBuf;

use dockwright_core::{CliInput, ConfigFile, DeployConfig, EnvSource, Host, Layout, resolve};

use crate::context::RunContext;
use crate::deploy::{DeployError, DeployOutcome, DeployWorkflow};
use crate::executor::ToolExecutor;
use crate::image::{ImageError, ImageOutcome, ImageWorkflow};
use crate::validate::{ValidationError, ValidationResult, Validator};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const CONFIRM_MESSAGE: &str =
    "Please confirm the configuration above. Press Enter to proceed with deployment: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configuration,
    Validation,
    DockerWorkflow,
    HelmWorkflow,
    Complete,
}

impl Stage {
    /// Step number shown in the banner; the closing stage is unnumbered.
    pub fn number(&self) -> Option<u8> {
        match self {
            Stage::Configuration => Some(1),
            Stage::Validation => Some(2),
            Stage::DockerWorkflow => Some(3),
            Stage::HelmWorkflow => Some(4),
            Stage::Complete => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Stage::Configuration => "CONFIGURATION",
            Stage::Validation => "VALIDATION",
            Stage::DockerWorkflow => "DOCKER WORKFLOW",
            Stage::HelmWorkflow => "HELM WORKFLOW",
            Stage::Complete => "DEPLOYMENT COMPLETE",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Stage::Configuration => "⚙️",
            Stage::Validation => "✓",
            Stage::DockerWorkflow => "🐳",
            Stage::HelmWorkflow => "⎈",
            Stage::Complete => "🎉",
        }
    }

    pub fn banner(&self) -> String {
        let heading = match self.number() {
            Some(n) => format!("{}  {n}. {}", self.icon(), self.title()),
            None => format!("{} {}", self.icon(), self.title()),
        };
        format!("\n{RULE}\n{heading}\n{RULE}")
    }
}

/// Line-based confirmation gate.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl Prompt<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `message` and wait for one line. The answer is discarded; an
    /// empty line or end of input both proceed.
    pub fn confirm(&mut self, message: &str) -> io::Result<()> {
        write!(self.output, "{message}")?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to resolve configuration")]
    Config(#[from] dockwright_core::Error),

    #[error("failed to read user input")]
    UserInput(#[source] io::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("docker workflow failed")]
    Image(#[from] ImageError),

    #[error("helm workflow failed")]
    Deploy(#[from] DeployError),
}

/// What a completed `deploy` did.
#[derive(Debug)]
pub struct PipelineReport {
    pub config: DeployConfig,
    pub validation: Vec<ValidationResult>,
    pub image: ImageOutcome,
    pub deploy: DeployOutcome,
}

pub struct Pipeline<'a, E: ToolExecutor> {
    layout: &'a Layout,
    env: &'a dyn EnvSource,
    executor: &'a E,
    home_dir: Option<Option<PathBuf>>,
}

impl<'a, E: ToolExecutor> Pipeline<'a, E> {
    pub fn new(layout: &'a Layout, env: &'a dyn EnvSource, executor: &'a E) -> Self {
        Self {
            layout,
            env,
            executor,
            home_dir: None,
        }
    }

    /// Replace the detected home directory used for kubeconfig defaults.
    pub fn with_home_dir(mut self, home_dir: Option<PathBuf>) -> Self {
        self.home_dir = Some(home_dir);
        self
    }

    /// Load the config file and resolve every field, then print the summary.
    pub fn configure(&self, input: &CliInput) -> Result<DeployConfig, PipelineError> {
        println!("{}", Stage::Configuration.banner());

        let file = ConfigFile::load(&self.layout.config_file());
        let mut host = Host::new(self.layout.project_dir(), self.env);
        if let Some(home_dir) = &self.home_dir {
            host = host.with_home_dir(home_dir.clone());
        }
        let config = resolve(input, &file, &host)?;

        println!("🛠️  Configuration loaded:");
        print!("{}", config.summary());
        Ok(config)
    }

    pub async fn run<R: BufRead, W: Write>(
        &self,
        input: &CliInput,
        prompt: &mut Prompt<R, W>,
    ) -> Result<PipelineReport, PipelineError> {
        let config = self.configure(input)?;

        if !config.auto_approve && !config.dry_run {
            prompt
                .confirm(CONFIRM_MESSAGE)
                .map_err(PipelineError::UserInput)?;
        }

        let ctx = RunContext::new(&config, self.layout, self.env);
        let validation = self.validate(ctx).await?;

        println!("{}", Stage::DockerWorkflow.banner());
        let image = ImageWorkflow::new(ctx, self.executor).run().await?;

        println!("{}", Stage::HelmWorkflow.banner());
        let deploy = DeployWorkflow::new(ctx, self.executor).run().await?;

        println!("{}", Stage::Complete.banner());
        Ok(PipelineReport {
            config,
            validation,
            image,
            deploy,
        })
    }

    /// Configure and validate without prompting or touching anything.
    pub async fn validate_only(
        &self,
        input: &CliInput,
    ) -> Result<(DeployConfig, Vec<ValidationResult>), PipelineError> {
        let config = self.configure(input)?;
        let ctx = RunContext::new(&config, self.layout, self.env);
        let results = self.validate(ctx).await?;
        Ok((config, results))
    }

    async fn validate(&self, ctx: RunContext<'_>) -> Result<Vec<ValidationResult>, ValidationError> {
        println!("{}", Stage::Validation.banner());

        let report = Validator::new(ctx, self.executor).validate_all().await;
        for result in &report.results {
            if result.passed() {
                tracing::info!("{}", result.message);
            } else {
                tracing::error!("❌ Validation error in {}", result.name());
            }
        }
        report.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_numbers_steps() {
        let banner = Stage::DockerWorkflow.banner();
        assert!(banner.contains("🐳  3. DOCKER WORKFLOW"));
        assert_eq!(banner.matches(RULE).count(), 2);
    }

    #[test]
    fn closing_banner_is_unnumbered() {
        assert!(Stage::Complete.banner().contains("🎉 DEPLOYMENT COMPLETE"));
    }

    #[test]
    fn confirm_accepts_eof() {
        let mut out = Vec::new();
        let mut prompt = Prompt::new(io::empty(), &mut out);
        prompt.confirm("go? ").unwrap();
        assert_eq!(out, b"go? ");
    }

    #[test]
    fn confirm_discards_answer() {
        let mut prompt = Prompt::new(&b"no thanks\n"[..], io::sink());
        assert!(prompt.confirm("go? ").is_ok());
    }
}
