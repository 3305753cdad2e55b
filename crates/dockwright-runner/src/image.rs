use dockwright_core::env::{REGISTRY_PASSWORD, REGISTRY_USERNAME};
use secrecy::{ExposeSecret, SecretString};

use crate::context::RunContext;
use crate::executor::ToolExecutor;
use crate::tool::{DOCKER, ToolCommand, ToolError};

/// What the image workflow did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    /// Docker build disabled or no Dockerfile; nothing ran.
    Skipped,
    /// Build, login and push, in that order. With `simulated` set the
    /// commands were only reported.
    Completed {
        commands: Vec<ToolCommand>,
        simulated: bool,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("cannot derive image tag")]
    Reference(#[from] dockwright_core::Error),

    #[error("{0} must be set for docker login")]
    MissingCredential(&'static str),

    #[error("docker build failed")]
    Build { source: ToolError },

    #[error("docker login failed")]
    Login { source: ToolError },

    #[error("docker push failed")]
    Push { source: ToolError },
}

/// Builds the service image, logs in to the registry, and pushes.
pub struct ImageWorkflow<'a, E: ToolExecutor> {
    ctx: RunContext<'a>,
    executor: &'a E,
}

impl<'a, E: ToolExecutor> ImageWorkflow<'a, E> {
    pub fn new(ctx: RunContext<'a>, executor: &'a E) -> Self {
        Self { ctx, executor }
    }

    pub async fn run(&self) -> Result<ImageOutcome, ImageError> {
        if !self.ctx.should_build_image() {
            tracing::info!(
                "⏭️  Skipping Docker workflow. Either docker build (--docker-build) flag is disabled or Dockerfile is missing."
            );
            return Ok(ImageOutcome::Skipped);
        }

        let image_tag = self.ctx.config.image_tag()?;

        let commands = vec![
            self.build(&image_tag).await?,
            self.login().await?,
            self.push(&image_tag).await?,
        ];

        Ok(ImageOutcome::Completed {
            commands,
            simulated: self.ctx.dry_run(),
        })
    }

    pub fn build_command(&self, image_tag: &str) -> ToolCommand {
        let context = self.ctx.layout.project_dir().display().to_string();
        ToolCommand::new(DOCKER, ["build", "-t", image_tag, context.as_str()])
    }

    pub fn login_command(&self, username: &str) -> ToolCommand {
        ToolCommand::new(
            DOCKER,
            [
                "login",
                self.ctx.config.docker_host.as_str(),
                "-u",
                username,
                "--password-stdin",
            ],
        )
    }

    pub fn push_command(&self, image_tag: &str) -> ToolCommand {
        ToolCommand::new(DOCKER, ["push", image_tag])
    }

    async fn build(&self, image_tag: &str) -> Result<ToolCommand, ImageError> {
        let command = self.build_command(image_tag);
        tracing::info!("🔨 Building Docker image: {image_tag}");
        tracing::info!("   Build context: {}", self.ctx.layout.project_dir().display());

        if self.ctx.dry_run() {
            tracing::info!("   🧪 [DRY-RUN] Would run: {command}");
            return Ok(command);
        }

        self.executor
            .exec_streaming(&command)
            .await
            .map_err(|e| ImageError::Build { source: e })?;

        tracing::info!("✓  Successfully built Docker image: {image_tag}");
        Ok(command)
    }

    async fn login(&self) -> Result<ToolCommand, ImageError> {
        let username = self
            .ctx
            .env
            .var(REGISTRY_USERNAME)
            .ok_or(ImageError::MissingCredential(REGISTRY_USERNAME))?;
        let password = self
            .ctx
            .env
            .var(REGISTRY_PASSWORD)
            .map(SecretString::from)
            .ok_or(ImageError::MissingCredential(REGISTRY_PASSWORD))?;

        let host = &self.ctx.config.docker_host;
        let command = self.login_command(&username);
        tracing::info!("🔐 Authenticating with Docker registry: {host}");
        tracing::info!("   Username: {username}");

        if self.ctx.dry_run() {
            tracing::info!("   🧪 [DRY-RUN] Would run: {command}");
            return Ok(command);
        }

        self.executor
            .exec_with_stdin(&command, password.expose_secret().as_bytes())
            .await
            .map_err(|e| ImageError::Login { source: e })?;

        tracing::info!("✓  Successfully authenticated with registry: {host}");
        Ok(command)
    }

    async fn push(&self, image_tag: &str) -> Result<ToolCommand, ImageError> {
        let command = self.push_command(image_tag);
        tracing::info!("📤 Pushing Docker image: {image_tag}");
        tracing::info!("   Target registry: {}", self.ctx.config.docker_host);

        if self.ctx.dry_run() {
            tracing::info!("   🧪 [DRY-RUN] Would run: {command}");
            return Ok(command);
        }

        self.executor
            .exec_streaming(&command)
            .await
            .map_err(|e| ImageError::Push { source: e })?;

        tracing::info!("✓  Successfully pushed image to registry: {image_tag}");
        Ok(command)
    }
}
