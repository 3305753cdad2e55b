//! Validation and tool workflows for dockwright.
//!
//! Every external process (`docker`, `helm`) is spawned through
//! [`ToolExecutor`], so the validator, the image and deploy workflows, and
//! the [`Pipeline`] driver can all run against a mock.

pub mod context;
pub mod deploy;
pub mod executor;
pub mod image;
pub mod pipeline;
pub mod tool;
pub mod validate;

pub use context::RunContext;
pub use deploy::{DeployError, DeployOutcome, DeployPlan, DeployWorkflow};
pub use executor::{RealExecutor, ToolExecutor};
pub use image::{ImageError, ImageOutcome, ImageWorkflow};
pub use pipeline::{Pipeline, PipelineError, PipelineReport, Prompt, Stage};
pub use tool::{DOCKER, HELM, ToolCommand, ToolError};
pub use validate::{Check, ValidationError, ValidationReport, ValidationResult, Validator};
