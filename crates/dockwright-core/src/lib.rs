//! Core types and configuration for dockwright.
//!
//! This crate defines the field registry ([`fields`]), three-tier
//! configuration resolution into [`DeployConfig`], the project filesystem
//! [`Layout`], a minimal kubeconfig reader, and shared error types.

pub mod config;
pub mod env;
pub mod error;
pub mod fields;
pub mod kubeconfig;
pub mod layout;

pub use config::{CliInput, ConfigFile, DeployConfig, FieldValue, Flavour, InvalidFlavour, resolve};
pub use env::{EnvSource, ProcessEnv};
pub use error::{Error, Result};
pub use fields::{FieldKind, FieldSpec, Host, fields};
pub use kubeconfig::{KubeConfig, KubeConfigError};
pub use layout::Layout;
