//! The field registry: one descriptor per configuration option.
//!
//! The registry drives flag registration in the CLI, precedence resolution
//! in [`crate::config::resolve`], and the required-field check in the
//! validator. Adding an option means adding a descriptor here and an arm in
//! the assignment table in [`crate::config`].

use std::fmt;
use std::path::{Path, PathBuf};

use crate::env::{EnvSource, REGISTRY_HOST};
use crate::kubeconfig::{self, KubeConfig};

pub const ARTIFACT_NAME: &str = "artifactName";
pub const HELM_FLAVOUR: &str = "helmFlavour";
pub const DOCKER_NAMESPACE: &str = "dockerNamespace";
pub const DOCKER_HOST: &str = "dockerHost";
pub const KUBERNETES_CONFIG: &str = "kubernetesConfig";
pub const KUBERNETES_CONTEXT: &str = "kubernetesContext";
pub const ENV: &str = "env";
pub const DRY_RUN: &str = "dryRun";
pub const RUN_DOCKER_BUILD: &str = "runDockerBuild";
pub const AUTO_APPROVE: &str = "autoApprove";

/// How a raw string value is coerced before assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Bool,
    List,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Text => "text",
            FieldKind::Bool => "boolean",
            FieldKind::List => "list",
        })
    }
}

/// Where a field's fallback value comes from.
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    None,
    Literal(&'static str),
    /// Computed lazily from the host; unavailable data yields `""`.
    Provider(fn(&Host<'_>) -> String),
}

/// Immutable description of one configuration option.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Dotted path into `.dockwright/config.yaml`.
    pub config_path: &'static str,
    /// Long flag name on `dockwright deploy`.
    pub flag: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub kind: FieldKind,
    pub default: DefaultValue,
}

impl FieldSpec {
    pub fn default_value(&self, host: &Host<'_>) -> String {
        match self.default {
            DefaultValue::None => String::new(),
            DefaultValue::Literal(value) => value.to_owned(),
            DefaultValue::Provider(provide) => provide(host),
        }
    }
}

/// Host facts consulted by default providers.
pub struct Host<'a> {
    pub project_dir: &'a Path,
    pub home_dir: Option<PathBuf>,
    pub env: &'a dyn EnvSource,
}

impl<'a> Host<'a> {
    pub fn new(project_dir: &'a Path, env: &'a dyn EnvSource) -> Self {
        Self {
            project_dir,
            home_dir: dirs::home_dir(),
            env,
        }
    }

    pub fn with_home_dir(mut self, home_dir: Option<PathBuf>) -> Self {
        self.home_dir = home_dir;
        self
    }
}

static FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: ARTIFACT_NAME,
        config_path: "artifactName",
        flag: "artifact-name",
        description: "Name of the artifact",
        required: true,
        kind: FieldKind::Text,
        default: DefaultValue::Provider(project_dir_name),
    },
    FieldSpec {
        name: HELM_FLAVOUR,
        config_path: "helm.flavour",
        flag: "helm-flavour",
        description: "Helm chart flavour (stateful or stateless)",
        required: true,
        kind: FieldKind::Text,
        default: DefaultValue::None,
    },
    FieldSpec {
        name: DOCKER_NAMESPACE,
        config_path: "docker.namespace",
        flag: "docker-namespace",
        description: "Docker registry namespace",
        required: false,
        kind: FieldKind::Text,
        default: DefaultValue::None,
    },
    FieldSpec {
        name: DOCKER_HOST,
        config_path: "docker.host",
        flag: "docker-host",
        description: "Docker registry host",
        required: false,
        kind: FieldKind::Text,
        default: DefaultValue::Provider(registry_host),
    },
    FieldSpec {
        name: KUBERNETES_CONFIG,
        config_path: "kubernetes.config",
        flag: "kubernetes-config",
        description: "Path to kubernetes config file",
        required: true,
        kind: FieldKind::Text,
        default: DefaultValue::Provider(default_kubeconfig_path),
    },
    FieldSpec {
        name: KUBERNETES_CONTEXT,
        config_path: "kubernetes.context",
        flag: "kubernetes-context",
        description: "Kubernetes context to use",
        required: true,
        kind: FieldKind::Text,
        default: DefaultValue::Provider(current_kube_context),
    },
    FieldSpec {
        name: ENV,
        config_path: "env",
        flag: "env",
        description: "Comma-separated list of environments (e.g., staging,production)",
        required: false,
        kind: FieldKind::List,
        default: DefaultValue::None,
    },
    FieldSpec {
        name: DRY_RUN,
        config_path: "dry-run",
        flag: "dry-run",
        description: "Exercise the deployment pipeline without mutating resources",
        required: false,
        kind: FieldKind::Bool,
        default: DefaultValue::Literal("false"),
    },
    FieldSpec {
        name: RUN_DOCKER_BUILD,
        config_path: "docker.build",
        flag: "docker-build",
        description: "Whether to run Docker build",
        required: false,
        kind: FieldKind::Bool,
        default: DefaultValue::Literal("true"),
    },
    FieldSpec {
        name: AUTO_APPROVE,
        config_path: "auto-approve",
        flag: "auto-approve",
        description: "Skip confirmation prompts and proceed automatically",
        required: false,
        kind: FieldKind::Bool,
        default: DefaultValue::Literal("false"),
    },
];

/// All descriptors, in declaration order.
pub fn fields() -> &'static [FieldSpec] {
    FIELDS
}

pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.name == name)
}

// ── Default providers ──

fn project_dir_name(host: &Host<'_>) -> String {
    match std::fs::canonicalize(host.project_dir) {
        Ok(dir) => dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        Err(e) => {
            tracing::debug!(error = %e, "project directory name unavailable");
            String::new()
        }
    }
}

fn registry_host(host: &Host<'_>) -> String {
    host.env.var(REGISTRY_HOST).unwrap_or_default()
}

fn default_kubeconfig_path(host: &Host<'_>) -> String {
    kubeconfig::default_path(host.home_dir.as_deref())
        .map(|path| path.display().to_string())
        .unwrap_or_default()
}

fn current_kube_context(host: &Host<'_>) -> String {
    let Some(path) = kubeconfig::default_path(host.home_dir.as_deref()) else {
        return String::new();
    };
    match KubeConfig::load(&path) {
        Ok(config) => config.current_context.unwrap_or_default(),
        Err(e) => {
            tracing::debug!(error = %e, "no current kubernetes context");
            String::new()
        }
    }
}
