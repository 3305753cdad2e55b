use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use serde_yaml::Value;

use crate::fields::{
    ARTIFACT_NAME, AUTO_APPROVE, DOCKER_HOST, DOCKER_NAMESPACE, DRY_RUN, ENV, FieldKind,
    FieldSpec, HELM_FLAVOUR, Host, KUBERNETES_CONFIG, KUBERNETES_CONTEXT, RUN_DOCKER_BUILD,
    fields,
};
use crate::layout::Layout;

/// Fully resolved configuration for one run.
///
/// Built once by [`resolve`] and only shared by reference afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployConfig {
    pub artifact_name: String,
    /// Raw flavour string; see [`DeployConfig::flavour`].
    pub helm_flavour: String,
    pub docker_namespace: String,
    pub docker_host: String,
    pub kubernetes_config: String,
    pub kubernetes_context: String,
    pub env: Vec<String>,
    pub dry_run: bool,
    pub run_docker_build: bool,
    pub auto_approve: bool,
}

/// Chart variant selected by `helm.flavour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavour {
    Stateless,
    Stateful,
}

impl Flavour {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flavour::Stateless => "stateless",
            Flavour::Stateful => "stateful",
        }
    }
}

impl fmt::Display for Flavour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid helm flavour: expected 'stateful' or 'stateless', but got '{0}'")]
pub struct InvalidFlavour(pub String);

impl FromStr for Flavour {
    type Err = InvalidFlavour;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stateless" => Ok(Flavour::Stateless),
            "stateful" => Ok(Flavour::Stateful),
            other => Err(InvalidFlavour(other.to_owned())),
        }
    }
}

impl DeployConfig {
    pub fn flavour(&self) -> Result<Flavour, InvalidFlavour> {
        self.helm_flavour.parse()
    }

    /// `host/namespace/artifact`.
    pub fn image_repository(&self) -> crate::Result<String> {
        let missing: Vec<&'static str> = [
            (DOCKER_HOST, &self.docker_host),
            (DOCKER_NAMESPACE, &self.docker_namespace),
            (ARTIFACT_NAME, &self.artifact_name),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(crate::Error::IncompleteImageReference { missing });
        }

        Ok(format!(
            "{}/{}/{}",
            self.docker_host, self.docker_namespace, self.artifact_name
        ))
    }

    /// `host/namespace/artifact:latest`.
    pub fn image_tag(&self) -> crate::Result<String> {
        Ok(format!("{}:latest", self.image_repository()?))
    }

    pub fn chart_path(&self, layout: &Layout) -> PathBuf {
        layout.chart_path(&self.helm_flavour)
    }

    /// The image workflow runs only when enabled and a Dockerfile exists.
    /// The deploy workflow uses the same rule to decide on image overrides.
    pub fn should_build_image(&self, layout: &Layout) -> bool {
        self.run_docker_build && layout.has_dockerfile()
    }

    /// Current value of a registry field, or `None` for an unknown name.
    pub fn field_value(&self, name: &str) -> Option<FieldValue> {
        let value = match name {
            ARTIFACT_NAME => FieldValue::Text(self.artifact_name.clone()),
            HELM_FLAVOUR => FieldValue::Text(self.helm_flavour.clone()),
            DOCKER_NAMESPACE => FieldValue::Text(self.docker_namespace.clone()),
            DOCKER_HOST => FieldValue::Text(self.docker_host.clone()),
            KUBERNETES_CONFIG => FieldValue::Text(self.kubernetes_config.clone()),
            KUBERNETES_CONTEXT => FieldValue::Text(self.kubernetes_context.clone()),
            ENV => FieldValue::List(self.env.clone()),
            DRY_RUN => FieldValue::Bool(self.dry_run),
            RUN_DOCKER_BUILD => FieldValue::Bool(self.run_docker_build),
            AUTO_APPROVE => FieldValue::Bool(self.auto_approve),
            _ => return None,
        };
        Some(value)
    }

    pub fn summary(&self) -> Summary<'_> {
        Summary(self)
    }

    fn assign(&mut self, field: &FieldSpec, value: FieldValue) -> crate::Result<()> {
        match field.name {
            ARTIFACT_NAME => self.artifact_name = value.into_text(field)?,
            HELM_FLAVOUR => self.helm_flavour = value.into_text(field)?,
            DOCKER_NAMESPACE => self.docker_namespace = value.into_text(field)?,
            DOCKER_HOST => self.docker_host = value.into_text(field)?,
            KUBERNETES_CONFIG => self.kubernetes_config = value.into_text(field)?,
            KUBERNETES_CONTEXT => self.kubernetes_context = value.into_text(field)?,
            ENV => self.env = value.into_list(field)?,
            DRY_RUN => self.dry_run = value.into_bool(field)?,
            RUN_DOCKER_BUILD => self.run_docker_build = value.into_bool(field)?,
            AUTO_APPROVE => self.auto_approve = value.into_bool(field)?,
            _ => return Err(crate::Error::UnknownField { field: field.name }),
        }
        Ok(())
    }
}

/// A coerced field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    List(Vec<String>),
}

impl FieldValue {
    pub fn coerce(kind: FieldKind, raw: &str) -> Self {
        match kind {
            FieldKind::Text => FieldValue::Text(raw.to_owned()),
            FieldKind::Bool => FieldValue::Bool(parse_bool(raw)),
            FieldKind::List => FieldValue::List(parse_list(raw)),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::List(_) => FieldKind::List,
        }
    }

    /// Whether a required field counts as provided.
    pub fn is_set(&self) -> bool {
        match self {
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Bool(_) => true,
            FieldValue::List(items) => !items.is_empty(),
        }
    }

    fn into_text(self, field: &FieldSpec) -> crate::Result<String> {
        match self {
            FieldValue::Text(s) => Ok(s),
            other => Err(other.mismatch(field, FieldKind::Text)),
        }
    }

    fn into_bool(self, field: &FieldSpec) -> crate::Result<bool> {
        match self {
            FieldValue::Bool(b) => Ok(b),
            other => Err(other.mismatch(field, FieldKind::Bool)),
        }
    }

    fn into_list(self, field: &FieldSpec) -> crate::Result<Vec<String>> {
        match self {
            FieldValue::List(items) => Ok(items),
            other => Err(other.mismatch(field, FieldKind::List)),
        }
    }

    fn mismatch(&self, field: &FieldSpec, expected: FieldKind) -> crate::Error {
        crate::Error::FieldMismatch {
            field: field.name,
            declared: self.kind(),
            expected,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// `true`, `1` and `yes` (any case) are true; everything else is false.
pub fn parse_bool(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

/// Splits on `,`, trims each item and drops empty ones. Order and
/// duplicates are kept.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

// ── CLI input ──

/// Flag values the user explicitly passed on the command line, keyed by
/// flag name. A flag is present here only if it was typed, even when its
/// value equals the field's default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliInput {
    supplied: BTreeMap<String, String>,
}

impl CliInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn supply(&mut self, flag: impl Into<String>, value: impl Into<String>) {
        self.supplied.insert(flag.into(), value.into());
    }

    pub fn with(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.supply(flag, value);
        self
    }

    pub fn get(&self, flag: &str) -> Option<&str> {
        self.supplied.get(flag).map(String::as_str)
    }
}

// ── Config file ──

/// Parsed `.dockwright/config.yaml`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    root: Value,
}

impl ConfigFile {
    /// Load the config file at `path`.
    ///
    /// A missing, unreadable or malformed file yields an empty tree, so
    /// resolution falls through to the defaults tier. Failures are logged.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file");
            return Self::default();
        }
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                return Self::default();
            }
        };
        match Self::parse(&content) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(Self {
            root: serde_yaml::from_str(content)?,
        })
    }

    /// String form of the value at a dotted path. `null`, missing keys and
    /// nested mappings count as absent; sequences are joined with `,`.
    pub fn get(&self, config_path: &str) -> Option<String> {
        let mut node = &self.root;
        for segment in config_path.split('.') {
            node = node.get(segment)?;
        }
        render(node)
    }
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Mapping(_) => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Sequence(items) => Some(items.iter().filter_map(render).collect::<Vec<_>>().join(",")),
        Value::Tagged(tagged) => render(&tagged.value),
    }
}

// ── Resolution ──

/// Which tier supplied a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Cli,
    File,
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Source::Cli => "cli",
            Source::File => "config file",
            Source::Default => "default",
        })
    }
}

/// Raw value for one field: CLI input, then config file, then default.
pub fn resolve_field(
    field: &FieldSpec,
    input: &CliInput,
    file: &ConfigFile,
    host: &Host<'_>,
) -> (String, Source) {
    if let Some(value) = input.get(field.flag) {
        return (value.to_owned(), Source::Cli);
    }
    if let Some(value) = file.get(field.config_path) {
        return (value, Source::File);
    }
    (field.default_value(host), Source::Default)
}

/// Merge all three tiers into a [`DeployConfig`].
///
/// Required fields are not checked here; an empty required value is
/// reported by the validator.
pub fn resolve(input: &CliInput, file: &ConfigFile, host: &Host<'_>) -> crate::Result<DeployConfig> {
    let mut config = DeployConfig::default();
    for field in fields() {
        let (raw, source) = resolve_field(field, input, file, host);
        tracing::debug!(field = field.name, %source, "resolved config field");
        config.assign(field, FieldValue::coerce(field.kind, &raw))?;
    }
    Ok(config)
}

/// Two-column table of every resolved field.
pub struct Summary<'a>(&'a DeployConfig);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "   {:<20} | Value", "Field")?;
        writeln!(f, "   {:-<21}|{:-<16}", "", "")?;
        for field in fields() {
            if let Some(value) = self.0.field_value(field.name) {
                writeln!(f, "   {:<20} | {value}", field.name)?;
            }
        }
        Ok(())
    }
}
