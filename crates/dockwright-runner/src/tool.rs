use std::fmt;

/// Image build, login and push tool.
pub const DOCKER: &str = "docker";
/// Chart deploy tool.
pub const HELM: &str = "helm";

/// A planned external command: program plus argument vector.
///
/// Dry runs and real runs build the same `ToolCommand`; only whether it is
/// handed to an executor differs. Secrets never appear in `args`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_owned(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{program} not found on PATH")]
    NotInstalled {
        program: String,
        source: which::Error,
    },

    #[error("failed to start {program}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("`{command}` failed: {}", stderr.trim())]
    CommandFailed { command: ToolCommand, stderr: String },

    #[error("{program} output was not valid UTF-8")]
    InvalidUtf8 {
        program: String,
        source: std::string::FromUtf8Error,
    },

    #[error("failed to write to {program} stdin")]
    StdinWrite {
        program: String,
        source: std::io::Error,
    },
}
