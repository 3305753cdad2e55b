use crate::fields::FieldKind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ── Field assignment ──
    #[error("config field '{field}' has no assignment target in DeployConfig")]
    UnknownField { field: &'static str },

    #[error("config field '{field}' is declared as {declared} but its target expects {expected}")]
    FieldMismatch {
        field: &'static str,
        declared: FieldKind,
        expected: FieldKind,
    },

    // ── Derived values ──
    #[error(
        "dockerHost, dockerNamespace, and artifactName must all be set to generate the image repository ({} is empty)",
        missing.join(", ")
    )]
    IncompleteImageReference { missing: Vec<&'static str> },
}
