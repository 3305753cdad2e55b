mod deploy;
mod validate;

use std::path::PathBuf;

use dockwright_core::{EnvSource, Layout};

pub use deploy::deploy;
pub use validate::validate;

/// Commands operate on the current directory.
fn project_layout(env: &dyn EnvSource) -> Layout {
    Layout::from_env(PathBuf::from("."), env)
}
