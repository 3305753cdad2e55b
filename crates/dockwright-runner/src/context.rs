use dockwright_core::{DeployConfig, EnvSource, Layout};

/// Read-only inputs shared by the validator and both workflows.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    pub config: &'a DeployConfig,
    pub layout: &'a Layout,
    pub env: &'a dyn EnvSource,
}

impl<'a> RunContext<'a> {
    pub fn new(config: &'a DeployConfig, layout: &'a Layout, env: &'a dyn EnvSource) -> Self {
        Self {
            config,
            layout,
            env,
        }
    }

    pub fn dry_run(&self) -> bool {
        self.config.dry_run
    }

    pub fn should_build_image(&self) -> bool {
        self.config.should_build_image(self.layout)
    }
}
