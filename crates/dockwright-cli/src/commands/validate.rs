use dockwright_core::{CliInput, ProcessEnv};
use dockwright_runner::{Pipeline, RealExecutor};

pub async fn validate(input: CliInput) -> anyhow::Result<()> {
    let env = ProcessEnv;
    let layout = super::project_layout(&env);
    let executor = RealExecutor;

    let pipeline = Pipeline::new(&layout, &env, &executor);
    let (config, results) = pipeline.validate_only(&input).await?;

    tracing::info!(
        "✅ {} checks passed for {}; ready to deploy",
        results.len(),
        config.artifact_name
    );
    Ok(())
}
