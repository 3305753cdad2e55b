use dockwright_core::{CliInput, ProcessEnv};
use dockwright_runner::{Pipeline, Prompt, RealExecutor};

/// Configure, confirm, validate, build and push the image, then install the chart.
pub async fn deploy(input: CliInput) -> anyhow::Result<()> {
    let env = ProcessEnv;
    let layout = super::project_layout(&env);
    let executor = RealExecutor;

    let pipeline = Pipeline::new(&layout, &env, &executor);
    let mut prompt = Prompt::stdio();
    let report = pipeline.run(&input, &mut prompt).await?;

    if report.deploy.simulated {
        tracing::info!("🧪 Dry run finished without changing anything");
    }
    Ok(())
}
