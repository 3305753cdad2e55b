mod cli;
mod commands;

use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .without_time()
        .init();

    let matches = cli::command().get_matches();

    let result = match matches.subcommand() {
        Some((cli::DEPLOY, sub)) => commands::deploy(cli::collect_input(sub)).await,
        Some((cli::VALIDATE, sub)) => commands::validate(cli::collect_input(sub)).await,
        Some((other, _)) => Err(anyhow::anyhow!("unknown command '{other}'")),
        None => Err(anyhow::anyhow!("no command given")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
