use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    homepage::logging::init().context("init logging")?;

    let cli = homepage::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        homepage::cli::Command::Fetch(args) => {
            homepage::aggregate::run(args).await.context("fetch")?;
        }
        homepage::cli::Command::Show(args) => {
            homepage::narrative::show(args).await.context("show")?;
        }
        homepage::cli::Command::Workout(args) => {
            homepage::narrative::workout(args).context("workout")?;
        }
    }

    Ok(())
}
