use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;

use homepage::aggregate::Refresher;
use homepage::app::scheduler;
use homepage::app::server::{AppState, router};
use homepage::config::{Config, env_secret};
use homepage::store::{DocumentStore, LocalFsDocumentStore};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct AppArgs {
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    #[arg(long, default_value = "homepage-data")]
    data_dir: PathBuf,

    /// YAML config with sheet URLs and API settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seconds between scheduled fetch cycles; 0 disables the schedule.
    #[arg(long, default_value_t = scheduler::DEFAULT_REFRESH_INTERVAL.as_secs())]
    refresh_interval_secs: u64,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    if let Err(err) = try_main().await {
        eprintln!("{err:#}");
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}

async fn try_main() -> anyhow::Result<()> {
    homepage::logging::init()?;

    let args = AppArgs::parse();
    tracing::info!(?args, "starting homepage-app");

    let config = Config::load(args.config.as_deref()).context("load config")?;
    let store: Arc<dyn DocumentStore> = Arc::new(LocalFsDocumentStore::new(&args.data_dir));
    let refresher = Arc::new(Refresher::from_config(
        Arc::clone(&store),
        config,
        reqwest::Client::new(),
    ));

    let schedule = (args.refresh_interval_secs > 0).then(|| {
        let interval = Duration::from_secs(args.refresh_interval_secs);
        tracing::info!(interval_secs = args.refresh_interval_secs, "scheduling fetch cycles");
        scheduler::spawn(Arc::clone(&refresher), interval)
    });

    let refresh_secret = env_secret("HOMEPAGE_REFRESH_SECRET");
    if refresh_secret.is_none() {
        tracing::info!("HOMEPAGE_REFRESH_SECRET is unset; POST /refresh is disabled");
    }

    let app = router(AppState {
        store,
        refresher,
        refresh_secret,
    });

    let listener = tokio::net::TcpListener::bind(args.addr)
        .await
        .map_err(|err| anyhow::anyhow!("bind {}: {err}", args.addr))?;
    tracing::info!(addr = %args.addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(schedule) = schedule {
        schedule.abort();
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
