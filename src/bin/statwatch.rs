use anyhow::Context;
use clap::Parser;
use statwatch::{
    actors::collector::CollectorHandle,
    alerts::AlertDispatcher,
    fetch::HttpStatsSource,
    util::{Overrides, load_config},
};
use tracing::{debug, error, info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
#[command(about = "Polls a server's stats endpoint and prints alerts when limits are exceeded")]
struct Args {
    /// Config file
    #[arg(short)]
    file: Option<String>,

    /// Stats endpoint URL
    #[arg(long)]
    url: Option<String>,

    /// Poll interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,
}

fn init() {
    dotenv::dotenv().ok();

    let filter = filter::Targets::new().with_targets(vec![
        ("statwatch", LevelFilter::DEBUG),
        ("reqwest", LevelFilter::WARN),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let overrides = Overrides {
        url: args.url.clone(),
        interval_ms: args.interval_ms,
    };
    let config = load_config(args.file.as_deref(), &overrides)?;
    debug!("using config: {config:?}");

    let source = HttpStatsSource::new(&config.source.url, config.source.timeout())
        .context("failed to build HTTP client")?;
    let dispatcher =
        AlertDispatcher::from_config(&config.alerts, source.url(), config.source.timeout())
            .context("failed to build alert client")?;

    let (collector, task) = CollectorHandle::spawn(&config, Box::new(source), dispatcher);
    info!("watching {}", collector.display_name);

    shutdown_signal().await;

    collector.shutdown().await?;
    if let Err(e) = task.await {
        error!("collector task failed: {e}");
    }

    Ok(())
}

/// Wait for SIGINT (Ctrl-C) or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received SIGINT, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
