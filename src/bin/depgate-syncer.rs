use std::time::Duration;

use clap::Parser;
use dep_client::DepClient;
use dep_sync::DeviceSyncer;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

/// The depgate device syncer: polls the DEP device endpoints for each
/// configured DEP name and assigns profiles to newly added devices.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// DEP name to sync (repeatable)
    #[arg(long = "name", required = true)]
    names: Vec<String>,

    /// Storage backend: file, inmem, or sqlite
    #[arg(long, default_value = "file")]
    storage: String,

    /// Storage data source name (path for file and sqlite backends)
    #[arg(long, default_value = "")]
    storage_dsn: String,

    /// Seconds between sync iterations; 0 runs one iteration and exits
    #[arg(long, default_value_t = 30)]
    interval: u64,

    /// Per-request device limit (Apple default 100, maximum 1000)
    #[arg(long)]
    limit: Option<u32>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let directive = if args.debug { "depgate=debug" } else { "depgate=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(directive.parse().unwrap())
                .add_directive("dep_sync=info".parse().unwrap()),
        )
        .init();

    let store = depgate::storage::parse_storage(&args.storage, &args.storage_dsn)?;
    let client = DepClient::new(store.clone());

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        let mut sigterm = signal(SignalKind::terminate()).expect("signal handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("signal handler");
        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM"),
            _ = sigint.recv() => info!("received SIGINT"),
        }
        let _ = shutdown_tx.send(true);
    });

    // one syncer task per DEP name; names sync independently
    let mut handles = Vec::new();
    for name in args.names {
        let mut syncer = DeviceSyncer::new(client.clone(), store.clone(), name.clone());
        if let Some(limit) = args.limit {
            syncer = syncer.with_limit(limit);
        }
        let shutdown = shutdown_rx.clone();
        let interval = args.interval;
        info!(name = %name, interval = interval, "starting syncer");
        handles.push(tokio::spawn(async move {
            if interval == 0 {
                syncer.run_once().await
            } else {
                syncer.run(Duration::from_secs(interval), shutdown).await
            }
        }));
    }

    for handle in handles {
        handle.await??;
    }

    info!("depgate syncer shutting down");
    Ok(())
}
