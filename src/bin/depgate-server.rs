use clap::Parser;
use dep_http::{api_router, ApiState};
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

/// The depgate admin API server.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Listen address
    #[arg(long, default_value = "127.0.0.1:9001")]
    listen: String,

    /// Storage backend: file, inmem, or sqlite
    #[arg(long, default_value = "file")]
    storage: String,

    /// Storage data source name (path for file and sqlite backends)
    #[arg(long, default_value = "")]
    storage_dsn: String,

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
                .add_directive("dep_http=debug".parse().unwrap()),
        )
        .init();

    let store = depgate::storage::parse_storage(&args.storage, &args.storage_dsn)?;
    let app = api_router(ApiState::new(store));

    let listener = tokio::net::TcpListener::bind(&args.listen).await?;
    info!(listen = %args.listen, storage = %args.storage, "depgate server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("depgate server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let mut sigterm = signal(SignalKind::terminate()).expect("signal handler");
    let mut sigint = signal(SignalKind::interrupt()).expect("signal handler");

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM"),
        _ = sigint.recv() => info!("received SIGINT"),
    }
}
