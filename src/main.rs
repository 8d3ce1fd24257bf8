use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use oxidized_summarizer::{config::Config, create_router, utils::init_logger, AppState};

#[derive(Parser)]
#[command(name = "oxidized-summarizer", about = "Upload a document, get a summary back", version)]
struct Args {
    /// Bind address (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Directory for daily rolling log files (overrides LOG_DIR)
    #[arg(long)]
    log_dir: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::from_env()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.log_dir.is_some() {
        config.logging.directory = args.log_dir;
    }

    let _log_guard = init_logger(&config.logging);
    info!("Configuration loaded: {:?}", config.server);
    if config.session.secret == "change-me" {
        warn!("SECRET_KEY is not set; client hashes in logs use the default salt");
    }

    // Create shared state
    let state = AppState::new(config.clone())?;

    // Create router
    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address: {}", e))?;
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
