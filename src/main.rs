//! longpoll-server
//!
//! HTTP long-poll pub/sub server: `GET /sub` waits for one event of a topic,
//! `POST /pub` publishes to it.

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use longpoll::{
    config::{LongPollConfig, ServerSettings, DEFAULT_LISTEN_ADDR},
    http::{self, Payload},
    logging::{self, LogFormat, LoggingConfig},
    LongPoll,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Command-line arguments of the server.
///
/// Broker tuning (`LP_SUB_PURGE_INTERVAL`, `LP_SUB_EVENT_BUF`,
/// `LP_SUB_LEASE_TOLERANCE`) is read from the environment only.
#[derive(Parser, Debug)]
#[command(name = "longpoll-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Long-poll pub/sub server", long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(
        short,
        long,
        default_value = DEFAULT_LISTEN_ADDR,
        env = "LP_LISTEN_ADDR",
        help = "Address the HTTP server binds to"
    )]
    listen: SocketAddr,
    /// Log filter directive
    #[arg(
        long,
        default_value = "info",
        env = "LP_LOG_LEVEL",
        help = "Log filter used when RUST_LOG is not set"
    )]
    log_level: String,
    /// Log output format
    #[arg(
        long,
        default_value = "compact",
        env = "LP_LOG_FORMAT",
        help = "Log format: pretty, compact or json"
    )]
    log_format: LogFormat,
    /// Disable colored output
    #[arg(long, help = "Disable ANSI colors in the log")]
    no_ansi: bool,
}

impl Cli {
    fn into_settings(self) -> ServerSettings {
        ServerSettings {
            listen_addr: self.listen,
            logging: LoggingConfig {
                level: self.log_level,
                format: self.log_format,
                with_ansi: !self.no_ansi,
                ..Default::default()
            },
            longpoll: LongPollConfig::from_env(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Cli::parse().into_settings();

    logging::init_logging(&settings.logging)
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    info!(config = ?settings.longpoll, "starting broker");
    let broker: Arc<LongPoll<Payload>> = Arc::new(LongPoll::new(settings.longpoll.clone()));
    let app = http::router(broker.clone());

    let listener = TcpListener::bind(settings.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.listen_addr))?;
    info!(addr = %settings.listen_addr, "longpoll server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    broker.close();
    info!("longpoll server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
}
