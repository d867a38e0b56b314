//! Learning platform API gateway.
//!
//! ```text
//!     Client ──▶ gateway (:5000) ──┬──▶ auth-service      /register /login /validate /user/{id}
//!                                   ├──▶ course-service    /courses ...
//!                                   └──▶ learning-service  /lessons /enroll /enrollments ...
//! ```
//!
//! Each downstream call is retried and may fall back from the short service
//! hostname to its `{stack}_{service}` form.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use learning_gateway::config::load_config;
use learning_gateway::lifecycle::shutdown_signal;
use learning_gateway::observability::{logging, metrics};
use learning_gateway::{GatewayServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "learning-gateway", about = "API gateway for the learning platform")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "learning-gateway starting");

    tracing::info!(
        bind_address = %config.listener.bind_address,
        stack_name = %config.services.stack_name,
        retries = config.resilience.retries,
        call_timeout_ms = config.resilience.call_timeout_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_shutdown.trigger();
    });

    let server = GatewayServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
