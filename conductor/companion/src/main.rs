//! Halo Companion
//!
//! Conversation process the Halo surfaces connect to over WebSocket. It keeps
//! the shared roster, answers chat in each persona's voice, grounds replies in
//! uploaded documents and keeps agents talking between human messages.
//!
//! # Usage
//!
//! ```bash
//! # Listen on the default address (127.0.0.1:5001)
//! halo-companion
//!
//! # Custom bind address, reproducible replies
//! HALO_COMPANION_BIND=0.0.0.0:6000 halo-companion --seed 7
//!
//! # With verbose logging
//! RUST_LOG=debug halo-companion
//! ```
//!
//! # Signals
//!
//! - SIGINT: graceful shutdown

mod manager;
mod persona;
mod server;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};

use server::CompanionServer;

/// Conversation companion for Halo surfaces
#[derive(Debug, Parser)]
#[command(name = "halo-companion", version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "HALO_COMPANION_BIND", default_value = "127.0.0.1:5001")]
    bind: String,

    /// Seed for persona replies and speaker selection
    #[arg(long, env = "HALO_COMPANION_SEED")]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("halo_companion=info".parse()?)
                .add_directive("halo_conductor=info".parse()?),
        )
        .with_target(true)
        .init();

    let args = Args::parse();
    info!("Starting Halo Companion");
    info!("PID: {}", std::process::id());

    let listener = TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", args.bind))?;

    let server = CompanionServer::new(args.seed);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
    };

    server.run(listener, shutdown).await?;
    info!("Halo Companion stopped");
    Ok(())
}
