//! Tokenward demo API
//!
//! Serves `GET /simple` behind introspection-based bearer token validation.
//!
//! ```text
//! TOKENWARD__OAUTH2__ISSUER=https://login.example.com/uas \
//! TOKENWARD__OAUTH2__CLIENT_ID=api \
//! TOKENWARD__OAUTH2__CLIENT_SECRET=secret \
//! tokenward-demo --port 5000
//! ```

mod config;
mod logging;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokenward_auth::IntrospectionValidator;
use tracing::info;

use crate::config::DemoConfig;

#[derive(Debug, Parser)]
#[command(name = "tokenward-demo", version, about = "Demo API protected by token introspection")]
struct Args {
    /// Configuration file (.toml, .yaml, .yml or .json)
    #[arg(short, long, env = "TOKENWARD_CONFIG")]
    config: Option<PathBuf>,

    /// Override the bind address
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config =
        DemoConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    logging::init(&config.logging).context("failed to initialize logging")?;

    let challenge_scope = config.oauth2.client_id.clone();
    info!(
        "Validating tokens against {} as client {}",
        config.oauth2.issuer, challenge_scope
    );
    let validator = IntrospectionValidator::new(config.oauth2, &config.introspection)?;

    let app = routes::router(Arc::new(validator), &challenge_scope);

    let bind_address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
