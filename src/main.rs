#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

use std::net::SocketAddr;

use anyhow::Result;
use jotter::config::Config;
use jotter::setup_app;
use jotter::utils::env_var_or_else;
use tokio::net::TcpListener;
use tracing_subscriber::prelude::*;

mod graceful_shutdown;

const DEFAULT_RUST_LOG: &str = "jotter=debug,tower_http=debug";
const DEFAULT_ADDRESS: &str = "0.0.0.0:6000";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let config = Config::from_env()?;
    tracing::debug!(
        "Content limit {} characters, conflict grace {}s, base URL {}",
        config.content_max_chars,
        config.conflict_grace_seconds,
        config.base_url
    );

    let app = setup_app(config).await?;

    let address = setup_address()?;
    let listener = TcpListener::bind(&address).await?;
    tracing::info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler())
        .await?;

    Ok(())
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}

fn setup_address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    // optional override of just the port
    if let Ok(port) = std::env::var("PORT") {
        // only check non-empty strings
        if !port.is_empty() {
            let port = port.parse::<u16>()?;

            address.set_port(port);
        }
    }

    Ok(address)
}
