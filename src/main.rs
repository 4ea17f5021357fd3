//! Service entrypoint.
//!
//! Loads `.env`, builds the configuration, initializes tracing, and hands
//! off to [`tinylink_gateway::server::run`].

use tinylink_gateway::config::{self, Config};
use tinylink_gateway::server;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before reading any configuration
    dotenvy::dotenv().ok();

    let config = config::load_from_env()?;

    init_tracing(&config);
    config.print_summary();

    server::run(config).await
}

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` drives the filter (via `config.log_level`); `LOG_FORMAT=json`
/// switches to structured output for log shippers.
fn init_tracing(config: &Config) {
    let filter = EnvFilter::new(&config.log_level);
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if config.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
