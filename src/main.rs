//! MCP Server Entry Point
//!
//! Loads configuration (failing fast when a backend URL is missing),
//! initializes logging, and serves the Morningstar tools over the configured
//! transport.

use anyhow::{Context, Result};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, filter::Directive, fmt};

use morningstar_mcp_server::core::{Config, McpServer, TransportService};

#[tokio::main]
async fn main() -> Result<()> {
    // Missing backend URLs abort here, before any transport is started
    let config = Config::from_env().context("failed to load configuration")?;

    init_logging(&config.logging.level);

    info!("Starting {} v{}", config.server.name, config.server.version);
    info!(
        "Datapoint backend: {}, retrieval backend: {}, timeout: {}s",
        config.backends.datapoint_url,
        config.backends.retrieval_url,
        config.backends.request_timeout.as_secs()
    );

    let transport = TransportService::new(config.transport.clone());
    let server = McpServer::new(config).context("failed to initialize server")?;

    info!("Server initialized");

    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr; stdout belongs to the STDIO transport.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for noisy in ["hyper=warn", "hyper_util=warn", "reqwest=warn", "rmcp=warn"] {
        if let Ok(directive) = noisy.parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
