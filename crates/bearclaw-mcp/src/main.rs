use bearclaw_mcp::BearclawService;
use bearclaw_sqlite::{BearDb, BearDbConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the MCP transport; all logging goes to stderr, which
    // Claude Desktop captures in its own log files.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = BearDbConfig::from_env();

    tracing::info!("Starting Bearclaw MCP server");
    tracing::info!("  Bear database: {}", config.path.display());

    let db = BearDb::open(&config).map_err(|e| {
        tracing::error!("Failed to open Bear database: {}", e);
        anyhow::anyhow!("Failed to open Bear database: {}", e)
    })?;

    BearclawService::new(db).serve_stdio().await?;

    Ok(())
}
