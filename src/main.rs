use anyhow::Result;
use design_planner::{config::Config, server::DesignServer};
use rmcp::{ServiceExt, transport::stdio};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    // stdout carries the protocol; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.runtime.log_level))
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    info!("🚀 Starting design-planner MCP server");
    info!(
        "📊 Configuration loaded: base_url={}, analysis_model={}, design_model={}, use_ai={}",
        config.generation.base_url,
        config.models.analysis,
        config.models.design,
        config.complexity.use_ai
    );

    let server = DesignServer::new(config).map_err(|e| {
        eprintln!("Failed to create server: {}", e);
        e
    })?;

    info!("🛠️  Available tools: analyze_and_plan, design_block, integrate, query_component");

    let service = server.serve(stdio()).await.map_err(|e| {
        eprintln!("Failed to start MCP service: {}", e);
        e
    })?;

    info!("🎯 MCP Server ready - waiting for requests...");
    service.waiting().await?;

    Ok(())
}
