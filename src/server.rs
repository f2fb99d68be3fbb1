//! MCP server initialization for stdio and Streamable HTTP transports.
//!
//! Provides [`serve_stdio`] and [`serve_http`] entry points that build the
//! shared [`App`], start the request-cache sweeper, and wire the MCP tool
//! handler into a running server.

use anyhow::Result;
use rmcp::ServiceExt;
use tokio::task::JoinHandle;

use kizuna::app::App;
use kizuna::chat::dedup::spawn_sweeper;
use kizuna::config::KizunaConfig;

use crate::tools::KizunaTools;

/// Shared setup: build components and start the cache sweeper.
fn setup_shared_state(config: KizunaConfig) -> Result<(App, JoinHandle<()>)> {
    let app = App::from_config(config)?;
    let sweeper = spawn_sweeper(
        app.chat.cache().clone(),
        app.config.cache.sweep_interval(),
    );
    tracing::info!(
        ttl_ms = app.config.cache.ttl_ms,
        capacity = app.config.cache.capacity,
        "request cache sweeper started"
    );
    Ok((app, sweeper))
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: KizunaConfig) -> Result<()> {
    tracing::info!("starting Kizuna MCP server on stdio");

    let (app, sweeper) = setup_shared_state(config)?;

    let tools = KizunaTools::new(app);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    sweeper.abort();
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over Streamable HTTP transport.
pub async fn serve_http(config: KizunaConfig) -> Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let bind_addr = format!("{host}:{port}");

    tracing::info!(addr = %bind_addr, "starting Kizuna MCP server on HTTP");

    let (app, sweeper) = setup_shared_state(config)?;

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(KizunaTools::new(app.clone())),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    sweeper.abort();
    Ok(())
}
