use anyhow::Result;
use axum::middleware;
use dotenv::dotenv;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

use api::{config::ApiConfig, observability, state::AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    observability::init();

    let config = ApiConfig::from_env()?;
    let port = config.port;
    let swagger_path = config.swagger.json_path();

    let state = AppState::new(config)?;
    tracing::info!(
        "Catalog loaded with fallback locale '{}'",
        state.catalog.fallback()
    );

    let app = api::app(state)
        .layer(middleware::from_fn(request_logger))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("API server listening on {} (docs at {})", addr, swagger_path);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn request_logger(
    req: axum::http::Request<axum::body::Body>,
    next: middleware::Next,
) -> axum::response::Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(req).await;

    let elapsed = start.elapsed().as_millis();
    let status = response.status().as_u16();

    tracing::info!("{method} {uri} {status} {elapsed}ms");

    response
}
