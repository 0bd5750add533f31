pub mod auth;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use pagewright_core::Config;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health))
        .route("/build", post(routes::build::build))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the pagewright agent server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let port = config.port;
    let state = state::AppState::new(config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    tracing::info!("pagewright listening on http://localhost:{port}");
    axum::serve(listener, app).await?;
    Ok(())
}
