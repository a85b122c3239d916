use std::{net::SocketAddr, sync::Arc};

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use server_api::{
    product::{ProductMapper, ProductValidator},
    EntityController,
};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::ProductViewModel,
};
use storage::{Product, Storage};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod resource;

use app_state::AppState;
use config::{load_settings, prepare_database_url};
use resource::resource_routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let app = build_router(AppState { storage }, settings.max_body_bytes);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let products: EntityController<Product, ProductViewModel> = EntityController::new(
        Arc::new(state.storage.clone()),
        Arc::new(ProductMapper),
        Arc::new(ProductValidator),
    );

    Router::new()
        .route("/healthz", get(healthz))
        .with_state(Arc::new(state))
        .merge(resource_routes("/products", products))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
}

async fn healthz(
    State(state): State<Arc<AppState>>,
) -> Result<&'static str, (StatusCode, Json<ApiError>)> {
    state.storage.health_check().await.map_err(|e| {
        error!(error = %e, "health check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new(ErrorCode::Unavailable, "storage unavailable")),
        )
    })?;
    Ok("ok")
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
