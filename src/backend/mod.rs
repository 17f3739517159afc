mod handlers;
mod routes;

use axum::{
    routing::get,
    Router,
};
use sqlx::{Pool, Sqlite};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

pub use handlers::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "Backend is running" }))
        .merge(routes::api_routes())
        .with_state(state)
}

/// Serves on an already bound listener (tests bind `127.0.0.1:0`).
pub async fn serve(listener: TcpListener, pool: Pool<Sqlite>) -> std::io::Result<()> {
    axum::serve(listener, router(AppState { db: pool })).await
}

pub async fn run_server(pool: Pool<Sqlite>, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", listener.local_addr()?);
    serve(listener, pool).await?;
    Ok(())
}
