use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{
    callbacks::{DispatchError, Event, Registry, Update},
    dashboard::Dashboard,
    page::UPDATE_ROUTE,
};

#[derive(Debug, Clone)]
pub struct AppState {
    dashboard: Arc<Dashboard>,
    registry: Arc<Registry>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> AppState {
        AppState {
            dashboard: Arc::new(dashboard),
            registry: Arc::new(Registry::dashboard()),
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        warn!(error = %self, "rejected dashboard event");
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}

async fn page_handler(State(state): State<AppState>) -> Html<Bytes> {
    Html(state.dashboard.page())
}

async fn update_handler(
    State(state): State<AppState>,
    Json(event): Json<Event>,
) -> Result<Json<Update>, DispatchError> {
    state
        .registry
        .dispatch(&state.dashboard, event)
        .map(Json)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(page_handler))
        .route(UPDATE_ROUTE, post(update_handler))
        .with_state(state)
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            Err(e) => {
                warn!("unable to listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

pub async fn serve(bind: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("unable to bind {}", bind))?;
    info!("boxing-analytics listening on http://{}", bind);
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("server failed")?;
    info!("boxing-analytics stopped");
    Ok(())
}
