//! HTTP Routes - Trigger, Read-side and Health Endpoints
//!
//! - `GET  /api/cron/liquidity-probe`: run one sweep (bearer secret)
//! - `POST /api/liquidity/seed`: seed missing pair states (bearer secret)
//! - `GET  /api/liquidity`: liquidity table rows
//! - `GET  /live`: liveness probe
//! - `GET  /ready`: readiness (not shutting down, store writable)

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::{broadcast, watch};
use tracing::{info, instrument};

use super::auth::TriggerAuth;
use super::error::ApiError;
use crate::config::AppConfig;
use crate::domain::PairRegistry;
use crate::ports::LiquidityRow;
use crate::usecases::LiquidityProbeScheduler;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct ApiState {
    pub scheduler: Arc<LiquidityProbeScheduler>,
    /// Latest config; the registry is rebuilt from its catalog per request.
    pub config_rx: watch::Receiver<AppConfig>,
    pub auth: Arc<TriggerAuth>,
    /// Cleared on shutdown so readiness reports 503.
    pub accepting: Arc<AtomicBool>,
}

impl ApiState {
    fn registry(&self) -> PairRegistry {
        PairRegistry::from_catalog(&self.config_rx.borrow().tokens)
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        if self.auth.verify(header) {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

/// Build the API router.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/cron/liquidity-probe", get(trigger_sweep))
        .route("/api/liquidity/seed", post(seed_pairs))
        .route("/api/liquidity", get(list_liquidity))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
        .with_state(state)
}

/// Axum-based API server.
pub struct ApiServer {
    state: ApiState,
    bind_address: String,
}

impl ApiServer {
    pub fn new(state: ApiState, bind_address: String) -> Self {
        Self {
            state,
            bind_address,
        }
    }

    /// Serve until the shutdown signal fires.
    #[instrument(skip(self, shutdown_rx), fields(address = %self.bind_address))]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.bind_address).await?;
        info!("API server started");

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

/// Scheduled trigger: run one sweep over the current registry.
pub async fn trigger_sweep(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    state.authorize(&headers)?;
    let registry = state.registry();
    let report = state.scheduler.run_sweep(&registry).await?;
    Ok(Json(json!({ "error": null, "sweep": report })))
}

/// Seed default state for registry pairs without a record.
pub async fn seed_pairs(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    state.authorize(&headers)?;
    let registry = state.registry();
    let inserted = state
        .scheduler
        .seed_missing(&registry)
        .await
        .map_err(ApiError::Store)?;
    Ok(Json(json!({ "error": null, "inserted": inserted })))
}

/// Read-side listing of the liquidity table.
pub async fn list_liquidity(
    State(state): State<ApiState>,
) -> Result<Json<Vec<LiquidityRow>>, ApiError> {
    let rows = state.scheduler.store().rows().await.map_err(ApiError::Store)?;
    Ok(Json(rows))
}

async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn readiness(State(state): State<ApiState>) -> impl IntoResponse {
    if state.accepting.load(Ordering::Relaxed) && state.scheduler.store().is_healthy().await {
        (StatusCode::OK, "READY")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
    }
}
