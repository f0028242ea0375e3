//! Web server adapter.
//!
//! JSON API over axum for submitting backtest runs and reading their results.
//! Runs execute on the blocking pool; clients poll `/results/{id}`.

mod error;
mod handlers;

pub use error::{WebError, status_from_error};
pub use handlers::{BacktestCreateResponse, BacktestRequestBody, ResultResponse};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::ports::store_port::BacktestStore;

pub struct AppState {
    pub store: Arc<dyn BacktestStore>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/backtest", post(handlers::create_backtest))
        .route("/results/{run_id}", get(handlers::get_result))
        .fallback(handlers::not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(Arc::new(state))
}
