//! HTTP request handlers for the web adapter.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{error, info};

use crate::domain::backtest::{DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW};
use crate::domain::error::AxiomError;
use crate::domain::run::{BacktestRequest, BacktestRun};
use crate::ports::store_port::{BacktestStore, RunStore};
use crate::service::execute_run;

use super::{AppState, WebError};

#[derive(Debug, Deserialize)]
pub struct BacktestRequestBody {
    pub ticker: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default = "default_short_window")]
    pub short_window: i64,
    #[serde(default = "default_long_window")]
    pub long_window: i64,
}

fn default_short_window() -> i64 {
    DEFAULT_SHORT_WINDOW as i64
}

fn default_long_window() -> i64 {
    DEFAULT_LONG_WINDOW as i64
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BacktestCreateResponse {
    pub message: String,
    pub run_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResultResponse {
    pub id: i64,
    pub ticker: String,
    pub start_date: String,
    pub end_date: String,
    pub short_window: i64,
    pub long_window: i64,
    pub status: String,
    pub sharpe_ratio: Option<f64>,
    pub trade_count: Option<i64>,
    pub final_portfolio_value: Option<f64>,
}

impl From<BacktestRun> for ResultResponse {
    fn from(run: BacktestRun) -> Self {
        Self {
            id: run.id,
            ticker: run.ticker,
            start_date: run.start_date.format("%Y-%m-%d").to_string(),
            end_date: run.end_date.format("%Y-%m-%d").to_string(),
            short_window: run.short_window,
            long_window: run.long_window,
            status: run.status.to_string(),
            // JSON has no infinity
            sharpe_ratio: run.sharpe_ratio.filter(|s| s.is_finite()),
            trade_count: run.trade_count,
            final_portfolio_value: run.final_portfolio_value,
        }
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, WebError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| WebError::bad_request(format!("invalid {field}, expected YYYY-MM-DD")))
}

impl BacktestRequestBody {
    fn into_request(self) -> Result<BacktestRequest, WebError> {
        let ticker = self.ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(WebError::bad_request("ticker must not be empty"));
        }

        let request = BacktestRequest {
            ticker,
            start_date: parse_date("start_date", &self.start_date)?,
            end_date: parse_date("end_date", &self.end_date)?,
            short_window: self.short_window,
            long_window: self.long_window,
        };
        request.to_config()?;
        Ok(request)
    }
}

/// Runs a store call on the blocking pool. The database clients are
/// synchronous and must stay off the async workers.
async fn with_store<T, F>(state: &AppState, f: F) -> Result<T, WebError>
where
    F: FnOnce(&dyn BacktestStore) -> Result<T, AxiomError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    Ok(tokio::task::spawn_blocking(move || f(store.as_ref())).await??)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn create_backtest(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BacktestRequestBody>,
) -> Result<(StatusCode, Json<BacktestCreateResponse>), WebError> {
    let request = body.into_request()?;
    let run_id = with_store(&state, {
        let request = request.clone();
        move |store| store.create_run(&request)
    })
    .await?;
    info!(run_id, ticker = %request.ticker, "backtest run queued");

    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || {
        if let Err(e) = execute_run(store.as_ref(), run_id, &request) {
            error!(run_id, error = %e, "could not record backtest outcome");
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(BacktestCreateResponse {
            message: "Backtest run started".to_string(),
            run_id,
        }),
    ))
}

pub async fn get_result(
    State(state): State<Arc<AppState>>,
    Path(run_id): Path<i64>,
) -> Result<Json<ResultResponse>, WebError> {
    match with_store(&state, move |store| store.get_run(run_id)).await? {
        Some(run) => Ok(Json(run.into())),
        None => Err(WebError::not_found("Result not found")),
    }
}

pub async fn not_found() -> WebError {
    WebError::not_found("Not Found")
}
