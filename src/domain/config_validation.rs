//! Configuration validation.
//!
//! Validates config fields before a backtest or ingest runs.

use crate::domain::error::AxiomError;
use crate::domain::period::Period;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), AxiomError> {
    validate_window(config, "short_window")?;
    validate_window(config, "long_window")?;
    validate_initial_capital(config)?;
    validate_risk_free_rate(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_ingest_config(config: &dyn ConfigPort) -> Result<(), AxiomError> {
    if let Some(period) = config.get_string("ingest", "period") {
        period
            .parse::<Period>()
            .map_err(|e| AxiomError::ConfigInvalid {
                section: "ingest".to_string(),
                key: "period".to_string(),
                reason: e.to_string(),
            })?;
    }
    match config.get_string("ingest", "source").as_deref() {
        None | Some("csv") | Some("yahoo") => Ok(()),
        Some(other) => Err(AxiomError::ConfigInvalid {
            section: "ingest".to_string(),
            key: "source".to_string(),
            reason: format!("unknown source {other:?} (expected csv or yahoo)"),
        }),
    }
}

/// Parses `[backtest] key` when present; text that does not parse is rejected
/// instead of falling back to a default.
fn parse_optional_number<T: FromStr>(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<T>, AxiomError> {
    match config.get_string("backtest", key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AxiomError::ConfigInvalid {
                section: "backtest".to_string(),
                key: key.to_string(),
                reason: format!("{key} is not a number: {raw:?}"),
            }),
    }
}

fn validate_window(config: &dyn ConfigPort, key: &str) -> Result<(), AxiomError> {
    if let Some(value) = parse_optional_number::<i64>(config, key)? {
        if value <= 0 {
            return Err(AxiomError::ConfigInvalid {
                section: "backtest".to_string(),
                key: key.to_string(),
                reason: format!("{key} must be positive"),
            });
        }
    }
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), AxiomError> {
    if let Some(value) = parse_optional_number::<f64>(config, "initial_capital")? {
        if value <= 0.0 || !value.is_finite() {
            return Err(AxiomError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "initial_capital".to_string(),
                reason: "initial_capital must be positive".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), AxiomError> {
    if let Some(value) = parse_optional_number::<f64>(config, "risk_free_rate")? {
        if !(0.0..1.0).contains(&value) {
            return Err(AxiomError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "risk_free_rate".to_string(),
                reason: "risk_free_rate must be between 0 and 1".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), AxiomError> {
    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(AxiomError::ConfigInvalid {
                section: "backtest".to_string(),
                key: "start_date".to_string(),
                reason: "start_date must not be after end_date".to_string(),
            });
        }
    }
    Ok(())
}

pub fn parse_optional_date(
    config: &dyn ConfigPort,
    field: &str,
) -> Result<Option<NaiveDate>, AxiomError> {
    match config.get_string("backtest", field) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| AxiomError::ConfigInvalid {
                section: "backtest".to_string(),
                key: field.to_string(),
                reason: format!("invalid {} format, expected YYYY-MM-DD", field),
            }),
    }
}
