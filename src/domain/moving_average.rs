//! Simple moving average over close prices.
//!
//! SMA(n)[i] = (P[i-n+1] + ... + P[i]) / n
//! Warmup: the first (n-1) points carry no value.

use chrono::NaiveDate;

use super::error::AxiomError;
use super::price::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingAveragePoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverageSeries {
    pub window: usize,
    pub values: Vec<MovingAveragePoint>,
}

impl MovingAverageSeries {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

/// Converts a signed window (as read from config or a request body) into a
/// usable window length.
pub fn window_from_i64(window: i64) -> Result<usize, AxiomError> {
    if window <= 0 {
        return Err(AxiomError::invalid_argument(format!(
            "window size must be positive, got {window}"
        )));
    }
    usize::try_from(window).map_err(|_| AxiomError::invalid_argument("window size is too large"))
}

/// Returns an empty series when there are fewer prices than `window`.
pub fn simple_moving_average(
    prices: &PriceSeries,
    window: usize,
) -> Result<MovingAverageSeries, AxiomError> {
    if window == 0 {
        return Err(AxiomError::invalid_argument("window size must be positive"));
    }

    let points = prices.points();
    if points.len() < window {
        return Ok(MovingAverageSeries {
            window,
            values: Vec::new(),
        });
    }

    let values = points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let value = if i + 1 >= window {
                let sum: f64 = points[i + 1 - window..=i].iter().map(|p| p.close).sum();
                Some(sum / window as f64)
            } else {
                None
            };
            MovingAveragePoint {
                date: point.date,
                value,
            }
        })
        .collect();

    Ok(MovingAverageSeries { window, values })
}
