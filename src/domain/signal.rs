//! Dual moving-average crossover signal and trade extraction.
//!
//! The signal only covers dates where both averages are defined. Within that
//! restricted range every point defaults to flat, and only points from offset
//! `short_window` onwards (counted inside the restricted range, not the
//! original price index) are set long when the short average is above the
//! long one.
//!
//! Trades are emitted wherever the position delta is not zero. The first
//! point has no predecessor, so its delta is undefined; an undefined delta
//! counts as a change and is reported as a `SELL`.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use super::error::AxiomError;
use super::moving_average::simple_moving_average;
use super::price::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Flat,
    Long,
}

impl Position {
    pub fn units(self) -> i8 {
        match self {
            Position::Flat => 0,
            Position::Long => 1,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.units())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => f.pad("BUY"),
            TradeAction::Sell => f.pad("SELL"),
        }
    }
}

impl FromStr for TradeAction {
    type Err = AxiomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(TradeAction::Buy),
            "SELL" => Ok(TradeAction::Sell),
            other => Err(AxiomError::invalid_argument(format!(
                "unknown trade action: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trade {
    pub date: NaiveDate,
    pub price: f64,
    pub action: TradeAction,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub price: f64,
    pub short_mavg: f64,
    pub long_mavg: f64,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub short_window: usize,
    pub long_window: usize,
    pub points: Vec<SignalPoint>,
}

impl Signal {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Position change at each point; `None` for the first point.
    pub fn position_deltas(&self) -> Vec<Option<i8>> {
        let mut deltas = Vec::with_capacity(self.points.len());
        let mut previous: Option<Position> = None;
        for point in &self.points {
            deltas.push(previous.map(|prev| point.position.units() - prev.units()));
            previous = Some(point.position);
        }
        deltas
    }

    pub fn trades(&self) -> Vec<Trade> {
        self.points
            .iter()
            .zip(self.position_deltas())
            .filter_map(|(point, delta)| {
                let action = match delta {
                    Some(0) => return None,
                    Some(1) => TradeAction::Buy,
                    _ => TradeAction::Sell,
                };
                Some(Trade {
                    date: point.date,
                    price: point.price,
                    action,
                })
            })
            .collect()
    }
}

pub fn generate_crossover_signal(
    prices: &PriceSeries,
    short_window: usize,
    long_window: usize,
) -> Result<(Signal, Vec<Trade>), AxiomError> {
    let short_mavg = simple_moving_average(prices, short_window)?;
    let long_mavg = simple_moving_average(prices, long_window)?;

    let mut signal = Signal {
        short_window,
        long_window,
        points: Vec::new(),
    };

    if short_mavg.is_empty() || long_mavg.is_empty() {
        return Ok((signal, Vec::new()));
    }

    signal.points = prices
        .iter()
        .zip(short_mavg.values.iter().zip(&long_mavg.values))
        .filter_map(|(price, (short, long))| match (short.value, long.value) {
            (Some(s), Some(l)) => Some(SignalPoint {
                date: price.date,
                price: price.close,
                short_mavg: s,
                long_mavg: l,
                position: Position::Flat,
            }),
            _ => None,
        })
        .collect();

    for point in signal.points.iter_mut().skip(short_window) {
        if point.short_mavg > point.long_mavg {
            point.position = Position::Long;
        }
    }

    let trades = signal.trades();
    Ok((signal, trades))
}
