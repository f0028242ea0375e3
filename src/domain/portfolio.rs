//! Portfolio replay of a crossover signal.
//!
//! holdings[t] = position[t] * price[t]
//! cash[t]     = initial_capital - sum(delta[s] * price[s] for s <= t)
//! total[t]    = cash[t] + holdings[t]
//!
//! The first point has no delta and contributes nothing to the cash sum.

use chrono::NaiveDate;

use super::signal::{Position, Signal};

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioSnapshot {
    pub date: NaiveDate,
    pub position: Position,
    pub price: f64,
    pub holdings: f64,
    pub cash: f64,
    pub total: f64,
}

pub fn simulate_portfolio(signal: &Signal, initial_capital: f64) -> Vec<PortfolioSnapshot> {
    let mut snapshots = Vec::with_capacity(signal.len());
    let mut spent = 0.0_f64;

    for (point, delta) in signal.points.iter().zip(signal.position_deltas()) {
        let delta = f64::from(delta.unwrap_or(0));
        spent += delta * point.price;

        let holdings = point.position.as_f64() * point.price;
        let cash = initial_capital - spent;

        snapshots.push(PortfolioSnapshot {
            date: point.date,
            position: point.position,
            price: point.price,
            holdings,
            cash,
            total: cash + holdings,
        });
    }

    snapshots
}
