//! Sharpe ratio over daily returns.

use super::portfolio::PortfolioSnapshot;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Annualized Sharpe ratio using the sample standard deviation of excess
/// returns.
///
/// * empty input gives `0.0`
/// * zero volatility gives `+inf` for a positive mean and `0.0` otherwise
pub fn sharpe_ratio(daily_returns: &[f64], risk_free_rate: f64) -> f64 {
    if daily_returns.is_empty() {
        return 0.0;
    }

    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
    let excess: Vec<f64> = daily_returns.iter().map(|r| r - daily_rf).collect();

    let n = excess.len() as f64;
    let mean = excess.iter().sum::<f64>() / n;
    let annualized_mean = mean * TRADING_DAYS_PER_YEAR;

    let annualized_vol = if excess.iter().all(|&r| r == excess[0]) {
        0.0
    } else {
        sample_std_dev(&excess, mean) * TRADING_DAYS_PER_YEAR.sqrt()
    };

    if annualized_vol == 0.0 {
        return if annualized_mean > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };
    }

    annualized_mean / annualized_vol
}

fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Fractional day-over-day change of the portfolio total. The first snapshot
/// has no predecessor and is dropped; steps from a zero total are skipped.
pub fn daily_returns(portfolio: &[PortfolioSnapshot]) -> Vec<f64> {
    portfolio
        .windows(2)
        .filter_map(|w| {
            let prev = w[0].total;
            if prev == 0.0 {
                None
            } else {
                Some(w[1].total / prev - 1.0)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signal::Position;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_portfolio(totals: &[f64]) -> Vec<PortfolioSnapshot> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        totals
            .iter()
            .enumerate()
            .map(|(i, &total)| PortfolioSnapshot {
                date: start + chrono::Duration::days(i as i64),
                position: Position::Flat,
                price: 1.0,
                holdings: 0.0,
                cash: total,
                total,
            })
            .collect()
    }

    #[test]
    fn sharpe_empty_is_zero() {
        assert_eq!(sharpe_ratio(&[], 0.0), 0.0);
    }

    #[test]
    fn sharpe_constant_positive_is_infinite() {
        let returns = vec![0.01; 252];
        assert_eq!(sharpe_ratio(&returns, 0.0), f64::INFINITY);
    }

    #[test]
    fn sharpe_constant_zero_is_zero() {
        let returns = vec![0.0; 30];
        assert_eq!(sharpe_ratio(&returns, 0.0), 0.0);
    }

    #[test]
    fn sharpe_constant_negative_is_zero() {
        let returns = vec![-0.002; 30];
        assert_eq!(sharpe_ratio(&returns, 0.0), 0.0);
    }

    #[test]
    fn sharpe_single_positive_return_is_infinite() {
        assert_eq!(sharpe_ratio(&[0.05], 0.0), f64::INFINITY);
    }

    #[test]
    fn sharpe_risk_free_can_flip_constant_series() {
        // 0.0001 * 252 = 0.0252 of yearly return against a 5% risk-free rate.
        let returns = vec![0.0001; 10];
        assert_eq!(sharpe_ratio(&returns, 0.05), 0.0);
    }

    #[test]
    fn sharpe_mixed_returns_above_one() {
        let pattern = [0.01, 0.01, 0.01, -0.01, 0.01];
        let returns: Vec<f64> = pattern.iter().cycle().take(250).copied().collect();
        assert!(sharpe_ratio(&returns, 0.02) > 1.0);
    }

    #[test]
    fn sharpe_uses_sample_std_dev() {
        let returns = [0.01, -0.01];
        // mean 0 → ratio 0 regardless of denominator
        assert_relative_eq!(sharpe_ratio(&returns, 0.0), 0.0);

        let returns = [0.02, 0.0];
        // mean 0.01, sample std sqrt(0.0002)
        let expected = (0.01 * 252.0) / (0.0002_f64.sqrt() * 252.0_f64.sqrt());
        assert_relative_eq!(sharpe_ratio(&returns, 0.0), expected, max_relative = 1e-12);
    }

    #[test]
    fn sharpe_negative_mean_is_negative() {
        let returns = [-0.02, 0.0, -0.01];
        assert!(sharpe_ratio(&returns, 0.0) < 0.0);
    }

    #[test]
    fn daily_returns_drop_first_entry() {
        let returns = daily_returns(&make_portfolio(&[100.0, 110.0, 99.0]));
        assert_eq!(returns.len(), 2);
        assert_relative_eq!(returns[0], 0.1, max_relative = 1e-12);
        assert_relative_eq!(returns[1], -0.1, max_relative = 1e-12);
    }

    #[test]
    fn daily_returns_short_portfolios() {
        assert!(daily_returns(&[]).is_empty());
        assert!(daily_returns(&make_portfolio(&[100.0])).is_empty());
    }

    #[test]
    fn daily_returns_skip_zero_base() {
        let returns = daily_returns(&make_portfolio(&[0.0, 10.0, 11.0]));
        assert_eq!(returns.len(), 1);
        assert_relative_eq!(returns[0], 0.1, max_relative = 1e-12);
    }
}
