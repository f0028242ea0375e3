//! Close-price series for a single ticker.

use chrono::NaiveDate;

use super::error::AxiomError;
use super::ohlcv::OhlcvBar;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        PricePoint { date, close }
    }
}

/// Ordered `(date, close)` pairs. Dates are strictly increasing; gaps such as
/// non-trading days are simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, AxiomError> {
        if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(AxiomError::invalid_argument(format!(
                "price dates must be strictly increasing ({} followed by {})",
                pair[0].date, pair[1].date
            )));
        }
        Ok(PriceSeries { points })
    }

    pub fn empty() -> Self {
        PriceSeries::default()
    }

    /// Builds a series from bars already sorted by date.
    pub fn from_bars(bars: &[OhlcvBar]) -> Result<Self, AxiomError> {
        PriceSeries::new(
            bars.iter()
                .map(|b| PricePoint::new(b.date, b.close))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PricePoint> {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn accepts_increasing_dates() {
        let series = PriceSeries::new(vec![
            PricePoint::new(day(1), 10.0),
            PricePoint::new(day(2), 11.0),
            PricePoint::new(day(5), 12.0),
        ])
        .unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.points()[0].date, day(1));
        assert_eq!(series.points()[2].date, day(5));
    }

    #[test]
    fn rejects_duplicate_dates() {
        let result = PriceSeries::new(vec![
            PricePoint::new(day(1), 10.0),
            PricePoint::new(day(1), 11.0),
        ]);
        assert!(matches!(result, Err(AxiomError::InvalidArgument { .. })));
    }

    #[test]
    fn rejects_decreasing_dates() {
        let result = PriceSeries::new(vec![
            PricePoint::new(day(3), 10.0),
            PricePoint::new(day(2), 11.0),
        ]);
        assert!(matches!(result, Err(AxiomError::InvalidArgument { .. })));
    }

    #[test]
    fn empty_series() {
        let series = PriceSeries::empty();
        assert!(series.is_empty());
        assert_eq!(series.len(), 0);
    }

    #[test]
    fn from_bars_uses_close() {
        let bars = vec![OhlcvBar {
            ticker: "AAPL".into(),
            date: day(2),
            open: 1.0,
            high: 3.0,
            low: 0.5,
            close: 2.5,
            volume: 10,
        }];
        let series = PriceSeries::from_bars(&bars).unwrap();
        assert_eq!(series.points()[0], PricePoint::new(day(2), 2.5));
    }
}
