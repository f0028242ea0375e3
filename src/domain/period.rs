//! Lookback periods used when ingesting market data (`5d`, `1mo`, `5y`, `ytd`, `max`).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};

use super::error::AxiomError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Days(u32),
    Months(u32),
    Years(u32),
    YearToDate,
    Max,
}

impl Default for Period {
    fn default() -> Self {
        Period::Years(5)
    }
}

impl Period {
    /// First date covered by the period when it ends on `end`, inclusive; `None`
    /// means unbounded. `5d` ending on the 31st covers the 27th through the 31st.
    pub fn start_date(&self, end: NaiveDate) -> Option<NaiveDate> {
        let lookback = match *self {
            Period::Days(n) => end.checked_sub_days(Days::new(u64::from(n))),
            Period::Months(n) => end.checked_sub_months(Months::new(n)),
            Period::Years(n) => end.checked_sub_months(Months::new(n.saturating_mul(12))),
            Period::YearToDate => return NaiveDate::from_ymd_opt(end.year(), 1, 1),
            Period::Max => return None,
        };
        lookback.and_then(|d| d.succ_opt())
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Days(n) => write!(f, "{n}d"),
            Period::Months(n) => write!(f, "{n}mo"),
            Period::Years(n) => write!(f, "{n}y"),
            Period::YearToDate => write!(f, "ytd"),
            Period::Max => write!(f, "max"),
        }
    }
}

impl FromStr for Period {
    type Err = AxiomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "max" => return Ok(Period::Max),
            "ytd" => return Ok(Period::YearToDate),
            _ => {}
        }

        let invalid = || AxiomError::invalid_argument(format!("invalid period: {s:?}"));

        let split = s.find(|c: char| !c.is_ascii_digit()).ok_or_else(invalid)?;
        let (digits, unit) = s.split_at(split);
        let count: u32 = digits.parse().map_err(|_| invalid())?;
        if count == 0 {
            return Err(invalid());
        }

        match unit {
            "d" => Ok(Period::Days(count)),
            "mo" => Ok(Period::Months(count)),
            "y" => Ok(Period::Years(count)),
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_known_forms() {
        assert_eq!("5d".parse::<Period>().unwrap(), Period::Days(5));
        assert_eq!("1mo".parse::<Period>().unwrap(), Period::Months(1));
        assert_eq!("5y".parse::<Period>().unwrap(), Period::Years(5));
        assert_eq!("YTD".parse::<Period>().unwrap(), Period::YearToDate);
        assert_eq!(" max ".parse::<Period>().unwrap(), Period::Max);
    }

    #[test]
    fn rejects_garbage() {
        assert!("".parse::<Period>().is_err());
        assert!("y".parse::<Period>().is_err());
        assert!("10".parse::<Period>().is_err());
        assert!("0y".parse::<Period>().is_err());
        assert!("3w".parse::<Period>().is_err());
    }

    #[test]
    fn display_round_trips() {
        for p in [
            Period::Days(5),
            Period::Months(6),
            Period::Years(2),
            Period::YearToDate,
            Period::Max,
        ] {
            assert_eq!(p.to_string().parse::<Period>().unwrap(), p);
        }
    }

    #[test]
    fn default_is_five_years() {
        assert_eq!(Period::default(), Period::Years(5));
    }

    #[test]
    fn start_dates() {
        let end = date(2024, 3, 31);
        assert_eq!(Period::Days(5).start_date(end), Some(date(2024, 3, 27)));
        assert_eq!(Period::Months(1).start_date(end), Some(date(2024, 3, 1)));
        assert_eq!(Period::Years(1).start_date(end), Some(date(2023, 4, 1)));
        assert_eq!(Period::YearToDate.start_date(end), Some(date(2024, 1, 1)));
        assert_eq!(Period::Max.start_date(end), None);
    }

    #[test]
    fn day_period_covers_exactly_n_days() {
        let end = date(2024, 1, 10);
        let start = Period::Days(5).start_date(end).unwrap();
        assert_eq!((end - start).num_days() + 1, 5);

        let start = Period::Years(1).start_date(date(2024, 1, 2)).unwrap();
        assert_eq!(start, date(2023, 1, 3));
    }
}
