//! Trailing time windows for charting and benchmark comparison.

use crate::types::EquityCurve;
use crate::{Error, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named trailing window ending at the evaluation time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Period {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "YTD")]
    YearToDate,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "5Y")]
    FiveYears,
    #[default]
    #[serde(rename = "MAX")]
    Max,
}

impl Period {
    pub const ALL: [Period; 8] = [
        Period::OneDay,
        Period::OneWeek,
        Period::OneMonth,
        Period::SixMonths,
        Period::YearToDate,
        Period::OneYear,
        Period::FiveYears,
        Period::Max,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Period::OneDay => "1D",
            Period::OneWeek => "1W",
            Period::OneMonth => "1M",
            Period::SixMonths => "6M",
            Period::YearToDate => "YTD",
            Period::OneYear => "1Y",
            Period::FiveYears => "5Y",
            Period::Max => "MAX",
        }
    }

    fn lookback_days(&self) -> Option<i64> {
        match self {
            Period::OneDay => Some(1),
            Period::OneWeek => Some(7),
            Period::OneMonth => Some(30),
            Period::SixMonths => Some(180),
            Period::OneYear => Some(365),
            Period::FiveYears => Some(1825),
            Period::YearToDate | Period::Max => None,
        }
    }

    /// Earliest instant included in the window, or `None` for no bound.
    pub fn start_threshold(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Period::Max => None,
            Period::YearToDate => NaiveDate::from_ymd_opt(now.year(), 1, 1)
                .map(|jan1| jan1.and_time(NaiveTime::MIN)),
            _ => self
                .lookback_days()
                .and_then(|days| now.checked_sub_signed(Duration::days(days))),
        }
    }

    /// Whether a date, taken at midnight, falls inside the window.
    pub fn contains(&self, date: NaiveDate, now: NaiveDateTime) -> bool {
        match self.start_threshold(now) {
            Some(threshold) => date.and_time(NaiveTime::MIN) >= threshold,
            None => true,
        }
    }

    /// Keep the points of `curve` that fall inside the window, in order.
    pub fn filter(&self, curve: &EquityCurve, now: NaiveDateTime) -> EquityCurve {
        curve
            .points()
            .iter()
            .filter(|p| self.contains(p.date, now))
            .copied()
            .collect()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_uppercase();
        Period::ALL
            .into_iter()
            .find(|p| p.label() == wanted)
            .ok_or_else(|| Error::InvalidPeriod(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EquityPoint;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        date.and_hms_opt(h, m, 0).unwrap()
    }

    fn daily_curve(start: NaiveDate, days: usize) -> EquityCurve {
        start
            .iter_days()
            .take(days)
            .enumerate()
            .map(|(i, date)| EquityPoint {
                date,
                equity: 1000.0 + i as f64,
            })
            .collect()
    }

    #[test]
    fn test_parse_and_display() {
        for period in Period::ALL {
            assert_eq!(period.to_string().parse::<Period>().unwrap(), period);
        }
        assert_eq!("ytd".parse::<Period>().unwrap(), Period::YearToDate);
        assert_eq!(" 1m ".parse::<Period>().unwrap(), Period::OneMonth);
        assert!(matches!(
            "2W".parse::<Period>(),
            Err(Error::InvalidPeriod(p)) if p == "2W"
        ));
        assert_eq!(Period::default(), Period::Max);
    }

    #[test]
    fn test_serde_uses_labels() {
        assert_eq!(serde_json::to_string(&Period::SixMonths).unwrap(), "\"6M\"");
        let parsed: Period = serde_json::from_str("\"5Y\"").unwrap();
        assert_eq!(parsed, Period::FiveYears);
    }

    #[test]
    fn test_one_day_boundary() {
        let now = at(ymd(2024, 3, 15), 10, 30);

        // Yesterday's midnight is earlier than now - 1 day
        assert!(!Period::OneDay.contains(ymd(2024, 3, 14), now));
        assert!(Period::OneDay.contains(ymd(2024, 3, 15), now));

        let midnight = at(ymd(2024, 3, 15), 0, 0);
        assert!(Period::OneDay.contains(ymd(2024, 3, 14), midnight));
    }

    #[test]
    fn test_one_week_window() {
        let now = at(ymd(2024, 3, 15), 12, 0);
        let curve = daily_curve(ymd(2024, 3, 1), 15);

        let filtered = Period::OneWeek.filter(&curve, now);

        assert_eq!(filtered.first().unwrap().date, ymd(2024, 3, 9));
        assert_eq!(filtered.last().unwrap().date, ymd(2024, 3, 15));
        assert_eq!(filtered.len(), 7);
    }

    #[test]
    fn test_ytd_starts_january_first() {
        let now = at(ymd(2024, 2, 10), 9, 0);
        let curve = daily_curve(ymd(2023, 12, 25), 48);

        let filtered = Period::YearToDate.filter(&curve, now);

        assert_eq!(filtered.first().unwrap().date, ymd(2024, 1, 1));
        assert!(filtered.points().iter().all(|p| p.date.year() == 2024));
    }

    #[test]
    fn test_max_keeps_everything() {
        let now = at(ymd(2024, 3, 15), 12, 0);
        let curve = daily_curve(ymd(2010, 1, 1), 100);

        assert_eq!(Period::Max.filter(&curve, now), curve);
        assert!(Period::FiveYears.filter(&curve, now).is_empty());
    }

    #[test]
    fn test_filter_preserves_order_and_values() {
        let now = at(ymd(2024, 3, 15), 12, 0);
        let curve = daily_curve(ymd(2024, 1, 1), 75);

        let filtered = Period::OneMonth.filter(&curve, now);

        assert!(filtered.points().windows(2).all(|w| w[0].date < w[1].date));
        for p in filtered.points() {
            assert!(curve.points().contains(p));
        }
    }

    #[test]
    fn test_thresholds() {
        let now = at(ymd(2024, 3, 15), 12, 0);
        assert_eq!(
            Period::SixMonths.start_threshold(now),
            Some(at(ymd(2023, 9, 17), 12, 0))
        );
        assert_eq!(
            Period::OneYear.start_threshold(now),
            Some(at(ymd(2023, 3, 16), 12, 0))
        );
        assert_eq!(Period::Max.start_threshold(now), None);
    }
}
