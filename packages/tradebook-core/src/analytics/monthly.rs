//! Month-by-month return table.

use crate::types::{EquityCurve, MonthlyReturn};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// One year of the monthly table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyRow {
    pub year: i32,
    /// Return percentage per calendar month, January first; 0 where no data
    pub months: [f64; 12],
    /// Arithmetic sum of the twelve monthly returns
    pub total: f64,
}

/// Year-by-month grid of returns.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MonthlyTable {
    /// Rows in ascending year order
    pub rows: Vec<MonthlyRow>,
}

impl MonthlyTable {
    /// Pivot monthly returns into a year-by-month grid.
    ///
    /// Months without data are 0. Each year's total is the plain sum of its
    /// monthly percentages, not a compounded return.
    pub fn from_returns(returns: &[MonthlyReturn]) -> Self {
        let mut rows: Vec<MonthlyRow> = Vec::new();

        for r in returns {
            let idx = match rows.binary_search_by_key(&r.year, |row| row.year) {
                Ok(idx) => idx,
                Err(idx) => {
                    rows.insert(
                        idx,
                        MonthlyRow {
                            year: r.year,
                            months: [0.0; 12],
                            total: 0.0,
                        },
                    );
                    idx
                }
            };
            if (1..=12).contains(&r.month) {
                rows[idx].months[(r.month - 1) as usize] = r.return_percent;
            }
        }

        for row in &mut rows {
            row.total = row.months.iter().sum();
        }

        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn year(&self, year: i32) -> Option<&MonthlyRow> {
        self.rows.iter().find(|row| row.year == year)
    }
}

/// Month-over-month returns of an equity curve.
///
/// Each month closes at its last observed equity value. The first month has
/// no baseline and is reported as 0%, as is any month following a zero close.
pub fn monthly_returns(curve: &EquityCurve) -> Vec<MonthlyReturn> {
    let mut closes: Vec<(i32, u32, f64)> = Vec::new();
    for point in curve.points() {
        let key = (point.date.year(), point.date.month());
        match closes.last_mut() {
            Some(last) if (last.0, last.1) == key => last.2 = point.equity,
            _ => closes.push((key.0, key.1, point.equity)),
        }
    }

    let mut previous: Option<f64> = None;
    closes
        .into_iter()
        .map(|(year, month, close)| {
            let return_percent = match previous {
                Some(prev) if prev > 0.0 => (close - prev) / prev * 100.0,
                _ => 0.0,
            };
            previous = Some(close);
            MonthlyReturn {
                year,
                month,
                return_percent,
            }
        })
        .collect()
}

/// Year-by-month return table of an equity curve.
pub fn monthly_table(curve: &EquityCurve) -> MonthlyTable {
    MonthlyTable::from_returns(&monthly_returns(curve))
}
