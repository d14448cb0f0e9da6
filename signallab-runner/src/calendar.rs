//! Calendar grids: daily PnL bucketed by (year, weekday) and
//! (year, month), dense over the full bucket domain with synthesized
//! totals.

use crate::ledger::DayPnl;
use crate::metrics::round2;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trading weekdays. Saturday is a real bucket (exchanges schedule
/// occasional Saturday sessions); Sunday entries are skipped.
pub const WEEKDAY_LABELS: [&str; 6] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const MONTH_LABELS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One grid row: a year (or "Total") with one cell per bucket plus a
/// row-wise total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarRow {
    pub year: String,
    pub cells: Vec<f64>,
    pub total: f64,
}

/// A dense year × bucket grid. Every bucket of every covered year is
/// present, zero-filled when empty; the last row is the column-wise
/// "Total".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarGrid {
    pub labels: Vec<String>,
    pub rows: Vec<CalendarRow>,
}

impl CalendarGrid {
    fn build(daily: &[DayPnl], labels: &[&str], bucket_of: impl Fn(&DayPnl) -> Option<usize>) -> Self {
        let width = labels.len();
        let mut years: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
        for day in daily {
            let Some(bucket) = bucket_of(day) else { continue };
            years.entry(day.date.year()).or_insert_with(|| vec![0.0; width])[bucket] += day.pnl;
        }

        let mut column_totals = vec![0.0; width];
        let mut rows: Vec<CalendarRow> = years
            .into_iter()
            .map(|(year, cells)| {
                for (total, cell) in column_totals.iter_mut().zip(&cells) {
                    *total += cell;
                }
                CalendarRow {
                    year: year.to_string(),
                    total: round2(cells.iter().sum()),
                    cells: cells.into_iter().map(round2).collect(),
                }
            })
            .collect();

        rows.push(CalendarRow {
            year: "Total".into(),
            total: round2(column_totals.iter().sum()),
            cells: column_totals.into_iter().map(round2).collect(),
        });

        Self {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            rows,
        }
    }

    /// PnL by (year, weekday), Monday through Saturday.
    pub fn by_weekday(daily: &[DayPnl]) -> Self {
        Self::build(daily, &WEEKDAY_LABELS, |day| {
            let idx = day.date.weekday().num_days_from_monday() as usize;
            (idx < WEEKDAY_LABELS.len()).then_some(idx)
        })
    }

    /// PnL by (year, month).
    pub fn by_month(daily: &[DayPnl]) -> Self {
        Self::build(daily, &MONTH_LABELS, |day| {
            Some(day.date.month0() as usize)
        })
    }

    /// Month grid over PnL expressed as percent of the strategy's
    /// required margin. All-zero when the margin is 0.
    pub fn by_month_margin_pct(daily: &[DayPnl], margin: f64) -> Self {
        let scaled: Vec<DayPnl> = daily
            .iter()
            .map(|day| DayPnl {
                date: day.date,
                pnl: if margin != 0.0 {
                    day.pnl / margin * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        Self::by_month(&scaled)
    }
}
