//! Stage 4: expiry-spanning windows → chains of expiry-bounded legs.

use crate::domain::TradeWindow;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::{debug, warn};

/// Expiry calendar for one traded instrument.
///
/// Maps each trading date to its upcoming expiry dates, nearest first,
/// as delivered by the rollover calendar provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpiryCalendar {
    expiries: BTreeMap<NaiveDate, Vec<NaiveDate>>,
}

impl ExpiryCalendar {
    pub fn new(expiries: BTreeMap<NaiveDate, Vec<NaiveDate>>) -> Self {
        Self { expiries }
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }

    /// Nearest expiry on or after the given trading date, if the date
    /// is known to the calendar.
    pub fn nearest_expiry(&self, date: NaiveDate) -> Option<NaiveDate> {
        self.expiries.get(&date).and_then(|e| e.first().copied())
    }

    /// First expiry of the next trading date strictly after `expiry`.
    pub fn next_expiry_after(&self, expiry: NaiveDate) -> Option<NaiveDate> {
        self.expiries
            .range((Bound::Excluded(expiry), Bound::Unbounded))
            .next()
            .and_then(|(_, e)| e.first().copied())
    }
}

/// Expand one window into its rollover chain.
///
/// A window closing on or before its entry date's nearest expiry passes
/// through unchanged. Otherwise the chain is: an initial leg clipped to
/// that expiry at the rollover time, one full expiry-to-expiry leg per
/// complete cycle, and a terminal leg ending at the original exit.
/// Every continuation leg enters on the previous leg's exit date, so
/// adjacent legs always share a date.
///
/// A window whose entry date has no expiry mapping is dropped — fatal
/// to the window, not to the batch.
pub fn expand_rollover(
    window: TradeWindow,
    calendar: &ExpiryCalendar,
    rollover_time: NaiveTime,
) -> Vec<TradeWindow> {
    let Some(mut current_expiry) = calendar.nearest_expiry(window.entry_date) else {
        warn!(
            trade_no = window.trade_no,
            entry_date = %window.entry_date,
            "dropping window: no expiry mapping for entry date"
        );
        return Vec::new();
    };

    if window.exit_date <= current_expiry {
        return vec![window];
    }

    debug!(trade_no = window.trade_no, "expanding window across expiry boundaries");

    let mut legs = vec![TradeWindow {
        exit_date: current_expiry,
        exit_time: rollover_time,
        expiry_day_exit_time: rollover_time,
        ..window.clone()
    }];

    loop {
        let entry_date = legs[legs.len() - 1].exit_date;

        match calendar.next_expiry_after(current_expiry) {
            // An expiry landing exactly on the exit date still gets its
            // full expiry-to-expiry leg; only the terminal leg may end
            // at the original exit time.
            Some(next) if next <= window.exit_date => {
                legs.push(TradeWindow {
                    entry_date,
                    entry_time: rollover_time,
                    exit_date: next,
                    exit_time: rollover_time,
                    is_rollover_leg: true,
                    expiry_day_exit_time: rollover_time,
                    ..window.clone()
                });
                current_expiry = calendar.nearest_expiry(next).unwrap_or(next);
            }
            next => {
                if next.is_none() && entry_date < window.exit_date {
                    // Calendar exhausted before the window's exit:
                    // close the chain at the original exit rather than
                    // failing the batch.
                    warn!(
                        trade_no = window.trade_no,
                        "expiry calendar exhausted before window exit; closing chain early"
                    );
                }
                legs.push(TradeWindow {
                    entry_date,
                    entry_time: rollover_time,
                    exit_date: window.exit_date,
                    exit_time: window.exit_time,
                    is_rollover_leg: true,
                    expiry_day_exit_time: window.exit_time,
                    ..window.clone()
                });
                return legs;
            }
        }
    }
}
