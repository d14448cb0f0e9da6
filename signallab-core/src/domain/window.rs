//! TradeWindow — a resolved entry→exit time span for one intended trade.

use super::signal::Direction;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A tradeable time window synthesized from paired signals.
///
/// Invariant: `entry_at() <= exit_at()`. Windows violating it are
/// rejected during pairing, not repaired.
///
/// A window that spans an expiry boundary is expanded into a chain of
/// legs; every leg after the first carries `is_rollover_leg = true` and
/// enters on the previous leg's exit date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeWindow {
    pub trade_no: i64,
    pub direction: Direction,

    pub entry_date: NaiveDate,
    pub entry_time: NaiveTime,
    pub exit_date: NaiveDate,
    pub exit_time: NaiveTime,

    pub lots: f64,
    pub is_rollover_leg: bool,

    /// Square-off time used when the leg's exit lands on an expiry day:
    /// the rollover time for intermediate legs, the leg's own exit time
    /// for terminal legs, the configured expiry-day exit otherwise.
    pub expiry_day_exit_time: NaiveTime,

    pub entry_price: Option<f64>,
    pub exit_price: Option<f64>,
}

impl TradeWindow {
    pub fn entry_at(&self) -> NaiveDateTime {
        self.entry_date.and_time(self.entry_time)
    }

    pub fn exit_at(&self) -> NaiveDateTime {
        self.exit_date.and_time(self.exit_time)
    }

    /// True when the window opens and closes on the same calendar day.
    pub fn is_intraday(&self) -> bool {
        self.entry_date == self.exit_date
    }
}
