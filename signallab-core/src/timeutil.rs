//! Time-of-day helpers for signal adjustment.

use chrono::{Duration, NaiveTime};

/// Shift a time-of-day by a signed number of seconds, wrapping within the day.
///
/// Configured entry/exit offsets are small (seconds to minutes) and
/// intraday, so wrap-around is tolerated rather than treated as a date
/// change.
pub fn shift_time(time: NaiveTime, seconds: i64) -> NaiveTime {
    if seconds == 0 {
        return time;
    }
    time.overflowing_add_signed(Duration::seconds(seconds)).0
}
