//! Stage 5: intraday square-off clipping.

use crate::config::RunParams;
use crate::domain::TradeWindow;
use tracing::debug;

/// Clip windows to the intraday square-off when exit signals are not
/// honored.
///
/// Any window (or rollover leg — each leg is clipped independently)
/// whose exit lands on a later day, or after the configured intraday
/// exit time, is forced to close on its entry date at the cutoff.
/// A no-op when exit signals are honored or square-off is disabled.
pub fn finalize_windows(mut windows: Vec<TradeWindow>, params: &RunParams) -> Vec<TradeWindow> {
    if params.honor_exit_signals || !params.intraday_square_off {
        return windows;
    }

    for window in &mut windows {
        if window.exit_date != window.entry_date || window.exit_time > params.intraday_exit_time {
            debug!(trade_no = window.trade_no, "clipping window to intraday square-off");
            window.exit_date = window.entry_date;
            window.exit_time = params.intraday_exit_time;
        }
    }

    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_params;
    use crate::domain::Direction;
    use chrono::{NaiveDate, NaiveTime};

    fn window(exit_day: u32, exit_h: u32, exit_m: u32) -> TradeWindow {
        TradeWindow {
            trade_no: 1,
            direction: Direction::Long,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            entry_time: NaiveTime::from_hms_opt(9, 20, 0).unwrap(),
            exit_date: NaiveDate::from_ymd_opt(2024, 1, exit_day).unwrap(),
            exit_time: NaiveTime::from_hms_opt(exit_h, exit_m, 0).unwrap(),
            lots: 75.0,
            is_rollover_leg: false,
            expiry_day_exit_time: NaiveTime::from_hms_opt(15, 20, 0).unwrap(),
            entry_price: None,
            exit_price: None,
        }
    }

    fn square_off_params() -> RunParams {
        let mut p = test_params();
        p.honor_exit_signals = false;
        p.intraday_square_off = true;
        p
    }

    #[test]
    fn clips_multi_day_window_to_entry_date() {
        let out = finalize_windows(vec![window(5, 15, 0)], &square_off_params());
        assert_eq!(out[0].exit_date, out[0].entry_date);
        assert_eq!(out[0].exit_time, NaiveTime::from_hms_opt(15, 15, 0).unwrap());
    }

    #[test]
    fn clips_exit_past_the_cutoff() {
        let out = finalize_windows(vec![window(2, 15, 30)], &square_off_params());
        assert_eq!(out[0].exit_time, NaiveTime::from_hms_opt(15, 15, 0).unwrap());
    }

    #[test]
    fn leaves_compliant_window_alone() {
        let out = finalize_windows(vec![window(2, 14, 0)], &square_off_params());
        assert_eq!(out[0].exit_time, NaiveTime::from_hms_opt(14, 0, 0).unwrap());
    }

    #[test]
    fn noop_when_exit_signals_are_honored() {
        let out = finalize_windows(vec![window(5, 15, 30)], &test_params());
        assert_eq!(out[0].exit_date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }
}
