//! Property tests for the signal pipeline invariants.

use chrono::{NaiveDate, NaiveTime};
use proptest::prelude::*;
use signallab_core::config::RunParams;
use signallab_core::domain::{Direction, Signal, TradeWindow};
use signallab_core::pipeline::pair::pair_signals;
use signallab_core::pipeline::rollover::{expand_rollover, ExpiryCalendar};
use std::collections::BTreeMap;

fn params() -> RunParams {
    RunParams {
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        signal_datetime_format: "%Y-%m-%d %H:%M:%S".into(),
        manual_trade_entry_time: None,
        manual_trade_lots: 0.0,
        first_trade_entry_time: None,
        honor_exit_signals: true,
        entry_time_shift_secs: 0,
        exit_time_shift_secs: 0,
        intraday_square_off: false,
        intraday_exit_time: NaiveTime::from_hms_opt(15, 15, 0).unwrap(),
        expiry_day_exit_time: NaiveTime::from_hms_opt(15, 20, 0).unwrap(),
        rollover: false,
        rollover_time: NaiveTime::from_hms_opt(15, 25, 0).unwrap(),
        tax_rate: 0.0,
        capital: 100_000.0,
    }
}

/// Weekly expiries across 2024, every day mapped to its upcoming list.
fn weekly_calendar() -> ExpiryCalendar {
    let start = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
    let expiries: Vec<NaiveDate> = (0..52).map(|w| start + chrono::Days::new(w * 7)).collect();

    let mut map = BTreeMap::new();
    let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 12, 20).unwrap();
    while date <= end {
        let upcoming: Vec<NaiveDate> = expiries.iter().copied().filter(|e| *e >= date).collect();
        map.insert(date, upcoming);
        date = date + chrono::Days::new(1);
    }
    ExpiryCalendar::new(map)
}

fn window(entry_offset: u64, exit_offset: u64) -> TradeWindow {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    TradeWindow {
        trade_no: 1,
        direction: Direction::Long,
        entry_date: base + chrono::Days::new(entry_offset),
        entry_time: NaiveTime::from_hms_opt(9, 20, 0).unwrap(),
        exit_date: base + chrono::Days::new(entry_offset + exit_offset),
        exit_time: NaiveTime::from_hms_opt(15, 15, 0).unwrap(),
        lots: 75.0,
        is_rollover_leg: false,
        expiry_day_exit_time: NaiveTime::from_hms_opt(15, 20, 0).unwrap(),
        entry_price: None,
        exit_price: None,
    }
}

fn signal(trade_no: i64, label: &str, minute_of_day: u32) -> Signal {
    Signal {
        trade_no,
        kind: Direction::Long,
        label: label.into(),
        at: NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9 + minute_of_day / 60, minute_of_day % 60, 0)
            .unwrap(),
        lots: 75.0,
        price: None,
    }
}

proptest! {
    /// Adjacent rollover legs always share a date, and the chain's
    /// final exit equals the original window's exit.
    #[test]
    fn rollover_chain_is_adjacent_and_exit_preserving(
        entry_offset in 0u64..200,
        exit_offset in 1u64..150,
    ) {
        let calendar = weekly_calendar();
        let original = window(entry_offset, exit_offset);
        let legs = expand_rollover(original.clone(), &calendar, NaiveTime::from_hms_opt(15, 25, 0).unwrap());

        prop_assert!(!legs.is_empty());
        for pair in legs.windows(2) {
            prop_assert_eq!(pair[0].exit_date, pair[1].entry_date);
        }
        let last = &legs[legs.len() - 1];
        prop_assert_eq!(last.exit_date, original.exit_date);
        prop_assert_eq!(last.exit_time, original.exit_time);
        prop_assert_eq!(legs[0].entry_date, original.entry_date);
    }

    /// Only the first leg of a chain is a non-rollover leg.
    #[test]
    fn only_the_initial_leg_is_non_rollover(
        entry_offset in 0u64..200,
        exit_offset in 1u64..150,
    ) {
        let calendar = weekly_calendar();
        let legs = expand_rollover(window(entry_offset, exit_offset), &calendar, NaiveTime::from_hms_opt(15, 25, 0).unwrap());
        for (i, leg) in legs.iter().enumerate() {
            prop_assert_eq!(leg.is_rollover_leg, i != 0);
        }
    }

    /// Odd trade-id groups never yield windows; even groups yield at
    /// most one window per id.
    #[test]
    fn group_parity_controls_window_count(counts in proptest::collection::vec(1usize..6, 1..8)) {
        let mut signals = Vec::new();
        for (id, &count) in counts.iter().enumerate() {
            for i in 0..count {
                let label = if i % 2 == 0 { "Entry Long" } else { "Exit Long" };
                signals.push(signal(id as i64, label, (id * 40 + i * 5) as u32));
            }
        }
        let windows = pair_signals(&signals, &params());

        let expected: usize = counts.iter().filter(|&&c| c % 2 == 0).count();
        prop_assert_eq!(windows.len(), expected);
        for (id, &count) in counts.iter().enumerate() {
            let emitted = windows.iter().filter(|w| w.trade_no == id as i64).count();
            prop_assert_eq!(emitted, usize::from(count % 2 == 0));
        }
    }

    /// Every emitted window satisfies entry <= exit.
    #[test]
    fn windows_are_never_inverted(minutes in proptest::collection::vec(0u32..350, 2..10)) {
        let mut signals = Vec::new();
        for (i, &m) in minutes.iter().enumerate() {
            let label = if i % 2 == 0 { "Entry Long" } else { "Exit Long" };
            signals.push(signal((i / 2) as i64, label, m));
        }
        for w in pair_signals(&signals, &params()) {
            prop_assert!(w.entry_at() <= w.exit_at());
        }
    }
}
