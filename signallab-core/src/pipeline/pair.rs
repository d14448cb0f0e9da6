//! Stage 3: trade-id groups → directional trade windows.

use crate::config::RunParams;
use crate::domain::{Signal, TradeWindow};
use crate::timeutil::shift_time;
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Pair signals sharing a trade id into trade windows.
///
/// A group is accepted only when its signal count is even; odd groups
/// are discarded whole — partial pairs are not repaired. Entry/exit
/// roles come from the preserved labels when possible ("ENTRY"/"EXIT"
/// substring), falling back to timestamp order when the labels are
/// inconclusive. Both halves of that policy are load-bearing: labels
/// get corrupted upstream and signals arrive out of order.
pub fn pair_signals(signals: &[Signal], params: &RunParams) -> Vec<TradeWindow> {
    // Days that saw a real entry signal, for the first-entry override.
    // Consumed once per day on first use.
    let mut override_days: HashSet<NaiveDate> = if params.first_trade_entry_time.is_some() {
        signals
            .iter()
            .filter(|s| s.label.contains("Entry "))
            .map(|s| s.at.date())
            .collect()
    } else {
        HashSet::new()
    };

    let mut order: Vec<i64> = Vec::new();
    let mut groups: HashMap<i64, Vec<&Signal>> = HashMap::new();
    for signal in signals {
        groups
            .entry(signal.trade_no)
            .or_insert_with(|| {
                order.push(signal.trade_no);
                Vec::new()
            })
            .push(signal);
    }

    let mut windows = Vec::new();

    for trade_no in order {
        let group = &groups[&trade_no];
        if group.len() % 2 != 0 {
            debug!(trade_no, count = group.len(), "discarding odd signal group");
            continue;
        }

        let (entry, exit) = resolve_roles(group);

        let entry_date = entry.at.date();
        let mut entry_time = entry.at.time();
        let exit_date = exit.at.date();
        let mut exit_time = exit.at.time();

        if let Some(first_entry) = params.first_trade_entry_time {
            if override_days.remove(&entry_date) {
                entry_time = first_entry;
            }
        }

        entry_time = shift_time(entry_time, params.entry_time_shift_secs);
        exit_time = shift_time(exit_time, params.exit_time_shift_secs);

        let window = TradeWindow {
            trade_no,
            direction: entry.kind,
            entry_date,
            entry_time,
            exit_date,
            exit_time,
            lots: entry.lots,
            is_rollover_leg: false,
            expiry_day_exit_time: params.expiry_day_exit_time,
            entry_price: entry.price,
            exit_price: exit.price,
        };

        if window.entry_at() > window.exit_at() {
            warn!(trade_no, "discarding window whose resolved entry is after its exit");
            continue;
        }

        windows.push(window);
    }

    windows
}

/// Resolve which of the group's first two signals is the entry.
///
/// Label inspection wins; timestamp order (earlier = entry) is the
/// fallback when either role cannot be determined from labels.
fn resolve_roles<'a>(group: &[&'a Signal]) -> (&'a Signal, &'a Signal) {
    let mut entry_idx = None;
    let mut exit_idx = None;

    for (i, signal) in group.iter().take(2).enumerate() {
        if signal.label_says_entry() {
            entry_idx.get_or_insert(i);
        } else if signal.label_says_exit() {
            exit_idx.get_or_insert(i);
        }
    }

    match (entry_idx, exit_idx) {
        (Some(e), Some(x)) => (group[e], group[x]),
        _ => {
            if group[0].at < group[1].at {
                (group[0], group[1])
            } else {
                (group[1], group[0])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_params;
    use crate::domain::Direction;
    use chrono::NaiveTime;

    fn sig(trade_no: i64, label: &str, kind: Direction, day: u32, h: u32, m: u32) -> Signal {
        Signal {
            trade_no,
            kind,
            label: label.into(),
            at: NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(h, m, 0)
                .unwrap(),
            lots: 75.0,
            price: None,
        }
    }

    #[test]
    fn pairs_entry_exit_into_one_window() {
        let signals = vec![
            sig(1, "Entry Long", Direction::Long, 2, 9, 20),
            sig(1, "Exit Long", Direction::Long, 2, 15, 15),
        ];
        let windows = pair_signals(&signals, &test_params());
        assert_eq!(windows.len(), 1);
        let w = &windows[0];
        assert_eq!(w.direction, Direction::Long);
        assert_eq!(w.entry_time, NaiveTime::from_hms_opt(9, 20, 0).unwrap());
        assert_eq!(w.exit_time, NaiveTime::from_hms_opt(15, 15, 0).unwrap());
        assert_eq!(w.lots, 75.0);
    }

    #[test]
    fn odd_groups_are_discarded_entirely() {
        let signals = vec![
            sig(1, "Entry Long", Direction::Long, 2, 9, 20),
            sig(1, "Exit Long", Direction::Long, 2, 11, 0),
            sig(1, "Entry Long", Direction::Long, 2, 13, 0),
        ];
        assert!(pair_signals(&signals, &test_params()).is_empty());
    }

    #[test]
    fn labels_win_over_timestamp_order() {
        // Exit delivered first: label resolution must still pick the
        // later signal as the entry.
        let signals = vec![
            sig(4, "Exit Short", Direction::Short, 2, 9, 20),
            sig(4, "Entry Short", Direction::Short, 2, 9, 10),
        ];
        let windows = pair_signals(&signals, &test_params());
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].entry_time, NaiveTime::from_hms_opt(9, 10, 0).unwrap());
        assert_eq!(windows[0].exit_time, NaiveTime::from_hms_opt(9, 20, 0).unwrap());
    }

    #[test]
    fn timestamp_fallback_when_labels_are_corrupted() {
        let signals = vec![
            sig(5, "??", Direction::Long, 2, 14, 0),
            sig(5, "??", Direction::Long, 2, 9, 30),
        ];
        let windows = pair_signals(&signals, &test_params());
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].entry_time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
    }

    #[test]
    fn inverted_labeled_window_is_rejected() {
        // Labels claim the entry happened a day after the exit; the
        // window invariant rejects it instead of repairing it.
        let signals = vec![
            sig(6, "Exit Long", Direction::Long, 2, 15, 0),
            sig(6, "Entry Long", Direction::Long, 3, 9, 20),
        ];
        assert!(pair_signals(&signals, &test_params()).is_empty());
    }

    #[test]
    fn first_entry_override_is_consumed_once_per_day() {
        let mut params = test_params();
        params.first_trade_entry_time = NaiveTime::from_hms_opt(9, 16, 0);

        let signals = vec![
            sig(1, "Entry Long", Direction::Long, 2, 9, 30),
            sig(1, "Exit Long", Direction::Long, 2, 11, 0),
            sig(2, "Entry Long", Direction::Long, 2, 12, 0),
            sig(2, "Exit Long", Direction::Long, 2, 15, 15),
        ];
        let windows = pair_signals(&signals, &params);
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].entry_time, NaiveTime::from_hms_opt(9, 16, 0).unwrap());
        // Second trade of the day keeps its natural entry time.
        assert_eq!(windows[1].entry_time, NaiveTime::from_hms_opt(12, 0, 0).unwrap());
    }

    #[test]
    fn time_shifts_apply_uniformly() {
        let mut params = test_params();
        params.entry_time_shift_secs = 60;
        params.exit_time_shift_secs = -30;

        let signals = vec![
            sig(1, "Entry Long", Direction::Long, 2, 9, 20),
            sig(1, "Exit Long", Direction::Long, 2, 15, 15),
        ];
        let windows = pair_signals(&signals, &params);
        assert_eq!(windows[0].entry_time, NaiveTime::from_hms_opt(9, 21, 0).unwrap());
        assert_eq!(windows[0].exit_time, NaiveTime::from_hms_opt(15, 14, 30).unwrap());
    }

    #[test]
    fn direction_comes_from_resolved_entry() {
        let signals = vec![
            sig(8, "Exit Short", Direction::Short, 2, 15, 0),
            sig(8, "Entry Short", Direction::Short, 2, 9, 30),
        ];
        let windows = pair_signals(&signals, &test_params());
        assert_eq!(windows[0].direction, Direction::Short);
    }
}
