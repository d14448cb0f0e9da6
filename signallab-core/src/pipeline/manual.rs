//! Stage 2: synthetic MANUAL pairs for uncovered intraday time.

use crate::config::RunParams;
use crate::domain::{Direction, Signal};
use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

/// Insert synthetic entry/exit pairs covering the leading and trailing
/// gap of each trading day.
///
/// Active only when a manual trade entry time is configured. For each
/// day: if the earliest real signal lands after the manual entry time,
/// a pair spans (manual entry → first signal); if the latest real
/// signal lands before the intraday exit cutoff, a pair spans (last
/// signal → cutoff). Interior gaps between real signals are never
/// filled — observed behavior, preserved deliberately.
///
/// Synthetic trade ids count upward from the maximum observed id.
pub fn synthesize_manual_pairs(signals: Vec<Signal>, params: &RunParams) -> Vec<Signal> {
    let Some(manual_entry) = params.manual_trade_entry_time else {
        return signals;
    };
    if signals.is_empty() {
        return signals;
    }

    let last_exit = params.intraday_exit_time;
    let mut next_trade_no = signals.iter().map(|s| s.trade_no).max().unwrap_or(0);

    let mut out: Vec<Signal> = Vec::with_capacity(signals.len());
    let mut days: Vec<NaiveDate> = signals.iter().map(|s| s.at.date()).collect();
    days.dedup();

    for day in days {
        let day_signals: Vec<&Signal> = signals.iter().filter(|s| s.at.date() == day).collect();
        let first = day_signals[0];
        let last = day_signals[day_signals.len() - 1];

        if manual_entry < first.at.time() {
            next_trade_no += 1;
            debug!(%day, trade_no = next_trade_no, "synthesizing leading manual pair");
            out.push(manual_signal(next_trade_no, "Entry MANUAL", day, manual_entry, params));
            out.push(manual_signal(next_trade_no, "Exit MANUAL", day, first.at.time(), params));
        }

        out.extend(day_signals.iter().map(|s| (*s).clone()));

        if last_exit > last.at.time() {
            next_trade_no += 1;
            debug!(%day, trade_no = next_trade_no, "synthesizing trailing manual pair");
            out.push(manual_signal(next_trade_no, "Entry MANUAL", day, last.at.time(), params));
            out.push(manual_signal(next_trade_no, "Exit MANUAL", day, last_exit, params));
        }
    }

    out
}

fn manual_signal(
    trade_no: i64,
    label: &str,
    day: NaiveDate,
    time: NaiveTime,
    params: &RunParams,
) -> Signal {
    Signal {
        trade_no,
        kind: Direction::Manual,
        label: label.into(),
        at: day.and_time(time),
        lots: params.manual_trade_lots,
        price: None,
    }
}
