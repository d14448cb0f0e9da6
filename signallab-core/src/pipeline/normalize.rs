//! Stage 1: raw alert rows → canonical signals.

use crate::config::RunParams;
use crate::domain::{Direction, RawSignal, Signal};
use chrono::NaiveDateTime;
use tracing::debug;

/// Parse, filter, and sort raw alert rows.
///
/// Rows with unparsable timestamps or unrecognizable direction labels
/// are dropped silently (logged at debug); an empty input is an empty
/// output, not an error. The date-range filter is inclusive on both
/// ends at date granularity. The original label survives on every
/// signal for later entry/exit role resolution.
pub fn normalize_signals(raw: &[RawSignal], params: &RunParams) -> Vec<Signal> {
    let mut signals: Vec<Signal> = raw
        .iter()
        .filter_map(|row| {
            let at = match NaiveDateTime::parse_from_str(&row.timestamp, &params.signal_datetime_format) {
                Ok(at) => at,
                Err(err) => {
                    debug!(trade_no = row.trade_no, timestamp = %row.timestamp, %err, "dropping signal with unparsable timestamp");
                    return None;
                }
            };
            let kind = match direction_of(&row.label) {
                Some(kind) => kind,
                None => {
                    debug!(trade_no = row.trade_no, label = %row.label, "dropping signal with unrecognized label");
                    return None;
                }
            };
            Some(Signal {
                trade_no: row.trade_no,
                kind,
                label: row.label.clone(),
                at,
                lots: row.lots,
                price: row.price,
            })
        })
        .filter(|s| {
            let d = s.at.date();
            d >= params.start_date && d <= params.end_date
        })
        .collect();

    signals.sort_by_key(|s| s.at);
    signals
}

/// Extract the direction token from a free-text label.
///
/// "Entry Long" → second whitespace token; a bare "MANUAL" has no role
/// prefix, so a single-token label is taken whole.
fn direction_of(label: &str) -> Option<Direction> {
    let upper = label.to_uppercase();
    let mut tokens = upper.split_whitespace();
    let first = tokens.next()?;
    let token = tokens.next().unwrap_or(first);
    Direction::from_label_token(token)
}
