//! Signal-to-window synthesis pipeline.
//!
//! Stages run strictly in order, once per request:
//! 1. normalize — raw alert rows → canonical [`Signal`]s
//! 2. manual — synthetic MANUAL pairs for uncovered intraday time
//! 3. pair — even trade-id groups → directional [`TradeWindow`]s
//! 4. rollover — expiry-spanning windows → chains of expiry-bounded legs
//! 5. finalize — intraday square-off clipping
//!
//! [`Signal`]: crate::domain::Signal
//! [`TradeWindow`]: crate::domain::TradeWindow

pub mod finalize;
pub mod manual;
pub mod normalize;
pub mod pair;
pub mod rollover;

use crate::config::RunParams;
use crate::domain::{RawSignal, TradeWindow};
use rollover::ExpiryCalendar;
use thiserror::Error;

/// Pipeline-level failures. Per-row and per-trade-id problems are
/// skipped inline; only batch-level conditions surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("rollover is configured but no expiry calendar is available")]
    MissingExpiryCalendar,
}

/// Run stages 1–5 and return finalized trade windows.
///
/// `calendar` must be `Some` when `params.rollover` is set; a missing
/// or empty calendar aborts this signal batch (the only fatal lookup
/// failure in the pipeline).
pub fn build_windows(
    raw: &[RawSignal],
    params: &RunParams,
    calendar: Option<&ExpiryCalendar>,
) -> Result<Vec<TradeWindow>, PipelineError> {
    let signals = normalize::normalize_signals(raw, params);
    let signals = manual::synthesize_manual_pairs(signals, params);
    let windows = pair::pair_signals(&signals, params);

    let windows = if params.rollover {
        let calendar = calendar
            .filter(|c| !c.is_empty())
            .ok_or(PipelineError::MissingExpiryCalendar)?;
        windows
            .into_iter()
            .flat_map(|w| rollover::expand_rollover(w, calendar, params.rollover_time))
            .collect()
    } else {
        windows
    };

    Ok(finalize::finalize_windows(windows, params))
}
