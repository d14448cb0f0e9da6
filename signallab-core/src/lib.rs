//! SignalLab Core — alert-signal ingestion and trade-window synthesis.
//!
//! This crate contains the heart of the signal pipeline:
//! - Domain types (signals, trade windows, engine fills)
//! - Normalization of raw alert exports into canonical signals
//! - Entry/exit pairing with label-first, time-fallback role resolution
//! - Synthetic manual-window insertion for uncovered intraday time
//! - Rollover expansion across option-expiry boundaries
//! - Intraday square-off finalization
//! - External collaborator traits (execution engine, expiry calendar,
//!   margin pricing, lot-size reference) with bounded-retry HTTP clients

pub mod config;
pub mod domain;
pub mod external;
pub mod pipeline;
pub mod timeutil;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: types that cross the runner's rayon boundary
    /// are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Signal>();
        require_sync::<domain::Signal>();
        require_send::<domain::TradeWindow>();
        require_sync::<domain::TradeWindow>();
        require_send::<domain::EngineFill>();
        require_sync::<domain::EngineFill>();

        require_send::<config::RunParams>();
        require_sync::<config::RunParams>();
        require_send::<config::StrategyConfig>();
        require_sync::<config::StrategyConfig>();

        require_send::<pipeline::rollover::ExpiryCalendar>();
        require_sync::<pipeline::rollover::ExpiryCalendar>();

        require_send::<external::lot_size::LotSizeTable>();
        require_sync::<external::lot_size::LotSizeTable>();
        require_send::<external::retry::RetryPolicy>();
        require_sync::<external::retry::RetryPolicy>();
    }
}
