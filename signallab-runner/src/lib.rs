//! SignalLab Runner — turns finalized trade windows into results.
//!
//! Responsibilities:
//! - Trade ledger: engine fills → priced rows with slippage and expenses
//! - Performance statistics over the daily PnL series
//! - Weekday/month calendar grids with dense totals
//! - Orchestration of the full per-strategy + portfolio pass
//! - Report assembly with a content-addressed run id

pub mod calendar;
pub mod ledger;
pub mod metrics;
pub mod report;
pub mod runner;

pub use report::{BacktestReport, StrategyReport};
pub use runner::{run_backtest, Collaborators, RunError};
