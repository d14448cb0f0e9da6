//! Report assembly.

use crate::calendar::CalendarGrid;
use crate::ledger::LedgerRow;
use crate::metrics::PerformanceMetrics;
use serde::{Deserialize, Serialize};
use signallab_core::config::{PortfolioSettings, RunParams};

/// Deterministic hash identifying a run configuration.
pub type RunId = String;

/// Computes a content-addressed id for the run: two runs with identical
/// parameters and portfolio produce the same id.
pub fn run_id(params: &RunParams, portfolio: &PortfolioSettings) -> RunId {
    let json = serde_json::to_string(&(params, portfolio)).expect("run config serialization failed");
    blake3::hash(json.as_bytes()).to_hex().to_string()
}

/// Everything reported for one strategy (or the portfolio roll-up).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyReport {
    pub name: String,
    pub margin_required: f64,
    pub metrics: PerformanceMetrics,
    pub ledger: Vec<LedgerRow>,
    pub day_grid: CalendarGrid,
    pub month_grid: CalendarGrid,
    pub margin_pct_grid: CalendarGrid,
}

/// Full backtest output: per-strategy reports plus the portfolio
/// aggregate over the concatenated ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub run_id: RunId,
    pub strategies: Vec<StrategyReport>,
    pub portfolio: StrategyReport,
}

impl BacktestReport {
    /// True when the entire run produced no ledger rows; the caller
    /// reports "no trades generated" in that case.
    pub fn is_empty(&self) -> bool {
        self.portfolio.ledger.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RunParams {
        serde_json::from_value(serde_json::json!({
            "start_date": "2024-01-01",
            "end_date": "2024-12-31",
            "signal_datetime_format": "%Y-%m-%d %H:%M:%S",
            "honor_exit_signals": true,
            "intraday_square_off": false,
            "intraday_exit_time": "15:15:00",
            "expiry_day_exit_time": "15:20:00",
            "rollover": false,
            "rollover_time": "15:25:00"
        }))
        .unwrap()
    }

    #[test]
    fn run_id_is_deterministic() {
        let portfolio = PortfolioSettings::default();
        assert_eq!(run_id(&params(), &portfolio), run_id(&params(), &portfolio));
    }

    #[test]
    fn run_id_changes_with_parameters() {
        let portfolio = PortfolioSettings::default();
        let mut other = params();
        other.tax_rate = 0.001;
        assert_ne!(run_id(&params(), &portfolio), run_id(&other, &portfolio));
    }
}
