//! Run orchestration: one call drives the whole pipeline for every
//! strategy, then once more for the portfolio roll-up.

use crate::calendar::CalendarGrid;
use crate::ledger::{daily_pnl, LedgerRow};
use crate::metrics::PerformanceMetrics;
use crate::report::{run_id, BacktestReport, StrategyReport};
use rayon::prelude::*;
use signallab_core::config::{
    validate_run, ConfigError, PortfolioSettings, RunParams, StrategyConfig,
};
use signallab_core::domain::{Direction, RawSignal, TradeWindow};
use signallab_core::external::calendar::{CalendarError, RolloverCalendarSource};
use signallab_core::external::engine::{EngineRequest, ExecutionEngine};
use signallab_core::external::lot_size::LotSizeTable;
use signallab_core::external::margin::{build_margin_positions, ContractTable, MarginSource};
use signallab_core::pipeline::{build_windows, PipelineError};
use thiserror::Error;
use tracing::{info, warn};

pub const PORTFOLIO_NAME: &str = "Portfolio";

/// Everything a run needs from the outside world, as trait objects so
/// tests substitute fakes.
pub struct Collaborators<'a> {
    pub engine: &'a dyn ExecutionEngine,
    pub calendar: &'a dyn RolloverCalendarSource,
    pub margin: &'a dyn MarginSource,
    pub lot_sizes: &'a LotSizeTable,
    pub contracts: &'a ContractTable,
}

/// Failures that abort the whole run. Per-strategy problems (unmapped
/// lot size, engine errors, margin errors) degrade instead.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("expiry calendar lookup failed: {0}")]
    Calendar(#[from] CalendarError),
}

/// Execute a full backtest: validate, synthesize windows, run every
/// strategy through the engine, price the ledgers, and compute the
/// per-strategy and portfolio analytics.
///
/// A run that produces zero ledger rows is still `Ok`; callers check
/// [`BacktestReport::is_empty`] and report "no trades generated".
pub fn run_backtest(
    params: &RunParams,
    portfolio: &PortfolioSettings,
    raw: &[RawSignal],
    deps: &Collaborators<'_>,
) -> Result<BacktestReport, RunError> {
    validate_run(params, portfolio)?;

    // Exactly one instrument when rollover is on, enforced above.
    let calendar = if params.rollover {
        match portfolio.instruments().into_iter().next() {
            Some(instrument) => Some(deps.calendar.expiry_calendar(&instrument)?),
            None => None,
        }
    } else {
        None
    };

    let windows = build_windows(raw, params, calendar.as_ref())?;
    info!(windows = windows.len(), "signal pipeline complete");

    // Route windows to strategy groups by direction; directions with no
    // configured group are skipped.
    let mut assignments: Vec<(&StrategyConfig, Vec<TradeWindow>)> = Vec::new();
    for (group, direction) in [
        (portfolio.long.as_ref(), Direction::Long),
        (portfolio.short.as_ref(), Direction::Short),
        (portfolio.manual.as_ref(), Direction::Manual),
    ] {
        let Some(group) = group else { continue };
        let routed: Vec<TradeWindow> = windows
            .iter()
            .filter(|w| w.direction == direction)
            .cloned()
            .collect();
        if routed.is_empty() {
            continue;
        }
        for strategy in &group.strategies {
            assignments.push((strategy, routed.clone()));
        }
    }

    // Engine and margin calls are sequential (network); analytics are
    // parallel per strategy below.
    let mut priced: Vec<(String, Vec<LedgerRow>, f64)> = Vec::with_capacity(assignments.len());
    for (strategy, strategy_windows) in assignments {
        let Some(lot_size) = deps.lot_sizes.get(&strategy.instrument) else {
            warn!(
                strategy = %strategy.name,
                instrument = %strategy.instrument,
                "skipping strategy: no lot size for instrument"
            );
            continue;
        };

        let fills = match deps.engine.run(&EngineRequest {
            strategy: strategy.clone(),
            lot_size,
            windows: strategy_windows,
        }) {
            Ok(resp) => resp.fills,
            Err(err) => {
                warn!(strategy = %strategy.name, %err, "engine call failed; no fills");
                Vec::new()
            }
        };

        let margin = {
            let positions = build_margin_positions(&fills, deps.contracts);
            match deps.margin.margin_for(&positions) {
                Ok(m) => m,
                Err(err) => {
                    warn!(strategy = %strategy.name, %err, "margin lookup failed; using 0");
                    0.0
                }
            }
        };

        let rows: Vec<LedgerRow> = fills
            .iter()
            .map(|f| LedgerRow::from_fill(f, strategy.slippage_percent, params.tax_rate))
            .collect();
        priced.push((strategy.name.clone(), rows, margin));
    }

    let portfolio_rows: Vec<LedgerRow> = priced.iter().flat_map(|(_, rows, _)| rows.clone()).collect();
    let portfolio_margin: f64 = priced.iter().map(|(_, _, m)| m).sum();

    let strategies: Vec<StrategyReport> = priced
        .into_par_iter()
        .map(|(name, rows, margin)| analyze(name, rows, margin, params.capital))
        .collect();

    let portfolio_report = analyze(
        PORTFOLIO_NAME.to_string(),
        portfolio_rows,
        portfolio_margin,
        params.capital,
    );

    Ok(BacktestReport {
        run_id: run_id(params, portfolio),
        strategies,
        portfolio: portfolio_report,
    })
}

/// Analytics for one ledger: daily series, statistics, grids.
fn analyze(name: String, rows: Vec<LedgerRow>, margin: f64, capital: f64) -> StrategyReport {
    let daily = daily_pnl(&rows);
    StrategyReport {
        name,
        margin_required: margin,
        metrics: PerformanceMetrics::compute(&daily, capital),
        day_grid: CalendarGrid::by_weekday(&daily),
        month_grid: CalendarGrid::by_month(&daily),
        margin_pct_grid: CalendarGrid::by_month_margin_pct(&daily, margin),
        ledger: rows,
    }
}
