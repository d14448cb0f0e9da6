//! Run configuration: timing knobs, strategy definitions, and the
//! cross-field validation performed before the pipeline runs.

use crate::domain::{OptionType, Side};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Timing and behavior parameters for one backtest run.
///
/// `Option` fields express the original "zero means not configured"
/// convention; times-of-day serialize as `HH:MM:SS` strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParams {
    /// Date range, inclusive on both ends (date-only granularity).
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// strftime-style format of the raw signal timestamps.
    pub signal_datetime_format: String,

    /// When set, synthetic MANUAL windows fill the first and last
    /// uncovered gap of each trading day.
    #[serde(default)]
    pub manual_trade_entry_time: Option<NaiveTime>,
    #[serde(default)]
    pub manual_trade_lots: f64,

    /// When set, replaces the natural entry time of the first entry of
    /// each day that had a real entry signal (consumed once per day).
    #[serde(default)]
    pub first_trade_entry_time: Option<NaiveTime>,

    /// Honor exit signals from the alert source. When false, every
    /// window is clipped to the intraday square-off.
    pub honor_exit_signals: bool,

    /// Uniform offsets applied to resolved entry/exit times, in seconds.
    #[serde(default)]
    pub entry_time_shift_secs: i64,
    #[serde(default)]
    pub exit_time_shift_secs: i64,

    pub intraday_square_off: bool,
    pub intraday_exit_time: NaiveTime,
    pub expiry_day_exit_time: NaiveTime,

    pub rollover: bool,
    pub rollover_time: NaiveTime,

    /// Combined tax/transaction-cost rate applied to slippage-adjusted
    /// turnover when building ledger rows. Zero disables expenses.
    #[serde(default)]
    pub tax_rate: f64,

    /// Initial capital backing the rate-of-return series.
    #[serde(default = "default_capital")]
    pub capital: f64,
}

fn default_capital() -> f64 {
    100_000.0
}

/// Rule for selecting a leg's strike, as a closed set of typed variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrikeRule {
    /// At-the-money strike shifted by a signed number of strikes.
    AtmOffset { offset: i32 },
    /// Strike whose premium is closest to the target.
    PremiumTarget { premium: f64 },
    /// Strike offset by a multiple of the ATM straddle width.
    StraddleWidth { multiple: f64 },
}

/// One option leg of a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegConfig {
    pub leg_id: String,
    pub side: Side,
    pub option_type: OptionType,
    pub strike_rule: StrikeRule,
}

/// A strategy definition sent to the execution engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    pub name: String,
    /// Traded underlying (upper-cased for lot-size/contract lookups).
    pub instrument: String,
    #[serde(default = "default_multiplier")]
    pub lots_multiplier: f64,
    #[serde(default)]
    pub slippage_percent: f64,
    pub legs: Vec<LegConfig>,
}

fn default_multiplier() -> f64 {
    1.0
}

/// Strategies grouped by the signal direction they trade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyGroup {
    pub strategies: Vec<StrategyConfig>,
}

/// Per-direction strategy groups. Windows whose direction has no group
/// are skipped, not errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSettings {
    #[serde(default)]
    pub long: Option<StrategyGroup>,
    #[serde(default)]
    pub short: Option<StrategyGroup>,
    #[serde(default)]
    pub manual: Option<StrategyGroup>,
}

impl PortfolioSettings {
    /// Distinct upper-cased instruments across all configured groups.
    pub fn instruments(&self) -> BTreeSet<String> {
        self.groups()
            .flat_map(|g| g.strategies.iter())
            .map(|s| s.instrument.to_uppercase())
            .collect()
    }

    pub fn groups(&self) -> impl Iterator<Item = &StrategyGroup> {
        [self.long.as_ref(), self.short.as_ref(), self.manual.as_ref()]
            .into_iter()
            .flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.groups().all(|g| g.strategies.is_empty())
    }
}

/// Configuration rejections raised before the pipeline runs.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("start date {start} is after end date {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error("rollover requires honoring exit signals")]
    RolloverWithoutExitSignals,

    #[error("intraday square-off is required when exit signals are not honored")]
    SquareOffRequired,

    #[error("manual trade entry time requires honoring exit signals")]
    ManualEntryWithoutExitSignals,

    #[error("rollover and intraday square-off are mutually exclusive")]
    RolloverWithSquareOff,

    #[error("first trade entry time and manual trade entry time are mutually exclusive")]
    FirstEntryWithManualEntry,

    #[error("rollover requires exactly one traded instrument, got {0:?}")]
    MultiInstrumentRollover(Vec<String>),

    #[error("no strategies configured")]
    EmptyPortfolio,
}

impl RunParams {
    /// Validate field combinations that cannot run together.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_date > self.end_date {
            return Err(ConfigError::InvertedDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if !self.honor_exit_signals {
            if self.rollover {
                return Err(ConfigError::RolloverWithoutExitSignals);
            }
            if !self.intraday_square_off {
                return Err(ConfigError::SquareOffRequired);
            }
            if self.manual_trade_entry_time.is_some() {
                return Err(ConfigError::ManualEntryWithoutExitSignals);
            }
        }
        if self.rollover && self.intraday_square_off {
            return Err(ConfigError::RolloverWithSquareOff);
        }
        if self.first_trade_entry_time.is_some() && self.manual_trade_entry_time.is_some() {
            return Err(ConfigError::FirstEntryWithManualEntry);
        }
        Ok(())
    }
}

/// Validate a run configuration against the strategies it will drive.
pub fn validate_run(params: &RunParams, portfolio: &PortfolioSettings) -> Result<(), ConfigError> {
    params.validate()?;
    if portfolio.is_empty() {
        return Err(ConfigError::EmptyPortfolio);
    }
    if params.rollover {
        let instruments = portfolio.instruments();
        if instruments.len() != 1 {
            return Err(ConfigError::MultiInstrumentRollover(
                instruments.into_iter().collect(),
            ));
        }
    }
    Ok(())
}

/// Baseline parameters for unit tests across the crate.
#[cfg(test)]
pub(crate) fn test_params() -> RunParams {
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
