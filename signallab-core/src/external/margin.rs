//! Margin pricing provider.
//!
//! The margin backend prices a basket of open positions; the basket is
//! built from the latest entry per (strategy, leg) so re-entries do not
//! double-count. Margin is advisory: exhausting retries degrades the
//! figure to 0 at the orchestration layer instead of failing the run.

use super::retry::{RetryPolicy, Sleeper, ThreadSleeper};
use crate::domain::{EngineFill, OptionType, Side};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum MarginError {
    #[error("margin request failed: {0}")]
    Transport(String),

    #[error("margin backend returned HTTP {status}")]
    Status { status: u16 },

    #[error("margin response did not parse: {0}")]
    BadResponse(String),
}

/// Exchange contract metadata for one underlying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfo {
    pub contract: String,
    pub exchange: String,
}

/// Immutable symbol → contract metadata lookup, keys upper-cased.
#[derive(Debug, Clone, Default)]
pub struct ContractTable {
    entries: HashMap<String, ContractInfo>,
}

impl ContractTable {
    pub fn new(entries: HashMap<String, ContractInfo>) -> Self {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();
        Self { entries }
    }

    pub fn get(&self, symbol: &str) -> Option<&ContractInfo> {
        self.entries.get(&symbol.to_uppercase())
    }
}

/// One open position in a margin pricing request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarginPosition {
    pub contract: String,
    pub exchange: String,
    pub side: Side,
    pub option_type: OptionType,
    pub strike: f64,
    pub expiry: NaiveDate,
    pub quantity: f64,
}

/// Build the margin basket from engine fills: the latest entry per
/// (strategy, leg) wins; fills on symbols without contract metadata are
/// skipped.
pub fn build_margin_positions(fills: &[EngineFill], contracts: &ContractTable) -> Vec<MarginPosition> {
    let mut latest: HashMap<(&str, &str), &EngineFill> = HashMap::new();
    for fill in fills {
        latest
            .entry((fill.strategy.as_str(), fill.leg_id.as_str()))
            .and_modify(|kept| {
                if fill.entry_at > kept.entry_at {
                    *kept = fill;
                }
            })
            .or_insert(fill);
    }

    let mut keys: Vec<_> = latest.keys().copied().collect();
    keys.sort_unstable();

    let mut positions = Vec::with_capacity(keys.len());
    for key in keys {
        let fill = latest[&key];
        let Some(info) = contracts.get(&fill.symbol) else {
            warn!(symbol = %fill.symbol, "skipping margin position: no contract metadata");
            continue;
        };
        positions.push(MarginPosition {
            contract: info.contract.clone(),
            exchange: info.exchange.clone(),
            side: fill.side,
            option_type: fill.option_type,
            strike: fill.strike,
            expiry: fill.expiry,
            quantity: fill.quantity,
        });
    }
    positions
}

pub trait MarginSource: Send + Sync {
    /// Required margin for the given basket.
    fn margin_for(&self, positions: &[MarginPosition]) -> Result<f64, MarginError>;
}

#[derive(Debug, Deserialize)]
struct WireMargin {
    #[serde(default)]
    total_margin: f64,
    #[serde(default)]
    net_premium: f64,
}

impl WireMargin {
    /// The backend reports 0 total margin for pure premium baskets;
    /// fall back to the net premium in that case.
    fn required(&self) -> f64 {
        if self.total_margin == 0.0 {
            self.net_premium
        } else {
            self.total_margin
        }
    }
}

/// Blocking HTTP margin client, retried with linear backoff.
pub struct HttpMarginSource {
    client: reqwest::blocking::Client,
    url: String,
    retry: RetryPolicy,
    sleeper: Box<dyn Sleeper>,
}

impl HttpMarginSource {
    pub fn new(url: impl Into<String>) -> Result<Self, MarginError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MarginError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            retry: RetryPolicy::linear(2),
            sleeper: Box::new(ThreadSleeper),
        })
    }

    fn fetch_once(&self, positions: &[MarginPosition]) -> Result<f64, MarginError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&positions)
            .send()
            .map_err(|e| MarginError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MarginError::Status {
                status: status.as_u16(),
            });
        }

        let wire: WireMargin = resp
            .json()
            .map_err(|e| MarginError::BadResponse(e.to_string()))?;
        Ok(wire.required())
    }
}

impl MarginSource for HttpMarginSource {
    fn margin_for(&self, positions: &[MarginPosition]) -> Result<f64, MarginError> {
        if positions.is_empty() {
            return Ok(0.0);
        }
        self.retry
            .run(self.sleeper.as_ref(), |_| self.fetch_once(positions))
    }
}
