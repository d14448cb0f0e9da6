//! EngineFill — one realized leg reported back by the remote execution engine.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Trade side of an executed leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

/// Option contract type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionType {
    #[serde(rename = "CE", alias = "CALL")]
    Call,
    #[serde(rename = "PE", alias = "PUT")]
    Put,
}

/// A filled leg as reported by the execution engine.
///
/// Prices here are raw engine fills; slippage and expense adjustment
/// happen when the ledger row is built, never inside the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineFill {
    #[serde(rename = "strategy_name")]
    pub strategy: String,
    pub leg_id: String,

    #[serde(rename = "entry_time")]
    pub entry_at: NaiveDateTime,
    #[serde(rename = "exit_time")]
    pub exit_at: NaiveDateTime,

    pub side: Side,
    #[serde(rename = "qty")]
    pub quantity: f64,

    pub entry_price: f64,
    pub exit_price: f64,

    /// Engine-reported exit reason code (e.g. "Exit Time Hit").
    pub reason: String,

    pub symbol: String,
    pub strike: f64,
    pub option_type: OptionType,
    pub expiry: NaiveDate,
}
