//! Trade ledger: one priced row per filled leg.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use signallab_core::domain::{EngineFill, OptionType, Side};
use std::collections::BTreeMap;

/// One realized trade leg with its derived economics.
///
/// The four derived fields (`points`, `slippage_adjusted_points`,
/// `expenses`, `net_pnl`) are only ever computed together in
/// [`LedgerRow::from_fill`]; a price correction means rebuilding the
/// row from the corrected fill, never patching a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub strategy: String,
    pub leg_id: String,
    pub symbol: String,
    pub strike: f64,
    pub option_type: OptionType,
    pub expiry: NaiveDate,

    pub side: Side,
    pub quantity: f64,
    pub entry_at: NaiveDateTime,
    pub exit_at: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub reason: String,

    pub points: f64,
    pub slippage_adjusted_entry: f64,
    pub slippage_adjusted_exit: f64,
    pub slippage_adjusted_points: f64,
    pub expenses: f64,
    pub net_pnl: f64,
}

impl LedgerRow {
    /// Price a fill into a ledger row.
    ///
    /// Slippage moves each price against the trader: a SELL receives
    /// less on entry and pays more on exit; BUY is mirrored. Expenses
    /// are `tax_rate` applied to slippage-adjusted turnover.
    pub fn from_fill(fill: &EngineFill, slippage_percent: f64, tax_rate: f64) -> Self {
        let s = slippage_percent / 100.0;
        let (adj_entry, adj_exit) = match fill.side {
            Side::Sell => (fill.entry_price * (1.0 - s), fill.exit_price * (1.0 + s)),
            Side::Buy => (fill.entry_price * (1.0 + s), fill.exit_price * (1.0 - s)),
        };

        let points = match fill.side {
            Side::Sell => fill.entry_price - fill.exit_price,
            Side::Buy => fill.exit_price - fill.entry_price,
        };
        let slippage_adjusted_points = match fill.side {
            Side::Sell => adj_entry - adj_exit,
            Side::Buy => adj_exit - adj_entry,
        };

        let expenses = (adj_entry + adj_exit) * fill.quantity * tax_rate;
        let net_pnl = slippage_adjusted_points * fill.quantity - expenses;

        Self {
            strategy: fill.strategy.clone(),
            leg_id: fill.leg_id.clone(),
            symbol: fill.symbol.clone(),
            strike: fill.strike,
            option_type: fill.option_type,
            expiry: fill.expiry,
            side: fill.side,
            quantity: fill.quantity,
            entry_at: fill.entry_at,
            exit_at: fill.exit_at,
            entry_price: fill.entry_price,
            exit_price: fill.exit_price,
            reason: fill.reason.clone(),
            points,
            slippage_adjusted_entry: adj_entry,
            slippage_adjusted_exit: adj_exit,
            slippage_adjusted_points,
            expenses,
            net_pnl,
        }
    }
}

/// One trading day's summed net PnL.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayPnl {
    pub date: NaiveDate,
    pub pnl: f64,
}

/// Sum ledger rows into a date-ordered daily PnL series, keyed by
/// entry date. A leg held across days books its whole PnL on the day
/// it was opened.
pub fn daily_pnl(rows: &[LedgerRow]) -> Vec<DayPnl> {
    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for row in rows {
        *by_date.entry(row.entry_at.date()).or_insert(0.0) += row.net_pnl;
    }
    by_date
        .into_iter()
        .map(|(date, pnl)| DayPnl { date, pnl })
        .collect()
}
