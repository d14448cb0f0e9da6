//! Performance statistics — pure functions over the daily PnL series.
//!
//! Everything here is series in, scalars out: no dependency on the
//! runner, the pipeline, or any collaborator. Ratios are computed over
//! the daily rate-of-return series, never raw PnL; drawdown is the one
//! deliberate exception (raw PnL against its running maximum).

use crate::ledger::DayPnl;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const RISK_FREE_RATE_PCT: f64 = 5.0;

/// Aggregate statistics for one strategy or the portfolio roll-up.
///
/// All float fields are rounded to 2 decimals; non-finite values
/// (risk-reward with no losing days) pass through unrounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub trading_days: usize,
    pub positive_days: usize,
    pub negative_days: usize,

    pub total_pnl: f64,
    pub avg_profit: f64,
    pub avg_loss: f64,
    pub max_daily_pnl: f64,
    pub min_daily_pnl: f64,
    pub median_daily_pnl: f64,

    pub win_rate: f64,
    pub risk_reward: f64,
    pub expectancy: f64,

    pub sharpe: f64,
    pub sortino: f64,
    pub cagr: f64,
    pub calmar: f64,

    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
    /// Longest gap in calendar days between two consecutive
    /// zero-drawdown days; `None` when the series never recovers twice.
    pub days_to_recover: Option<i64>,

    pub max_win_streak: usize,
    pub max_loss_streak: usize,

    pub profit_factor: f64,
    pub outlier_adjusted_profit_factor: f64,
}

impl PerformanceMetrics {
    /// Compute all statistics from a date-ordered daily PnL series.
    pub fn compute(daily: &[DayPnl], capital: f64) -> Self {
        if daily.is_empty() {
            return Self::empty();
        }

        let pnl: Vec<f64> = daily.iter().map(|d| d.pnl).collect();
        let n = pnl.len();

        // Equity curve and daily rate of return (percent). Day 0 uses
        // the starting capital as its denominator.
        let mut equity = Vec::with_capacity(n);
        let mut ror = Vec::with_capacity(n);
        let mut prev = capital;
        for &p in &pnl {
            ror.push(if prev != 0.0 { p / prev * 100.0 } else { 0.0 });
            prev += p;
            equity.push(prev);
        }

        let positive_days = pnl.iter().filter(|&&p| p > 0.0).count();
        let negative_days = pnl.iter().filter(|&&p| p < 0.0).count();
        let total_pnl: f64 = pnl.iter().sum();

        let wins: Vec<f64> = pnl.iter().copied().filter(|&p| p > 0.0).collect();
        let losses: Vec<f64> = pnl.iter().copied().filter(|&p| p < 0.0).collect();
        let avg_profit = mean(&wins);
        let avg_loss = mean(&losses);

        let win_rate = positive_days as f64 / n as f64;
        let risk_reward = if avg_loss == 0.0 {
            f64::INFINITY
        } else {
            (avg_profit / avg_loss).abs()
        };
        let expectancy = win_rate * risk_reward - (1.0 - win_rate);

        // Drawdown is raw PnL against its own running maximum, not an
        // equity-curve drawdown.
        let mut running_max = f64::NEG_INFINITY;
        let mut drawdown = Vec::with_capacity(n);
        for &p in &pnl {
            running_max = running_max.max(p);
            drawdown.push(p - running_max);
        }
        let (trough_idx, max_drawdown) = drawdown
            .iter()
            .copied()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap_or((0, 0.0));
        let max_drawdown_pct = if equity[trough_idx] != 0.0 {
            max_drawdown / equity[trough_idx] * 100.0
        } else {
            0.0
        };

        let days_to_recover = recovery_days(daily, &drawdown);

        let mean_ror = mean(&ror);
        let sharpe = annualized_ratio(mean_ror, std_dev(&ror));
        let downside: Vec<f64> = ror.iter().copied().filter(|&r| r < 0.0).collect();
        let sortino = annualized_ratio(mean_ror, std_dev(&downside));

        let span_days = (daily[n - 1].date - daily[0].date).num_days();
        let cagr = if span_days != 0 && capital > 0.0 && equity[n - 1] > 0.0 {
            ((equity[n - 1] / capital).powf(365.0 / span_days as f64) - 1.0) * 100.0
        } else {
            0.0
        };
        let calmar = if max_drawdown_pct == 0.0 {
            0.0
        } else {
            (cagr / max_drawdown_pct).abs()
        };

        let gross_profit: f64 = wins.iter().sum();
        let gross_loss: f64 = losses.iter().sum();
        let profit_factor = ratio_or_zero(gross_profit, gross_loss);
        let biggest_win = wins.iter().copied().fold(0.0_f64, f64::max);
        let outlier_adjusted_profit_factor = ratio_or_zero(gross_profit - biggest_win, gross_loss);

        let (max_win_streak, max_loss_streak) = streaks(&pnl);

        Self {
            start_date: Some(daily[0].date),
            end_date: Some(daily[n - 1].date),
            trading_days: n,
            positive_days,
            negative_days,
            total_pnl: round2(total_pnl),
            avg_profit: round2(avg_profit),
            avg_loss: round2(avg_loss),
            max_daily_pnl: round2(pnl.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            min_daily_pnl: round2(pnl.iter().copied().fold(f64::INFINITY, f64::min)),
            median_daily_pnl: round2(median(&pnl)),
            win_rate: round2(win_rate),
            risk_reward: round2(risk_reward),
            expectancy: round2(expectancy),
            sharpe: round2(sharpe),
            sortino: round2(sortino),
            cagr: round2(cagr),
            calmar: round2(calmar),
            max_drawdown: round2(max_drawdown),
            max_drawdown_pct: round2(max_drawdown_pct),
            days_to_recover,
            max_win_streak,
            max_loss_streak,
            profit_factor: round2(profit_factor),
            outlier_adjusted_profit_factor: round2(outlier_adjusted_profit_factor),
        }
    }

    fn empty() -> Self {
        Self {
            start_date: None,
            end_date: None,
            trading_days: 0,
            positive_days: 0,
            negative_days: 0,
            total_pnl: 0.0,
            avg_profit: 0.0,
            avg_loss: 0.0,
            max_daily_pnl: 0.0,
            min_daily_pnl: 0.0,
            median_daily_pnl: 0.0,
            win_rate: 0.0,
            risk_reward: 0.0,
            expectancy: 0.0,
            sharpe: 0.0,
            sortino: 0.0,
            cagr: 0.0,
            calmar: 0.0,
            max_drawdown: 0.0,
            max_drawdown_pct: 0.0,
            days_to_recover: None,
            max_win_streak: 0,
            max_loss_streak: 0,
            profit_factor: 0.0,
            outlier_adjusted_profit_factor: 0.0,
        }
    }
}

// ─── Individual pieces ──────────────────────────────────────────────

/// Annualized excess-return ratio used by both Sharpe and Sortino:
/// `(mean * 252 - 5) / (std * sqrt(252))`, 0 when the deviation is 0.
fn annualized_ratio(mean_ror: f64, deviation: f64) -> f64 {
    if deviation == 0.0 {
        return 0.0;
    }
    (mean_ror * TRADING_DAYS_PER_YEAR - RISK_FREE_RATE_PCT)
        / (deviation * TRADING_DAYS_PER_YEAR.sqrt())
}

/// `|numerator / denominator|`, 0 when the denominator is 0.
fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        (numerator / denominator).abs()
    }
}

/// Longest calendar-day gap between two consecutive zero-drawdown days.
fn recovery_days(daily: &[DayPnl], drawdown: &[f64]) -> Option<i64> {
    let zero_days: Vec<NaiveDate> = daily
        .iter()
        .zip(drawdown)
        .filter(|(_, &dd)| dd == 0.0)
        .map(|(d, _)| d.date)
        .collect();
    zero_days
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days())
        .max()
}

/// Longest win and loss streaks, one pass, each counter reset when the
/// other side prints.
fn streaks(pnl: &[f64]) -> (usize, usize) {
    let mut win = 0;
    let mut loss = 0;
    let mut max_win = 0;
    let mut max_loss = 0;
    for &p in pnl {
        if p > 0.0 {
            win += 1;
            loss = 0;
        } else if p < 0.0 {
            loss += 1;
            win = 0;
        } else {
            win = 0;
            loss = 0;
        }
        max_win = max_win.max(win);
        max_loss = max_loss.max(loss);
    }
    (max_win, max_loss)
}

/// Round to 2 decimals; non-finite values pass through.
pub fn round2(value: f64) -> f64 {
    if value.is_finite() {
        (value * 100.0).round() / 100.0
    } else {
        value
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator), 0 for fewer than 2
/// values.
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Lower-middle median: sorted element at index `(n - 1) / 2`.
fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted[(sorted.len() - 1) / 2]
}
