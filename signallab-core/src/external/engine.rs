//! Remote execution engine client.
//!
//! The engine receives a strategy definition plus the trade windows to
//! simulate and returns one fill per executed leg. Engine failures are
//! not fatal to a run; the orchestration layer degrades the affected
//! strategy to an empty fill set.

use crate::config::StrategyConfig;
use crate::domain::{EngineFill, TradeWindow};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine request failed: {0}")]
    Transport(String),

    #[error("engine returned HTTP {status}")]
    Status { status: u16 },

    #[error("engine response did not parse: {0}")]
    BadResponse(String),
}

/// Payload posted to the engine for one strategy.
#[derive(Debug, Clone, Serialize)]
pub struct EngineRequest {
    pub strategy: StrategyConfig,
    /// Contract lot size of the strategy's instrument, already resolved
    /// from the reference table.
    pub lot_size: f64,
    pub windows: Vec<TradeWindow>,
}

/// Engine reply, flattened from the nested wire shape
/// `{"strategies": {"orders": [...]}}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineResponse {
    pub fills: Vec<EngineFill>,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    strategies: WireStrategies,
}

#[derive(Debug, Deserialize)]
struct WireStrategies {
    #[serde(default)]
    orders: Vec<EngineFill>,
}

impl EngineResponse {
    pub fn from_json(body: &str) -> Result<Self, EngineError> {
        let wire: WireResponse =
            serde_json::from_str(body).map_err(|e| EngineError::BadResponse(e.to_string()))?;
        Ok(Self {
            fills: wire.strategies.orders,
        })
    }
}

pub trait ExecutionEngine: Send + Sync {
    fn run(&self, request: &EngineRequest) -> Result<EngineResponse, EngineError>;
}

/// Blocking HTTP engine client with a fixed per-call timeout.
pub struct HttpExecutionEngine {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpExecutionEngine {
    pub fn new(url: impl Into<String>) -> Result<Self, EngineError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| EngineError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl ExecutionEngine for HttpExecutionEngine {
    fn run(&self, request: &EngineRequest) -> Result<EngineResponse, EngineError> {
        let resp = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(EngineError::Status {
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .map_err(|e| EngineError::Transport(e.to_string()))?;
        EngineResponse::from_json(&body)
    }
}
