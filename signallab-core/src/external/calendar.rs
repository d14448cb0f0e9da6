//! Rollover expiry calendar provider.

use super::retry::{RetryPolicy, Sleeper, ThreadSleeper};
use crate::pipeline::rollover::ExpiryCalendar;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("calendar request failed: {0}")]
    Transport(String),

    #[error("calendar returned HTTP {status}")]
    Status { status: u16 },

    #[error("calendar response did not parse: {0}")]
    BadResponse(String),

    #[error("calendar for {instrument} is empty")]
    Empty { instrument: String },
}

/// Source of the expiry calendar used to split windows at rollover
/// boundaries. Exhausting retries here aborts the affected batch, so
/// implementations retry internally.
pub trait RolloverCalendarSource: Send + Sync {
    fn expiry_calendar(&self, instrument: &str) -> Result<ExpiryCalendar, CalendarError>;
}

/// Wire shape: trading date → upcoming expiry dates, nearest first.
fn parse_calendar(body: &str, instrument: &str) -> Result<ExpiryCalendar, CalendarError> {
    let raw: BTreeMap<NaiveDate, Vec<NaiveDate>> =
        serde_json::from_str(body).map_err(|e| CalendarError::BadResponse(e.to_string()))?;
    let calendar = ExpiryCalendar::new(raw);
    if calendar.is_empty() {
        return Err(CalendarError::Empty {
            instrument: instrument.to_string(),
        });
    }
    Ok(calendar)
}

/// Blocking HTTP calendar client, retried with linear backoff.
pub struct HttpCalendarSource {
    client: reqwest::blocking::Client,
    base_url: String,
    retry: RetryPolicy,
    sleeper: Box<dyn Sleeper>,
}

impl HttpCalendarSource {
    pub fn new(base_url: impl Into<String>) -> Result<Self, CalendarError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CalendarError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            retry: RetryPolicy::linear(5),
            sleeper: Box::new(ThreadSleeper),
        })
    }

    fn fetch_once(&self, instrument: &str) -> Result<ExpiryCalendar, CalendarError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), instrument);
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| CalendarError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CalendarError::Status {
                status: status.as_u16(),
            });
        }

        let body = resp
            .text()
            .map_err(|e| CalendarError::Transport(e.to_string()))?;
        parse_calendar(&body, instrument)
    }
}

impl RolloverCalendarSource for HttpCalendarSource {
    fn expiry_calendar(&self, instrument: &str) -> Result<ExpiryCalendar, CalendarError> {
        self.retry
            .run(self.sleeper.as_ref(), |_| self.fetch_once(instrument))
    }
}
