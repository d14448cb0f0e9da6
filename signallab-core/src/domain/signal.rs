//! Raw and canonical alert signals.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One row of a raw alert export, as delivered by the charting frontend.
///
/// The `label` is free text like `"Entry Long"` or `"Exit Short"`; the
/// timestamp string format is configured per run (`RunParams::signal_datetime_format`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSignal {
    #[serde(rename = "trade")]
    pub trade_no: i64,

    #[serde(rename = "type")]
    pub label: String,

    #[serde(rename = "datetime")]
    pub timestamp: String,

    #[serde(rename = "contracts")]
    pub lots: f64,

    /// Optional fill price reported alongside the alert.
    #[serde(default)]
    pub price: Option<f64>,
}

/// Direction of a signal or trade window.
///
/// `Manual` marks synthetic windows inserted to cover intraday time the
/// real signals leave open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
    Manual,
}

impl Direction {
    /// Parse the direction token of an alert label ("Long" from "Entry Long").
    pub fn from_label_token(token: &str) -> Option<Self> {
        match token.trim().to_uppercase().as_str() {
            "LONG" => Some(Direction::Long),
            "SHORT" => Some(Direction::Short),
            "MANUAL" => Some(Direction::Manual),
            _ => None,
        }
    }
}

/// A canonical, timestamp-parsed alert signal.
///
/// The original label is preserved verbatim: entry/exit role resolution
/// during pairing inspects it for the substrings "ENTRY" and "EXIT",
/// and upstream label corruption is an observed reality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub trade_no: i64,
    pub kind: Direction,
    pub label: String,
    pub at: NaiveDateTime,
    pub lots: f64,
    pub price: Option<f64>,
}

impl Signal {
    /// True when the preserved label marks this signal as an entry.
    pub fn label_says_entry(&self) -> bool {
        self.label.to_uppercase().contains("ENTRY")
    }

    /// True when the preserved label marks this signal as an exit.
    pub fn label_says_exit(&self) -> bool {
        self.label.to_uppercase().contains("EXIT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_from_label_token() {
        assert_eq!(Direction::from_label_token("Long"), Some(Direction::Long));
        assert_eq!(Direction::from_label_token(" SHORT "), Some(Direction::Short));
        assert_eq!(Direction::from_label_token("manual"), Some(Direction::Manual));
        assert_eq!(Direction::from_label_token("Sideways"), None);
    }

    #[test]
    fn label_role_detection_is_case_insensitive() {
        let sig = Signal {
            trade_no: 1,
            kind: Direction::Long,
            label: "entry long".into(),
            at: chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(9, 20, 0)
                .unwrap(),
            lots: 1.0,
            price: None,
        };
        assert!(sig.label_says_entry());
        assert!(!sig.label_says_exit());
    }

    #[test]
    fn raw_signal_deserializes_frontend_field_names() {
        let json = r#"{"trade": 7, "type": "Exit Short", "datetime": "2024-01-02 15:15:00", "contracts": 75}"#;
        let raw: RawSignal = serde_json::from_str(json).unwrap();
        assert_eq!(raw.trade_no, 7);
        assert_eq!(raw.label, "Exit Short");
        assert_eq!(raw.lots, 75.0);
        assert!(raw.price.is_none());
    }
}
