//! Lot-size reference table, loaded once from the exchange CSV.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LotSizeError {
    #[error("failed to read lot-size file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse lot-size CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("lot-size CSV is missing the {0} column")]
    MissingColumn(&'static str),

    #[error("invalid lot size {value:?} for {instrument}")]
    BadValue { instrument: String, value: String },

    #[error("lot-size table is empty")]
    Empty,
}

/// Instrument → contract lot size, keys upper-cased. Built once at
/// startup and passed by reference; never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct LotSizeTable {
    sizes: HashMap<String, f64>,
}

impl LotSizeTable {
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self, LotSizeError> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }

    /// Parse the exchange CSV. Expected columns (case-insensitive
    /// headers): `underlyingname`, `lotsize`.
    pub fn from_csv_reader(reader: impl Read) -> Result<Self, LotSizeError> {
        let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let headers = csv.headers()?.clone();
        let find = |name: &'static str| -> Result<usize, LotSizeError> {
            headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(name))
                .ok_or(LotSizeError::MissingColumn(name))
        };
        let name_idx = find("underlyingname")?;
        let size_idx = find("lotsize")?;

        let mut sizes = HashMap::new();
        for record in csv.records() {
            let record = record?;
            let instrument = match record.get(name_idx) {
                Some(name) if !name.is_empty() => name.to_uppercase(),
                _ => continue,
            };
            let raw = record.get(size_idx).unwrap_or("");
            let size: f64 = raw.parse().map_err(|_| LotSizeError::BadValue {
                instrument: instrument.clone(),
                value: raw.to_string(),
            })?;
            sizes.insert(instrument, size);
        }

        if sizes.is_empty() {
            return Err(LotSizeError::Empty);
        }
        Ok(Self { sizes })
    }

    pub fn get(&self, instrument: &str) -> Option<f64> {
        self.sizes.get(&instrument.to_uppercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}
