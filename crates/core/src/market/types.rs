use serde::{Deserialize, Serialize};

pub const NO_DATA: &str = "No data";

/// Trailing statistics for one symbol, or why they are missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InstrumentMarketStats {
    Stats {
        current_price: f64,
        year_high: f64,
        year_low: f64,
        volatility: f64,
        one_year_return_percent: f64,
    },
    Error {
        error: String,
    },
}

impl InstrumentMarketStats {
    pub fn error(reason: impl Into<String>) -> Self {
        InstrumentMarketStats::Error {
            error: reason.into(),
        }
    }

    pub fn no_data() -> Self {
        Self::error(NO_DATA)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, InstrumentMarketStats::Error { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            InstrumentMarketStats::Error { error } => Some(error),
            InstrumentMarketStats::Stats { .. } => None,
        }
    }
}
