pub mod enricher;
pub mod stats;
pub mod types;
pub mod yahoo;

use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPeriod {
    OneYear,
}

impl HistoryPeriod {
    pub fn as_str(self) -> &'static str {
        match self {
            HistoryPeriod::OneYear => "1y",
        }
    }
}

/// Read-only source of daily closing prices.
#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Daily closes for `symbol` over `period`, oldest first. An unknown
    /// symbol may either fail or return an empty series.
    async fn fetch_closing_prices(&self, symbol: &str, period: HistoryPeriod) -> Result<Vec<f64>>;
}
