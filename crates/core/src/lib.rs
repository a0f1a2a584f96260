pub mod advisor;
pub mod domain;
pub mod market;
pub mod profile;

pub use profile::validate_static_config;

pub mod config {
    use std::ops::RangeInclusive;
    use std::time::Duration;

    const DEFAULT_MARKET_DATA_BASE_URL: &str = "https://query1.finance.yahoo.com";
    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_RETRIES: u32 = 3;
    const DEFAULT_CONCURRENCY: usize = 4;
    const DEFAULT_PORT: u16 = 3000;

    pub const RETRIES_RANGE: RangeInclusive<u32> = 1..=8;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub port: u16,
        pub market_data_base_url: String,
        pub market_data_api_key: Option<String>,
        /// Timeout for a single HTTP request to the provider.
        pub market_data_timeout: Duration,
        pub market_data_retries: u32,
        pub market_data_concurrency: usize,
        /// Budget for one symbol across all attempts and backoff.
        pub market_data_symbol_timeout: Duration,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let parse = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

            let market_data_base_url = parse("MARKET_DATA_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MARKET_DATA_BASE_URL.to_string());

            let timeout_secs = parse_num(parse("MARKET_DATA_TIMEOUT_SECS")).unwrap_or(DEFAULT_TIMEOUT_SECS);
            let retries = parse_num(parse("MARKET_DATA_RETRIES")).unwrap_or(DEFAULT_RETRIES);
            let concurrency = parse_num(parse("MARKET_DATA_CONCURRENCY")).unwrap_or(DEFAULT_CONCURRENCY);
            let port = parse_num(parse("PORT")).unwrap_or(DEFAULT_PORT);

            anyhow::ensure!(timeout_secs > 0, "MARKET_DATA_TIMEOUT_SECS must be > 0");
            anyhow::ensure!(
                RETRIES_RANGE.contains(&retries),
                "MARKET_DATA_RETRIES must be {}..={} (got {retries})",
                RETRIES_RANGE.start(),
                RETRIES_RANGE.end()
            );
            anyhow::ensure!(
                (1..=16).contains(&concurrency),
                "MARKET_DATA_CONCURRENCY must be 1..=16 (got {concurrency})"
            );

            let market_data_timeout = Duration::from_secs(timeout_secs);
            let market_data_symbol_timeout = match parse_num::<u64>(parse("MARKET_DATA_SYMBOL_TIMEOUT_SECS")) {
                Some(secs) => {
                    anyhow::ensure!(secs > 0, "MARKET_DATA_SYMBOL_TIMEOUT_SECS must be > 0");
                    Duration::from_secs(secs)
                }
                None => crate::market::yahoo::retry_budget(
                    market_data_timeout,
                    retries,
                    crate::market::yahoo::DEFAULT_BACKOFF_BASE,
                ),
            };

            Ok(Self {
                sentry_dsn: parse("SENTRY_DSN"),
                port,
                market_data_base_url,
                market_data_api_key: parse("MARKET_DATA_API_KEY"),
                market_data_timeout,
                market_data_retries: retries,
                market_data_concurrency: concurrency,
                market_data_symbol_timeout,
            })
        }

        pub fn enrich_options(&self) -> crate::market::enricher::EnrichOptions {
            crate::market::enricher::EnrichOptions {
                concurrency: self.market_data_concurrency,
                symbol_timeout: self.market_data_symbol_timeout,
            }
        }
    }

    fn parse_num<T: std::str::FromStr>(v: Option<String>) -> Option<T> {
        v.and_then(|s| s.trim().parse::<T>().ok())
    }

}
