use crate::domain::recommendation::Recommendation;
use crate::market::stats::summarize;
use crate::market::types::InstrumentMarketStats;
use crate::market::{HistoryPeriod, MarketDataProvider};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const FETCH_TASK_FAILED: &str = "fetch task failed";

#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Maximum number of in-flight provider requests.
    pub concurrency: usize,
    /// Upper bound for one symbol, retries included.
    pub symbol_timeout: Duration,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            concurrency: 4,
            symbol_timeout: crate::market::yahoo::retry_budget(
                Duration::from_secs(30),
                3,
                crate::market::yahoo::DEFAULT_BACKOFF_BASE,
            ),
        }
    }
}

/// Fetches one year of closes for every distinct symbol in `recommendation`
/// and summarizes each. Always returns exactly one entry per distinct symbol;
/// provider faults and timeouts become error markers for that symbol only.
pub async fn enrich(
    provider: Arc<dyn MarketDataProvider>,
    recommendation: &Recommendation,
    opts: &EnrichOptions,
) -> BTreeMap<String, InstrumentMarketStats> {
    let symbols: BTreeSet<String> = recommendation.symbols().map(str::to_string).collect();
    let total = symbols.len();
    let semaphore = Arc::new(Semaphore::new(opts.concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for symbol in symbols.iter().cloned() {
        let provider = Arc::clone(&provider);
        let semaphore = Arc::clone(&semaphore);
        let timeout = opts.symbol_timeout;
        tasks.spawn(async move {
            let stats = match semaphore.acquire_owned().await {
                Ok(_permit) => fetch_stats(provider.as_ref(), &symbol, timeout).await,
                Err(_) => InstrumentMarketStats::error(FETCH_TASK_FAILED),
            };
            (symbol, stats)
        });
    }

    let mut out = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((symbol, stats)) => {
                out.insert(symbol, stats);
            }
            Err(err) => {
                tracing::error!(error = %err, "market data task did not complete");
            }
        }
    }

    // A panicked task loses its symbol; backfill so the mapping stays complete.
    for symbol in symbols {
        out.entry(symbol)
            .or_insert_with(|| InstrumentMarketStats::error(FETCH_TASK_FAILED));
    }

    let failures = out.values().filter(|s| s.is_error()).count();
    tracing::info!(
        provider = provider.provider_name(),
        symbols = total,
        failures,
        "market data enrichment finished"
    );

    out
}

async fn fetch_stats(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    timeout: Duration,
) -> InstrumentMarketStats {
    let fetched = tokio::time::timeout(
        timeout,
        provider.fetch_closing_prices(symbol, HistoryPeriod::OneYear),
    )
    .await;

    match fetched {
        Ok(Ok(closes)) => {
            if closes.is_empty() {
                tracing::warn!(symbol, "market data returned no history");
            }
            summarize(&closes)
        }
        Ok(Err(err)) => {
            tracing::warn!(symbol, error = %err, "market data fetch failed");
            InstrumentMarketStats::error(format!("{err:#}"))
        }
        Err(_) => {
            tracing::warn!(symbol, ?timeout, "market data fetch timed out");
            InstrumentMarketStats::error(format!("timed out after {}s", timeout.as_secs_f64()))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::recommendation::AssetClass;
    use crate::profile::builder::build;
    use crate::profile::catalog::StaticCatalog;
    use crate::profile::policy::AGGRESSIVE;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone)]
    pub(crate) enum Scripted {
        Closes(Vec<f64>),
        Fault(&'static str),
        Hang,
        Panic,
    }

    /// In-memory provider; symbols without a script get a flat series.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedProvider {
        pub(crate) script: HashMap<&'static str, Scripted>,
        pub(crate) calls: AtomicUsize,
    }

    impl ScriptedProvider {
        pub(crate) fn with(mut self, symbol: &'static str, s: Scripted) -> Self {
            self.script.insert(symbol, s);
            self
        }
    }

    #[async_trait::async_trait]
    impl MarketDataProvider for ScriptedProvider {
        fn provider_name(&self) -> &'static str {
            "scripted"
        }

        async fn fetch_closing_prices(
            &self,
            symbol: &str,
            period: HistoryPeriod,
        ) -> anyhow::Result<Vec<f64>> {
            assert_eq!(period, HistoryPeriod::OneYear);
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script.get(symbol).cloned() {
                Some(Scripted::Closes(c)) => Ok(c),
                Some(Scripted::Fault(msg)) => anyhow::bail!("{msg}"),
                Some(Scripted::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(vec![])
                }
                Some(Scripted::Panic) => panic!("provider blew up"),
                None => Ok(vec![100.0, 110.0]),
            }
        }
    }

    fn opts() -> EnrichOptions {
        EnrichOptions {
            concurrency: 3,
            symbol_timeout: Duration::from_millis(200),
        }
    }

    #[tokio::test]
    async fn faults_and_empty_history_are_isolated() {
        let provider = Arc::new(
            ScriptedProvider::default()
                .with("QQQ", Scripted::Closes(vec![]))
                .with("BND", Scripted::Fault("symbol lookup failed")),
        );
        let rec = build(&AGGRESSIVE, &StaticCatalog);

        let out = enrich(provider.clone(), &rec, &opts()).await;

        assert_eq!(out.len(), 15);
        assert_eq!(out["QQQ"], InstrumentMarketStats::no_data());
        assert_eq!(out["BND"].error_message(), Some("symbol lookup failed"));
        assert_eq!(
            out["VTI"],
            InstrumentMarketStats::Stats {
                current_price: 110.0,
                year_high: 110.0,
                year_low: 100.0,
                volatility: 7.07,
                one_year_return_percent: 10.0,
            }
        );
        assert_eq!(out.values().filter(|s| s.is_error()).count(), 2);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 15);
    }

    #[tokio::test]
    async fn every_symbol_failing_still_yields_complete_mapping() {
        let mut provider = ScriptedProvider::default();
        let rec = build(&AGGRESSIVE, &StaticCatalog);
        let symbols: Vec<&'static str> = AssetClass::ALL
            .into_iter()
            .flat_map(|c| crate::profile::catalog::instruments_for(c).iter().map(|i| i.symbol))
            .collect();
        for &s in &symbols {
            provider = provider.with(s, Scripted::Fault("offline"));
        }

        let out = enrich(Arc::new(provider), &rec, &opts()).await;
        assert_eq!(out.len(), symbols.len());
        assert!(out.values().all(|s| s.error_message() == Some("offline")));
    }

    #[tokio::test]
    async fn slow_symbol_times_out_without_blocking_others() {
        let provider = Arc::new(ScriptedProvider::default().with("GLD", Scripted::Hang));
        let rec = build(&AGGRESSIVE, &StaticCatalog);

        let out = enrich(provider, &rec, &opts()).await;

        assert!(out["GLD"].error_message().unwrap().starts_with("timed out"));
        assert!(!out["IAU"].is_error());
        assert_eq!(out.len(), 15);
    }

    #[tokio::test]
    async fn panicking_fetch_is_backfilled() {
        let provider = Arc::new(ScriptedProvider::default().with("TLT", Scripted::Panic));
        let rec = build(&AGGRESSIVE, &StaticCatalog);

        let out = enrich(provider, &rec, &opts()).await;

        assert_eq!(out["TLT"].error_message(), Some(FETCH_TASK_FAILED));
        assert!(!out["BND"].is_error());
        assert_eq!(out.len(), 15);
    }

    #[tokio::test]
    async fn duplicate_symbols_are_fetched_once() {
        let mut rec = build(&AGGRESSIVE, &StaticCatalog);
        let dup = rec.classes[0].instruments[0].clone();
        rec.classes[1].instruments.push(dup);
        let provider = Arc::new(ScriptedProvider::default());

        let out = enrich(provider.clone(), &rec, &opts()).await;

        assert_eq!(out.len(), 15);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 15);
    }

    #[tokio::test]
    async fn empty_recommendation_makes_no_calls() {
        let provider = Arc::new(ScriptedProvider::default());
        let out = enrich(provider.clone(), &Recommendation::default(), &opts()).await;
        assert!(out.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
