use crate::config::Settings;
use crate::market::{HistoryPeriod, MarketDataProvider};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

const CHART_PATH: [&str; 3] = ["v8", "finance", "chart"];
const DAILY_INTERVAL: &str = "1d";
const USER_AGENT: &str = concat!("advisor/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);

/// Delay before retry number `attempt` (1-based): base, 2x base, 4x base, ...
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}

/// Worst-case time for one symbol: every attempt hits the request timeout,
/// plus the backoff slept between attempts.
pub fn retry_budget(request_timeout: Duration, retries: u32, backoff_base: Duration) -> Duration {
    let retries = retries.clamp(
        *crate::config::RETRIES_RANGE.start(),
        *crate::config::RETRIES_RANGE.end(),
    );
    let backoff = (1..retries).fold(Duration::ZERO, |acc, attempt| {
        acc.saturating_add(backoff_delay(backoff_base, attempt))
    });
    request_timeout
        .saturating_mul(retries)
        .saturating_add(backoff)
        .saturating_add(Duration::from_secs(1))
}

/// Yahoo Finance v8 chart endpoint client.
#[derive(Debug, Clone)]
pub struct YahooChartProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    retries: u32,
    backoff_base: Duration,
}

/// Non-2xx response or a chart-level error object.
#[derive(Debug, Clone)]
pub struct ProviderStatusError {
    pub status: StatusCode,
    pub detail: String,
}

impl ProviderStatusError {
    fn is_retryable(&self) -> bool {
        self.status == StatusCode::TOO_MANY_REQUESTS || self.status.is_server_error()
    }
}

impl fmt::Display for ProviderStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "market data HTTP {}: {}", self.status, self.detail)
    }
}

impl std::error::Error for ProviderStatusError {}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl YahooChartProvider {
    pub fn new(base_url: impl Into<String>, timeout: Duration, retries: u32) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build market data http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: None,
            retries: retries.clamp(
                *crate::config::RETRIES_RANGE.start(),
                *crate::config::RETRIES_RANGE.end(),
            ),
            backoff_base: DEFAULT_BACKOFF_BASE,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut provider = Self::new(
            settings.market_data_base_url.clone(),
            settings.market_data_timeout,
            settings.market_data_retries,
        )?;
        provider.api_key = settings.market_data_api_key.clone();
        Ok(provider)
    }

    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    fn url(&self, symbol: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .with_context(|| format!("invalid market data base url: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("market data base url cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(CHART_PATH)
            .push(symbol);
        Ok(url)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }

    async fn fetch_once(&self, symbol: &str, period: HistoryPeriod) -> Result<Vec<f64>> {
        let url = self.url(symbol)?;
        let headers = self.headers()?;

        let res = self
            .http
            .get(url)
            .headers(headers)
            .query(&[("range", period.as_str()), ("interval", DAILY_INTERVAL)])
            .send()
            .await
            .context("market data request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read market data response")?;

        let parsed = serde_json::from_str::<ChartEnvelope>(&text);

        if !status.is_success() {
            let detail = parsed
                .ok()
                .and_then(|env| env.chart.error)
                .map(describe_chart_error)
                .unwrap_or(text);
            return Err(ProviderStatusError { status, detail }.into());
        }

        let envelope =
            parsed.with_context(|| format!("market data response is not a chart payload: {text}"))?;
        parse_closes(envelope)
    }

    fn is_retryable(err: &anyhow::Error) -> bool {
        if let Some(status_err) = err.downcast_ref::<ProviderStatusError>() {
            return status_err.is_retryable();
        }
        err.chain().any(|cause| cause.is::<reqwest::Error>())
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for YahooChartProvider {
    fn provider_name(&self) -> &'static str {
        "yahoo_chart"
    }

    async fn fetch_closing_prices(&self, symbol: &str, period: HistoryPeriod) -> Result<Vec<f64>> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(symbol, period).await {
                Ok(closes) => return Ok(closes),
                Err(err) => {
                    if attempt >= self.retries || !Self::is_retryable(&err) {
                        return Err(err);
                    }
                    let backoff = backoff_delay(self.backoff_base, attempt);
                    tracing::warn!(symbol, attempt, ?backoff, error = %err, "market data fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

fn describe_chart_error(err: ChartError) -> String {
    match (err.code, err.description) {
        (Some(code), Some(desc)) => format!("{code}: {desc}"),
        (Some(s), None) | (None, Some(s)) => s,
        (None, None) => "unknown chart error".to_string(),
    }
}

fn parse_closes(envelope: ChartEnvelope) -> Result<Vec<f64>> {
    if let Some(err) = envelope.chart.error {
        anyhow::bail!("market data error: {}", describe_chart_error(err));
    }

    // Missing result/quote arrays mean the symbol resolved without history.
    let closes = envelope
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|r| r.indicators)
        .and_then(|i| i.quote.into_iter().next())
        .map(|q| q.close.into_iter().flatten().filter(|c| c.is_finite()).collect())
        .unwrap_or_default();

    Ok(closes)
}
