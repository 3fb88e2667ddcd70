//! Polygon.io REST data adapter.
//!
//! Daily bars come from the aggregates endpoint, the display name from
//! ticker details. Rate limiting, server errors and connection failures are
//! retried with exponential backoff; authentication failures are not.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::domain::error::GoldenStopError;
use crate::domain::price_bar::PriceBar;
use crate::ports::data_port::DataPort;

pub const DEFAULT_BASE_URL: &str = "https://api.polygon.io";
pub const API_KEY_ENV: &str = "POLYGON_API_KEY";

#[derive(Clone)]
pub struct PolygonConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for PolygonConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl std::fmt::Debug for PolygonConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolygonConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct AggsResponse {
    status: Option<String>,
    #[serde(rename = "resultsCount")]
    results_count: Option<u64>,
    results: Option<Vec<AggBar>>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AggBar {
    /// Start of the aggregate window, Unix milliseconds.
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
}

#[derive(Debug, Deserialize)]
struct TickerDetailsResponse {
    results: Option<TickerDetails>,
}

#[derive(Debug, Deserialize)]
struct TickerDetails {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

pub struct PolygonAdapter {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
    max_retries: u32,
    base_delay: Duration,
}

impl PolygonAdapter {
    pub fn new(config: PolygonConfig) -> Result<Self, GoldenStopError> {
        let api_key = config
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| GoldenStopError::Credentials {
                reason: format!("no API key configured (set [polygon] api_key or {API_KEY_ENV})"),
            })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("goldenstop/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GoldenStopError::data_source(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            max_retries: config.max_retries,
            base_delay: config.base_delay,
        })
    }

    fn aggs_url(&self, symbol: &str, from: NaiveDate, to: NaiveDate) -> String {
        format!(
            "{}/v2/aggs/ticker/{symbol}/range/1/day/{}/{}?adjusted=true&sort=asc&limit=50000",
            self.base_url,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d"),
        )
    }

    fn details_url(&self, symbol: &str) -> String {
        format!("{}/v3/reference/tickers/{symbol}", self.base_url)
    }

    /// Performs a GET with retry and decodes the JSON body.
    fn get_json<T: DeserializeOwned>(&self, url: &str, symbol: &str) -> Result<T, GoldenStopError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                tracing::warn!(%symbol, attempt, ?delay, "retrying market data request");
                std::thread::sleep(delay);
            }

            let resp = match self.client.get(url).bearer_auth(&self.api_key).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(GoldenStopError::data_source(format!(
                        "network error for {symbol}: {e}"
                    )));
                    continue;
                }
                Err(e) => {
                    return Err(GoldenStopError::data_source(format!(
                        "request failed for {symbol}: {e}"
                    )));
                }
            };

            let status = resp.status();
            let body = match resp.text() {
                Ok(body) => body,
                Err(e) if e.is_timeout() => {
                    last_error = Some(GoldenStopError::data_source(format!(
                        "timed out reading response for {symbol}: {e}"
                    )));
                    continue;
                }
                Err(e) => {
                    return Err(GoldenStopError::data_source(format!(
                        "failed to read response for {symbol}: {e}"
                    )));
                }
            };
            tracing::debug!(%symbol, status = status.as_u16(), "market data response");

            if status.is_success() {
                return serde_json::from_str(&body).map_err(|e| {
                    GoldenStopError::data_source(format!(
                        "unexpected response format for {symbol}: {e}"
                    ))
                });
            }

            match status {
                reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                    return Err(GoldenStopError::Credentials {
                        reason: error_detail(&body).unwrap_or_else(|| status.to_string()),
                    });
                }
                reqwest::StatusCode::NOT_FOUND => {
                    return Err(GoldenStopError::SymbolNotFound {
                        symbol: symbol.to_string(),
                    });
                }
                s if s == reqwest::StatusCode::TOO_MANY_REQUESTS || s.is_server_error() => {
                    last_error = Some(GoldenStopError::data_source(format!(
                        "HTTP {status} for {symbol}"
                    )));
                    continue;
                }
                _ => {
                    return Err(GoldenStopError::data_source(format!(
                        "HTTP {status} for {symbol}: {}",
                        error_detail(&body).unwrap_or_default()
                    )));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| GoldenStopError::data_source("max retries exceeded")))
    }
}

fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed.error.or(parsed.message)
}

fn parse_aggs(symbol: &str, resp: AggsResponse) -> Result<Vec<PriceBar>, GoldenStopError> {
    if resp.status.as_deref() == Some("ERROR") {
        return Err(GoldenStopError::data_source(format!(
            "provider error for {symbol}: {}",
            resp.error.unwrap_or_default()
        )));
    }
    if resp.results_count == Some(0) {
        return Ok(Vec::new());
    }

    resp.results
        .unwrap_or_default()
        .into_iter()
        .map(|agg| {
            let date = DateTime::from_timestamp_millis(agg.t)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| {
                    GoldenStopError::data_source(format!("invalid timestamp {} for {symbol}", agg.t))
                })?;
            Ok(PriceBar {
                date,
                open: agg.o,
                high: agg.h,
                low: agg.l,
                close: agg.c,
            })
        })
        .collect()
}

impl DataPort for PolygonAdapter {
    fn fetch_daily_bars(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PriceBar>, GoldenStopError> {
        let resp: AggsResponse = self.get_json(&self.aggs_url(symbol, from, to), symbol)?;
        parse_aggs(symbol, resp)
    }

    fn fetch_display_name(&self, symbol: &str) -> Result<Option<String>, GoldenStopError> {
        match self.get_json::<TickerDetailsResponse>(&self.details_url(symbol), symbol) {
            Ok(resp) => Ok(resp.results.and_then(|r| r.name)),
            Err(GoldenStopError::SymbolNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
