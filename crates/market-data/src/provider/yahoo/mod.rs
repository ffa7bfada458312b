//! Yahoo Finance quote source implementation.
//!
//! Free quote data from the public chart endpoint. Used both for equity
//! quotes and for index tickers (^GSPC, ^VIX) when assembling a market
//! snapshot.

use std::borrow::Cow;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::{CompanyInfo, StockQuote};
use crate::provider::QuoteProvider;

const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SOURCE_ID: &str = "YAHOO";

// Yahoo rejects requests without a browser-ish user agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Yahoo Finance quote source.
pub struct YahooProvider {
    client: Client,
}

// ============================================================================
// Response structures for the chart API
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    symbol: String,
    #[serde(rename = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(rename = "chartPreviousClose")]
    chart_previous_close: Option<f64>,
    #[serde(rename = "regularMarketVolume")]
    regular_market_volume: Option<u64>,
    #[serde(rename = "longName")]
    long_name: Option<String>,
    #[serde(rename = "fullExchangeName")]
    full_exchange_name: Option<String>,
}

impl YahooProvider {
    /// Create a Yahoo provider with its own HTTP client.
    pub fn new(request_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self { client }
    }

    async fn fetch_meta(&self, ticker: &str) -> Result<ChartMeta, MarketDataError> {
        let url = format!("{}/{}", BASE_URL, ticker);
        let response = self
            .client
            .get(&url)
            .query(&[("range", "5d"), ("interval", "1d")])
            .send()
            .await?;

        if response.status().as_u16() == 429 {
            return Err(MarketDataError::RateLimited {
                provider: SOURCE_ID.to_string(),
            });
        }
        if response.status().as_u16() == 404 {
            return Err(MarketDataError::SymbolNotFound(ticker.to_string()));
        }

        let body: ChartResponse = response.json().await?;

        if let Some(err) = body.chart.error {
            debug!("Yahoo chart error for {}: {} - {}", ticker, err.code, err.description);
            return Err(MarketDataError::SourceError {
                provider: SOURCE_ID.to_string(),
                message: format!("{}: {}", err.code, err.description),
            });
        }

        body.chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0).meta)
                }
            })
            .ok_or(MarketDataError::EmptyResponse {
                provider: SOURCE_ID.to_string(),
            })
    }
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    async fn get_quote(&self, ticker: &str) -> Result<StockQuote, MarketDataError> {
        let meta = self.fetch_meta(ticker).await?;

        let price = meta
            .regular_market_price
            .and_then(Decimal::from_f64_retain)
            .ok_or(MarketDataError::EmptyResponse {
                provider: SOURCE_ID.to_string(),
            })?;

        let previous_close = meta
            .chart_previous_close
            .and_then(Decimal::from_f64_retain);

        let (change, change_percent) = match previous_close {
            Some(prev) if !prev.is_zero() => {
                let change = price - prev;
                let pct = match (meta.regular_market_price, meta.chart_previous_close) {
                    (Some(p), Some(pc)) if pc != 0.0 => (p - pc) / pc * 100.0,
                    _ => 0.0,
                };
                (change, pct)
            }
            _ => (Decimal::ZERO, 0.0),
        };

        Ok(StockQuote {
            ticker: meta.symbol,
            price,
            change,
            change_percent,
            volume: meta.regular_market_volume,
            timestamp: Utc::now(),
            source: Cow::Borrowed(SOURCE_ID),
        })
    }

    async fn get_company_info(&self, ticker: &str) -> Result<CompanyInfo, MarketDataError> {
        let meta = self.fetch_meta(ticker).await?;

        Ok(CompanyInfo {
            ticker: meta.symbol,
            name: meta.long_name.unwrap_or_else(|| ticker.to_string()),
            sector: None,
            industry: None,
            is_active: meta.regular_market_price.is_some(),
            exchange: meta.full_exchange_name,
            source: Cow::Borrowed(SOURCE_ID),
        })
    }
}
