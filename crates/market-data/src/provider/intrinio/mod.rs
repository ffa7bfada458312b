//! Intrinio quote source implementation.
//!
//! Premium quote and fundamentals data. Requires an API key; without one
//! every call fails with `MissingApiKey`, which the fallback client treats
//! as "try the next source".

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

const BASE_URL: &str = "https://api-v2.intrinio.com";
const SOURCE_ID: &str = "INTRINIO";

/// Intrinio quote source.
pub struct IntrinioProvider {
    client: Client,
    api_key: Option<String>,
}

// ============================================================================
// Response structures for the Intrinio API
// ============================================================================

/// securities/{ticker}/prices/realtime response
#[derive(Debug, Deserialize)]
struct RealtimePriceResponse {
    last_price: Option<f64>,
    previous_close: Option<f64>,
    market_volume: Option<u64>,
    security: Option<SecurityRef>,
}

#[derive(Debug, Deserialize)]
struct SecurityRef {
    ticker: Option<String>,
}

/// companies/{ticker} response
#[derive(Debug, Deserialize)]
struct CompanyResponse {
    ticker: Option<String>,
    name: Option<String>,
    sector: Option<String>,
    industry_category: Option<String>,
    stock_exchange: Option<String>,
}

impl IntrinioProvider {
    /// Create an Intrinio provider. `api_key` may be `None`, in which case
    /// the provider is present but never answers.
    pub fn new(api_key: Option<String>, request_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_default();
        Self { client, api_key }
    }

    fn api_key(&self) -> Result<&str, MarketDataError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(MarketDataError::MissingApiKey {
                provider: SOURCE_ID.to_string(),
            })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, MarketDataError> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", BASE_URL, path);
        let response = self
            .client
            .get(&url)
            .query(&[("api_key", api_key)])
            .send()
            .await?;

        match response.status().as_u16() {
            429 => Err(MarketDataError::RateLimited {
                provider: SOURCE_ID.to_string(),
            }),
            404 => Err(MarketDataError::SymbolNotFound(path.to_string())),
            s if s >= 400 => Err(MarketDataError::SourceError {
                provider: SOURCE_ID.to_string(),
                message: format!("HTTP {}", s),
            }),
            _ => Ok(response.json().await?),
        }
    }
}

#[async_trait]
impl QuoteProvider for IntrinioProvider {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    async fn get_quote(&self, ticker: &str) -> Result<StockQuote, MarketDataError> {
        let body: RealtimePriceResponse = self
            .get_json(&format!("/securities/{}/prices/realtime", ticker))
            .await?;

        let price = body
            .last_price
            .and_then(Decimal::from_f64_retain)
            .ok_or(MarketDataError::EmptyResponse {
                provider: SOURCE_ID.to_string(),
            })?;

        let (change, change_percent) = match body.previous_close {
            Some(prev) if prev != 0.0 => {
                let change_f = body.last_price.unwrap_or(0.0) - prev;
                (
                    Decimal::from_f64_retain(change_f).unwrap_or(Decimal::ZERO),
                    change_f / prev * 100.0,
                )
            }
            _ => (Decimal::ZERO, 0.0),
        };

        debug!("Intrinio quote for {}: {}", ticker, price);

        Ok(StockQuote {
            ticker: body
                .security
                .and_then(|s| s.ticker)
                .unwrap_or_else(|| ticker.to_string()),
            price,
            change,
            change_percent,
            volume: body.market_volume,
            timestamp: Utc::now(),
            source: Cow::Borrowed(SOURCE_ID),
        })
    }

    async fn get_company_info(&self, ticker: &str) -> Result<CompanyInfo, MarketDataError> {
        let body: CompanyResponse = self.get_json(&format!("/companies/{}", ticker)).await?;

        let name = body.name.ok_or(MarketDataError::EmptyResponse {
            provider: SOURCE_ID.to_string(),
        })?;

        Ok(CompanyInfo {
            ticker: body.ticker.unwrap_or_else(|| ticker.to_string()),
            name,
            sector: body.sector,
            industry: body.industry_category,
            is_active: true,
            exchange: body.stock_exchange,
            source: Cow::Borrowed(SOURCE_ID),
        })
    }
}
