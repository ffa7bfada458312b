//! FRED (Federal Reserve Economic Data) indicator source.
//!
//! Provides the economic series used for reconciliation context: interest
//! rates, treasury yields, inflation and employment. The 10y-2y yield curve
//! spread is derived client-side from the fetched yields.

use std::borrow::Cow;
use std::time::Duration;

use chrono::NaiveDate;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::EconomicIndicator;

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";
const SOURCE_ID: &str = "FRED";

/// FRED series fetched for a full indicator set: (series id, name, unit).
const SERIES: &[(&str, &str, &str)] = &[
    ("FEDFUNDS", "Federal Funds Rate", "%"),
    ("DGS2", "2Y Treasury Yield", "%"),
    ("DGS5", "5Y Treasury Yield", "%"),
    ("DGS10", "10Y Treasury Yield", "%"),
    ("DGS30", "30Y Treasury Yield", "%"),
    ("CPIAUCSL", "CPI", "index"),
    ("UNRATE", "Unemployment Rate", "%"),
];

/// FRED economic indicator source.
pub struct FredProvider {
    client: Client,
    api_key: Option<String>,
}

// ============================================================================
// Response structures for the FRED API
// ============================================================================

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Option<Vec<Observation>>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    // FRED reports missing data points as the literal string "."
    value: String,
}

impl FredProvider {
    /// Create a FRED provider. `api_key` may be `None`, in which case every
    /// call fails with `MissingApiKey` and the snapshot simply carries no
    /// economic series.
    pub fn new(api_key: Option<String>, request_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_default();
        Self { client, api_key }
    }

    /// Identifier used in snapshot data_sources.
    pub fn id(&self) -> &'static str {
        SOURCE_ID
    }

    fn api_key(&self) -> Result<&str, MarketDataError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(MarketDataError::MissingApiKey {
                provider: SOURCE_ID.to_string(),
            })
    }

    /// Fetch the most recent observation of a series.
    pub async fn get_indicator(
        &self,
        series_id: &str,
        name: &str,
        unit: &str,
    ) -> Result<EconomicIndicator, MarketDataError> {
        let api_key = self.api_key()?;
        let response = self
            .client
            .get(BASE_URL)
            .query(&[
                ("series_id", series_id),
                ("api_key", api_key),
                ("file_type", "json"),
                ("sort_order", "desc"),
                ("limit", "30"),
            ])
            .send()
            .await?;

        if response.status().as_u16() == 429 {
            return Err(MarketDataError::RateLimited {
                provider: SOURCE_ID.to_string(),
            });
        }

        let body: ObservationsResponse = response.json().await?;

        if let Some(message) = body.error_message {
            return Err(MarketDataError::SourceError {
                provider: SOURCE_ID.to_string(),
                message,
            });
        }

        let observations = body.observations.unwrap_or_default();
        latest_observation(&observations)
            .map(|(date, value)| EconomicIndicator {
                name: name.to_string(),
                value,
                unit: unit.to_string(),
                as_of_date: date,
                source: Cow::Borrowed(SOURCE_ID),
            })
            .ok_or(MarketDataError::EmptyResponse {
                provider: SOURCE_ID.to_string(),
            })
    }

    /// Fetch the full indicator set, including the derived yield curve
    /// spread. Series that fail individually are skipped, not fatal.
    pub async fn get_all_indicators(&self) -> Result<Vec<EconomicIndicator>, MarketDataError> {
        // Fail fast when no key is configured rather than issuing one doomed
        // request per series.
        self.api_key()?;

        let mut indicators = Vec::with_capacity(SERIES.len() + 1);
        for &(series_id, name, unit) in SERIES {
            match self.get_indicator(series_id, name, unit).await {
                Ok(indicator) => indicators.push(indicator),
                Err(e) => debug!("FRED series {} unavailable: {}", series_id, e),
            }
        }

        if indicators.is_empty() {
            return Err(MarketDataError::EmptyResponse {
                provider: SOURCE_ID.to_string(),
            });
        }

        if let Some(spread) = derive_yield_curve_spread(&indicators) {
            indicators.push(spread);
        }

        Ok(indicators)
    }
}

/// First observation with a parseable value, observations sorted most
/// recent first.
fn latest_observation(observations: &[Observation]) -> Option<(NaiveDate, f64)> {
    observations.iter().find_map(|obs| {
        let value: f64 = obs.value.parse().ok()?;
        let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").ok()?;
        Some((date, value))
    })
}

/// 10y minus 2y spread, when both yields are present.
fn derive_yield_curve_spread(indicators: &[EconomicIndicator]) -> Option<EconomicIndicator> {
    let t10 = indicators.iter().find(|i| i.name == "10Y Treasury Yield")?;
    let t2 = indicators.iter().find(|i| i.name == "2Y Treasury Yield")?;

    Some(EconomicIndicator {
        name: "Yield Curve Spread (10Y-2Y)".to_string(),
        value: t10.value - t2.value,
        unit: "%".to_string(),
        as_of_date: t10.as_of_date.max(t2.as_of_date),
        source: Cow::Borrowed(SOURCE_ID),
    })
}

/// Indicator names as they appear in the assembled set; used by the
/// snapshot builder.
pub mod names {
    pub const FED_FUNDS: &str = "Federal Funds Rate";
    pub const TREASURY_2Y: &str = "2Y Treasury Yield";
    pub const TREASURY_5Y: &str = "5Y Treasury Yield";
    pub const TREASURY_10Y: &str = "10Y Treasury Yield";
    pub const TREASURY_30Y: &str = "30Y Treasury Yield";
    pub const YIELD_CURVE_SPREAD: &str = "Yield Curve Spread (10Y-2Y)";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observations_skip_missing_values() {
        let observations = vec![
            Observation {
                date: "2024-01-15".to_string(),
                value: ".".to_string(),
            },
            Observation {
                date: "2024-01-12".to_string(),
                value: "5.33".to_string(),
            },
        ];

        let (date, value) = latest_observation(&observations).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 12).unwrap());
        assert!((value - 5.33).abs() < f64::EPSILON);
    }

    #[test]
    fn test_observations_response_parsing() {
        let json = r#"{
            "observations": [
                {"date": "2024-01-15", "value": "5.33", "realtime_start": "x", "realtime_end": "y"}
            ]
        }"#;

        let parsed: ObservationsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.observations.unwrap()[0].value, "5.33");
    }

    #[test]
    fn test_yield_curve_spread_derivation() {
        let mk = |name: &str, value: f64| EconomicIndicator {
            name: name.to_string(),
            value,
            unit: "%".to_string(),
            as_of_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            source: Cow::Borrowed(SOURCE_ID),
        };

        let indicators = vec![mk("10Y Treasury Yield", 4.50), mk("2Y Treasury Yield", 4.75)];
        let spread = derive_yield_curve_spread(&indicators).unwrap();
        assert!((spread.value - (-0.25)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_reported() {
        let provider = FredProvider::new(None, Duration::from_secs(1));
        let err = provider.get_all_indicators().await.unwrap_err();
        assert!(matches!(err, MarketDataError::MissingApiKey { .. }));
    }
}
