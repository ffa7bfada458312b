//! Unified market data client.
//!
//! Puts the premium and free quote sources plus the economic indicator
//! source behind one query surface, with priority-policy fallback, per-call
//! timeouts, and single-flight TTL caching.
//!
//! This is the error boundary of the crate: every public method returns a
//! plain value or `Option`. Source failures are logged as degraded-mode
//! signals and surface as "no data", never as errors.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt};
use log::{debug, info, warn};
use rust_decimal::prelude::ToPrimitive;

use crate::config::MarketDataConfig;
use crate::errors::{MarketDataError, RetryClass};
use crate::models::{
    CompanyInfo, EconomicIndicator, MarketSnapshot, MarketStatus, StockQuote, VendorValidation,
};
use crate::provider::fred::names;
use crate::provider::{FredProvider, IntrinioProvider, QuoteProvider, YahooProvider};
use crate::registry::cache::SingleFlightCache;
use crate::registry::priority::DataPriority;
use crate::resolver::VendorTickerResolver;

/// Yahoo-style index ticker for the S&P 500.
const SP500_TICKER: &str = "^GSPC";

/// Yahoo-style index ticker for the CBOE volatility index.
const VIX_TICKER: &str = "^VIX";

/// Unified market data client.
pub struct MarketDataClient {
    primary: Arc<dyn QuoteProvider>,
    secondary: Arc<dyn QuoteProvider>,
    econ: Arc<FredProvider>,
    resolver: VendorTickerResolver,
    priority: DataPriority,
    call_timeout: Duration,
    quote_cache: SingleFlightCache<StockQuote>,
    company_cache: SingleFlightCache<CompanyInfo>,
    indicator_cache: SingleFlightCache<Vec<EconomicIndicator>>,
    snapshot_cache: SingleFlightCache<MarketSnapshot>,
}

impl MarketDataClient {
    /// Create a client with the standard source set (Intrinio premium,
    /// Yahoo free, FRED economic).
    pub fn new(config: MarketDataConfig) -> Self {
        let primary: Arc<dyn QuoteProvider> = Arc::new(IntrinioProvider::new(
            config.intrinio_api_key.clone(),
            config.request_timeout,
        ));
        let secondary: Arc<dyn QuoteProvider> =
            Arc::new(YahooProvider::new(config.request_timeout));
        let econ = Arc::new(FredProvider::new(
            config.fred_api_key.clone(),
            config.request_timeout,
        ));
        Self::with_sources(primary, secondary, econ, &config)
    }

    /// Create a client over explicit sources. Used by tests to substitute
    /// deterministic fakes.
    pub fn with_sources(
        primary: Arc<dyn QuoteProvider>,
        secondary: Arc<dyn QuoteProvider>,
        econ: Arc<FredProvider>,
        config: &MarketDataConfig,
    ) -> Self {
        Self {
            primary,
            secondary,
            econ,
            resolver: VendorTickerResolver::new(),
            priority: config.priority,
            call_timeout: config.request_timeout,
            quote_cache: SingleFlightCache::new(config.cache_ttl),
            company_cache: SingleFlightCache::new(config.cache_ttl),
            indicator_cache: SingleFlightCache::new(config.cache_ttl),
            snapshot_cache: SingleFlightCache::new(config.cache_ttl),
        }
    }

    /// Quote sources eligible under the priority policy, in consultation
    /// order, plus whether they should be raced instead of chained.
    fn ordered_sources(&self) -> (Vec<Arc<dyn QuoteProvider>>, bool) {
        match self.priority {
            DataPriority::PrimaryFirst => {
                (vec![self.primary.clone(), self.secondary.clone()], false)
            }
            DataPriority::SecondaryOnly => (vec![self.secondary.clone()], false),
            DataPriority::PrimaryOnly => (vec![self.primary.clone()], false),
            DataPriority::FirstToRespond => {
                (vec![self.primary.clone(), self.secondary.clone()], true)
            }
        }
    }

    /// Latest quote for a ticker, or `None` when every eligible source
    /// failed.
    pub async fn get_quote(&self, ticker: &str) -> Option<StockQuote> {
        let (sources, race) = self.ordered_sources();
        let call_timeout = self.call_timeout;
        let owned_ticker = ticker.to_string();
        self.quote_cache
            .get_or_fetch(&format!("quote:{ticker}"), move || {
                fetch_quote(sources, race, call_timeout, owned_ticker)
            })
            .await
    }

    /// Company fundamentals for a ticker, or `None` when unavailable.
    pub async fn get_company_info(&self, ticker: &str) -> Option<CompanyInfo> {
        let (sources, race) = self.ordered_sources();
        let call_timeout = self.call_timeout;
        let owned_ticker = ticker.to_string();
        self.company_cache
            .get_or_fetch(&format!("company:{ticker}"), move || {
                fetch_company(sources, race, call_timeout, owned_ticker)
            })
            .await
    }

    /// The full economic indicator set, empty when the indicator source is
    /// unavailable.
    pub async fn get_economic_indicators(&self) -> Vec<EconomicIndicator> {
        let econ = self.econ.clone();
        self.indicator_cache
            .get_or_fetch("indicators", move || async move {
                match econ.get_all_indicators().await {
                    Ok(indicators) => Some(indicators),
                    Err(e) => {
                        warn!("economic indicators unavailable: {}", e);
                        None
                    }
                }
            })
            .await
            .unwrap_or_default()
    }

    /// Assemble a market snapshot from every source that answers.
    ///
    /// Returns `None` when no source contributed anything - callers treat
    /// that as a valid "no data" state.
    pub async fn get_market_snapshot(&self) -> Option<MarketSnapshot> {
        let (sources, race) = self.ordered_sources();
        let call_timeout = self.call_timeout;
        let econ = self.econ.clone();
        self.snapshot_cache
            .get_or_fetch("snapshot", move || {
                build_snapshot(sources, race, call_timeout, econ)
            })
            .await
    }

    /// Resolve a vendor name and check the resolved ticker for liveness.
    ///
    /// A vendor that doesn't resolve to a public ticker yields a
    /// not-public validation; resolution itself never fails.
    pub async fn validate_vendor(&self, vendor_name: &str) -> VendorValidation {
        let Some(ticker) = self.resolver.lookup(vendor_name) else {
            return VendorValidation::not_public(vendor_name);
        };

        // Liveness rides on the (cached) quote path.
        let quote = self.get_quote(ticker).await;
        debug!(
            "vendor '{}' resolved to {} (active: {})",
            vendor_name,
            ticker,
            quote.is_some()
        );

        VendorValidation {
            vendor_name: vendor_name.to_string(),
            is_public: true,
            ticker: Some(ticker.to_string()),
            is_active: quote.is_some(),
            price: quote.map(|q| q.price),
        }
    }

    /// Drop all cached results.
    pub async fn clear_caches(&self) {
        self.quote_cache.clear().await;
        self.company_cache.clear().await;
        self.indicator_cache.clear().await;
        self.snapshot_cache.clear().await;
    }
}

/// Fetch a quote through the source chain. Chained mode walks sources in
/// order, consulting each error's retry class; race mode returns the first
/// success.
async fn fetch_quote(
    sources: Vec<Arc<dyn QuoteProvider>>,
    race: bool,
    call_timeout: Duration,
    ticker: String,
) -> Option<StockQuote> {
    if race {
        let attempts: Vec<BoxFuture<'static, Result<StockQuote, MarketDataError>>> = sources
            .iter()
            .map(|source| {
                let source = source.clone();
                let ticker = ticker.clone();
                async move {
                    match tokio::time::timeout(call_timeout, source.get_quote(&ticker)).await {
                        Ok(result) => result,
                        Err(_) => Err(MarketDataError::Timeout {
                            provider: source.id().to_string(),
                        }),
                    }
                }
                .boxed()
            })
            .collect();

        match futures::future::select_ok(attempts).await {
            Ok((quote, _)) => Some(quote),
            Err(e) => {
                warn!("all quote sources failed for {}: {}", ticker, e);
                None
            }
        }
    } else {
        for source in &sources {
            match tokio::time::timeout(call_timeout, source.get_quote(&ticker)).await {
                Ok(Ok(quote)) => return Some(quote),
                Ok(Err(e)) => match e.retry_class() {
                    RetryClass::Never => {
                        info!("terminal error from '{}' for {}: {}", source.id(), ticker, e);
                        return None;
                    }
                    RetryClass::NextSource => {
                        warn!(
                            "quote source '{}' failed for {}: {}, trying next",
                            source.id(),
                            ticker,
                            e
                        );
                    }
                },
                Err(_) => {
                    warn!("quote source '{}' timed out for {}", source.id(), ticker);
                }
            }
        }
        None
    }
}

/// Company info counterpart of [`fetch_quote`].
async fn fetch_company(
    sources: Vec<Arc<dyn QuoteProvider>>,
    race: bool,
    call_timeout: Duration,
    ticker: String,
) -> Option<CompanyInfo> {
    if race {
        let attempts: Vec<BoxFuture<'static, Result<CompanyInfo, MarketDataError>>> = sources
            .iter()
            .map(|source| {
                let source = source.clone();
                let ticker = ticker.clone();
                async move {
                    match tokio::time::timeout(call_timeout, source.get_company_info(&ticker)).await
                    {
                        Ok(result) => result,
                        Err(_) => Err(MarketDataError::Timeout {
                            provider: source.id().to_string(),
                        }),
                    }
                }
                .boxed()
            })
            .collect();

        match futures::future::select_ok(attempts).await {
            Ok((info, _)) => Some(info),
            Err(e) => {
                warn!("all company sources failed for {}: {}", ticker, e);
                None
            }
        }
    } else {
        for source in &sources {
            match tokio::time::timeout(call_timeout, source.get_company_info(&ticker)).await {
                Ok(Ok(info)) => return Some(info),
                Ok(Err(e)) => match e.retry_class() {
                    RetryClass::Never => return None,
                    RetryClass::NextSource => {
                        warn!(
                            "company source '{}' failed for {}: {}, trying next",
                            source.id(),
                            ticker,
                            e
                        );
                    }
                },
                Err(_) => {
                    warn!("company source '{}' timed out for {}", source.id(), ticker);
                }
            }
        }
        None
    }
}

/// Fetch index quotes and indicators and assemble a snapshot.
async fn build_snapshot(
    sources: Vec<Arc<dyn QuoteProvider>>,
    race: bool,
    call_timeout: Duration,
    econ: Arc<FredProvider>,
) -> Option<MarketSnapshot> {
    let sp500 = fetch_quote(sources.clone(), race, call_timeout, SP500_TICKER.to_string()).await;
    let vix = fetch_quote(sources, race, call_timeout, VIX_TICKER.to_string()).await;
    let indicators = match econ.get_all_indicators().await {
        Ok(indicators) => indicators,
        Err(e) => {
            warn!("indicator source unavailable for snapshot: {}", e);
            Vec::new()
        }
    };

    let snapshot = assemble_snapshot(Utc::now(), sp500, vix, indicators);
    if snapshot.is_empty() {
        info!("no market data source answered; snapshot unavailable");
        None
    } else {
        Some(snapshot)
    }
}

/// Pure snapshot assembly from whatever the sources delivered.
fn assemble_snapshot(
    now: DateTime<Utc>,
    sp500_quote: Option<StockQuote>,
    vix_quote: Option<StockQuote>,
    indicators: Vec<EconomicIndicator>,
) -> MarketSnapshot {
    let mut snapshot = MarketSnapshot::empty(now);
    snapshot.market_status = MarketStatus::from_datetime(now);

    if let Some(quote) = &sp500_quote {
        snapshot.sp500 = Some(quote.price);
        snapshot.sp500_change_percent = Some(quote.change_percent);
        push_source(&mut snapshot, quote.source.clone());
    }

    if let Some(quote) = &vix_quote {
        snapshot.vix = quote.price.to_f64();
        push_source(&mut snapshot, quote.source.clone());
    }

    let find = |name: &str| indicators.iter().find(|i| i.name == name).map(|i| i.value);
    snapshot.fed_funds_rate = find(names::FED_FUNDS);
    snapshot.treasury_2y = find(names::TREASURY_2Y);
    snapshot.treasury_5y = find(names::TREASURY_5Y);
    snapshot.treasury_10y = find(names::TREASURY_10Y);
    snapshot.treasury_30y = find(names::TREASURY_30Y);

    snapshot.yield_curve_spread = find(names::YIELD_CURVE_SPREAD).or_else(|| {
        match (snapshot.treasury_10y, snapshot.treasury_2y) {
            (Some(t10), Some(t2)) => Some(t10 - t2),
            _ => None,
        }
    });
    snapshot.yield_curve_inverted = snapshot.yield_curve_spread.is_some_and(|s| s < 0.0);

    if let Some(indicator) = indicators.first() {
        push_source(&mut snapshot, indicator.source.clone());
    }

    snapshot
}

fn push_source(snapshot: &mut MarketSnapshot, source: crate::models::SourceId) {
    if !snapshot.data_sources.contains(&source) {
        snapshot.data_sources.push(source);
    }
}
