//! Reconciliation orchestrator.
//!
//! Thin composition point sequencing the pipeline: boundary validation,
//! matching passes 1-3, economic validation (pass 4), exception
//! classification (pass 5), summary assembly. All algorithmic depth lives
//! in the components; this module only wires them together and enforces
//! the pass-boundary cancellation contract.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use ledgermatch_market_data::{
    MarketDataClient, MarketDataConfig, MarketSnapshot, VendorValidation,
};
use log::{info, warn};
use rust_decimal::Decimal;

use crate::cancel::CancelToken;
use crate::config::ReconcileConfig;
use crate::errors::Result;
use crate::exceptions::ExceptionDetector;
use crate::matching::{normalize_vendor, MatchingEngine};
use crate::models::{
    Exception, ExceptionKind, Match, ReconciliationSummary, Transaction,
};
use crate::validation::EconomicValidator;

/// Complete result of one reconciliation run.
#[derive(Clone, Debug)]
pub struct ReconciliationResult {
    pub matches: Vec<Match>,
    pub exceptions: Vec<Exception>,
    pub summary: ReconciliationSummary,
    /// Market context the run was validated against, when available
    pub snapshot: Option<MarketSnapshot>,
}

/// Sequences the matching, validation and exception passes.
pub struct Reconciler {
    config: ReconcileConfig,
    engine: MatchingEngine,
    validator: EconomicValidator,
    detector: ExceptionDetector,
    market_data: Option<Arc<MarketDataClient>>,
}

impl Reconciler {
    /// Build a reconciler, validating the configuration up front.
    pub fn new(config: ReconcileConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine: MatchingEngine::new(config.clone()),
            validator: EconomicValidator::new(),
            detector: ExceptionDetector::new(config.clone()),
            config,
            market_data: None,
        })
    }

    /// Attach a market data client for economic validation. Without one
    /// (or with `enable_economic_validation` off) pass 4 is skipped.
    pub fn with_market_data(mut self, client: Arc<MarketDataClient>) -> Self {
        self.market_data = Some(client);
        self
    }

    /// Attach the standard market data client (premium/free/indicator
    /// sources with credentials from the environment), honoring this run
    /// configuration's priority policy and cache TTL.
    pub fn with_live_market_data(self) -> Self {
        let md_config = MarketDataConfig {
            priority: self.config.market_data_priority,
            cache_ttl: Duration::from_secs(self.config.cache_ttl_minutes * 60),
            ..MarketDataConfig::from_env()
        };
        let client = Arc::new(MarketDataClient::new(md_config));
        self.with_market_data(client)
    }

    /// Reconcile bank transactions against AP records.
    pub async fn reconcile(
        &self,
        bank: Vec<Transaction>,
        ap: Vec<Transaction>,
    ) -> ReconciliationResult {
        self.reconcile_with_cancel(bank, ap, &CancelToken::new())
            .await
    }

    /// Reconcile, honoring `cancel` at pass boundaries. A cancelled run
    /// returns whatever it had, tagged `summary.complete = false`.
    pub async fn reconcile_with_cancel(
        &self,
        bank: Vec<Transaction>,
        ap: Vec<Transaction>,
        cancel: &CancelToken,
    ) -> ReconciliationResult {
        let mut exceptions = Vec::new();

        // Boundary validation: reject malformed records one at a time
        let bank = screen(bank, &mut exceptions);
        let ap = screen(ap, &mut exceptions);
        info!(
            "reconciling {} bank transactions against {} AP records",
            bank.len(),
            ap.len()
        );

        // Passes 1-3
        let outcome = self.engine.run_with_cancel(&bank, &ap, cancel);
        let mut matches: Vec<Match> = outcome
            .candidates
            .iter()
            .cloned()
            .map(Match::from_candidate)
            .collect();

        // Pass 4: economic validation, additive only
        let mut snapshot = None;
        if outcome.complete && self.config.enable_economic_validation {
            if let Some(client) = &self.market_data {
                snapshot = client.get_market_snapshot().await;
                match &snapshot {
                    Some(snap) => {
                        let vendors = self.prefetch_vendors(client, &matches).await;
                        matches = self.validator.validate(matches, Some(snap), &vendors);
                    }
                    None => {
                        info!("market snapshot unavailable; skipping economic validation");
                    }
                }
            }
        }

        let cancelled = cancel.is_cancelled();
        let complete = outcome.complete && !cancelled;

        // Pass 5: exception classification, only for runs that finished
        // matching - residue from a half-run would be misleading
        if complete {
            exceptions.extend(self.detector.detect(
                &matches,
                &bank,
                &ap,
                &outcome.unmatched_bank_ids,
                &outcome.unmatched_ap_ids,
            ));
        } else {
            info!("run incomplete; exception classification skipped");
        }

        let summary = build_summary(
            &bank,
            &ap,
            &matches,
            exceptions.len(),
            outcome.unmatched_bank_ids.len(),
            outcome.unmatched_ap_ids.len(),
            complete,
        );

        ReconciliationResult {
            matches,
            exceptions,
            summary,
            snapshot,
        }
    }

    /// Resolve vendor validations for every distinct vendor named by a
    /// match, keyed by normalized name. Sequential on purpose: the client
    /// caches and dedups, and match counts are small.
    async fn prefetch_vendors(
        &self,
        client: &MarketDataClient,
        matches: &[Match],
    ) -> HashMap<String, VendorValidation> {
        let names: BTreeSet<String> = matches
            .iter()
            .filter_map(|m| m.candidate.vendor_name.clone())
            .collect();

        let mut vendors = HashMap::with_capacity(names.len());
        for name in names {
            let validation = client.validate_vendor(&name).await;
            vendors.insert(normalize_vendor(&name), validation);
        }
        vendors
    }
}

/// Validate records, turning rejects into invalid_record exceptions.
fn screen(transactions: Vec<Transaction>, exceptions: &mut Vec<Exception>) -> Vec<Transaction> {
    transactions
        .into_iter()
        .filter_map(|tx| match tx.validate() {
            Ok(()) => Some(tx),
            Err(e) => {
                warn!("rejecting transaction at intake: {}", e);
                let id = (!tx.id.trim().is_empty()).then(|| tx.id.clone());
                exceptions.push(Exception::new(
                    ExceptionKind::InvalidRecord,
                    id,
                    tx.amount.abs(),
                    format!("Rejected at intake: {e}"),
                ));
                None
            }
        })
        .collect()
}

fn build_summary(
    bank: &[Transaction],
    ap: &[Transaction],
    matches: &[Match],
    exception_count: usize,
    unmatched_bank_count: usize,
    unmatched_ap_count: usize,
    complete: bool,
) -> ReconciliationSummary {
    let bank_payments: Vec<&Transaction> = bank.iter().filter(|tx| tx.is_payment()).collect();
    let total_bank_amount: Decimal = bank_payments.iter().map(|tx| tx.abs_amount()).sum();
    let total_ap_amount: Decimal = ap
        .iter()
        .filter(|tx| tx.is_payment())
        .map(|tx| tx.amount)
        .sum();
    let total_matched_amount: Decimal = matches.iter().map(|m| m.candidate.bank_amount).sum();

    let match_rate = if bank_payments.is_empty() {
        0.0
    } else {
        matches.len() as f64 / bank_payments.len() as f64
    };

    ReconciliationSummary {
        total_bank_transactions: bank.len(),
        total_ap_transactions: ap.len(),
        matched_count: matches.len(),
        exception_count,
        unmatched_bank_count,
        unmatched_ap_count,
        match_rate,
        total_bank_amount,
        total_ap_amount,
        total_matched_amount,
        unreconciled_amount: total_bank_amount - total_matched_amount,
        complete,
    }
}
