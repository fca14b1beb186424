//! The scan pipeline: discover → extract → analyze → rank.
//!
//! Discovery fans out over liquidity venues concurrently; each later
//! stage runs in bounded batches. A failing venue, transaction, or
//! signal degrades the affected token instead of aborting the scan,
//! so one flaky provider cannot blank an entire run.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::engine::batch::run_batched;
use crate::engine::scoring::{
    self, FilterThresholds, ScoreWeights,
};
use crate::providers::{
    ChainDataProvider, PoolSighting, QuoteProvider, SafetyProvider, Venue, WSOL_MINT,
};
use crate::types::{ScanSummary, TokenMetrics, TokenSignals};

/// Discovery over-fetch: signatures pulled per scan relative to the
/// requested result count, since many transactions repeat mints or
/// fail extraction.
const DISCOVERY_MULTIPLIER: usize = 3;
/// Concurrent lookups per batch, keeps us under provider rate limits.
const BATCH_SIZE: usize = 5;

/// A mint with the pool sighting that first surfaced it.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub mint: String,
    pub venue: String,
    pub first_seen: Option<DateTime<Utc>>,
}

pub struct TokenScout {
    chain: Arc<dyn ChainDataProvider>,
    quotes: Arc<dyn QuoteProvider>,
    safety: Arc<dyn SafetyProvider>,
    weights: ScoreWeights,
    filters: FilterThresholds,
    venues: Vec<Venue>,
}

impl TokenScout {
    pub fn new(
        chain: Arc<dyn ChainDataProvider>,
        quotes: Arc<dyn QuoteProvider>,
        safety: Arc<dyn SafetyProvider>,
    ) -> Self {
        Self {
            chain,
            quotes,
            safety,
            weights: ScoreWeights::default(),
            filters: FilterThresholds::default(),
            venues: crate::providers::default_venues(),
        }
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_filters(mut self, filters: FilterThresholds) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_venues(mut self, venues: Vec<Venue>) -> Self {
        self.venues = venues;
        self
    }

    /// Run a full scan and return up to `limit` ranked tokens.
    pub async fn scan(&self, limit: usize) -> Result<ScanSummary> {
        let limit = limit.max(1);
        let sightings = self.discover(limit * DISCOVERY_MULTIPLIER).await;
        let total_discovered = sightings.len();
        info!(signatures = total_discovered, "discovery complete");

        if sightings.is_empty() {
            return Ok(self.empty_summary(0, "No recent pool activity found on any venue"));
        }

        let candidates = self.extract_candidates(sightings).await;
        info!(candidates = candidates.len(), "extraction complete");

        if candidates.is_empty() {
            return Ok(self.empty_summary(
                total_discovered,
                "No token mints could be extracted from recent pool transactions",
            ));
        }

        let mut tokens = self.analyze(candidates).await;
        let total_analyzed = tokens.len();

        // Rank everything, then drop the filtered-out tail. Filters run
        // after scoring so excluded tokens still logged full breakdowns.
        tokens.retain(|t| t.passed);
        let total_passed_filters = tokens.len();
        tokens.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        tokens.truncate(limit);

        info!(
            discovered = total_discovered,
            analyzed = total_analyzed,
            passed = total_passed_filters,
            returned = tokens.len(),
            "scan complete"
        );

        Ok(ScanSummary {
            returned: tokens.len(),
            tokens,
            total_discovered,
            total_analyzed,
            total_passed_filters,
            weights: self.weights,
            filters: self.filters,
            message: None,
        })
    }

    fn empty_summary(&self, total_discovered: usize, message: &str) -> ScanSummary {
        ScanSummary {
            tokens: Vec::new(),
            total_discovered,
            total_analyzed: 0,
            total_passed_filters: 0,
            returned: 0,
            weights: self.weights,
            filters: self.filters,
            message: Some(message.to_string()),
        }
    }

    /// Stage 1: pull recent signatures from every venue concurrently.
    /// A venue that errors is logged and skipped.
    async fn discover(&self, per_venue: usize) -> Vec<PoolSighting> {
        let futures: Vec<_> = self
            .venues
            .iter()
            .map(|venue| async move {
                (
                    venue.name,
                    self.chain.recent_pool_signatures(venue, per_venue).await,
                )
            })
            .collect();

        let mut sightings = Vec::new();
        for (venue, result) in futures::future::join_all(futures).await {
            match result {
                Ok(mut found) => {
                    debug!(venue, count = found.len(), "venue signatures");
                    sightings.append(&mut found);
                }
                Err(err) => warn!(venue, error = %err, "venue discovery failed"),
            }
        }
        sightings
    }

    /// Stage 2: parse each signature's token transfers into candidate
    /// mints, batched. WSOL is never a candidate; duplicates keep the
    /// first sighting.
    async fn extract_candidates(&self, sightings: Vec<PoolSighting>) -> Vec<Candidate> {
        let results = run_batched(sightings, BATCH_SIZE, |sighting| {
            let chain = self.chain.clone();
            async move {
                let activity = chain.transaction_mints(&sighting.signature).await?;
                Ok((sighting, activity))
            }
        })
        .await;

        let mut extracted = Vec::new();
        for result in results {
            match result {
                Ok((sighting, activity)) => {
                    for mint in activity.mints {
                        extracted.push(Candidate {
                            mint,
                            venue: sighting.venue.clone(),
                            first_seen: sighting.block_time,
                        });
                    }
                }
                Err(err) => debug!(error = %err, "transaction extraction failed"),
            }
        }
        dedup_candidates(extracted)
    }

    /// Stage 3: fetch all four signals per candidate concurrently,
    /// batched across candidates. A failed signal degrades to its
    /// worst-case default rather than dropping the token.
    async fn analyze(&self, candidates: Vec<Candidate>) -> Vec<TokenMetrics> {
        let now = Utc::now();
        let results = run_batched(candidates, BATCH_SIZE, |candidate| {
            let chain = self.chain.clone();
            let quotes = self.quotes.clone();
            let safety = self.safety.clone();
            async move {
                let (holders, quote, audit, tx_count) = tokio::join!(
                    chain.holder_distribution(&candidate.mint),
                    quotes.test_quote(&candidate.mint),
                    safety.audit(&candidate.mint),
                    chain.tx_count_24h(&candidate.mint),
                );

                let mut signals = TokenSignals::default();
                match holders {
                    Ok(dist) => {
                        signals.holder_count = dist.holder_count;
                        signals.top10_pct = dist.top10_pct;
                    }
                    Err(err) => warn!(mint = %candidate.mint, error = %err, "holder lookup failed"),
                }
                match quote {
                    Ok(q) => signals.price_impact_pct = Some(q.price_impact_pct),
                    Err(err) => {
                        debug!(mint = %candidate.mint, error = %err, "no quote route")
                    }
                }
                match audit {
                    Ok(report) => {
                        signals.risk_count = report.risk_count;
                        signals.has_critical_risk = report.has_critical_risk;
                    }
                    Err(err) => warn!(mint = %candidate.mint, error = %err, "safety audit failed"),
                }
                match tx_count {
                    Ok(n) => signals.tx_count_24h = n,
                    Err(err) => warn!(mint = %candidate.mint, error = %err, "tx count failed"),
                }

                Ok((candidate, signals))
            }
        })
        .await;

        results
            .into_iter()
            .filter_map(|r| r.ok())
            .map(|(candidate, signals)| {
                let scores = scoring::component_scores(&signals, candidate.first_seen, now);
                let score = scoring::compute_score(&scores, &self.weights);
                let passed = scoring::passes_filters(&signals, &self.filters);
                TokenMetrics {
                    mint: candidate.mint,
                    venue: candidate.venue,
                    created_at: candidate.first_seen,
                    signals,
                    scores,
                    score,
                    passed,
                }
            })
            .collect()
    }
}

/// Drops WSOL and repeated mints, keeping each mint's first sighting.
pub fn dedup_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for candidate in candidates {
        if candidate.mint == WSOL_MINT {
            continue;
        }
        if seen.insert(candidate.mint.clone()) {
            unique.push(candidate);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(mint: &str, venue: &str) -> Candidate {
        Candidate {
            mint: mint.to_string(),
            venue: venue.to_string(),
            first_seen: None,
        }
    }

    #[test]
    fn test_dedup_keeps_first_sighting() {
        let candidates = vec![
            candidate("MintA", "raydium"),
            candidate("MintB", "pump.fun"),
            candidate("MintA", "orca"),
        ];
        let unique = dedup_candidates(candidates);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].mint, "MintA");
        assert_eq!(unique[0].venue, "raydium");
        assert_eq!(unique[1].mint, "MintB");
    }

    #[test]
    fn test_dedup_excludes_wsol() {
        let candidates = vec![
            candidate(WSOL_MINT, "raydium"),
            candidate("MintA", "raydium"),
        ];
        let unique = dedup_candidates(candidates);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].mint, "MintA");
    }

    #[test]
    fn test_dedup_empty() {
        assert!(dedup_candidates(Vec::new()).is_empty());
    }
}
