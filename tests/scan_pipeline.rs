//! Scan pipeline integration tests against deterministic in-memory
//! providers. No external dependencies; every failure mode is
//! controllable from test code.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use prospector::engine::scanner::TokenScout;
use prospector::providers::{
    ChainDataProvider, HolderDistribution, PoolSighting, QuoteOutcome, QuoteProvider,
    SafetyProvider, SafetyReport, TxTokenActivity, Venue, WSOL_MINT,
};

// ---------------------------------------------------------------------------
// Mock providers
// ---------------------------------------------------------------------------

/// Per-mint chain fixture.
#[derive(Clone)]
struct MintFixture {
    holders: u64,
    top10_pct: f64,
    tx_count: u64,
}

struct MockChain {
    /// signature -> mints it touches
    transactions: Vec<(String, Vec<String>)>,
    mints: HashMap<String, MintFixture>,
    /// Venue names whose discovery call fails.
    failing_venues: Mutex<Vec<String>>,
    /// Mints whose holder lookup fails.
    failing_holders: Mutex<Vec<String>>,
}

impl MockChain {
    fn new(transactions: Vec<(&str, Vec<&str>)>, mints: Vec<(&str, MintFixture)>) -> Self {
        Self {
            transactions: transactions
                .into_iter()
                .map(|(sig, m)| {
                    (
                        sig.to_string(),
                        m.into_iter().map(str::to_string).collect(),
                    )
                })
                .collect(),
            mints: mints
                .into_iter()
                .map(|(m, f)| (m.to_string(), f))
                .collect(),
            failing_venues: Mutex::new(Vec::new()),
            failing_holders: Mutex::new(Vec::new()),
        }
    }

    fn fail_venue(&self, name: &str) {
        self.failing_venues.lock().unwrap().push(name.to_string());
    }

    fn fail_holders(&self, mint: &str) {
        self.failing_holders.lock().unwrap().push(mint.to_string());
    }
}

#[async_trait]
impl ChainDataProvider for MockChain {
    async fn recent_pool_signatures(
        &self,
        venue: &Venue,
        limit: usize,
    ) -> Result<Vec<PoolSighting>> {
        if self.failing_venues.lock().unwrap().contains(&venue.name.to_string()) {
            return Err(anyhow!("rpc unavailable"));
        }
        // Only the first venue reports activity; others are quiet.
        if venue.name != "raydium" {
            return Ok(Vec::new());
        }
        Ok(self
            .transactions
            .iter()
            .take(limit)
            .map(|(sig, _)| PoolSighting {
                signature: sig.clone(),
                venue: venue.name.to_string(),
                block_time: Some(Utc::now()),
            })
            .collect())
    }

    async fn transaction_mints(&self, signature: &str) -> Result<TxTokenActivity> {
        self.transactions
            .iter()
            .find(|(sig, _)| sig == signature)
            .map(|(_, mints)| TxTokenActivity {
                mints: mints.clone(),
            })
            .ok_or_else(|| anyhow!("transaction not indexed: {signature}"))
    }

    async fn holder_distribution(&self, mint: &str) -> Result<HolderDistribution> {
        if self.failing_holders.lock().unwrap().contains(&mint.to_string()) {
            return Err(anyhow!("holder lookup failed"));
        }
        let fixture = self
            .mints
            .get(mint)
            .ok_or_else(|| anyhow!("unknown mint: {mint}"))?;
        Ok(HolderDistribution {
            holder_count: fixture.holders,
            top10_pct: fixture.top10_pct,
        })
    }

    async fn tx_count_24h(&self, mint: &str) -> Result<u64> {
        let fixture = self
            .mints
            .get(mint)
            .ok_or_else(|| anyhow!("unknown mint: {mint}"))?;
        Ok(fixture.tx_count)
    }

    fn name(&self) -> &str {
        "mock-chain"
    }
}

struct MockQuotes {
    /// mint -> price impact percent; absent means no route.
    impacts: HashMap<String, f64>,
}

impl MockQuotes {
    fn new(impacts: Vec<(&str, f64)>) -> Self {
        Self {
            impacts: impacts
                .into_iter()
                .map(|(m, i)| (m.to_string(), i))
                .collect(),
        }
    }
}

#[async_trait]
impl QuoteProvider for MockQuotes {
    async fn test_quote(&self, mint: &str) -> Result<QuoteOutcome> {
        self.impacts
            .get(mint)
            .map(|&price_impact_pct| QuoteOutcome { price_impact_pct })
            .ok_or_else(|| anyhow!("no route for {mint}"))
    }

    async fn price_usd(&self, _mint: &str) -> Result<Option<f64>> {
        Ok(Some(1.0))
    }

    fn name(&self) -> &str {
        "mock-quotes"
    }
}

struct MockSafety {
    /// mint -> (risk count, critical)
    reports: HashMap<String, (u32, bool)>,
}

impl MockSafety {
    fn new(reports: Vec<(&str, u32, bool)>) -> Self {
        Self {
            reports: reports
                .into_iter()
                .map(|(m, n, crit)| (m.to_string(), (n, crit)))
                .collect(),
        }
    }
}

#[async_trait]
impl SafetyProvider for MockSafety {
    async fn audit(&self, mint: &str) -> Result<SafetyReport> {
        let (risk_count, has_critical_risk) = self
            .reports
            .get(mint)
            .copied()
            .ok_or_else(|| anyhow!("no report for {mint}"))?;
        Ok(SafetyReport {
            risk_count,
            has_critical_risk,
            risk_names: Vec::new(),
        })
    }

    fn name(&self) -> &str {
        "mock-safety"
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

const MINT_GOOD: &str = "GoodMint1111111111111111111111111111111111";
const MINT_RISKY: &str = "RiskyMint111111111111111111111111111111111";
const MINT_THIN: &str = "ThinMint1111111111111111111111111111111111";

fn healthy_fixture() -> MintFixture {
    MintFixture {
        holders: 500,
        top10_pct: 30.0,
        tx_count: 15,
    }
}

/// Three transactions: a healthy token (twice, plus WSOL noise), a
/// token with a critical risk, and a token with too few holders.
fn scout() -> (Arc<MockChain>, TokenScout) {
    let chain = Arc::new(MockChain::new(
        vec![
            ("sig-1", vec![WSOL_MINT, MINT_GOOD]),
            ("sig-2", vec![MINT_GOOD, MINT_RISKY]),
            ("sig-3", vec![MINT_THIN]),
        ],
        vec![
            (MINT_GOOD, healthy_fixture()),
            (MINT_RISKY, healthy_fixture()),
            (
                MINT_THIN,
                MintFixture {
                    holders: 9,
                    top10_pct: 30.0,
                    tx_count: 15,
                },
            ),
        ],
    ));
    let quotes = Arc::new(MockQuotes::new(vec![
        (MINT_GOOD, 0.5),
        (MINT_RISKY, 0.5),
        (MINT_THIN, 0.5),
    ]));
    let safety = Arc::new(MockSafety::new(vec![
        (MINT_GOOD, 1, false),
        (MINT_RISKY, 2, true),
        (MINT_THIN, 0, false),
    ]));
    let scout = TokenScout::new(chain.clone(), quotes, safety);
    (chain, scout)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_full_pipeline_counters_and_ranking() {
    let (_chain, scout) = scout();
    let summary = scout.scan(10).await.unwrap();

    // 3 signatures discovered, 3 unique non-WSOL mints analyzed,
    // only the healthy one survives the filters.
    assert_eq!(summary.total_discovered, 3);
    assert_eq!(summary.total_analyzed, 3);
    assert_eq!(summary.total_passed_filters, 1);
    assert_eq!(summary.returned, 1);
    assert_eq!(summary.tokens[0].mint, MINT_GOOD);
    assert!(summary.tokens[0].passed);
    assert!(summary.tokens[0].score > 0.0);
    assert!(summary.message.is_none());
}

#[tokio::test]
async fn test_wsol_and_duplicates_excluded() {
    let (_chain, scout) = scout();
    let summary = scout.scan(10).await.unwrap();

    // MINT_GOOD appears in two transactions and WSOL in one; neither
    // inflates the analyzed count.
    assert_eq!(summary.total_analyzed, 3);
    let mints: Vec<&str> = summary.tokens.iter().map(|t| t.mint.as_str()).collect();
    assert!(!mints.contains(&WSOL_MINT));
}

#[tokio::test]
async fn test_failed_venue_does_not_abort_scan() {
    let (chain, scout) = scout();
    chain.fail_venue("pump.fun");
    chain.fail_venue("orca");

    let summary = scout.scan(10).await.unwrap();
    assert_eq!(summary.total_discovered, 3, "raydium results still flow");
    assert_eq!(summary.returned, 1);
}

#[tokio::test]
async fn test_all_venues_failing_yields_message_not_error() {
    let (chain, scout) = scout();
    chain.fail_venue("raydium");
    chain.fail_venue("pump.fun");
    chain.fail_venue("orca");

    let summary = scout.scan(10).await.unwrap();
    assert_eq!(summary.total_discovered, 0);
    assert!(summary.tokens.is_empty());
    assert!(summary.message.is_some());
}

#[tokio::test]
async fn test_failed_signal_degrades_to_worst_case() {
    let (chain, scout) = scout();
    chain.fail_holders(MINT_GOOD);

    let summary = scout.scan(10).await.unwrap();
    // The token is still analyzed but its holder signal collapsed to
    // zero, which trips the minimum-holders filter.
    assert_eq!(summary.total_analyzed, 3);
    assert_eq!(summary.total_passed_filters, 0);

    // Message-free: tokens were analyzed, just none passed.
    assert!(summary.message.is_none());
}

#[tokio::test]
async fn test_limit_truncates_ranked_output() {
    // Five healthy tokens with distinct liquidity, limit 2.
    let mints: Vec<String> = (0..5).map(|i| format!("Mint{i}11111111111111111111111111111111111")).collect();
    let txs: Vec<(String, Vec<String>)> = mints
        .iter()
        .enumerate()
        .map(|(i, m)| (format!("sig-{i}"), vec![m.clone()]))
        .collect();

    let chain = Arc::new(MockChain::new(
        txs.iter()
            .map(|(s, m)| (s.as_str(), m.iter().map(String::as_str).collect()))
            .collect(),
        mints
            .iter()
            .map(|m| (m.as_str(), healthy_fixture()))
            .collect(),
    ));
    // Later mints have worse liquidity, so ranking is mint order.
    let quotes = Arc::new(MockQuotes::new(
        mints
            .iter()
            .enumerate()
            .map(|(i, m)| (m.as_str(), i as f64))
            .collect(),
    ));
    let safety = Arc::new(MockSafety::new(
        mints.iter().map(|m| (m.as_str(), 0, false)).collect(),
    ));

    let scout = TokenScout::new(chain, quotes, safety);
    let summary = scout.scan(2).await.unwrap();

    assert_eq!(summary.total_analyzed, 5);
    assert_eq!(summary.total_passed_filters, 5);
    assert_eq!(summary.returned, 2);
    assert_eq!(summary.tokens[0].mint, mints[0]);
    assert_eq!(summary.tokens[1].mint, mints[1]);
    assert!(summary.tokens[0].score >= summary.tokens[1].score);
}
