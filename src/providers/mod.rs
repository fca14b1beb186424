//! Data-provider integrations.
//!
//! Defines the provider traits and implementations for:
//! - Helius — Solana RPC, enhanced transaction parsing, token holder data
//! - Jupiter — swap quotes (liquidity probe) and USD prices
//! - Rugcheck — token safety audits

pub mod helius;
pub mod jupiter;
pub mod rugcheck;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Wrapped SOL. Appears in every pool pair and is never a candidate itself.
pub const WSOL_MINT: &str = "So11111111111111111111111111111111111111112";

/// Raydium AMM v4 program.
pub const RAYDIUM_AMM_PROGRAM: &str = "675kPX9MHTjS2zt1qfr1NYHuzeLXfQM9H24wFSUt1Mp8";
/// Pump.fun bonding-curve program.
pub const PUMP_FUN_PROGRAM: &str = "6EF8rrecthR5Dkzon8Nwu78hRvfCKubJ14M5uBEwF6P";
/// Orca Whirlpool program.
pub const ORCA_WHIRLPOOL_PROGRAM: &str = "whirLbMiicVdio4qvUfM5KAg6Ct8VwpYzGff3uctyCc";

/// A liquidity venue to watch for new pool activity.
#[derive(Debug, Clone)]
pub struct Venue {
    pub name: &'static str,
    pub program_id: &'static str,
}

/// Venues scanned by default, in discovery order.
pub fn default_venues() -> Vec<Venue> {
    vec![
        Venue {
            name: "raydium",
            program_id: RAYDIUM_AMM_PROGRAM,
        },
        Venue {
            name: "pump.fun",
            program_id: PUMP_FUN_PROGRAM,
        },
        Venue {
            name: "orca",
            program_id: ORCA_WHIRLPOOL_PROGRAM,
        },
    ]
}

/// A transaction signature observed against a venue program.
#[derive(Debug, Clone)]
pub struct PoolSighting {
    pub signature: String,
    pub venue: String,
    pub block_time: Option<DateTime<Utc>>,
}

/// Token mints touched by a parsed transaction.
#[derive(Debug, Clone, Default)]
pub struct TxTokenActivity {
    pub mints: Vec<String>,
}

/// Holder distribution for a mint.
#[derive(Debug, Clone, Default)]
pub struct HolderDistribution {
    pub holder_count: u64,
    /// Share of supply held by the ten largest accounts, in percent.
    pub top10_pct: f64,
}

/// Safety audit summary for a mint.
#[derive(Debug, Clone, Default)]
pub struct SafetyReport {
    pub risk_count: u32,
    pub has_critical_risk: bool,
    pub risk_names: Vec<String>,
}

/// Outcome of a small test swap against a mint.
#[derive(Debug, Clone)]
pub struct QuoteOutcome {
    /// Price impact of the test swap, in percent.
    pub price_impact_pct: f64,
}

/// Chain-level data: pool discovery, transaction detail, holder lookups.
#[async_trait]
pub trait ChainDataProvider: Send + Sync {
    /// Recent transaction signatures against a venue program, newest first.
    async fn recent_pool_signatures(&self, venue: &Venue, limit: usize)
        -> Result<Vec<PoolSighting>>;

    /// Token mints involved in a transaction, by signature.
    async fn transaction_mints(&self, signature: &str) -> Result<TxTokenActivity>;

    /// Holder count and top-10 concentration for a mint.
    async fn holder_distribution(&self, mint: &str) -> Result<HolderDistribution>;

    /// Number of transactions touching the mint in the last 24 hours.
    async fn tx_count_24h(&self, mint: &str) -> Result<u64>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

/// Swap quoting and pricing.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Quote a small fixed-size test swap into the mint to probe liquidity.
    /// Errors when no route exists.
    async fn test_quote(&self, mint: &str) -> Result<QuoteOutcome>;

    /// Current USD price for a mint, if listed.
    async fn price_usd(&self, mint: &str) -> Result<Option<f64>>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

/// Token safety auditing.
#[async_trait]
pub trait SafetyProvider: Send + Sync {
    /// Fetch the risk summary for a mint.
    async fn audit(&self, mint: &str) -> Result<SafetyReport>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
