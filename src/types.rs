//! Shared types for the PROSPECTOR skill.
//!
//! These types form the data model used across all modules. The
//! persisted subset (journal, watchlist, narratives, scans, config)
//! serializes in camelCase so the state file stays compatible with
//! the schema the agent runtime already reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Chains & trade enums
// ---------------------------------------------------------------------------

/// Supported chains. Discovery runs on Solana; Base positions are
/// journaled and analyzed but not scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Solana,
    Base,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Solana => write!(f, "solana"),
            Chain::Base => write!(f, "base"),
        }
    }
}

impl std::str::FromStr for Chain {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "solana" | "sol" => Ok(Chain::Solana),
            "base" => Ok(Chain::Base),
            _ => Err(anyhow::anyhow!("Unknown chain: {s}")),
        }
    }
}

/// What a journal entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    Buy,
    Sell,
    Bet,
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeKind::Buy => write!(f, "buy"),
            TradeKind::Sell => write!(f, "sell"),
            TradeKind::Bet => write!(f, "bet"),
        }
    }
}

impl std::str::FromStr for TradeKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buy" => Ok(TradeKind::Buy),
            "sell" => Ok(TradeKind::Sell),
            "bet" => Ok(TradeKind::Bet),
            _ => Err(anyhow::anyhow!("Unknown trade kind: {s}")),
        }
    }
}

/// Lifecycle of a journal entry. Open → Closed exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

impl std::str::FromStr for TradeStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(TradeStatus::Open),
            "closed" => Ok(TradeStatus::Closed),
            _ => Err(anyhow::anyhow!("Unknown status: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

/// One trade or bet, as recorded by the journal. Owned exclusively by
/// the state store; pnl fields stay null until the entry is closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TradeKind,
    pub chain: Chain,
    pub mint: String,
    pub symbol: String,
    /// Position size in USD at entry.
    pub amount: f64,
    #[serde(default)]
    pub token_amount: Option<f64>,
    pub price: f64,
    #[serde(default)]
    pub mcap: Option<f64>,
    pub status: TradeStatus,
    #[serde(default)]
    pub exit_price: Option<f64>,
    #[serde(default)]
    pub exit_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pnl: Option<f64>,
    #[serde(default)]
    pub pnl_pct: Option<f64>,
    #[serde(default)]
    pub narratives: Vec<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub signature: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl JournalEntry {
    /// Create a fresh open entry with a generated id.
    pub fn open(
        kind: TradeKind,
        chain: Chain,
        mint: &str,
        symbol: &str,
        amount: f64,
        price: f64,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            chain,
            mint: mint.to_string(),
            symbol: symbol.to_string(),
            amount,
            token_amount: if price > 0.0 { Some(amount / price) } else { None },
            price,
            mcap: None,
            status: TradeStatus::Open,
            exit_price: None,
            exit_timestamp: None,
            pnl: None,
            pnl_pct: None,
            narratives: Vec::new(),
            note: None,
            signature: None,
            timestamp: Utc::now(),
        }
    }

    /// Close the entry at an exit price, computing realized pnl.
    /// No-op on an already-closed entry.
    pub fn close_at(&mut self, exit_price: f64, at: DateTime<Utc>) {
        if self.status == TradeStatus::Closed {
            return;
        }
        self.status = TradeStatus::Closed;
        self.exit_price = Some(exit_price);
        self.exit_timestamp = Some(at);
        if self.price > 0.0 {
            let pct = (exit_price - self.price) / self.price * 100.0;
            self.pnl_pct = Some(pct);
            let pnl = match self.token_amount {
                Some(tokens) => tokens * (exit_price - self.price),
                None => self.amount * pct / 100.0,
            };
            self.pnl = Some(pnl);
        }
    }

    /// Current USD value of the position at a given price.
    pub fn value_at(&self, price: f64) -> f64 {
        match self.token_amount {
            Some(tokens) => tokens * price,
            None => self.amount,
        }
    }
}

impl fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} ${:.2} @ {:.8} ({:?})",
            self.chain, self.kind, self.symbol, self.amount, self.price, self.status,
        )
    }
}

// ---------------------------------------------------------------------------
// Watchlist & narratives
// ---------------------------------------------------------------------------

/// A token being tracked for entry/exit targets. Keyed by mint;
/// re-adding the same mint replaces the item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    pub mint: String,
    pub chain: Chain,
    pub symbol: String,
    #[serde(default)]
    pub target_buy: Option<f64>,
    #[serde(default)]
    pub target_sell: Option<f64>,
    #[serde(default)]
    pub narratives: Vec<String>,
    pub price_at_add: f64,
    pub last_price: f64,
    #[serde(default)]
    pub last_mcap: Option<f64>,
    #[serde(default)]
    pub last_holders: Option<u64>,
    #[serde(default)]
    pub notes: Option<String>,
    pub added_at: DateTime<Utc>,
    pub last_check: DateTime<Utc>,
}

/// Tokens and notes accumulated under a thematic tag. Created
/// implicitly the first time a tag is used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NarrativeRecord {
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

// ---------------------------------------------------------------------------
// Scan history & prediction-market bets
// ---------------------------------------------------------------------------

/// Truncated snapshot of one scan, kept in a 50-entry ring buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub timestamp: DateTime<Utc>,
    pub top_mints: Vec<String>,
    pub best_score: f64,
}

/// A prediction-market bet, keyed by condition id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolyBet {
    pub condition_id: String,
    pub market: String,
    pub outcome: String,
    /// "yes" | "no" as entered.
    pub side: String,
    pub size: f64,
    pub price: f64,
    pub status: TradeStatus,
    #[serde(default)]
    pub pnl: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Persisted config
// ---------------------------------------------------------------------------

/// Process-wide tunables persisted alongside the rest of the state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfig {
    pub goal_usd: f64,
    pub default_risk_pct: f64,
    pub default_stop_loss_pct: f64,
    #[serde(default)]
    pub last_watch_check: Option<DateTime<Utc>>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            goal_usd: 1_000_000.0,
            default_risk_pct: 2.0,
            default_stop_loss_pct: 25.0,
            last_watch_check: None,
        }
    }
}

// ---------------------------------------------------------------------------
// State document
// ---------------------------------------------------------------------------

/// The single JSON document holding all persistent state. Every
/// top-level key defaults on load so older or partially-written
/// documents remain readable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDocument {
    #[serde(default)]
    pub journal: Vec<JournalEntry>,
    #[serde(default)]
    pub watchlist: Vec<WatchlistItem>,
    #[serde(default)]
    pub narratives: BTreeMap<String, NarrativeRecord>,
    #[serde(default)]
    pub scans: Vec<ScanRecord>,
    #[serde(default)]
    pub poly_bets: Vec<PolyBet>,
    #[serde(default)]
    pub config: StoreConfig,
}

// ---------------------------------------------------------------------------
// Scan output types
// ---------------------------------------------------------------------------

/// Raw signal data gathered for one candidate token. A failed fetch
/// leaves the corresponding field at its worst-case default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSignals {
    pub holder_count: u64,
    /// Share of supply held by the top 10 holders, in percent.
    pub top10_pct: f64,
    /// Number of risks flagged by the safety audit.
    pub risk_count: u32,
    /// Whether any flagged risk is critical.
    pub has_critical_risk: bool,
    /// Price impact of the fixed test-swap quote, in percent.
    /// None when no quote could be obtained (illiquid/unquotable).
    pub price_impact_pct: Option<f64>,
    /// Transactions observed in the last 24 hours.
    pub tx_count_24h: u64,
}

impl Default for TokenSignals {
    /// Worst case everywhere except criticality, which must be
    /// positively observed rather than assumed.
    fn default() -> Self {
        Self {
            holder_count: 0,
            top10_pct: 100.0,
            risk_count: 5,
            has_critical_risk: false,
            price_impact_pct: None,
            tx_count_24h: 0,
        }
    }
}

/// Per-component scores, each in [0, 1].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ComponentScores {
    pub liquidity: f64,
    pub volume: f64,
    pub holders: f64,
    pub safety: f64,
    pub age: f64,
}

/// Full per-token scan result, ephemeral except for the truncated
/// snapshot kept in ScanRecord.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenMetrics {
    pub mint: String,
    /// Venue program the creating pool was first observed on.
    pub venue: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub signals: TokenSignals,
    pub scores: ComponentScores,
    pub score: f64,
    pub passed: bool,
}

/// Aggregate result of one scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    pub tokens: Vec<TokenMetrics>,
    pub total_discovered: usize,
    pub total_analyzed: usize,
    pub total_passed_filters: usize,
    pub returned: usize,
    pub weights: crate::engine::scoring::ScoreWeights,
    pub filters: crate::engine::scoring::FilterThresholds,
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for PROSPECTOR.
#[derive(Debug, thiserror::Error)]
pub enum ProspectorError {
    #[error("Missing credential: {var} is not set ({reason})")]
    MissingCredential { var: String, reason: String },

    #[error("Provider error ({provider}) {status}: {body}")]
    Provider {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Timed out after {secs}s waiting for {what}")]
    Timeout { what: String, secs: u64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Chain / enum tests --

    #[test]
    fn test_chain_from_str() {
        assert_eq!("solana".parse::<Chain>().unwrap(), Chain::Solana);
        assert_eq!("SOL".parse::<Chain>().unwrap(), Chain::Solana);
        assert_eq!("Base".parse::<Chain>().unwrap(), Chain::Base);
        assert!("polygon".parse::<Chain>().is_err());
    }

    #[test]
    fn test_chain_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Chain::Solana).unwrap(), "\"solana\"");
        assert_eq!(serde_json::to_string(&Chain::Base).unwrap(), "\"base\"");
    }

    #[test]
    fn test_trade_kind_roundtrip() {
        for kind in [TradeKind::Buy, TradeKind::Sell, TradeKind::Bet] {
            let json = serde_json::to_string(&kind).unwrap();
            let parsed: TradeKind = serde_json::from_str(&json).unwrap();
            assert_eq!(kind, parsed);
        }
        assert_eq!("bet".parse::<TradeKind>().unwrap(), TradeKind::Bet);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("open".parse::<TradeStatus>().unwrap(), TradeStatus::Open);
        assert_eq!("CLOSED".parse::<TradeStatus>().unwrap(), TradeStatus::Closed);
        assert!("pending".parse::<TradeStatus>().is_err());
    }

    // -- JournalEntry tests --

    #[test]
    fn test_entry_open_defaults() {
        let e = JournalEntry::open(TradeKind::Buy, Chain::Solana, "MintA", "TOK", 100.0, 0.001);
        assert_eq!(e.status, TradeStatus::Open);
        assert!(e.pnl.is_none());
        assert!(e.pnl_pct.is_none());
        assert!(e.exit_price.is_none());
        let tokens = e.token_amount.unwrap();
        assert!((tokens - 100_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_entry_open_zero_price_no_token_amount() {
        let e = JournalEntry::open(TradeKind::Bet, Chain::Base, "cond", "MKT", 50.0, 0.0);
        assert!(e.token_amount.is_none());
    }

    #[test]
    fn test_entry_close_computes_pnl() {
        let mut e = JournalEntry::open(TradeKind::Buy, Chain::Solana, "MintA", "TOK", 100.0, 0.001);
        e.close_at(0.002, Utc::now());
        assert_eq!(e.status, TradeStatus::Closed);
        assert!((e.pnl_pct.unwrap() - 100.0).abs() < 1e-9);
        // 100k tokens * 0.001 gain
        assert!((e.pnl.unwrap() - 100.0).abs() < 1e-6);
        assert!(e.exit_timestamp.is_some());
    }

    #[test]
    fn test_entry_close_only_once() {
        let mut e = JournalEntry::open(TradeKind::Buy, Chain::Solana, "MintA", "TOK", 100.0, 1.0);
        e.close_at(2.0, Utc::now());
        let first_pnl = e.pnl;
        e.close_at(0.5, Utc::now());
        assert_eq!(e.pnl, first_pnl, "second close must be a no-op");
    }

    #[test]
    fn test_entry_value_at() {
        let e = JournalEntry::open(TradeKind::Buy, Chain::Solana, "MintA", "TOK", 100.0, 0.5);
        // 200 tokens at 0.75
        assert!((e.value_at(0.75) - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_entry_serializes_camel_case_with_type_key() {
        let e = JournalEntry::open(TradeKind::Buy, Chain::Solana, "MintA", "TOK", 100.0, 0.5);
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["type"], "buy");
        assert!(json.get("tokenAmount").is_some());
        assert!(json.get("pnlPct").is_some());
        assert!(json.get("kind").is_none());
    }

    // -- StateDocument tests --

    #[test]
    fn test_state_document_defaults_missing_keys() {
        let doc: StateDocument = serde_json::from_str("{\"journal\": []}").unwrap();
        assert!(doc.watchlist.is_empty());
        assert!(doc.narratives.is_empty());
        assert!(doc.scans.is_empty());
        assert!(doc.poly_bets.is_empty());
        assert!((doc.config.goal_usd - 1_000_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_state_document_roundtrip() {
        let mut doc = StateDocument::default();
        doc.journal.push(JournalEntry::open(
            TradeKind::Buy,
            Chain::Solana,
            "MintA",
            "TOK",
            25.0,
            0.01,
        ));
        doc.narratives.insert("ai".into(), NarrativeRecord::default());
        let json = serde_json::to_string(&doc).unwrap();
        let parsed: StateDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.journal.len(), 1);
        assert!(parsed.narratives.contains_key("ai"));
    }

    #[test]
    fn test_store_config_defaults() {
        let cfg = StoreConfig::default();
        assert_eq!(cfg.goal_usd, 1_000_000.0);
        assert_eq!(cfg.default_risk_pct, 2.0);
        assert!(cfg.last_watch_check.is_none());
    }

    // -- Signal/score types --

    #[test]
    fn test_token_signals_worst_case_default() {
        let s = TokenSignals::default();
        assert_eq!(s.holder_count, 0);
        assert!(s.price_impact_pct.is_none());
        assert_eq!(s.tx_count_24h, 0);
        assert!(!s.has_critical_risk);
    }

    // -- Error display --

    #[test]
    fn test_error_display() {
        let e = ProspectorError::MissingCredential {
            var: "HELIUS_API_KEY".into(),
            reason: "required for pool discovery".into(),
        };
        let msg = format!("{e}");
        assert!(msg.contains("HELIUS_API_KEY"));
        assert!(msg.contains("pool discovery"));

        let e = ProspectorError::Provider {
            provider: "jupiter".into(),
            status: 429,
            body: "rate limited".into(),
        };
        assert!(format!("{e}").contains("429"));
    }
}
