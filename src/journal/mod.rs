//! Journal analyzer.
//!
//! Pure aggregation over the closed subset of journal entries:
//! win rate, average win/loss magnitudes (Kelly inputs), profit
//! factor, per-narrative and per-chain breakdowns, and streaks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::strategy::kelly::{kelly_criterion, KellyResult};
use crate::types::{JournalEntry, TradeStatus};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Reference to a single trade in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeRef {
    pub id: String,
    pub symbol: String,
    pub pnl_pct: f64,
}

/// Cohort performance under one narrative tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeStats {
    pub trades: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub avg_pnl_pct: f64,
}

/// Per-chain trade count and realized P&L.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainStats {
    pub trades: usize,
    pub total_pnl: f64,
}

/// Win/loss runs, walked in stored (chronological) order.
///
/// The walk assumes stored order is chronological; out-of-order manual
/// inserts would change these numbers, and the analyzer deliberately
/// does not re-sort (that would rewrite historical streak values).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streaks {
    /// Signed run length: positive = current win streak, negative =
    /// current loss streak.
    pub current: i64,
    pub longest_win: u64,
    pub longest_loss: u64,
}

/// Full analysis over the closed trades.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalReport {
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub avg_win_pct: f64,
    /// Mean of losing trades' pnl%, as stored (negative).
    pub avg_loss_pct: f64,
    pub avg_pnl_pct: f64,
    pub total_pnl: f64,
    /// Realized P&L over total closed entry size, in percent.
    pub total_pnl_pct: f64,
    /// Gross profit over gross loss, computed from absolute pnl.
    /// `None` means infinite (profit with no recorded losses);
    /// 0.0 when there is neither profit nor loss.
    #[serde(default)]
    pub profit_factor: Option<f64>,
    pub best_trade: Option<TradeRef>,
    pub worst_trade: Option<TradeRef>,
    pub kelly: KellyResult,
    pub per_narrative: BTreeMap<String, NarrativeStats>,
    pub per_chain: BTreeMap<String, ChainStats>,
    pub streaks: Streaks,
}

/// Top-level analysis payload. `report` is absent (with an explanatory
/// message) when there are no closed trades to analyze.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalAnalysis {
    pub total_entries: usize,
    pub open_count: usize,
    pub closed_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<JournalReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

/// Analyze the journal. Only entries with `status == closed` and a
/// recorded pnl% participate; zero such entries yields an explicit
/// insufficient-data result, never an error.
pub fn analyze(entries: &[JournalEntry]) -> JournalAnalysis {
    let open_count = entries
        .iter()
        .filter(|e| e.status == TradeStatus::Open)
        .count();
    let closed: Vec<&JournalEntry> = entries
        .iter()
        .filter(|e| e.status == TradeStatus::Closed && e.pnl_pct.is_some())
        .collect();

    if closed.is_empty() {
        return JournalAnalysis {
            total_entries: entries.len(),
            open_count,
            closed_count: 0,
            report: None,
            message: Some("No closed trades yet — close a position to build the stats".into()),
        };
    }

    let mut wins = 0usize;
    let mut win_pcts = Vec::new();
    let mut loss_pcts = Vec::new();
    let mut gross_profit = 0.0f64;
    let mut gross_loss = 0.0f64;
    let mut total_pnl = 0.0f64;
    let mut invested = 0.0f64;
    let mut best: Option<&JournalEntry> = None;
    let mut worst: Option<&JournalEntry> = None;
    let mut per_narrative: BTreeMap<String, NarrativeStats> = BTreeMap::new();
    let mut per_chain: BTreeMap<String, ChainStats> = BTreeMap::new();
    let mut streaks = Streaks::default();

    for entry in &closed {
        let pct = entry.pnl_pct.unwrap_or(0.0);
        let pnl = entry.pnl.unwrap_or(0.0);
        let won = pct > 0.0;

        if won {
            wins += 1;
            win_pcts.push(pct);
        } else {
            loss_pcts.push(pct);
        }
        if pnl > 0.0 {
            gross_profit += pnl;
        } else {
            gross_loss += pnl.abs();
        }
        total_pnl += pnl;
        invested += entry.amount;

        if best.map_or(true, |b| pct > b.pnl_pct.unwrap_or(f64::MIN)) {
            best = Some(entry);
        }
        if worst.map_or(true, |w| pct < w.pnl_pct.unwrap_or(f64::MAX)) {
            worst = Some(entry);
        }

        // a trade tagged with N narratives contributes to all N buckets
        for tag in &entry.narratives {
            let bucket = per_narrative.entry(tag.clone()).or_default();
            bucket.trades += 1;
            if won {
                bucket.wins += 1;
            }
            bucket.avg_pnl_pct += pct; // sum for now, divided below
        }

        let chain = per_chain.entry(entry.chain.to_string()).or_default();
        chain.trades += 1;
        chain.total_pnl += pnl;

        // signed run counter, sign resets on outcome flip
        streaks.current = match (won, streaks.current) {
            (true, c) if c > 0 => c + 1,
            (true, _) => 1,
            (false, c) if c < 0 => c - 1,
            (false, _) => -1,
        };
        if streaks.current > 0 {
            streaks.longest_win = streaks.longest_win.max(streaks.current as u64);
        } else {
            streaks.longest_loss = streaks.longest_loss.max((-streaks.current) as u64);
        }
    }

    for bucket in per_narrative.values_mut() {
        bucket.win_rate = bucket.wins as f64 / bucket.trades as f64;
        bucket.avg_pnl_pct /= bucket.trades as f64;
    }

    let losses = closed.len() - wins;
    let win_rate = wins as f64 / closed.len() as f64;
    let avg_win_pct = mean(&win_pcts);
    let avg_loss_pct = mean(&loss_pcts);
    let avg_pnl_pct =
        closed.iter().map(|e| e.pnl_pct.unwrap_or(0.0)).sum::<f64>() / closed.len() as f64;

    let profit_factor = if gross_loss > 0.0 {
        Some(gross_profit / gross_loss)
    } else if gross_profit > 0.0 {
        None // infinite
    } else {
        Some(0.0)
    };

    let kelly = kelly_criterion(win_rate, avg_win_pct, avg_loss_pct);

    JournalAnalysis {
        total_entries: entries.len(),
        open_count,
        closed_count: closed.len(),
        report: Some(JournalReport {
            wins,
            losses,
            win_rate,
            avg_win_pct,
            avg_loss_pct,
            avg_pnl_pct,
            total_pnl,
            total_pnl_pct: if invested > 0.0 {
                total_pnl / invested * 100.0
            } else {
                0.0
            },
            profit_factor,
            best_trade: best.map(trade_ref),
            worst_trade: worst.map(trade_ref),
            kelly,
            per_narrative,
            per_chain,
            streaks,
        }),
        message: None,
    }
}

fn trade_ref(e: &JournalEntry) -> TradeRef {
    TradeRef {
        id: e.id.clone(),
        symbol: e.symbol.clone(),
        pnl_pct: e.pnl_pct.unwrap_or(0.0),
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
