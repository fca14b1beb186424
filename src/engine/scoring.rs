//! Token scoring: five normalized sub-scores and a weighted composite.
//!
//! Weights and filter thresholds are empirical tuning constants, not
//! contracts — they travel as configurable structs and are echoed in
//! every scan payload so downstream consumers can see what produced
//! the ranking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ComponentScores, TokenSignals};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Composite score weights. Must sum to 1.0.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub liquidity: f64,
    pub volume: f64,
    pub holders: f64,
    pub safety: f64,
    pub age: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            liquidity: 0.25,
            volume: 0.20,
            holders: 0.20,
            safety: 0.20,
            age: 0.15,
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.liquidity + self.volume + self.holders + self.safety + self.age
    }
}

/// Hard exclusion thresholds, applied strictly after scoring.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterThresholds {
    /// Tokens with fewer holders are excluded.
    pub min_holders: u64,
    /// Tokens whose top-10 holders control more than this share of
    /// supply (in percent) are excluded.
    pub max_top10_pct: f64,
}

impl Default for FilterThresholds {
    fn default() -> Self {
        Self {
            min_holders: 10,
            max_top10_pct: 50.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Sub-scores (each clamped to [0, 1])
// ---------------------------------------------------------------------------

/// 1.0 at 0% price impact on the test quote, linearly degrading to 0
/// at 5%+ impact. No quote at all is scored as fully illiquid.
pub fn score_liquidity(price_impact_pct: Option<f64>) -> f64 {
    match price_impact_pct {
        Some(impact) => (1.0 - impact / 5.0).clamp(0.0, 1.0),
        None => 0.0,
    }
}

/// Linear in 24h transaction count, saturating at 20+ transactions.
pub fn score_volume(tx_count_24h: u64) -> f64 {
    (tx_count_24h as f64 / 20.0).clamp(0.0, 1.0)
}

/// `log10(holders) / 3`: 0 holders → 0, ~1000+ → 1.
pub fn score_holders(holder_count: u64) -> f64 {
    if holder_count == 0 {
        return 0.0;
    }
    ((holder_count as f64).log10() / 3.0).clamp(0.0, 1.0)
}

/// `1 − risks/5`: five or more flagged risks score 0.
pub fn score_safety(risk_count: u32) -> f64 {
    (1.0 - risk_count as f64 / 5.0).clamp(0.0, 1.0)
}

/// Exponential decay with a 24h half-life-ish constant:
/// `exp(−age_secs / 86400)`. Unknown creation time is neutral (0.5).
pub fn score_age(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match created_at {
        Some(created) => {
            let age_secs = (now - created).num_seconds() as f64;
            (-age_secs / 86_400.0).exp().clamp(0.0, 1.0)
        }
        None => 0.5,
    }
}

// ---------------------------------------------------------------------------
// Composite & filters
// ---------------------------------------------------------------------------

/// All five sub-scores for a token's raw signals.
pub fn component_scores(
    signals: &TokenSignals,
    created_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ComponentScores {
    ComponentScores {
        liquidity: score_liquidity(signals.price_impact_pct),
        volume: score_volume(signals.tx_count_24h),
        holders: score_holders(signals.holder_count),
        safety: score_safety(signals.risk_count),
        age: score_age(created_at, now),
    }
}

/// Weighted composite in [0, 1].
pub fn compute_score(scores: &ComponentScores, weights: &ScoreWeights) -> f64 {
    scores.liquidity * weights.liquidity
        + scores.volume * weights.volume
        + scores.holders * weights.holders
        + scores.safety * weights.safety
        + scores.age * weights.age
}

/// Hard exclusions, evaluated after scoring so every analyzed token
/// still carries a full score breakdown.
pub fn passes_filters(signals: &TokenSignals, filters: &FilterThresholds) -> bool {
    if signals.holder_count < filters.min_holders {
        return false;
    }
    if signals.top10_pct > filters.max_top10_pct {
        return false;
    }
    if signals.has_critical_risk {
        return false;
    }
    if signals.price_impact_pct.is_none() {
        return false;
    }
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
