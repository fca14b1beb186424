//! Kelly criterion position sizing.
//!
//! Computes the Kelly fraction from a realized win rate and average
//! win/loss magnitudes, with a hard cap and a half-Kelly companion
//! figure for conservative sizing.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hard cap on the recommended Kelly percentage.
const KELLY_CAP_PCT: f64 = 25.0;

/// Kelly sizing recommendation. Percentages are of bankroll.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KellyResult {
    pub kelly_pct: f64,
    pub half_kelly_pct: f64,
    /// Payoff ratio R = |avg win| / |avg loss|.
    pub payoff_ratio: f64,
    pub win_rate: f64,
    pub capped: bool,
    pub recommendation: String,
}

/// Kelly formula on realized trade statistics:
/// `kelly% = winRate − (1 − winRate) / R` with `R = |avgWin| / |avgLoss|`,
/// expressed in percent, capped at 25 and floored at 0.
///
/// Degenerate inputs (no recorded losses, or a non-positive win rate)
/// short-circuit to a 0% advisory result instead of dividing by zero.
pub fn kelly_criterion(win_rate: f64, avg_win: f64, avg_loss: f64) -> KellyResult {
    if avg_loss.abs() < f64::EPSILON || win_rate <= 0.0 {
        return KellyResult {
            kelly_pct: 0.0,
            half_kelly_pct: 0.0,
            payoff_ratio: 0.0,
            win_rate,
            capped: false,
            recommendation: "Insufficient data: need both wins and losses recorded to size with Kelly".to_string(),
        };
    }

    let payoff_ratio = avg_win.abs() / avg_loss.abs();
    let raw_pct = (win_rate - (1.0 - win_rate) / payoff_ratio) * 100.0;
    let floored = raw_pct.max(0.0);
    let capped = floored > KELLY_CAP_PCT;
    let kelly_pct = floored.min(KELLY_CAP_PCT);

    if capped {
        debug!(raw_pct, "Kelly above cap — clamping");
    }

    let recommendation = if kelly_pct == 0.0 {
        "Negative edge: no position recommended".to_string()
    } else {
        format!(
            "Risk up to {:.1}% of bankroll per trade ({:.1}% at half-Kelly)",
            kelly_pct,
            kelly_pct / 2.0
        )
    };

    KellyResult {
        kelly_pct,
        half_kelly_pct: kelly_pct / 2.0,
        payoff_ratio,
        win_rate,
        capped,
        recommendation,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kelly_basic_capped() {
        // 60% win rate, wins twice the size of losses:
        // kelly% = 60 - 40/2 = 40, capped to 25
        let r = kelly_criterion(0.6, 20.0, 10.0);
        assert_eq!(r.kelly_pct, 25.0);
        assert_eq!(r.half_kelly_pct, 12.5);
        assert!(r.capped);
        assert!((r.payoff_ratio - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_kelly_uncapped() {
        // 50% win rate, R=1.5: kelly% = 50 - 50/1.5 = 16.67
        let r = kelly_criterion(0.5, 15.0, 10.0);
        assert!((r.kelly_pct - (50.0 - 50.0 / 1.5)).abs() < 1e-9);
        assert!(!r.capped);
    }

    #[test]
    fn test_kelly_negative_edge_floors_to_zero() {
        // 30% win rate, even payoff: 30 - 70 = -40 → 0
        let r = kelly_criterion(0.3, 10.0, 10.0);
        assert_eq!(r.kelly_pct, 0.0);
        assert_eq!(r.half_kelly_pct, 0.0);
        assert!(r.recommendation.contains("Negative edge"));
    }

    #[test]
    fn test_kelly_no_losses_insufficient_data() {
        for win_rate in [0.2, 0.6, 1.0] {
            let r = kelly_criterion(win_rate, 50.0, 0.0);
            assert_eq!(r.kelly_pct, 0.0);
            assert!(r.recommendation.contains("Insufficient data"));
        }
    }

    #[test]
    fn test_kelly_zero_win_rate_insufficient_data() {
        let r = kelly_criterion(0.0, 10.0, 10.0);
        assert_eq!(r.kelly_pct, 0.0);
        assert!(r.recommendation.contains("Insufficient data"));
    }

    #[test]
    fn test_kelly_negative_magnitudes_use_absolute_values() {
        // losses often arrive as negative percentages
        let a = kelly_criterion(0.55, 12.0, -8.0);
        let b = kelly_criterion(0.55, 12.0, 8.0);
        assert!((a.kelly_pct - b.kelly_pct).abs() < 1e-12);
    }

    #[test]
    fn test_kelly_serializes_camel_case() {
        let json = serde_json::to_value(kelly_criterion(0.6, 20.0, 10.0)).unwrap();
        assert!(json.get("kellyPct").is_some());
        assert!(json.get("halfKellyPct").is_some());
    }
}
