//! Target, market-cap, risk-based size, and goal-distance calculators.
//!
//! All functions are pure: price/supply/portfolio numbers in, sizing
//! figures out. Non-positive inputs that would make the math
//! meaningless return `ProspectorError::InvalidInput`.

use serde::{Deserialize, Serialize};

use crate::types::ProspectorError;

// ---------------------------------------------------------------------------
// Target position
// ---------------------------------------------------------------------------

/// Tokens needed for a USD target at the current price.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetPosition {
    pub tokens_needed: f64,
    pub pct_of_supply: f64,
    pub current_mcap: f64,
}

/// How many tokens a `target_usd` position buys at `price`, what share
/// of `supply` that is, and the implied current market cap.
pub fn target_position(
    price: f64,
    supply: f64,
    target_usd: f64,
) -> Result<TargetPosition, ProspectorError> {
    if price <= 0.0 {
        return Err(ProspectorError::InvalidInput(format!(
            "price must be positive, got {price}"
        )));
    }
    let tokens_needed = target_usd / price;
    Ok(TargetPosition {
        tokens_needed,
        pct_of_supply: if supply > 0.0 {
            tokens_needed / supply * 100.0
        } else {
            0.0
        },
        current_mcap: price * supply,
    })
}

// ---------------------------------------------------------------------------
// Required market cap
// ---------------------------------------------------------------------------

/// The market cap a held position needs to be worth a USD target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredMcap {
    pub required_price: f64,
    pub required_mcap: f64,
    /// Multiplier from a known current mcap to the required one.
    #[serde(default)]
    pub multiplier: Option<f64>,
}

/// Price and market cap at which `tokens_held` is worth `target_usd`.
/// Pass the current mcap to also get the multiplier to the target.
pub fn required_mcap(
    tokens_held: f64,
    supply: f64,
    target_usd: f64,
    current_mcap: Option<f64>,
) -> Result<RequiredMcap, ProspectorError> {
    if tokens_held <= 0.0 {
        return Err(ProspectorError::InvalidInput(format!(
            "tokens held must be positive, got {tokens_held}"
        )));
    }
    if supply <= 0.0 {
        return Err(ProspectorError::InvalidInput(format!(
            "supply must be positive, got {supply}"
        )));
    }
    let required_price = target_usd / tokens_held;
    let required = required_price * supply;
    Ok(RequiredMcap {
        required_price,
        required_mcap: required,
        multiplier: current_mcap
            .filter(|m| *m > 0.0)
            .map(|m| required / m),
    })
}

// ---------------------------------------------------------------------------
// Risk-based position size
// ---------------------------------------------------------------------------

/// Risk-derived position size.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionSize {
    pub risk_amount: f64,
    /// USD at risk per token when a stop is set.
    #[serde(default)]
    pub risk_per_token: Option<f64>,
    pub tokens_to_buy: f64,
    pub position_size_usd: f64,
    pub pct_of_portfolio: f64,
}

/// Size a position risking `risk_pct` of `portfolio_value`.
///
/// With a valid stop below entry, sizes by risk-per-token:
/// `tokens = riskAmount / (entry − stop)`. Without one, the entire
/// risk amount is the position (full-loss assumption).
pub fn position_size(
    portfolio_value: f64,
    risk_pct: f64,
    entry_price: f64,
    stop_loss_price: Option<f64>,
) -> Result<PositionSize, ProspectorError> {
    if portfolio_value <= 0.0 {
        return Err(ProspectorError::InvalidInput(format!(
            "portfolio value must be positive, got {portfolio_value}"
        )));
    }
    if risk_pct <= 0.0 {
        return Err(ProspectorError::InvalidInput(format!(
            "risk % must be positive, got {risk_pct}"
        )));
    }
    if entry_price <= 0.0 {
        return Err(ProspectorError::InvalidInput(format!(
            "entry price must be positive, got {entry_price}"
        )));
    }

    let risk_amount = portfolio_value * risk_pct / 100.0;
    let valid_stop = stop_loss_price.filter(|s| *s > 0.0 && *s < entry_price);

    let (risk_per_token, tokens_to_buy, position_size_usd) = match valid_stop {
        Some(stop) => {
            let per_token = entry_price - stop;
            let tokens = risk_amount / per_token;
            (Some(per_token), tokens, tokens * entry_price)
        }
        None => (None, risk_amount / entry_price, risk_amount),
    };

    Ok(PositionSize {
        risk_amount,
        risk_per_token,
        tokens_to_buy,
        position_size_usd,
        pct_of_portfolio: position_size_usd / portfolio_value * 100.0,
    })
}

// ---------------------------------------------------------------------------
// Goal progress
// ---------------------------------------------------------------------------

/// One open position as seen by the goal calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPosition {
    pub mint: String,
    pub symbol: String,
    pub token_amount: f64,
    pub entry_price: f64,
    /// Live price when available; falls back to entry price.
    #[serde(default)]
    pub current_price: Option<f64>,
}

impl GoalPosition {
    pub fn value(&self) -> f64 {
        self.token_amount * self.current_price.unwrap_or(self.entry_price)
    }
}

/// Per-position distance to the goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionGoal {
    pub mint: String,
    pub symbol: String,
    pub value_usd: f64,
    /// Multiplier for this position alone to reach the goal.
    /// `None` ("N/A") when the position value is zero.
    #[serde(default)]
    pub multiplier_to_goal: Option<f64>,
}

/// Aggregate progress toward the USD goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub target_usd: f64,
    pub total_value_usd: f64,
    pub progress_pct: f64,
    pub remaining_usd: f64,
    /// Ranked nearest-to-goal first; zero-value positions last.
    pub positions: Vec<PositionGoal>,
}

/// Sum position values and report progress toward `target_usd`, with a
/// per-position "multiplier to reach the goal alone" ranking.
pub fn goal_progress(positions: &[GoalPosition], target_usd: f64) -> GoalProgress {
    let total_value_usd: f64 = positions.iter().map(|p| p.value()).sum();

    let mut ranked: Vec<PositionGoal> = positions
        .iter()
        .map(|p| {
            let value = p.value();
            PositionGoal {
                mint: p.mint.clone(),
                symbol: p.symbol.clone(),
                value_usd: value,
                multiplier_to_goal: if value > 0.0 {
                    Some(target_usd / value)
                } else {
                    None
                },
            }
        })
        .collect();
    ranked.sort_by(|a, b| match (a.multiplier_to_goal, b.multiplier_to_goal) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let progress_pct = if target_usd > 0.0 {
        total_value_usd / target_usd * 100.0
    } else {
        0.0
    };

    GoalProgress {
        target_usd,
        total_value_usd,
        progress_pct,
        remaining_usd: (target_usd - total_value_usd).max(0.0),
        positions: ranked,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
