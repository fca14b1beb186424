//! `calc` — position math on demand.

use anyhow::Result;
use clap::Subcommand;
use serde_json::{json, Value};

use crate::store::StateStore;
use crate::strategy::{kelly, sizing};
use crate::types::TradeStatus;

#[derive(Debug, Subcommand)]
pub enum CalcCmd {
    /// Tokens and supply share needed for a USD target at a price
    Target {
        #[arg(long)]
        price: f64,
        #[arg(long)]
        supply: f64,
        #[arg(long)]
        target_usd: f64,
    },
    /// Market cap required for held tokens to be worth a USD target
    Mcap {
        #[arg(long)]
        tokens_held: f64,
        #[arg(long)]
        supply: f64,
        #[arg(long)]
        target_usd: f64,
        /// Known current mcap, to also report the multiplier needed
        #[arg(long)]
        current_mcap: Option<f64>,
    },
    /// Risk-based position size
    Size {
        #[arg(long)]
        portfolio: f64,
        /// Percent of portfolio to risk
        #[arg(long)]
        risk_pct: f64,
        #[arg(long)]
        entry_price: f64,
        #[arg(long)]
        stop_loss: Option<f64>,
    },
    /// Kelly fraction from explicit inputs
    Kelly {
        /// Win rate as a fraction (0.6 = 60%)
        #[arg(long)]
        win_rate: f64,
        /// Average win as a percent
        #[arg(long)]
        avg_win: f64,
        /// Average loss as a percent
        #[arg(long)]
        avg_loss: f64,
    },
    /// Progress of open positions toward the configured USD goal
    Goal {
        /// Override the configured goal
        #[arg(long)]
        target_usd: Option<f64>,
    },
}

pub fn run(cmd: CalcCmd, store: &StateStore) -> Result<Value> {
    match cmd {
        CalcCmd::Target {
            price,
            supply,
            target_usd,
        } => Ok(serde_json::to_value(sizing::target_position(
            price, supply, target_usd,
        )?)?),
        CalcCmd::Mcap {
            tokens_held,
            supply,
            target_usd,
            current_mcap,
        } => Ok(serde_json::to_value(sizing::required_mcap(
            tokens_held,
            supply,
            target_usd,
            current_mcap,
        )?)?),
        CalcCmd::Size {
            portfolio,
            risk_pct,
            entry_price,
            stop_loss,
        } => Ok(serde_json::to_value(sizing::position_size(
            portfolio,
            risk_pct,
            entry_price,
            stop_loss,
        )?)?),
        CalcCmd::Kelly {
            win_rate,
            avg_win,
            avg_loss,
        } => Ok(serde_json::to_value(kelly::kelly_criterion(
            win_rate, avg_win, avg_loss,
        ))?),
        CalcCmd::Goal { target_usd } => {
            let doc = store.load();
            let target = target_usd.unwrap_or(doc.config.goal_usd);
            let positions: Vec<sizing::GoalPosition> = store
                .get_journal(Some(TradeStatus::Open))
                .into_iter()
                .filter_map(|e| {
                    e.token_amount.map(|tokens| sizing::GoalPosition {
                        mint: e.mint,
                        symbol: e.symbol,
                        token_amount: tokens,
                        entry_price: e.price,
                        current_price: None,
                    })
                })
                .collect();
            let progress = sizing::goal_progress(&positions, target);
            Ok(json!({ "goal": progress }))
        }
    }
}
