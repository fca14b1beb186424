//! `review` — full performance picture: journal analysis, Kelly
//! sizing from realized stats, and goal progress over open positions.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use serde_json::{json, Value};
use tracing::warn;

use crate::config::Settings;
use crate::engine::batch::run_batched;
use crate::journal;
use crate::providers::jupiter::JupiterClient;
use crate::providers::QuoteProvider;
use crate::store::StateStore;
use crate::strategy::sizing::{self, GoalPosition};
use crate::types::TradeStatus;

const QUOTE_BATCH_SIZE: usize = 5;

#[derive(Debug, Args)]
pub struct ReviewArgs {
    /// Skip live price enrichment and value positions at entry price
    #[arg(long)]
    pub no_refresh: bool,
}

pub async fn run(args: ReviewArgs, settings: &Settings, store: &StateStore) -> Result<Value> {
    let doc = store.load();
    let analysis = journal::analyze(&doc.journal);

    let open: Vec<GoalPosition> = store
        .get_journal(Some(TradeStatus::Open))
        .into_iter()
        .filter_map(|e| {
            e.token_amount.map(|tokens| GoalPosition {
                mint: e.mint,
                symbol: e.symbol,
                token_amount: tokens,
                entry_price: e.price,
                current_price: None,
            })
        })
        .collect();

    let positions = if args.no_refresh || open.is_empty() {
        open
    } else {
        enrich_prices(open, settings).await?
    };

    let goal = sizing::goal_progress(&positions, doc.config.goal_usd);

    Ok(json!({
        "analysis": analysis,
        "goal": goal,
        "openPositions": positions,
    }))
}

/// Attach live quotes to open positions. A position whose quote fails
/// keeps `current_price: None` and values at entry.
async fn enrich_prices(
    positions: Vec<GoalPosition>,
    settings: &Settings,
) -> Result<Vec<GoalPosition>> {
    let quotes: Arc<dyn QuoteProvider> =
        Arc::new(JupiterClient::new(settings.jupiter_api_key.as_deref())?);

    let results = run_batched(positions, QUOTE_BATCH_SIZE, |mut position| {
        let quotes = quotes.clone();
        async move {
            match quotes.price_usd(&position.mint).await {
                Ok(price) => position.current_price = price,
                Err(err) => {
                    warn!(mint = %position.mint, error = %err, "price enrichment failed")
                }
            }
            Ok(position)
        }
    })
    .await;

    Ok(results.into_iter().filter_map(|r| r.ok()).collect())
}
