//! `watch` — maintain the watchlist and run target checks.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::config::Settings;
use crate::engine::batch::run_batched;
use crate::providers::helius::HeliusClient;
use crate::providers::jupiter::JupiterClient;
use crate::providers::{ChainDataProvider, QuoteProvider};
use crate::store::StateStore;
use crate::types::{Chain, WatchlistItem};

const REFRESH_BATCH_SIZE: usize = 5;

#[derive(Debug, Subcommand)]
pub enum WatchCmd {
    /// Add a token to the watchlist (re-adding replaces it)
    Add {
        mint: String,
        #[arg(long)]
        symbol: String,
        #[arg(long, default_value = "solana")]
        chain: Chain,
        /// Alert when price drops to this level
        #[arg(long)]
        target_buy: Option<f64>,
        /// Alert when price rises to this level
        #[arg(long)]
        target_sell: Option<f64>,
        /// Narrative tags, comma-separated
        #[arg(long, value_delimiter = ',')]
        narratives: Vec<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Remove a token by mint
    Remove { mint: String },
    /// List watched tokens
    List,
    /// Refresh prices and holders, reporting tripped targets
    Check,
}

pub async fn run(cmd: WatchCmd, settings: &Settings, store: &StateStore) -> Result<Value> {
    match cmd {
        WatchCmd::Add {
            mint,
            symbol,
            chain,
            target_buy,
            target_sell,
            narratives,
            notes,
        } => {
            let quotes = JupiterClient::new(settings.jupiter_api_key.as_deref())?;
            let price = match quotes.price_usd(&mint).await {
                Ok(Some(p)) => p,
                Ok(None) => 0.0,
                Err(err) => {
                    warn!(mint = %mint, error = %err, "price lookup failed at add");
                    0.0
                }
            };

            let now = Utc::now();
            let item = WatchlistItem {
                mint: mint.clone(),
                chain,
                symbol,
                target_buy,
                target_sell,
                narratives,
                price_at_add: price,
                last_price: price,
                last_mcap: None,
                last_holders: None,
                notes,
                added_at: now,
                last_check: now,
            };
            store.add_watchlist_item(item.clone())?;
            Ok(json!({ "added": item }))
        }
        WatchCmd::Remove { mint } => {
            let removed = store.remove_watchlist_item(&mint)?;
            Ok(json!({ "removed": removed, "mint": mint }))
        }
        WatchCmd::List => {
            let doc = store.load();
            Ok(json!({
                "count": doc.watchlist.len(),
                "watchlist": doc.watchlist,
                "lastCheck": doc.config.last_watch_check,
            }))
        }
        WatchCmd::Check => check(settings, store).await,
    }
}

/// Refresh every watched token and report target hits. One token's
/// failed refresh keeps its previous values.
async fn check(settings: &Settings, store: &StateStore) -> Result<Value> {
    let items = store.load().watchlist;
    if items.is_empty() {
        return Ok(json!({ "checked": 0, "alerts": [], "message": "Watchlist is empty" }));
    }

    let quotes: Arc<dyn QuoteProvider> =
        Arc::new(JupiterClient::new(settings.jupiter_api_key.as_deref())?);
    // Holder refresh is best-effort: without a Helius key, prices still
    // update and holder counts stay stale.
    let chain: Option<Arc<dyn ChainDataProvider>> = match &settings.helius_api_key {
        Some(key) => Some(Arc::new(HeliusClient::new(key)?)),
        None => None,
    };

    let results = run_batched(items, REFRESH_BATCH_SIZE, |mut item| {
        let quotes = quotes.clone();
        let chain = chain.clone();
        async move {
            match quotes.price_usd(&item.mint).await {
                Ok(Some(price)) => item.last_price = price,
                Ok(None) => {}
                Err(err) => warn!(mint = %item.mint, error = %err, "price refresh failed"),
            }
            if let Some(chain) = chain {
                match chain.holder_distribution(&item.mint).await {
                    Ok(dist) => item.last_holders = Some(dist.holder_count),
                    Err(err) => warn!(mint = %item.mint, error = %err, "holder refresh failed"),
                }
            }
            item.last_check = Utc::now();
            Ok(item)
        }
    })
    .await;

    let refreshed: Vec<WatchlistItem> = results.into_iter().filter_map(|r| r.ok()).collect();

    let mut alerts = Vec::new();
    for item in &refreshed {
        if let Some(target) = item.target_buy {
            if item.last_price > 0.0 && item.last_price <= target {
                alerts.push(json!({
                    "mint": item.mint,
                    "symbol": item.symbol,
                    "kind": "buy",
                    "target": target,
                    "price": item.last_price,
                }));
            }
        }
        if let Some(target) = item.target_sell {
            if item.last_price >= target {
                alerts.push(json!({
                    "mint": item.mint,
                    "symbol": item.symbol,
                    "kind": "sell",
                    "target": target,
                    "price": item.last_price,
                }));
            }
        }
    }

    info!(checked = refreshed.len(), alerts = alerts.len(), "watch check complete");
    let count = refreshed.len();
    store.replace_watchlist(refreshed.clone())?;

    Ok(json!({
        "checked": count,
        "alerts": alerts,
        "watchlist": refreshed,
    }))
}
