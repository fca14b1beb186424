//! `scan` — discover and rank fresh tokens, recording a snapshot.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::Args;
use serde_json::Value;
use tracing::info;

use crate::config::Settings;
use crate::engine::scanner::TokenScout;
use crate::providers::helius::HeliusClient;
use crate::providers::jupiter::JupiterClient;
use crate::providers::rugcheck::RugcheckClient;
use crate::store::StateStore;
use crate::types::ScanRecord;

/// How many top mints each scan snapshot keeps.
const SNAPSHOT_MINTS: usize = 5;

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Maximum number of ranked tokens to return
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

pub async fn run(args: ScanArgs, settings: &Settings, store: &StateStore) -> Result<Value> {
    // Hard precondition: no chain data source, no scan. Checked before
    // any network call.
    let helius_key = settings.require_helius()?;

    let chain = Arc::new(HeliusClient::new(helius_key)?);
    let quotes = Arc::new(JupiterClient::new(settings.jupiter_api_key.as_deref())?);
    let safety = Arc::new(RugcheckClient::new()?);

    let scout = TokenScout::new(chain, quotes, safety);
    let summary = scout.scan(args.limit).await?;

    if !summary.tokens.is_empty() {
        let record = ScanRecord {
            timestamp: Utc::now(),
            top_mints: summary
                .tokens
                .iter()
                .take(SNAPSHOT_MINTS)
                .map(|t| t.mint.clone())
                .collect(),
            best_score: summary.tokens.first().map(|t| t.score).unwrap_or(0.0),
        };
        store.add_scan_record(record)?;
        info!("scan snapshot recorded");
    }

    Ok(serde_json::to_value(summary)?)
}
