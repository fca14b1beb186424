//! Helius integration.
//!
//! Two surfaces: the standard Solana JSON-RPC endpoint (signatures,
//! transaction counts) and the enhanced transaction API, which parses
//! raw transactions into token transfer lists. Holder data comes from
//! the DAS `getTokenAccounts` method.
//!
//! RPC: https://mainnet.helius-rpc.com
//! Enhanced API: https://api.helius.xyz/v0
//!
//! The enhanced parser indexes transactions with a short lag behind
//! chain state, so lookups for fresh signatures are polled.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::engine::batch::poll_until;
use crate::providers::{
    ChainDataProvider, HolderDistribution, PoolSighting, TxTokenActivity, Venue,
};
use crate::types::ProspectorError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const RPC_URL: &str = "https://mainnet.helius-rpc.com";
const ENHANCED_API_URL: &str = "https://api.helius.xyz/v0";
/// Enhanced API indexing lag tolerance.
const INDEX_POLL_INTERVAL: Duration = Duration::from_secs(2);
const INDEX_POLL_TIMEOUT: Duration = Duration::from_secs(20);
/// Page size for holder enumeration. DAS caps at 1000.
const HOLDER_PAGE_LIMIT: usize = 1000;
/// Signature page size when counting 24h activity.
const TX_COUNT_PAGE_LIMIT: usize = 1000;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct RpcResponse<T> {
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct SignatureInfo {
    #[serde(default)]
    signature: String,
    #[serde(default, rename = "blockTime")]
    block_time: Option<i64>,
    #[serde(default)]
    err: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct EnhancedTransaction {
    #[serde(default, rename = "tokenTransfers")]
    token_transfers: Vec<TokenTransfer>,
}

#[derive(Debug, Deserialize)]
struct TokenTransfer {
    #[serde(default)]
    mint: String,
}

#[derive(Debug, Deserialize)]
struct TokenAccountsResult {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    token_accounts: Vec<TokenAccount>,
}

#[derive(Debug, Deserialize)]
struct TokenAccount {
    #[serde(default)]
    amount: f64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct HeliusClient {
    http: Client,
    api_key: String,
}

impl HeliusClient {
    pub fn new(api_key: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build Helius HTTP client")?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
        })
    }

    fn rpc_url(&self) -> String {
        format!("{RPC_URL}/?api-key={}", self.api_key)
    }

    async fn rpc_call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let resp = self
            .http
            .post(self.rpc_url())
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Helius RPC request failed: {method}"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ProspectorError::Provider {
                provider: "helius".to_string(),
                status,
                body,
            }
            .into());
        }

        let parsed: RpcResponse<T> = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse Helius RPC response: {method}"))?;

        if let Some(err) = parsed.error {
            anyhow::bail!("Helius RPC {method} error {}: {}", err.code, err.message);
        }
        parsed
            .result
            .with_context(|| format!("Helius RPC {method} returned no result"))
    }

    /// One enhanced-API lookup attempt. `None` means not yet indexed.
    async fn try_enhanced_lookup(&self, signature: &str) -> Option<Vec<EnhancedTransaction>> {
        let url = format!("{ENHANCED_API_URL}/transactions?api-key={}", self.api_key);
        let resp = self
            .http
            .post(&url)
            .json(&json!({ "transactions": [signature] }))
            .send()
            .await
            .ok()?;

        if !resp.status().is_success() {
            debug!(status = %resp.status(), "enhanced tx lookup not ready");
            return None;
        }

        let txs: Vec<EnhancedTransaction> = resp.json().await.ok()?;
        if txs.is_empty() {
            return None;
        }
        Some(txs)
    }
}

#[async_trait]
impl ChainDataProvider for HeliusClient {
    async fn recent_pool_signatures(
        &self,
        venue: &Venue,
        limit: usize,
    ) -> Result<Vec<PoolSighting>> {
        debug!(venue = venue.name, limit, "fetching pool signatures");

        let infos: Vec<SignatureInfo> = self
            .rpc_call(
                "getSignaturesForAddress",
                json!([venue.program_id, { "limit": limit }]),
            )
            .await?;

        let sightings = infos
            .into_iter()
            .filter(|s| s.err.is_none() && !s.signature.is_empty())
            .map(|s| PoolSighting {
                signature: s.signature,
                venue: venue.name.to_string(),
                block_time: s
                    .block_time
                    .and_then(|t| Utc.timestamp_opt(t, 0).single()),
            })
            .collect();

        Ok(sightings)
    }

    async fn transaction_mints(&self, signature: &str) -> Result<TxTokenActivity> {
        let txs = poll_until(
            "enhanced transaction indexing",
            INDEX_POLL_INTERVAL,
            INDEX_POLL_TIMEOUT,
            || self.try_enhanced_lookup(signature),
        )
        .await?;

        let mut mints = Vec::new();
        for tx in &txs {
            for transfer in &tx.token_transfers {
                if !transfer.mint.is_empty() && !mints.contains(&transfer.mint) {
                    mints.push(transfer.mint.clone());
                }
            }
        }
        Ok(TxTokenActivity { mints })
    }

    async fn holder_distribution(&self, mint: &str) -> Result<HolderDistribution> {
        let result: TokenAccountsResult = self
            .rpc_call(
                "getTokenAccounts",
                json!({ "mint": mint, "limit": HOLDER_PAGE_LIMIT }),
            )
            .await?;

        let total_supply: f64 = result.token_accounts.iter().map(|a| a.amount).sum();
        let mut amounts: Vec<f64> = result.token_accounts.iter().map(|a| a.amount).collect();
        amounts.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));

        let top10: f64 = amounts.iter().take(10).sum();
        let top10_pct = if total_supply > 0.0 {
            top10 / total_supply * 100.0
        } else {
            100.0
        };

        // `total` counts all accounts even when the page is truncated;
        // concentration is computed from the largest page, which holds
        // the top accounts for any token small enough to matter here.
        let holder_count = if result.total > 0 {
            result.total
        } else {
            result.token_accounts.len() as u64
        };

        if result.total as usize > HOLDER_PAGE_LIMIT {
            warn!(mint, total = result.total, "holder page truncated");
        }

        Ok(HolderDistribution {
            holder_count,
            top10_pct,
        })
    }

    async fn tx_count_24h(&self, mint: &str) -> Result<u64> {
        let infos: Vec<SignatureInfo> = self
            .rpc_call(
                "getSignaturesForAddress",
                json!([mint, { "limit": TX_COUNT_PAGE_LIMIT }]),
            )
            .await?;

        let cutoff = (Utc::now() - chrono::Duration::hours(24)).timestamp();
        let count = infos
            .iter()
            .filter(|s| s.block_time.map(|t| t >= cutoff).unwrap_or(false))
            .count() as u64;

        Ok(count)
    }

    fn name(&self) -> &str {
        "helius"
    }
}
