//! Jupiter integration.
//!
//! Quote API probes liquidity: we request a small fixed SOL→token swap
//! and read the route's price impact. A missing route means the token
//! is effectively untradeable. The price API provides USD marks for
//! watchlist refresh and portfolio valuation.
//!
//! Quote API: https://quote-api.jup.ag/v6
//! Price API: https://lite-api.jup.ag/price/v2
//!
//! No API key required; one can be supplied for higher rate limits.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::providers::{QuoteOutcome, QuoteProvider, WSOL_MINT};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const QUOTE_API_URL: &str = "https://quote-api.jup.ag/v6";
const PRICE_API_URL: &str = "https://lite-api.jup.ag/price/v2";
/// Test swap size: 0.1 SOL in lamports. Small enough to be routable on
/// thin pools, large enough to register impact.
const TEST_SWAP_LAMPORTS: u64 = 100_000_000;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Price impact as a decimal fraction string, e.g. "0.0123".
    #[serde(default, rename = "priceImpactPct")]
    price_impact_pct: String,
}

#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    data: HashMap<String, Option<PriceEntry>>,
}

#[derive(Debug, Deserialize)]
struct PriceEntry {
    #[serde(default)]
    price: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct JupiterClient {
    http: Client,
    api_key: Option<String>,
}

impl JupiterClient {
    pub fn new(api_key: Option<&str>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build Jupiter HTTP client")?;

        Ok(Self {
            http,
            api_key: api_key.map(str::to_string),
        })
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let req = self.http.get(url);
        match &self.api_key {
            Some(key) => req.header("x-api-key", key),
            None => req,
        }
    }
}

#[async_trait]
impl QuoteProvider for JupiterClient {
    async fn test_quote(&self, mint: &str) -> Result<QuoteOutcome> {
        debug!(mint, "requesting test quote");

        let resp = self
            .get(&format!("{QUOTE_API_URL}/quote"))
            .query(&[
                ("inputMint", WSOL_MINT),
                ("outputMint", mint),
                ("amount", &TEST_SWAP_LAMPORTS.to_string()),
            ])
            .send()
            .await
            .context("Jupiter quote request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Jupiter quote error {status}: {body}");
        }

        let quote: QuoteResponse = resp
            .json()
            .await
            .context("Failed to parse Jupiter quote response")?;

        // Fraction → percent. An unparseable impact is treated as total.
        let fraction: f64 = quote.price_impact_pct.parse().unwrap_or(1.0);
        Ok(QuoteOutcome {
            price_impact_pct: fraction * 100.0,
        })
    }

    async fn price_usd(&self, mint: &str) -> Result<Option<f64>> {
        let resp = self
            .get(PRICE_API_URL)
            .query(&[("ids", mint)])
            .send()
            .await
            .context("Jupiter price request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Jupiter price error {status}: {body}");
        }

        let prices: PriceResponse = resp
            .json()
            .await
            .context("Failed to parse Jupiter price response")?;

        let price = prices
            .data
            .get(mint)
            .and_then(|entry| entry.as_ref())
            .and_then(|entry| entry.price.parse::<f64>().ok());

        Ok(price)
    }

    fn name(&self) -> &str {
        "jupiter"
    }
}
