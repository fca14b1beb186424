//! Rugcheck integration.
//!
//! Pulls the public report summary for a mint: a list of named risks,
//! each with a severity level. "danger" level risks (mint authority
//! retained, freeze authority, honeypot patterns) are treated as
//! critical and exclude the token outright.
//!
//! API: https://api.rugcheck.xyz/v1

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::providers::{SafetyProvider, SafetyReport};

const RUGCHECK_API_URL: &str = "https://api.rugcheck.xyz/v1";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ReportSummary {
    #[serde(default)]
    risks: Vec<Risk>,
}

#[derive(Debug, Deserialize)]
struct Risk {
    #[serde(default)]
    name: String,
    #[serde(default)]
    level: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct RugcheckClient {
    http: Client,
}

impl RugcheckClient {
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build Rugcheck HTTP client")?;

        Ok(Self { http })
    }
}

#[async_trait]
impl SafetyProvider for RugcheckClient {
    async fn audit(&self, mint: &str) -> Result<SafetyReport> {
        let url = format!("{RUGCHECK_API_URL}/tokens/{mint}/report/summary");
        debug!(mint, "fetching safety report");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .context("Rugcheck request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Rugcheck error {status}: {body}");
        }

        let summary: ReportSummary = resp
            .json()
            .await
            .context("Failed to parse Rugcheck report")?;

        let has_critical_risk = summary.risks.iter().any(|r| r.level == "danger");
        let risk_names = summary.risks.iter().map(|r| r.name.clone()).collect();

        Ok(SafetyReport {
            risk_count: summary.risks.len() as u32,
            has_critical_risk,
            risk_names,
        })
    }

    fn name(&self) -> &str {
        "rugcheck"
    }
}
