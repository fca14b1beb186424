//! `config` — inspect and tune persisted settings.

use anyhow::Result;
use clap::Subcommand;
use serde_json::{json, Value};

use crate::store::StateStore;

#[derive(Debug, Subcommand)]
pub enum ConfigCmd {
    /// Show persisted config and state location
    Show,
    /// Update one or more settings
    Set {
        /// Portfolio goal in USD
        #[arg(long)]
        goal_usd: Option<f64>,
        /// Default risk percent for sizing
        #[arg(long)]
        risk_pct: Option<f64>,
        /// Default stop-loss distance percent
        #[arg(long)]
        stop_loss_pct: Option<f64>,
    },
}

pub fn run(cmd: ConfigCmd, store: &StateStore) -> Result<Value> {
    match cmd {
        ConfigCmd::Show => {
            let doc = store.load();
            Ok(json!({
                "config": doc.config,
                "stateDir": store.dir().display().to_string(),
            }))
        }
        ConfigCmd::Set {
            goal_usd,
            risk_pct,
            stop_loss_pct,
        } => {
            let updated = store.update_config(|config| {
                if let Some(goal) = goal_usd {
                    config.goal_usd = goal;
                }
                if let Some(risk) = risk_pct {
                    config.default_risk_pct = risk;
                }
                if let Some(stop) = stop_loss_pct {
                    config.default_stop_loss_pct = stop;
                }
            })?;
            Ok(json!({ "config": updated }))
        }
    }
}
