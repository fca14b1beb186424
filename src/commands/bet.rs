//! `bet` — track prediction-market positions alongside the journal.

use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use serde_json::{json, Value};

use crate::store::StateStore;
use crate::types::{Chain, JournalEntry, PolyBet, TradeKind, TradeStatus};

#[derive(Debug, Subcommand)]
pub enum BetCmd {
    /// Record a placed bet
    Add {
        /// Market condition id
        condition_id: String,
        #[arg(long)]
        market: String,
        #[arg(long)]
        outcome: String,
        /// Side taken (yes|no)
        #[arg(long)]
        side: String,
        /// Stake in USD
        #[arg(long)]
        size: f64,
        /// Entry price per share (0..1)
        #[arg(long)]
        price: f64,
    },
    /// Settle a bet with its realized pnl
    Settle {
        condition_id: String,
        #[arg(long)]
        pnl: f64,
    },
    /// List tracked bets
    List,
}

pub fn run(cmd: BetCmd, store: &StateStore) -> Result<Value> {
    match cmd {
        BetCmd::Add {
            condition_id,
            market,
            outcome,
            side,
            size,
            price,
        } => {
            let bet = PolyBet {
                condition_id: condition_id.clone(),
                market: market.clone(),
                outcome,
                side,
                size,
                price,
                status: TradeStatus::Open,
                pnl: None,
                timestamp: Utc::now(),
            };
            store.add_poly_bet(bet.clone())?;

            // Bets also land in the journal so review covers them.
            let mut entry = JournalEntry::open(
                TradeKind::Bet,
                Chain::Solana,
                &condition_id,
                &market,
                size,
                price,
            );
            entry.note = Some(format!("polymarket: {market}"));
            store.add_journal_entry(entry)?;

            Ok(json!({ "added": bet }))
        }
        BetCmd::Settle { condition_id, pnl } => {
            let settled = store.update_poly_bet(&condition_id, |bet| {
                bet.status = TradeStatus::Closed;
                bet.pnl = Some(pnl);
            })?;
            match settled {
                Some(bet) => Ok(json!({ "settled": bet })),
                None => Ok(json!({
                    "settled": null,
                    "message": format!("No bet with condition id {condition_id}"),
                })),
            }
        }
        BetCmd::List => {
            let doc = store.load();
            Ok(json!({ "count": doc.poly_bets.len(), "bets": doc.poly_bets }))
        }
    }
}
