//! `journal` — record, list, and close trades.

use anyhow::Result;
use clap::Subcommand;
use serde_json::{json, Value};

use crate::store::StateStore;
use crate::types::{Chain, JournalEntry, TradeKind, TradeStatus};

#[derive(Debug, Subcommand)]
pub enum JournalCmd {
    /// List journal entries
    Show {
        /// Filter by status (open|closed)
        #[arg(long)]
        status: Option<TradeStatus>,
        /// Filter by chain (solana|base)
        #[arg(long)]
        chain: Option<Chain>,
    },
    /// Record a trade manually
    Add {
        /// Trade kind (buy|sell|bet)
        #[arg(long, default_value = "buy")]
        kind: TradeKind,
        /// Chain (solana|base)
        #[arg(long, default_value = "solana")]
        chain: Chain,
        #[arg(long)]
        mint: String,
        #[arg(long)]
        symbol: String,
        /// Position size in USD
        #[arg(long)]
        amount: f64,
        /// Entry price in USD
        #[arg(long)]
        price: f64,
        /// Narrative tags, comma-separated
        #[arg(long, value_delimiter = ',')]
        narratives: Vec<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Close an open entry at an exit price
    Close {
        /// Journal entry id
        id: String,
        #[arg(long)]
        exit_price: f64,
    },
}

pub fn run(cmd: JournalCmd, store: &StateStore) -> Result<Value> {
    match cmd {
        JournalCmd::Show { status, chain } => {
            let mut entries = store.get_journal(status);
            if let Some(chain) = chain {
                entries.retain(|e| e.chain == chain);
            }
            Ok(json!({
                "count": entries.len(),
                "entries": entries,
            }))
        }
        JournalCmd::Add {
            kind,
            chain,
            mint,
            symbol,
            amount,
            price,
            narratives,
            note,
        } => {
            let mut entry = JournalEntry::open(kind, chain, &mint, &symbol, amount, price);
            entry.narratives = narratives;
            entry.note = note;
            let saved = store.add_journal_entry(entry)?;
            Ok(json!({ "added": saved }))
        }
        JournalCmd::Close { id, exit_price } => {
            match store.close_journal_entry(&id, exit_price)? {
                Some(entry) => Ok(json!({ "closed": entry })),
                None => Ok(json!({ "closed": null, "message": format!("No entry with id {id}") })),
            }
        }
    }
}
