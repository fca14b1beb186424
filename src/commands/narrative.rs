//! `narrative` — thematic tags grouping tokens and notes.

use anyhow::Result;
use clap::Subcommand;
use serde_json::{json, Value};

use crate::store::StateStore;

#[derive(Debug, Subcommand)]
pub enum NarrativeCmd {
    /// Tag a mint and/or attach a note, creating the tag if needed
    Add {
        tag: String,
        #[arg(long)]
        mint: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// List narrative tags with their tokens and notes
    List,
}

pub fn run(cmd: NarrativeCmd, store: &StateStore) -> Result<Value> {
    match cmd {
        NarrativeCmd::Add { tag, mint, note } => {
            store.add_narrative(&tag, mint.as_deref(), note.as_deref())?;
            let doc = store.load();
            Ok(json!({ "tag": tag, "narrative": doc.narratives.get(&tag) }))
        }
        NarrativeCmd::List => {
            let doc = store.load();
            Ok(json!({
                "count": doc.narratives.len(),
                "narratives": doc.narratives,
            }))
        }
    }
}
