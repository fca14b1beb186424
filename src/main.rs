//! PROSPECTOR CLI entry point.
//!
//! Every subcommand resolves to one JSON object on stdout. Failures
//! print `{"error": true, "message": ...}` to stderr and exit 1, so a
//! calling agent never has to parse a stack trace.

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use prospector::commands::{
    bet, calc, config as config_cmd, journal, narrative, review, scan, watch,
};
use prospector::config::Settings;
use prospector::store::StateStore;

#[derive(Parser)]
#[command(name = "prospector")]
#[command(about = "Token discovery, position sizing, and trade journal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override the state directory
    #[arg(long, global = true)]
    state_dir: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover and rank fresh tokens
    Scan(scan::ScanArgs),

    /// Record, list, and close trades
    Journal {
        #[command(subcommand)]
        cmd: journal::JournalCmd,
    },

    /// Maintain the watchlist and run target checks
    Watch {
        #[command(subcommand)]
        cmd: watch::WatchCmd,
    },

    /// Position math: targets, mcap, sizing, Kelly, goal
    Calc {
        #[command(subcommand)]
        cmd: calc::CalcCmd,
    },

    /// Performance review: analysis, Kelly, goal progress
    Review(review::ReviewArgs),

    /// Group tokens and notes under thematic tags
    Narrative {
        #[command(subcommand)]
        cmd: narrative::NarrativeCmd,
    },

    /// Track prediction-market bets
    Bet {
        #[command(subcommand)]
        cmd: bet::BetCmd,
    },

    /// Inspect and tune persisted settings
    Config {
        #[command(subcommand)]
        cmd: config_cmd::ConfigCmd,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("prospector=info"));

    // Logs go to stderr: stdout is reserved for the JSON payload.
    if std::env::var("PROSPECTOR_LOG_JSON").is_ok() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let settings = Settings::from_env();
    let store = match &cli.state_dir {
        Some(dir) => StateStore::at(dir.clone()),
        None => StateStore::open_default(),
    };

    let result = match cli.command {
        Commands::Scan(args) => scan::run(args, &settings, &store).await,
        Commands::Journal { cmd } => journal::run(cmd, &store),
        Commands::Watch { cmd } => watch::run(cmd, &settings, &store).await,
        Commands::Calc { cmd } => calc::run(cmd, &store),
        Commands::Review(args) => review::run(args, &settings, &store).await,
        Commands::Narrative { cmd } => narrative::run(cmd, &store),
        Commands::Bet { cmd } => bet::run(cmd, &store),
        Commands::Config { cmd } => config_cmd::run(cmd, &store),
    };

    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(out) => println!("{out}"),
            Err(err) => {
                eprintln!("{}", json!({ "error": true, "message": err.to_string() }));
                std::process::exit(1);
            }
        },
        Err(err) => {
            eprintln!("{}", json!({ "error": true, "message": format!("{err:#}") }));
            std::process::exit(1);
        }
    }
}
