use clap::{Parser, Subcommand};

use crate::commands;

#[derive(Parser)]
#[command(name = "market-snapshot")]
#[command(about = "Vietnam market snapshot windows, index series and group rankings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the trading window that is authoritative right now (or at --at)
    Window {
        /// Market-local time to resolve instead of now (YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        at: Option<String>,
    },
    /// Print the recent series of an index (VNINDEX, VN30, ...)
    Series {
        /// Index code
        index: String,

        /// Only print the most recent N points
        #[arg(long)]
        top_n: Option<usize>,
    },
    /// Rank a symbol group by market cap with traded value (treemap data)
    Rank {
        /// Group code (VN30, HOSE, HNX, ...)
        group: String,

        /// Number of symbols to keep (default: TREEMAP_TOP_N or 35)
        #[arg(long)]
        top_n: Option<usize>,
    },
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Window { at } => {
            commands::window::run(at);
        }
        Commands::Series { index, top_n } => {
            commands::series::run(index, top_n).await;
        }
        Commands::Rank { group, top_n } => {
            commands::rank::run(group, top_n).await;
        }
    }
}
