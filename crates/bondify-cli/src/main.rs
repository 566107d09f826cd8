//! bondify CLI — spaced-repetition review from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "bondify", version, about = "Spaced-repetition review for Bondify")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Review due words interactively
    Review {
        /// Max due words to fetch (default: review.batch_size)
        #[arg(long)]
        limit: Option<u32>,

        /// Write a JSON summary of the last pass here when done (a restart with `r` starts a new pass)
        #[arg(long)]
        summary_out: Option<PathBuf>,
    },

    /// List words due for review
    Due {
        /// Max due words to fetch (default: review.batch_size)
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show SRS and wordlist statistics
    Stats {
        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show how many reviews are due each day
    Forecast {
        /// Days to forecast (default: review.forecast_days)
        #[arg(long)]
        days: Option<u32>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Add a word to your wordlist and the review queue
    AddWord {
        /// The word to add
        word: String,

        /// Personal notes for the word
        #[arg(long)]
        notes: Option<String>,
    },

    /// Log in and store an access token
    Login {
        #[arg(long)]
        email: String,

        /// Password (default: $BONDIFY_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },

    /// Delete the stored access token
    Logout,

    /// Create a starter bondify.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,bondify=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Review { limit, summary_out } => {
            commands::review::execute(limit, summary_out, config).await
        }
        Commands::Due { limit } => commands::due::execute(limit, config).await,
        Commands::Stats { format } => commands::stats::execute(format, config).await,
        Commands::Forecast { days, format } => {
            commands::forecast::execute(days, format, config).await
        }
        Commands::AddWord { word, notes } => {
            commands::add_word::execute(word, notes, config).await
        }
        Commands::Login { email, password } => {
            commands::login::execute(email, password, config).await
        }
        Commands::Logout => commands::login::logout(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
