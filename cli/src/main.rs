use std::path::PathBuf;

use clap::{Parser, Subcommand};
use handspell_cli::commands;
use handspell_cli::logging::init_logging;

#[derive(Parser)]
#[command(version, about = "Two-hand gesture spell duels, driven from scripts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full match with the local caster replaying a gesture script.
    Simulate {
        #[arg(short, long)]
        script: PathBuf,
        /// Config file to use instead of the stored one.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Directory of custom spellbook files.
        #[arg(long)]
        spellbook: Option<PathBuf>,
        /// Replay against the wall clock from a recognizer thread.
        #[arg(long)]
        realtime: bool,
        /// Stop an undecided match after this many seconds.
        #[arg(long, default_value_t = 120.0)]
        max_secs: f32,
    },
    /// List the spellbook.
    Spells {
        #[arg(long)]
        spellbook: Option<PathBuf>,
    },
    /// Print the effective configuration.
    Config {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let _guard = init_logging();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Simulate {
            script,
            config,
            spellbook,
            realtime,
            max_secs,
        } => {
            commands::run_simulation(
                script,
                config.as_deref(),
                spellbook.as_deref(),
                *realtime,
                *max_secs,
            )
            .await
        }
        Commands::Spells { spellbook } => commands::list_spells(spellbook.as_deref()),
        Commands::Config { config } => commands::show_config(config.as_deref()),
    }
}
