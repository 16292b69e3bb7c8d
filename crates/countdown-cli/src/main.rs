use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "countdown", version, about = "Countdown CLI")]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the countdown once (default)
    Show {
        /// Print a JSON snapshot instead of the rows
        #[arg(long)]
        json: bool,
    },
    /// Keep the countdown on screen, ticking once per second
    Watch,
    /// Print current countdown state as JSON without counting a launch
    Status,
    /// User agreement
    Terms {
        #[command(subcommand)]
        action: commands::terms::TermsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("COUNTDOWN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let result = match cli.command.unwrap_or(Commands::Show { json: false }) {
        Commands::Show { json } => commands::countdown::show(json),
        Commands::Watch => commands::countdown::watch(),
        Commands::Status => commands::countdown::status(),
        Commands::Terms { action } => commands::terms::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
