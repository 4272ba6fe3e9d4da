//! Heritage CLI
//!
//! Inspect metadata records across the type hierarchies of a JSON model:
//! scan an element under a search strategy, print attribute models, and check
//! whether a scan is known to be empty.

mod commands;
mod element;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use heritage_engine::SearchStrategy;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "heritage")]
#[command(about = "Metadata discovery across type hierarchies", long_about = None)]
#[command(version)]
struct Cli {
    /// Scanner configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log scan decisions and contained failures
    #[arg(short, long, global = true)]
    verbose: bool,

    /// When to use colors: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an element and print every level that carries records
    Scan {
        /// JSON type model
        model: PathBuf,
        /// Element: `acme.B`, `acme.B#save`, or `acme.B#save(acme.Item)`
        element: String,
        /// Search strategy
        #[arg(short, long, default_value = "type-hierarchy")]
        strategy: SearchStrategy,
    },

    /// Print the attribute model of a record kind
    Attributes {
        /// JSON type model
        model: PathBuf,
        /// Record kind name
        kind: String,
    },

    /// Check whether a scan is certain to find nothing
    KnownEmpty {
        /// JSON type model
        model: PathBuf,
        /// Element: `acme.B`, `acme.B#save`, or `acme.B#save(acme.Item)`
        element: String,
        /// Search strategy
        #[arg(short, long, default_value = "type-hierarchy")]
        strategy: SearchStrategy,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("HERITAGE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let choice = output::resolve_color_choice(cli.color.as_deref());
    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan {
            model,
            element,
            strategy,
        } => commands::scan::execute(&model, &element, strategy, &config, choice),

        Commands::Attributes { model, kind } => {
            commands::attributes::execute(&model, &kind, &config, choice)
        }

        Commands::KnownEmpty {
            model,
            element,
            strategy,
        } => commands::known_empty::execute(&model, &element, strategy, &config, choice),
    }
}
