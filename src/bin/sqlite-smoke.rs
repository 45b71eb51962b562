use clap::{Parser, Subcommand};
use sqlite_smoke::*;
use tracing::Level;

mod commands;

use commands::check::CheckArgs;
use commands::resolve::ResolveArgs;
use commands::run::RunArgs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.sqlite-smoke/sqlite-smoke.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long, global = true)]
    debug: bool,

    /// Output format: plain, table, markdown, json, json-pretty, psv
    #[clap(short, long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load an extension into an in-memory database and run its version query.
    Run(RunArgs),

    /// Run the gate, unloaded-function and load checks against an extension.
    Check(CheckArgs),

    /// Print the path of the loadable artifact for this platform.
    Resolve(ResolveArgs),

    /// Show the effective configuration.
    Config,
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = match SmokeConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(&config, args, cli.format),
        Commands::Check(args) => commands::check::run(&config, args, cli.format),
        Commands::Resolve(args) => commands::resolve::run(&config, args, cli.format),
        Commands::Config => commands::config::run(&config, &cli.config, cli.format),
    };

    if let Err(e) = result {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}
