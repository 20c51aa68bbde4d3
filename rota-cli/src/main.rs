//! Rota CLI - command line interface for reviewer assignment
//!
//! Manages teams, opens pull requests with automatically chosen reviewers,
//! and rebalances reviews when people leave.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rota_core::Config;
use serde_json::json;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{PrArgs, Services, TeamArgs, UserArgs};

/// Rota: reviewer assignment and pull request lifecycle
#[derive(Parser, Debug)]
#[command(name = "rota")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results and errors as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to the SQLite database (overrides config and env)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage teams and their members
    #[command(visible_alias = "t")]
    Team(TeamArgs),

    /// Activate, deactivate and inspect users
    #[command(visible_alias = "u")]
    User(UserArgs),

    /// Create, merge and reassign pull requests
    Pr(PrArgs),

    /// Show review assignment counts per reviewer
    Stats,

    /// Show current configuration
    Config,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err, cli.json);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.database.clone(), cli.verbose)?;

    init_tracing(&config.logging.filter);

    tracing::info!(
        database = %config.database.path.display(),
        log_filter = %config.logging.filter,
        "Configuration loaded"
    );

    let Some(command) = &cli.command else {
        println!("Rota - reviewer assignment for pull requests");
        println!();
        println!("Use --help for usage information");
        return Ok(());
    };

    match command {
        Commands::Version => {
            println!("rota {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Config => show_config(&config, cli.json)?,
        Commands::Team(args) => {
            let services = Services::open(&config).await?;
            args.execute(&services, cli.json).await?;
        }
        Commands::User(args) => {
            let services = Services::open(&config).await?;
            args.execute(&services, cli.json).await?;
        }
        Commands::Pr(args) => {
            let services = Services::open(&config).await?;
            args.execute(&services, cli.json).await?;
        }
        Commands::Stats => {
            let services = Services::open(&config).await?;
            commands::stats::execute(&services, cli.json).await?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over the configured filter
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn show_config(config: &Config, json: bool) -> anyhow::Result<()> {
    if json {
        return commands::print_json(config);
    }

    println!("Rota Configuration");
    println!("==================");
    println!();
    println!("Database Settings:");
    println!("  path: {}", config.database.path.display());
    println!("  max_connections: {}", config.database.max_connections);
    println!();
    println!("Logging Settings:");
    println!("  filter: {}", config.logging.filter);
    println!();
    if let Some(path) = Config::default_config_path() {
        println!("Config file: {}", path.display());
        if path.exists() {
            println!("  (exists)");
        } else {
            println!("  (not found - using defaults)");
        }
    }
    Ok(())
}

/// Print a failure with its machine-readable code
fn report(err: &anyhow::Error, json: bool) {
    let (code, message) = match err.downcast_ref::<rota_core::Error>() {
        Some(e) => (e.code(), e.to_string()),
        None => ("INTERNAL_ERROR", format!("{:#}", err)),
    };

    if json {
        println!("{}", json!({ "error": { "code": code, "message": message } }));
    } else {
        eprintln!("error[{}]: {}", code, message);
    }
}
