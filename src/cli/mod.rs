//! CLI module: command parsing and dispatch
//!
//! All CLI logic lives here. `main.rs` calls `cli::run()`.

pub mod config;
pub mod describe;
pub mod run;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "waba-node")]
#[command(version)]
#[command(about = "Send messages and manage templates via WABA API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute the node over a batch file
    Run {
        /// Input file: JSON array of records ({"json": ..., "parameters": ...})
        #[arg(long)]
        input: PathBuf,
        /// JSON object of parameters applied to records that do not set them
        #[arg(long)]
        params: Option<PathBuf>,
        /// Optional output file (prints to stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Record item failures as error records instead of aborting
        #[arg(long)]
        continue_on_fail: bool,
    },
    /// Print the node description
    Describe {
        /// Print the credential descriptor instead
        #[arg(long)]
        credentials: bool,
    },
    /// Validate configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Check configuration for errors and warnings
    Check,
}

/// Entry point for the CLI, called from main().
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Logging follows the config file; a broken file falls back to defaults
    // here and is reported by the command that needs it.
    let logging_cfg = waba_node::config::Config::load()
        .map(|c| c.logging)
        .unwrap_or_default();
    waba_node::utils::logging::init_logging(&logging_cfg)?;

    match cli.command {
        None => {
            let mut cmd = Cli::command();
            cmd.print_help()?;
            println!();
        }
        Some(Commands::Version) => {
            cmd_version();
        }
        Some(Commands::Run {
            input,
            params,
            output,
            continue_on_fail,
        }) => {
            run::cmd_run(input, params, output, continue_on_fail).await?;
        }
        Some(Commands::Describe { credentials }) => {
            describe::cmd_describe(credentials)?;
        }
        Some(Commands::Config { action }) => {
            config::cmd_config(action).await?;
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("waba-node {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("WABA gateway node: template messages, free-form replies, approved templates");
}
