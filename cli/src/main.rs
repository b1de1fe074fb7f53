//! # idlgen-cli
//!
//! Command-line front end generating TypeScript clients, mock data and enum
//! tables from parsed Thrift/Protobuf IDL files.
//!
//! ## Commands
//!
//! - `idlgen gen [api]` - Generate every API (or one) listed in idlgen.toml
//! - `idlgen search <query>` - Find declarations in the configured AST files
//! - `idlgen config validate` - Check the configuration file
//!
//! See `idlgen --help` for the full command reference.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;
use std::process;

mod commands;
mod config;
mod telemetry;
mod ui;

#[derive(Parser)]
#[command(name = "idlgen")]
#[command(about = "idlgen - Generate TypeScript clients from IDL definitions", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to idlgen.toml configuration file
    #[arg(short, long, global = true, default_value = "idlgen.toml")]
    config: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    /// Enable verbose output
    #[arg(long, global = true)]
    verbose: bool,

    /// Generate shell completions
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate clients for every configured API, or only the named one
    Gen {
        /// Name of the API to generate (generates all if not specified)
        api: Option<String>,

        /// Run the whole pipeline without writing any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Search declarations by name across the configured AST files
    Search {
        /// Name or part of a name
        query: String,

        /// Only search this API
        #[arg(long)]
        api: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Validate the configuration file
    Validate,
}

fn main() {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "idlgen", &mut io::stdout());
        return;
    }

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    telemetry::init(telemetry::TelemetryConfig {
        json_logs: cli.json_logs,
        verbose: cli.verbose,
    })?;

    match command {
        Commands::Gen { api, dry_run } => commands::gen::generate(&cli.config, api.as_deref(), dry_run),
        Commands::Search { query, api, json } => {
            commands::search::search(&cli.config, &query, api.as_deref(), json)
        }
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Validate => commands::config::validate(&cli.config),
        },
    }
}
