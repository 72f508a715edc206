//! Main entry point for the `TaskFlow` command-line client.

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use colored::Colorize;
use dotenv::dotenv;
use shared::config::ClientConfig;

mod commands;
mod logging;
mod terminal;

use commands::{
    auth::{LoginArgs, RegisterArgs},
    categories::CategoryCommand,
    profile::ProfileCommand,
    tasks::TaskCommand,
};

/// `TaskFlow` CLI
#[derive(Parser, Debug)]
#[command(name = "taskflow")]
#[command(about = "Command-line client for the TaskFlow task manager", long_about = None)]
pub struct Cli {
    /// Path to the configuration file (optional)
    #[arg(
        long,
        short,
        global = true,
        help = "Path to the configuration file (e.g., taskflow.yaml, taskflow.json or taskflow.toml)."
    )]
    config: Option<PathBuf>,

    /// API base URL override
    #[arg(
        long,
        global = true,
        help = "Base URL of the TaskFlow API (e.g., http://localhost:5000/api). Overrides the config file and TASKFLOW_API_URL."
    )]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for the `TaskFlow` CLI
#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and store the session token
    Login(LoginArgs),

    /// Create an account and log into it
    Register(RegisterArgs),

    /// Remove the stored session token
    Logout,

    /// Show the logged in user
    Whoami,

    /// Show task statistics with recent and upcoming tasks
    Dashboard {
        /// Print the raw dashboard data as JSON
        #[arg(long)]
        json: bool,
    },

    /// List and manage tasks
    #[command(subcommand)]
    Tasks(TaskCommand),

    /// List and manage categories
    #[command(subcommand)]
    Categories(CategoryCommand),

    /// Show or update the account profile
    #[command(subcommand)]
    Profile(ProfileCommand),

    /// Generate a configuration file
    Config {
        /// Format of the configuration file to generate (yaml or json). Defaults to yaml.
        #[arg(
            long,
            short,
            help = "Format of the configuration file to generate (yaml or json). Defaults to yaml."
        )]
        format: Option<String>,
    },

    /// Generate shell completion scripts for the CLI
    Completion {
        /// The shell type for which to generate the completion script (e.g., bash, zsh, fish, powershell)
        #[arg(
            long,
            short,
            help = "The shell type for which to generate the completion script (e.g., bash, zsh, fish, powershell)"
        )]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

/// Runs one command. `Ok(false)` means the failure was already reported.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    match &cli.command {
        Commands::Completion { shell } => {
            commands::completion::generate_completion(*shell);
            return Ok(true);
        }
        Commands::Config { format } => {
            commands::config::generate_config(format.as_deref().unwrap_or("yaml"))?;
            return Ok(true);
        }
        _ => {}
    }

    let config = ClientConfig::load_config(cli.config, cli.api_url)?;
    logging::initialize_tracing(&config);

    match cli.command {
        Commands::Login(args) => commands::auth::login(&config, args).await,
        Commands::Register(args) => commands::auth::register(&config, args).await,
        Commands::Logout => commands::auth::logout(&config).await,
        Commands::Whoami => commands::auth::whoami(&config).await,
        Commands::Dashboard { json } => commands::dashboard::show(&config, json).await,
        Commands::Tasks(command) => commands::tasks::run(&config, command).await,
        Commands::Categories(command) => commands::categories::run(&config, command).await,
        Commands::Profile(command) => commands::profile::run(&config, command).await,
        Commands::Config { .. } | Commands::Completion { .. } => Ok(true),
    }
}
