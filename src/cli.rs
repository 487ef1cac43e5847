use crate::config::{CliOverrides, load_config};
use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "finbot")]
#[command(about = "finbot - finance chat assistant behind a webhook")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Enable verbose logging (DEBUG level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a JSON configuration file (default: ~/.finbot/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the webhook server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
        /// Completion model to use
        #[arg(long)]
        model: Option<String>,
    },
    /// Chat with the assistant from the terminal
    Chat {
        /// User name the conversation is kept under
        #[arg(long, default_value = "console")]
        user: String,
        /// Completion model to use
        #[arg(long)]
        model: Option<String>,
    },
    /// Display version information
    Version,
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Version) => {
            print_version();
            Ok(())
        }
        Some(Commands::Serve { host, port, model }) => {
            let overrides = CliOverrides { host, port, model };
            let config = load_config(&overrides, cli.config)?;
            runtime()?.block_on(crate::gateway::run_server(&config))
        }
        Some(Commands::Chat { user, model }) => {
            let overrides = CliOverrides {
                model,
                ..CliOverrides::default()
            };
            let config = load_config(&overrides, cli.config)?;
            runtime()?.block_on(crate::console::run_console(&config, &user))
        }
        None => {
            Cli::command()
                .print_help()
                .context("Failed to print help")?;
            println!();
            Ok(())
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

fn print_version() {
    println!("finbot {}", env!("CARGO_PKG_VERSION"));
}
