use anyhow::Result;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use std::path::{Path, PathBuf};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

mod bootstrap;
mod shutdown;
mod web;

/// Tradepost Server - campus swap and messaging service
#[derive(Parser)]
#[command(name = "tradepost-server")]
#[command(about = "Tradepost Server - campus swap and messaging service")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port, overriding the config file
    #[arg(short, long)]
    port: Option<u16>,

    /// Dump the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Raise console log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use the fixture backend regardless of the configured catalog mode
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

impl Cli {
    fn as_config_args(&self) -> CliArgs {
        CliArgs {
            config: self
                .config
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            port: self.port,
            print_config: self.print_config,
            verbose: self.verbose,
            mock: self.mock,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let args = cli.as_config_args();

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Tradepost Server starting");
    println!("Effective server settings:\n{:#?}", config.server);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => bootstrap::run_server(config, args).await,
        Commands::Check => bootstrap::check_config(config, args).await,
    }
}
