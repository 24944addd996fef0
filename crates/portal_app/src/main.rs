mod platform;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use portal_engine::{write_keypair_file, Keypair};

use platform::config::{self, PortalConfig, DEFAULT_CONFIG_FILE};
use platform::logging::{self, LogDestination};

#[derive(Parser)]
#[command(author, version, about = "Share GIF links through an on-chain list", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive portal (default)
    Run {
        /// Path to the configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// Where log output goes
        #[arg(long, value_enum, default_value_t = LogDestination::File)]
        log: LogDestination,
    },
    /// Write a default configuration file
    GenerateConfig {
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Generate a new keypair file (list account or wallet)
    Keygen {
        #[arg(short, long, default_value = "keypair.json")]
        path: PathBuf,
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run {
        config: PathBuf::from(DEFAULT_CONFIG_FILE),
        log: LogDestination::File,
    }) {
        Commands::Run { config, log } => run(&config, log),
        Commands::GenerateConfig { path, force } => {
            let written = config::save_config(&path, &PortalConfig::default(), force)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote default configuration to {}", written.display());
            Ok(())
        }
        Commands::Keygen { path, force } => {
            let keypair = Keypair::generate();
            let written = write_keypair_file(&path, &keypair, force)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote keypair to {}", written.display());
            println!("Address: {}", keypair.address());
            Ok(())
        }
    }
}

fn run(config_path: &Path, log: LogDestination) -> Result<()> {
    logging::initialize(log);
    let config = config::load_config(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let session = config::build_session(&config).context("preparing the portal")?;
    platform::run_app(session).context("terminal i/o failed")?;
    Ok(())
}
