use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod init;
pub mod validate;
pub mod version;

#[derive(Parser)]
#[command(name = "dao-gov")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Operator CLI for DAO governance deployments", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default deployment config
    Init {
        /// Path to config file (default: ~/.local/share/dao-gov/config.toml)
        #[arg(long)]
        config: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Load a config, instantiate the engine from it and print a summary
    Validate {
        /// Path to config file (default: ~/.local/share/dao-gov/config.toml)
        #[arg(long)]
        config: Option<String>,

        /// Override the configured maximum voting period ("7d", "100 blocks")
        #[arg(long)]
        max_voting_period: Option<String>,
    },

    /// Display version information
    Version,
}

pub async fn execute(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Init { config, force } => init::execute(config, force),
        Commands::Validate {
            config,
            max_voting_period,
        } => validate::execute(config, max_voting_period).await,
        Commands::Version => {
            version::execute();
            Ok(())
        }
    }
}

/// Install the stderr subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // a subscriber may already be installed (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
