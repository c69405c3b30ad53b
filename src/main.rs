use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use smb_opener::config::OpenerConfig;
use smb_opener::error::Result;
use smb_opener::service::{client, Listener};
use smb_opener::utils::logging::init_logging;
use smb_opener::utils::time::SystemClock;

/// Mount smb:// shares on demand and open the requested path
#[derive(Parser, Debug)]
#[command(name = "smb-opener", version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Address to listen on or send to (overrides the config)
    #[arg(long, global = true)]
    address: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the listener (default)
    Serve,
    /// Send one locator to a running listener
    Send {
        /// e.g. smb://server1/docs/report.pdf
        locator: String,
    },
}

fn load_config(cli: &Cli) -> Result<OpenerConfig> {
    let mut config = match &cli.config {
        Some(path) => OpenerConfig::from_file(path)?,
        None => OpenerConfig::default(),
    };
    config.apply_env()?;
    if let Some(address) = &cli.address {
        config.listener.address = address.clone();
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let clock = Arc::new(SystemClock);
    let _guard = init_logging(&config.logging, clock.clone());

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let listener = Listener::from_config(&config, clock).await?;
            listener.run().await
        }
        Command::Send { locator } => {
            client::send_locator(
                &config.listener.address,
                &locator,
                config.listener.max_line_bytes,
            )
            .await
        }
    }
}
