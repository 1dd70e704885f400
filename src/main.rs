//! mplx command line
//!
//! Read NFTs, auction houses and candy machines, and update candy machines,
//! against the configured cluster.

#![deny(unused_imports)]
#![deny(unused_mut)]
#![deny(unused_variables)]
#![warn(unused_must_use)]

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use mplx::config::Config;
use mplx::metrics::metrics;
use mplx::plugins::candy_machine_module::{CandyMachineUpdate, UpdateCandyMachineInput};
use mplx::plugins::nft_module::FindNftByMintInput;
use mplx::structured_logging::init_logging;
use mplx::Mplx;
use solana_sdk::pubkey::Pubkey;
use std::path::Path;
use tracing::{info, warn};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Override the RPC endpoint
    #[arg(long, env = "MPLX_RPC_URL")]
    rpc_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load an NFT by its mint address
    FindNft {
        mint: Pubkey,
        /// Skip fetching the off-chain JSON
        #[arg(long)]
        no_json: bool,
    },
    /// Load an auction house by address
    FindAuctionHouse { address: Pubkey },
    /// Load a candy machine by address
    FindCandyMachine { address: Pubkey },
    /// Update a candy machine; only changed fields are sent
    UpdateCandyMachine {
        address: Pubkey,
        /// Price in lamports
        #[arg(long)]
        price: Option<u64>,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        seller_fee_basis_points: Option<u16>,
        #[arg(long)]
        items_available: Option<u64>,
        /// RFC 3339 go-live date
        #[arg(long, conflicts_with = "clear_go_live")]
        go_live: Option<DateTime<Utc>>,
        /// Remove the go-live date
        #[arg(long)]
        clear_go_live: bool,
        #[arg(long)]
        new_authority: Option<Pubkey>,
    },
    /// Print Prometheus metrics
    Metrics,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (mut config, found) = load_config(&args.config)?;
    if let Some(url) = &args.rpc_url {
        config.rpc.url = url.clone();
        config.validate()?;
    }

    init_logging(args.verbose, args.json_logs || config.monitoring.json_logs);
    info!(version = env!("CARGO_PKG_VERSION"), endpoint = %config.rpc.url, "Starting mplx");
    if !found {
        warn!("Config file {} not found, using defaults", args.config);
    }

    let mx = Mplx::from_config(&config).context("Failed to build context")?;
    let print_metrics =
        matches!(args.command, Command::Metrics) || config.monitoring.print_metrics;

    match args.command {
        Command::FindNft { mint, no_json } => {
            let mut input = FindNftByMintInput::new(mint);
            if no_json {
                input = input.without_json();
            }
            let nft = mx.nfts().find_by_mint_with(input).await?;
            println!("{:#?}", nft);
        }
        Command::FindAuctionHouse { address } => {
            let auction_house = mx.auction_houses().find_by_address(address).await?;
            println!("{:#?}", auction_house);
        }
        Command::FindCandyMachine { address } => {
            let candy_machine = mx.candy_machines().find_by_address(address).await?;
            println!("{:#?}", candy_machine);
        }
        Command::UpdateCandyMachine {
            address,
            price,
            symbol,
            seller_fee_basis_points,
            items_available,
            go_live,
            clear_go_live,
            new_authority,
        } => {
            let candy_machine = mx.candy_machines().find_by_address(address).await?;
            let go_live_date = if clear_go_live { Some(None) } else { go_live.map(Some) };

            let mut input = UpdateCandyMachineInput::new(candy_machine).with_update(
                CandyMachineUpdate {
                    price,
                    symbol,
                    seller_fee_basis_points,
                    items_available,
                    go_live_date,
                    ..Default::default()
                },
            );
            if let Some(new_authority) = new_authority {
                input = input.with_new_authority(new_authority);
            }

            let output = mx.candy_machines().update(input).await?;
            println!("{:#?}", output.response);
        }
        Command::Metrics => {}
    }

    if print_metrics {
        print!("{}", metrics().gather_text());
    }

    Ok(())
}

/// Load configuration, falling back to defaults when the file is absent
///
/// Runs before logging is set up; the flag tells the caller whether the file was found.
fn load_config(path: &str) -> Result<(Config, bool)> {
    if Path::new(path).exists() {
        let config =
            Config::load(Some(path)).with_context(|| format!("Failed to load {}", path))?;
        Ok((config, true))
    } else {
        Ok((Config::load(None)?, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let (config, found) = load_config(missing.to_str().unwrap()).unwrap();
        assert!(!found);
        assert_eq!(config.confirm.poll_interval_ms, 500);

        let path = dir.path().join("mplx.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[confirm]\ntimeout_secs = 15").unwrap();
        let (config, found) = load_config(path.to_str().unwrap()).unwrap();
        assert!(found);
        assert_eq!(config.confirm.timeout_secs, 15);
    }
}
