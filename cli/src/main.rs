//! liskdex CLI — query the Lisk indexing service from the terminal.
//!
//! Usage:
//! ```bash
//! # Network status on testnet
//! liskdex status
//!
//! # Fee estimates on mainnet
//! liskdex fees --env main
//!
//! # Block lookup against a custom service deployment
//! liskdex block --height 1234 --service-url https://service.example
//! ```

use std::env;
use std::process;

use anyhow::Context;

use liskdex_adapter::LiskServiceRepository;
use liskdex_core::{AdapterConfig, HostSet, NetworkEnv};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        cmd @ ("status" | "stats" | "fees" | "height" | "block") => run(cmd, &args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("liskdex {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("liskdex {}", env!("CARGO_PKG_VERSION"));
    println!("Query the Lisk indexing service\n");
    println!("USAGE:");
    println!("    liskdex <COMMAND> [FLAGS]\n");
    println!("COMMANDS:");
    println!("    status     Network status");
    println!("    stats      Network statistics");
    println!("    fees       Fee estimates");
    println!("    height     Current max block height");
    println!("    block      Block lookup (--height <N>)");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("FLAGS:");
    println!("    --env <test|main>     Network to target  [default: test]");
    println!("    --service-url <URL>   Override the service URL");
}

async fn run(command: &str, args: &[String]) -> anyhow::Result<()> {
    let repo = repository(args)?;

    let value = match command {
        "status" => repo.get_network_status().await?,
        "stats" => repo.get_network_stats().await?,
        "fees" => repo.get_fees().await?,
        "height" => {
            let block = repo
                .get_last_block()
                .await?
                .context("the service returned no blocks")?;
            serde_json::json!({"id": block.id, "height": block.height})
        }
        "block" => {
            let height: u64 = parse_flag(args, "--height")
                .context("--height is required")?
                .parse()
                .context("--height must be a number")?;
            let block = repo
                .get_block_at_height(height)
                .await?
                .with_context(|| format!("no block at height {height}"))?;
            serde_json::to_value(block)?
        }
        _ => unreachable!("commands are matched in main"),
    };

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn repository(args: &[String]) -> anyhow::Result<LiskServiceRepository> {
    let env = match parse_flag(args, "--env").as_deref() {
        None | Some("test") => NetworkEnv::Test,
        Some("main") => NetworkEnv::Main,
        Some(other) => anyhow::bail!("unknown --env value: {other}"),
    };
    let mut config = AdapterConfig::defaults_for(env);
    if let Some(url) = parse_flag(args, "--service-url") {
        config.service_url = url;
    }
    Ok(LiskServiceRepository::new(HostSet::new(
        config.service_url,
        config.service_url_fallbacks,
    )))
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}
