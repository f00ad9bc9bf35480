//! nearrpc CLI — send JSON-RPC calls to a NEAR node from the terminal.
//!
//! Usage:
//! ```bash
//! # Node status
//! nearrpc status --url https://rpc.testnet.near.org
//!
//! # Send a raw JSON-RPC call
//! nearrpc call --url https://rpc.testnet.near.org --method block --params '{"finality":"final"}'
//! ```

use std::env;
use std::process;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nearrpc_core::{ClientConfig, RpcClient};
use nearrpc_http::HttpTransport;

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    init_tracing(has_flag(&args, "--json-logs"));

    let result = match args[1].as_str() {
        "status" => cmd_status(&args[2..]).await,
        "call" => cmd_call(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("nearrpc {}", env!("CARGO_PKG_VERSION"));
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

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn print_usage() {
    println!("nearrpc {}", env!("CARGO_PKG_VERSION"));
    println!("Send JSON-RPC calls to a NEAR node\n");
    println!("USAGE:");
    println!("    nearrpc <COMMAND> [FLAGS]\n");
    println!("COMMANDS:");
    println!("    status     Print node status");
    println!("    call       Send a raw JSON-RPC call");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("FLAGS:");
    println!("    --url <URL>            RPC endpoint URL  [required]");
    println!("    --method <METHOD>      JSON-RPC method   [call]");
    println!("    --params <JSON>        Params object or array (default: [])");
    println!("    --account <ID>         Account for bare transaction-hash replies");
    println!("    --max-attempts <N>     Attempts before giving up (default: 12)");
    println!("    --json-logs            Emit logs as JSON\n");
    println!("Set NEAR_NO_LOGS to silence timeout-retry warnings, RUST_LOG to tune logging.");
}

fn build_client(args: &[String]) -> Result<RpcClient> {
    let url = parse_flag(args, "--url").ok_or_else(|| anyhow!("--url is required"))?;

    let mut config = ClientConfig::default().with_env_overrides();
    if let Some(account) = parse_flag(args, "--account") {
        config = config.with_account_id(account);
    }
    if let Some(n) = parse_flag(args, "--max-attempts") {
        config.max_attempts = n
            .parse()
            .with_context(|| format!("invalid --max-attempts {n}"))?;
    }
    config.validate()?;

    let transport = HttpTransport::default_for(url)?;
    Ok(RpcClient::new(Arc::new(transport), config))
}

async fn cmd_status(args: &[String]) -> Result<()> {
    let client = build_client(args)?;

    let start = std::time::Instant::now();
    let status = client.status().await?;
    let latency = start.elapsed();

    let field = |path: &str| {
        status
            .pointer(path)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".into())
    };

    println!("  Chain:        {}", field("/chain_id"));
    println!("  Version:      {}", field("/version/version"));
    println!("  Latest block: {}", field("/sync_info/latest_block_height"));
    println!("  Syncing:      {}", field("/sync_info/syncing"));
    println!("  Latency:      {}ms", latency.as_millis());

    Ok(())
}

async fn cmd_call(args: &[String]) -> Result<()> {
    let client = build_client(args)?;
    let method = parse_flag(args, "--method").ok_or_else(|| anyhow!("--method is required"))?;
    let params: Value = match parse_flag(args, "--params") {
        Some(raw) => serde_json::from_str(&raw).context("--params must be valid JSON")?,
        None => Value::Array(vec![]),
    };

    tracing::debug!(%method, %params, "sending call");
    let result: Value = client.send_request(&method, params).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_flag_finds_value() {
        let a = args(&["--url", "http://x", "--method", "status"]);
        assert_eq!(parse_flag(&a, "--method").as_deref(), Some("status"));
        assert_eq!(parse_flag(&a, "--params"), None);
    }

    #[test]
    fn build_client_requires_url() {
        assert!(build_client(&args(&["--method", "status"])).is_err());
    }

    #[test]
    fn build_client_applies_flags() {
        let client = build_client(&args(&[
            "--url",
            "http://127.0.0.1:3030",
            "--account",
            "alice.testnet",
            "--max-attempts",
            "3",
        ]))
        .unwrap();
        assert_eq!(client.account_id(), Some("alice.testnet"));
        assert_eq!(client.backoff().max_attempts(), 3);
    }

    #[test]
    fn build_client_rejects_bad_attempts() {
        let err = build_client(&args(&["--url", "http://x", "--max-attempts", "many"]));
        assert!(err.is_err());
    }

    #[test]
    fn build_client_rejects_zero_attempts() {
        let err = build_client(&args(&["--url", "http://x", "--max-attempts", "0"])).unwrap_err();
        assert!(err.to_string().contains("max_attempts"), "{err}");
    }
}
