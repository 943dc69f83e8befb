//! chainavatar CLI — resolve names and avatars from the terminal.
//!
//! Usage:
//! ```bash
//! # Resolve an avatar (name or address)
//! chainavatar resolve --url https://cloudflare-eth.com alice.eth
//!
//! # Forward lookup: name -> address
//! chainavatar lookup --url https://cloudflare-eth.com alice.eth
//!
//! # Reverse lookup: address -> primary name
//! chainavatar reverse --url https://cloudflare-eth.com 0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045
//! ```

use std::env;
use std::process;
use std::sync::Arc;

use alloy_primitives::Address;

use chainavatar_http::HttpRpcClient;
use chainavatar_resolve::{AvatarResolver, EngineConfig};

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
        "resolve" => cmd_resolve(&args[2..]).await,
        "lookup" => cmd_lookup(&args[2..]).await,
        "reverse" => cmd_reverse(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("chainavatar {}", env!("CARGO_PKG_VERSION"));
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
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("chainavatar {}", env!("CARGO_PKG_VERSION"));
    println!("Resolve names and NFT avatars against an ENS-style registry\n");
    println!("USAGE:");
    println!("    chainavatar <COMMAND> [FLAGS] <IDENTIFIER>\n");
    println!("COMMANDS:");
    println!("    resolve    Resolve the avatar for a name or address");
    println!("    lookup     Forward lookup: name -> address");
    println!("    reverse    Reverse lookup: address -> primary name");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("FLAGS:");
    println!("    --url <URL>        JSON-RPC endpoint  [required]");
    println!("    --gateway <URL>    IPFS gateway base  [default: gateway.ipfs.io]");
    println!("    --json             Print the full descriptor as JSON (resolve only)");
}

fn build_resolver(args: &[String]) -> Result<AvatarResolver, String> {
    let url = parse_flag(args, "--url").ok_or("--url is required")?;
    let mut config = EngineConfig::default();
    if let Some(gateway) = parse_flag(args, "--gateway") {
        config.ipfs_gateway = gateway;
    }

    let transport = Arc::new(HttpRpcClient::default_for(url));
    Ok(AvatarResolver::new(transport, config))
}

// Flags that consume the following argument as their value.
const VALUE_FLAGS: &[&str] = &["--url", "--gateway"];

fn identifier(args: &[String]) -> Result<String, String> {
    let mut id = None;
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if VALUE_FLAGS.contains(&arg.as_str()) {
            i += 2;
            continue;
        }
        if arg.starts_with("--") {
            i += 1;
            continue;
        }
        id = Some(arg.clone());
        i += 1;
    }
    id.ok_or_else(|| "missing identifier argument".to_string())
}

async fn cmd_resolve(args: &[String]) -> Result<(), String> {
    let resolver = build_resolver(args)?;
    let id = identifier(args)?;

    match resolver.resolve_avatar(&id).await.map_err(|e| e.to_string())? {
        Some(avatar) => {
            if args.iter().any(|a| a == "--json") {
                let json = serde_json::to_string_pretty(&avatar).map_err(|e| e.to_string())?;
                println!("{json}");
            } else {
                println!("Scheme: {}", avatar.scheme);
                println!("URL:    {}", avatar.url);
                if let Some(nft) = &avatar.nft {
                    match nft.owned {
                        Some(owned) => println!("Owned:  {owned}"),
                        None => println!("Owned:  unknown"),
                    }
                }
                println!("Steps:");
                for step in &avatar.linkage {
                    println!("  {:22} {}", step.kind, step.content);
                }
            }
            Ok(())
        }
        None => {
            println!("No avatar set for {id}");
            Ok(())
        }
    }
}

async fn cmd_lookup(args: &[String]) -> Result<(), String> {
    let resolver = build_resolver(args)?;
    let name = identifier(args)?;

    match resolver.forward_lookup(&name).await.map_err(|e| e.to_string())? {
        Some(address) => println!("{address}"),
        None => println!("No address record for {name}"),
    }
    Ok(())
}

async fn cmd_reverse(args: &[String]) -> Result<(), String> {
    let resolver = build_resolver(args)?;
    let raw = identifier(args)?;
    let address: Address = raw
        .parse()
        .map_err(|_| format!("not a valid address: {raw}"))?;

    match resolver.reverse_lookup(address).await.map_err(|e| e.to_string())? {
        Some(name) => println!("{name}"),
        None => println!("No primary name for {address}"),
    }
    Ok(())
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}
