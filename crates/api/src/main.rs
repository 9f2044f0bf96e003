//! byline API server binary.
//!
//! Usage:
//!   byline-api --config crew.toml
//!   byline-api --port 8080
//!   byline-api --port 8080 --bind 0.0.0.0
//!
//! # Environment variables
//!
//! - `BYLINE_API_KEY` - API authentication key (recommended)
//! - `BYLINE_BIND_ADDR` - Server bind address (default: 127.0.0.1)
//! - `TOGETHER_API_KEY` - Credential for the default model bindings
//! - `SERPER_API_KEY` - Credential for the planner's web search tool

use std::net::SocketAddr;
use std::sync::Arc;

use byline_agents::CrewConfig;
use byline_api::{serve, ApiKeyConfig, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,byline_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let mut port: u16 = 8080;
    let mut config_path: Option<String> = None;
    let mut bind_addr: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    port = args[i + 1]
                        .parse()
                        .map_err(|_| anyhow::anyhow!("invalid port: {}", args[i + 1]))?;
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--bind" | "-b" => {
                if i + 1 < args.len() {
                    bind_addr = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("byline API server");
                println!();
                println!("Usage: byline-api [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -p, --port <PORT>     Port to listen on (default: 8080)");
                println!("  -b, --bind <ADDR>     Bind address (default: 127.0.0.1, env: BYLINE_BIND_ADDR)");
                println!("  -c, --config <FILE>   Path to crew.toml file");
                println!("  -h, --help            Show this help message");
                println!();
                println!("Environment variables:");
                println!("  BYLINE_API_KEY        Bearer token for authentication");
                println!("  BYLINE_BIND_ADDR      Server bind address (overridden by --bind)");
                println!("  TOGETHER_API_KEY      Credential for the default model bindings");
                println!("  SERPER_API_KEY        Credential for the planner's web search");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let host = bind_addr
        .or_else(|| std::env::var("BYLINE_BIND_ADDR").ok())
        .unwrap_or_else(|| "127.0.0.1".to_string());

    if host == "0.0.0.0" {
        tracing::warn!(
            "Binding to 0.0.0.0 exposes the API on all interfaces; \
             set BYLINE_API_KEY and keep a firewall in place."
        );
    }

    let api_key = std::env::var("BYLINE_API_KEY").ok().map(ApiKeyConfig::new);
    if api_key.is_none() {
        tracing::warn!(
            "BYLINE_API_KEY not set; the API will run without authentication. \
             Fine for local development, not for production."
        );
    }

    let config = if let Some(path) = config_path {
        tracing::info!(path = %path, "Loading crew configuration");
        CrewConfig::from_file(&path)?
    } else {
        tracing::info!("Using the stock crew configuration");
        CrewConfig::default()
    };

    // Credentials and role configs are checked here, before the server
    // accepts any request.
    let state = AppState::new(&config)?;

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    serve(Arc::new(state), addr, api_key).await?;

    Ok(())
}
