mod auth;
mod config;
mod error;
mod events;
mod inference;
mod logging;
mod metrics;
mod routes;
mod server;
mod startup;
mod state;
mod storage;
mod utils;
#[cfg(test)]
mod testkit;

use std::sync::Arc;
use clap::Parser;
use tracing::info;

use config::GatewayConfig;
use inference::EndpointRef;
use startup::StartupValidator;
use state::AppState;

#[derive(Parser)]
#[command(name = "tenun-gateway")]
#[command(about = "Image upload and prediction gateway")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(long, env = "GATEWAY_CONFIG", help = "Config file path")]
    config: Option<String>,

    #[arg(long, help = "Listen host (overrides config)")]
    host: Option<String>,

    #[arg(long, help = "Listen port (overrides PORT and config)")]
    port: Option<u16>,

    #[arg(long, help = "Output as JSON")]
    json: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Serve the HTTP API (default)
    Serve,
    /// Show the resolved configuration
    Status,
    /// Write the default configuration file
    GenerateConfig {
        #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, help = "Config file path")]
        output: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::GenerateConfig { output }) = &cli.command {
        GatewayConfig::default().save(output)?;
        if cli.json {
            println!("{}", serde_json::json!({"written": output}));
        } else {
            println!("✅ Wrote default configuration to {}", output);
        }
        return Ok(());
    }

    let mut config = GatewayConfig::load(cli.config.as_deref())?;
    config.apply_env()?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command {
        Some(Commands::Status) => {
            print_status(&config, cli.json)?;
            Ok(())
        }
        Some(Commands::Serve) | None => serve(config).await,
        Some(Commands::GenerateConfig { .. }) => Ok(()),
    }
}

async fn serve(config: GatewayConfig) -> anyhow::Result<()> {
    logging::init(&config.logging);
    info!("tenun-gateway v{}", env!("CARGO_PKG_VERSION"));

    StartupValidator::new(&config).validate_and_start()?;

    let addr = config.listen_address();
    let state = Arc::new(AppState::from_config(config)?);
    info!(
        "Backends: store={} events={} inference={}",
        state.store.name(),
        state.publisher.name(),
        state.inference.name()
    );

    server::run_on(&addr, state).await
}

fn print_status(config: &GatewayConfig, json: bool) -> anyhow::Result<()> {
    let endpoint = EndpointRef::from_config(&config.inference);
    let problem = config.validate().err().map(|e| e.to_string());

    if json {
        let status = serde_json::json!({
            "status": if problem.is_none() { "ready" } else { "invalid" },
            "problem": problem,
            "listen_address": config.listen_address(),
            "bucket": config.storage.bucket,
            "topic": config.events.topic,
            "endpoint": endpoint.to_string(),
            "storage_backend": config.storage.backend,
            "events_backend": config.events.backend,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("📊 Gateway Status");
    println!("=================");
    match &problem {
        None => println!("✅ Status: Ready"),
        Some(problem) => println!("❌ Status: Invalid configuration ({})", problem),
    }
    println!("   Listen address: {}", config.listen_address());
    println!("   Bucket:         {} ({:?})", config.storage.bucket, config.storage.backend);
    println!("   Topic:          {} ({:?})", config.events.topic, config.events.backend);
    println!("   Endpoint:       {}", endpoint);
    Ok(())
}
