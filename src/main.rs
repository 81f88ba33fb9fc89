mod cli;

use chunkcast::client::{FetchClient, FetchStatus};
use chunkcast::{config, server};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "chunkcast=trace,tower_http=debug".to_string()
        } else {
            "chunkcast=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve {
            host,
            port,
            media_dir,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve(host, port, media_dir, cli.config.as_deref()))
        }
        Commands::Fetch {
            resource,
            host,
            port,
            output_dir,
            threshold,
            direct,
            player,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(fetch(
                resource,
                host,
                port,
                output_dir,
                threshold,
                direct,
                player,
                cli.config.as_deref(),
            ))
        }
        Commands::Resources { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(list_resources(host, port, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("chunkcast {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn serve(
    host: Option<String>,
    port: Option<u16>,
    media_dir: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override from CLI if specified
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(media_dir) = media_dir {
        config.server.media_dir = media_dir;
    }

    tracing::info!("Starting chunkcast server");
    tracing::info!(
        "Serving {:?} on {}:{} ({} byte chunks)",
        config.server.media_dir,
        config.server.host,
        config.server.port,
        config.server.chunk_size
    );

    server::start_server(config).await
}

#[allow(clippy::too_many_arguments)]
async fn fetch(
    resource: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    output_dir: Option<PathBuf>,
    threshold: Option<u64>,
    direct: bool,
    player: Option<String>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    if let Some(host) = host {
        config.client.host = host;
    }
    if let Some(port) = port {
        config.client.port = port;
    }
    if let Some(output_dir) = output_dir {
        config.client.download_dir = Some(output_dir);
    }
    if let Some(threshold) = threshold {
        config.client.threshold_bytes = threshold;
    }
    if direct {
        config.client.use_relay = false;
    }
    if player.is_some() {
        config.client.player_command = player;
    }

    let client = FetchClient::new(config.client);

    let outcome = tokio::select! {
        res = client.fetch(resource.as_deref()) => res?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Fetch cancelled");
            anyhow::bail!("Fetch cancelled; partial sink retained");
        }
    };

    match outcome.status {
        FetchStatus::Completed => {
            println!(
                "Saved {} bytes to {} in {:.1}s",
                outcome.bytes_received,
                outcome.sink_path.display(),
                outcome.elapsed.as_secs_f64()
            );
            if let Some(at) = outcome.ready {
                println!("Playback signalled at {} bytes", at);
            }
            Ok(())
        }
        FetchStatus::Failed(e) => {
            println!(
                "Stream failed after {} bytes: {}",
                outcome.bytes_received, e
            );
            println!("Partial data retained at {}", outcome.sink_path.display());
            anyhow::bail!("Stream did not complete")
        }
    }
}

async fn list_resources(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    if let Some(host) = host {
        config.client.host = host;
    }
    if let Some(port) = port {
        config.client.port = port;
    }

    let client = FetchClient::new(config.client);
    let entries = client.list_resources().await?;

    if entries.is_empty() {
        println!("No resources available");
        return Ok(());
    }

    println!("{} resources:", entries.len());
    for entry in entries {
        println!("  {}  {} bytes", entry.name, entry.size_bytes);
    }
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Media dir: {:?}", config.server.media_dir);
            println!("  Default resource: {}", config.server.default_resource);
            println!("  Chunk size: {} bytes", config.server.chunk_size);
            println!(
                "  Client target: {}:{}",
                config.client.host, config.client.port
            );
            println!("  Playback threshold: {} bytes", config.client.threshold_bytes);
            if config.client.use_relay {
                println!("  Relay: {} segments", config.client.relay_capacity);
            } else {
                println!("  Relay: disabled (direct writes)");
            }
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Chunk size: {} bytes", config.server.chunk_size);
        }
    }

    Ok(())
}
