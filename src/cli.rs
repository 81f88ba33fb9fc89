use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chunkcast")]
#[command(author, version, about = "Chunked media streaming server and progressive-playback client")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chunk streaming server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory holding streamable resources (overrides config)
        #[arg(long)]
        media_dir: Option<PathBuf>,
    },

    /// Stream a resource into a local file, starting playback at the threshold
    Fetch {
        /// Resource to stream (server default when omitted)
        resource: Option<String>,

        /// Server host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory for the sink file (overrides config)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Playback threshold in bytes (overrides config)
        #[arg(long)]
        threshold: Option<u64>,

        /// Write chunks as they arrive instead of through the relay
        #[arg(long)]
        direct: bool,

        /// Command to launch when playback becomes ready
        #[arg(long)]
        player: Option<String>,
    },

    /// List the resources the server exposes
    Resources {
        /// Server host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
