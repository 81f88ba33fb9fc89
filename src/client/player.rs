//! External playback hand-off.
//!
//! Playback itself is outside this crate: a player is anything that accepts
//! a readable file path. A player failure never fails the stream that
//! triggered it.

use anyhow::{Context, Result};
use std::path::Path;

/// Sink-path consumer invoked when the playback trigger fires.
#[async_trait::async_trait]
pub trait Player: Send + Sync {
    /// Hand the sink path to the player. Called at most once per stream.
    async fn play(&self, path: &Path) -> Result<()>;
}

/// Spawns a configured command with the sink path appended as its final
/// argument, e.g. `mpv` becomes `mpv /tmp/clip-xyz.mp4`.
///
/// The child is left running detached; progressive playback happens while
/// the rest of the stream is still arriving.
pub struct CommandPlayer {
    command: String,
}

impl CommandPlayer {
    pub fn new<S: Into<String>>(command: S) -> Self {
        Self {
            command: command.into(),
        }
    }
}

#[async_trait::async_trait]
impl Player for CommandPlayer {
    async fn play(&self, path: &Path) -> Result<()> {
        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| anyhow::anyhow!("Player command is empty"))?;

        let child = tokio::process::Command::new(program)
            .args(parts)
            .arg(path)
            .spawn()
            .with_context(|| format!("Failed to launch player: {}", self.command))?;

        tracing::info!(
            player = %self.command,
            pid = child.id(),
            sink = %path.display(),
            "Launched player"
        );
        Ok(())
    }
}

/// Fallback when no player command is configured: the ready event is only
/// logged.
pub struct LogPlayer;

#[async_trait::async_trait]
impl Player for LogPlayer {
    async fn play(&self, path: &Path) -> Result<()> {
        tracing::info!(sink = %path.display(), "Playback ready");
        Ok(())
    }
}
