//! Streaming fetch client.
//!
//! One [`FetchClient::fetch`] call drives the whole consumer pipeline:
//! request the chunk stream, append arriving payloads to a sink file
//! (directly, or through the bounded relay when receive and write run as
//! separate tasks), observe the playback trigger, and hand the sink path to
//! the configured player when the threshold is crossed.

pub mod consumer;
pub mod player;
pub mod relay;
pub mod trigger;

pub use consumer::SinkWriter;
pub use player::{CommandPlayer, LogPlayer, Player};
pub use relay::{RelayReceiver, RelaySender, Segment};
pub use trigger::{PlaybackTrigger, ReadyListener};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::ClientConfig;
use crate::error::{Result, StreamError};
use crate::server::ResourceEntry;

/// Connection timeout for the initial request. The body itself has no
/// deadline; long transfers are the normal case.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Terminal state of one fetch call.
#[derive(Debug)]
pub enum FetchStatus {
    /// Every source byte reached the sink.
    Completed,
    /// The stream ended early; the sink retains the prefix that arrived.
    Failed(StreamError),
}

/// Summary of one fetch call.
#[derive(Debug)]
pub struct FetchOutcome {
    pub status: FetchStatus,
    /// Bytes durably appended to the sink.
    pub bytes_received: u64,
    /// Sink file, retained on every terminal status.
    pub sink_path: PathBuf,
    /// Cumulative byte count when the playback signal fired, if it did.
    pub ready: Option<u64>,
    pub elapsed: Duration,
}

impl FetchOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self.status, FetchStatus::Completed)
    }
}

/// Client for the chunk stream endpoint.
pub struct FetchClient {
    http: reqwest::Client,
    base_url: String,
    config: ClientConfig,
}

impl FetchClient {
    pub fn new(config: ClientConfig) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                reqwest::Client::new()
            });

        let base_url = format!("http://{}:{}", config.host, config.port);

        Self {
            http,
            base_url,
            config,
        }
    }

    /// Stream a resource into a freshly created sink file.
    ///
    /// `None` asks the server for its configured default resource.
    ///
    /// Failures before any stream exists (absent resource, unreachable
    /// server) return `Err`. Once streaming has begun, the call resolves to
    /// a [`FetchOutcome`] whose status records how it ended; on failure the
    /// sink keeps the prefix that arrived.
    pub async fn fetch(&self, resource: Option<&str>) -> Result<FetchOutcome> {
        let started = Instant::now();

        let url = match resource {
            Some(name) => format!("{}/api/stream/{}", self.base_url, name),
            None => format!("{}/api/stream", self.base_url),
        };
        tracing::info!(url = %url, "Requesting chunk stream");

        let resp = self.http.get(&url).send().await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StreamError::not_found(resource.unwrap_or("<default>")));
        }
        if !resp.status().is_success() {
            return Err(StreamError::transport(format!(
                "Server returned {}",
                resp.status()
            )));
        }

        let expected = resp.content_length();
        let sink_path = self.create_sink_path(resource)?;
        tracing::info!(
            sink = %sink_path.display(),
            expected = expected.unwrap_or(0),
            "Writing stream to sink"
        );

        let (trigger, listener) =
            PlaybackTrigger::new(self.config.threshold_bytes, self.config.fire_on_complete);
        let watcher = spawn_ready_watcher(listener, self.make_player(), sink_path.clone());

        let stream = Box::pin(resp.bytes_stream());
        let (bytes_received, status) = if self.config.use_relay {
            self.run_relayed(stream, &sink_path, trigger.clone(), expected)
                .await
        } else {
            run_direct(stream, &sink_path, trigger.clone(), expected).await
        };

        // The last trigger handle drops here; an unfired listener resolves
        // to NeverReady and the watcher winds down.
        drop(trigger);
        let ready = watcher.await.ok().flatten();
        let elapsed = started.elapsed();

        match &status {
            FetchStatus::Completed => {
                tracing::info!(bytes = bytes_received, elapsed_ms = elapsed.as_millis() as u64, "Fetch complete");
            }
            FetchStatus::Failed(e) => {
                tracing::warn!(
                    bytes = bytes_received,
                    sink = %sink_path.display(),
                    "Fetch failed, partial sink retained: {}",
                    e
                );
            }
        }

        Ok(FetchOutcome {
            status,
            bytes_received,
            sink_path,
            ready,
            elapsed,
        })
    }

    /// Fetch the server's resource catalog.
    pub async fn list_resources(&self) -> Result<Vec<ResourceEntry>> {
        let url = format!("{}/api/resources", self.base_url);
        let resp = self.http.get(&url).send().await?;

        if !resp.status().is_success() {
            return Err(StreamError::transport(format!(
                "Server returned {}",
                resp.status()
            )));
        }

        Ok(resp.json().await?)
    }

    /// Receive and persist on separate tasks, joined by the bounded relay.
    async fn run_relayed(
        &self,
        mut stream: impl Stream<Item = reqwest::Result<Bytes>> + Unpin,
        sink_path: &Path,
        trigger: Arc<PlaybackTrigger>,
        expected: Option<u64>,
    ) -> (u64, FetchStatus) {
        let (tx, rx) = relay::relay(self.config.relay_capacity);
        let writer = tokio::spawn(write_segments(rx, sink_path.to_path_buf(), trigger));

        let mut received: u64 = 0;
        loop {
            match stream.next().await {
                Some(Ok(data)) => {
                    received += data.len() as u64;
                    if tx.append(data).await.is_err() {
                        // Writer is gone; its join result carries the cause.
                        break;
                    }
                }
                Some(Err(e)) => {
                    tx.fail(StreamError::from(e)).await;
                    break;
                }
                None => {
                    match expected {
                        Some(expected) if expected != received => {
                            tx.fail(truncated(received, expected)).await;
                        }
                        _ => tx.finish().await,
                    }
                    break;
                }
            }
        }

        // Closing the response body is what cancels the call upstream.
        drop(stream);

        match writer.await {
            Ok(result) => result,
            Err(e) => (
                0,
                FetchStatus::Failed(StreamError::transport(format!("Writer task failed: {e}"))),
            ),
        }
    }

    fn make_player(&self) -> Box<dyn Player> {
        match &self.config.player_command {
            Some(cmd) => Box::new(CommandPlayer::new(cmd.clone())),
            None => Box::new(LogPlayer),
        }
    }

    /// Create a uniquely named sink file that outlives the call.
    ///
    /// The file is deliberately not auto-deleting: partial data from a
    /// failed stream stays inspectable at the returned path.
    fn create_sink_path(&self, resource: Option<&str>) -> Result<PathBuf> {
        let dir = match &self.config.download_dir {
            Some(d) => d.clone(),
            None => std::env::temp_dir(),
        };

        let (stem, ext) = match resource {
            Some(name) => {
                let p = Path::new(name);
                (
                    p.file_stem().and_then(|s| s.to_str()).unwrap_or("video"),
                    p.extension().and_then(|s| s.to_str()).unwrap_or("mp4"),
                )
            }
            None => ("video", "mp4"),
        };

        let (_file, path) = tempfile::Builder::new()
            .prefix(&format!("{stem}-"))
            .suffix(&format!(".{ext}"))
            .tempfile_in(&dir)
            .map_err(|e| StreamError::write(0, e))?
            .keep()
            .map_err(|e| StreamError::write(0, e.error))?;

        Ok(path)
    }
}

/// Receive and persist in one loop; each append is durable before the next
/// payload is pulled, so the trigger counts written bytes here too.
async fn run_direct(
    mut stream: impl Stream<Item = reqwest::Result<Bytes>> + Unpin,
    sink_path: &Path,
    trigger: Arc<PlaybackTrigger>,
    expected: Option<u64>,
) -> (u64, FetchStatus) {
    let mut sink = match SinkWriter::create(sink_path).await {
        Ok(s) => s,
        Err(e) => return (0, FetchStatus::Failed(e)),
    };

    while let Some(next) = stream.next().await {
        match next {
            Ok(data) => match sink.append(&data).await {
                Ok(total) => {
                    if trigger.observe(total) {
                        tracing::debug!(bytes = total, "Playback threshold crossed");
                    }
                    tracing::trace!(chunk = data.len(), total, "Chunk appended");
                }
                // Returning drops the stream, which cancels the call upstream.
                Err(e) => return (sink.bytes_written(), FetchStatus::Failed(e)),
            },
            Err(e) => return (sink.bytes_written(), FetchStatus::Failed(StreamError::from(e))),
        }
    }

    let written = sink.bytes_written();
    if let Some(expected) = expected {
        if written != expected {
            return (written, FetchStatus::Failed(truncated(written, expected)));
        }
    }

    match sink.finish().await {
        Ok(total) => {
            trigger.complete(total);
            (total, FetchStatus::Completed)
        }
        Err(e) => (written, FetchStatus::Failed(e)),
    }
}

/// Drain the relay into the sink. Owns the durable byte count, so the
/// trigger observes bytes written, not merely received.
async fn write_segments(
    mut rx: RelayReceiver,
    sink_path: PathBuf,
    trigger: Arc<PlaybackTrigger>,
) -> (u64, FetchStatus) {
    let mut sink = match SinkWriter::create(&sink_path).await {
        Ok(s) => s,
        Err(e) => return (0, FetchStatus::Failed(e)),
    };

    loop {
        match rx.drain().await {
            Some(Segment::Data(data)) => match sink.append(&data).await {
                Ok(total) => {
                    if trigger.observe(total) {
                        tracing::debug!(bytes = total, "Playback threshold crossed");
                    }
                    tracing::trace!(chunk = data.len(), total, "Chunk persisted");
                }
                // Dropping the receiver fails the next append upstream.
                Err(e) => return (sink.bytes_written(), FetchStatus::Failed(e)),
            },
            Some(Segment::End) => {
                let written = sink.bytes_written();
                return match sink.finish().await {
                    Ok(total) => {
                        trigger.complete(total);
                        (total, FetchStatus::Completed)
                    }
                    Err(e) => (written, FetchStatus::Failed(e)),
                };
            }
            Some(Segment::Failed(e)) => {
                return (sink.bytes_written(), FetchStatus::Failed(e));
            }
            None => {
                return (sink.bytes_written(), FetchStatus::Failed(StreamError::Cancelled));
            }
        }
    }
}

fn spawn_ready_watcher(
    listener: ReadyListener,
    player: Box<dyn Player>,
    sink_path: PathBuf,
) -> tokio::task::JoinHandle<Option<u64>> {
    tokio::spawn(async move {
        match listener.ready().await {
            Some(bytes) => {
                tracing::info!(bytes, sink = %sink_path.display(), "Playback ready");
                if let Err(e) = player.play(&sink_path).await {
                    tracing::warn!("Player failed: {:#}", e);
                }
                Some(bytes)
            }
            None => None,
        }
    })
}

fn truncated(received: u64, expected: u64) -> StreamError {
    StreamError::transport(format!(
        "Stream truncated: {received} of {expected} bytes"
    ))
}
