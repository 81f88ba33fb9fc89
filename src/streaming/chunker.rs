//! Fixed-size chunk reader over a resource file.
//!
//! One [`ChunkReader`] backs one stream call. It owns the file handle for
//! the call's whole lifetime and releases it on every exit path, including
//! mid-stream cancellation, because the handle drops with the reader.

use bytes::Bytes;
use futures::stream::Stream;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt};
use uuid::Uuid;

use crate::error::{Result, StreamError};

/// Fill `buf` from `reader` until it is full or the source ends.
///
/// Returns how many bytes were placed in `buf`. An error discards whatever
/// the current block had accumulated.
async fn read_full<R: AsyncRead + Unpin>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Metadata captured when a stream call opens its resource.
#[derive(Debug, Clone)]
pub struct StreamInfo {
    /// Correlation id for log lines belonging to this call.
    pub id: Uuid,
    /// Resource size at open time. The stream emits exactly this many bytes
    /// when it completes.
    pub size: u64,
    /// Resolved path of the resource.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Streaming,
    Complete,
    Failed,
}

/// An open resource positioned for sequential chunked reading.
#[derive(Debug)]
pub struct ChunkReader {
    file: File,
    info: StreamInfo,
    chunk_size: usize,
    bytes_sent: u64,
    phase: Phase,
}

impl ChunkReader {
    /// Open a resource for chunked streaming.
    ///
    /// Fails with [`StreamError::NotFound`] before any chunk is produced if
    /// the path is missing or not a regular file.
    pub async fn open(path: &Path, chunk_size: usize) -> Result<Self> {
        let name = path.display().to_string();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|_| StreamError::not_found(&name))?;
        if !metadata.is_file() {
            return Err(StreamError::not_found(&name));
        }

        let file = File::open(path)
            .await
            .map_err(|_| StreamError::not_found(&name))?;

        Ok(Self {
            file,
            info: StreamInfo {
                id: Uuid::new_v4(),
                size: metadata.len(),
                path: path.to_path_buf(),
            },
            chunk_size,
            bytes_sent: 0,
            phase: Phase::Streaming,
        })
    }

    pub fn info(&self) -> &StreamInfo {
        &self.info
    }

    /// Bytes emitted so far.
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    /// Read the next chunk in file order.
    ///
    /// Short reads are accumulated until the block is full or the file ends,
    /// so every chunk except the last is exactly `chunk_size` bytes. Returns
    /// `Ok(None)` once the file is exhausted. A read error discards the
    /// partially filled block and terminates the stream; chunks already
    /// returned remain valid.
    pub async fn next_chunk(&mut self) -> Result<Option<Bytes>> {
        if self.phase != Phase::Streaming {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.chunk_size];
        let filled = match read_full(&mut self.file, &mut buf).await {
            Ok(n) => n,
            Err(e) => {
                self.phase = Phase::Failed;
                tracing::warn!(
                    stream_id = %self.info.id,
                    bytes_sent = self.bytes_sent,
                    error = %e,
                    "Read failed mid-stream"
                );
                return Err(StreamError::read(self.bytes_sent, e));
            }
        };

        if filled == 0 {
            self.phase = Phase::Complete;
            return Ok(None);
        }

        // A short block only ever happens at end of file.
        if filled < buf.len() {
            self.phase = Phase::Complete;
        }

        buf.truncate(filled);
        self.bytes_sent += filled as u64;
        Ok(Some(Bytes::from(buf)))
    }

    /// Turn the reader into a lazy chunk stream.
    ///
    /// The stream is pulled one chunk at a time, so a consumer that stops
    /// polling (or drops the stream) halts the producer within one chunk of
    /// work. Dropping the stream drops the reader and its file handle.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes>> + Send {
        futures::stream::try_unfold(self, |mut reader| async move {
            match reader.next_chunk().await? {
                Some(chunk) => Ok(Some((chunk, reader))),
                None => Ok(None),
            }
        })
    }
}

impl Drop for ChunkReader {
    fn drop(&mut self) {
        match self.phase {
            Phase::Complete => {
                tracing::debug!(
                    stream_id = %self.info.id,
                    bytes_sent = self.bytes_sent,
                    "Chunk stream complete"
                );
            }
            Phase::Streaming => {
                tracing::info!(
                    stream_id = %self.info.id,
                    bytes_sent = self.bytes_sent,
                    size = self.info.size,
                    "Chunk stream closed before completion"
                );
            }
            // Failure is logged where it occurs.
            Phase::Failed => {}
        }
    }
}
