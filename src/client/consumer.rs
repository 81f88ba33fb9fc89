//! Ordered sink writer for received chunks.

use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::error::{Result, StreamError};

/// Appends chunk payloads to a sink file in arrival order and tracks the
/// cumulative byte count.
///
/// The file handle closes when the writer drops, so error paths need no
/// explicit teardown; whatever was appended before a failure stays on disk.
#[derive(Debug)]
pub struct SinkWriter {
    file: File,
    path: PathBuf,
    bytes_written: u64,
}

impl SinkWriter {
    /// Create a sink at `path`, truncating anything already there.
    pub async fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .await
            .map_err(|e| StreamError::write(0, e))?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            bytes_written: 0,
        })
    }

    /// Append one chunk payload, returning the new cumulative byte count.
    ///
    /// The write is flushed through before returning, so the count never
    /// runs ahead of what the file holds.
    pub async fn append(&mut self, data: &[u8]) -> Result<u64> {
        self.file
            .write_all(data)
            .await
            .map_err(|e| StreamError::write(self.bytes_written, e))?;
        self.file
            .flush()
            .await
            .map_err(|e| StreamError::write(self.bytes_written, e))?;
        self.bytes_written += data.len() as u64;
        Ok(self.bytes_written)
    }

    /// Flush and close the sink, returning the total byte count.
    pub async fn finish(mut self) -> Result<u64> {
        self.file
            .flush()
            .await
            .map_err(|e| StreamError::write(self.bytes_written, e))?;
        Ok(self.bytes_written)
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
