use std::path::Path;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;
use tracing::debug;

use crate::{MAX_CHUNK_SIZE, STREAM_BUFFER_SIZE, TransferError};

// ---------------------------------------------------------------------------
// UploadFile
// ---------------------------------------------------------------------------

/// A local file opened for a single-chunk upload.
///
/// The handle lives exactly as long as this value; it is closed when the
/// value (or the body stream built from it) is dropped.
#[derive(Debug)]
pub struct UploadFile {
    file: tokio::fs::File,
    len: u64,
}

impl UploadFile {
    /// Checks the size ceiling, then opens `path`.
    ///
    /// The size is checked before the file is opened, so oversized files
    /// never reach the network layer.
    pub async fn open(path: &Path) -> Result<Self, TransferError> {
        let len = tokio::fs::metadata(path).await?.len();
        check_size(len)?;
        let file = tokio::fs::File::open(path).await?;
        debug!(path = %path.display(), len, "transfer file opened");
        Ok(Self { file, len })
    }

    /// Size of the file in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Turns the file into a body stream.
    ///
    /// The running byte count is pushed to `progress_tx` after every read.
    /// Ticks are dropped when the receiver lags behind; only the latest
    /// count matters.
    pub(crate) fn into_stream(
        self,
        progress_tx: mpsc::Sender<u64>,
    ) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
        let mut sent: u64 = 0;
        ReaderStream::with_capacity(self.file, STREAM_BUFFER_SIZE).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                sent += bytes.len() as u64;
                let _ = progress_tx.try_send(sent);
            }
            chunk
        })
    }
}

/// Rejects files that do not fit into one chunk.
fn check_size(len: u64) -> Result<(), TransferError> {
    if len > MAX_CHUNK_SIZE {
        return Err(TransferError::TooLarge {
            size: len,
            limit: MAX_CHUNK_SIZE,
        });
    }
    Ok(())
}

/// `Content-Range` value for a body that covers the whole file.
pub fn content_range(len: u64) -> String {
    if len == 0 {
        "bytes */0".to_string()
    } else {
        format!("bytes 0-{}/{len}", len - 1)
    }
}
