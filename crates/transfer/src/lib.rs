//! Binary file transfer to the collector.
//!
//! Implements the resumable-session protocol in its single-chunk form:
//! a metadata pre-request opens an upload session, then the whole file
//! is streamed to the session URI in one request. Progress is reported
//! synchronously to an [`UploadProgressListener`], which may cancel the
//! transfer.

mod chunked;
mod progress;
mod session;
mod types;
mod validation;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use chunked::{UploadFile, content_range};
pub use progress::{IgnoreProgress, SpeedCalculator, UploadProgress, UploadProgressListener};
pub use session::{ResumableUpload, SessionRequest};
pub use types::HttpResponse;
pub use validation::validate_file_name;

/// Largest file accepted for upload: 100 MiB.
///
/// The collector cannot yet merge several chunk requests into one file, so
/// every file must fit into a single chunk. With 100 Hz sensors this covers
/// measurements of roughly 44 hours.
pub const MAX_CHUNK_SIZE: u64 = 100 * 1024 * 1024;

/// Read buffer size used while streaming a file body (256 KiB).
pub const STREAM_BUFFER_SIZE: usize = 256 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transfer file is too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    #[error("transfer cancelled by progress listener")]
    Cancelled,

    #[error("session pre-request succeeded without a session URI")]
    MissingSessionUri,

    #[error("invalid session URI: {0}")]
    InvalidSessionUri(String),

    #[error("invalid file name: {0}")]
    InvalidFileName(String),

    #[error("metadata cannot be sent as header: {0}")]
    InvalidHeader(String),
}
