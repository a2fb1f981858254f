//! Authentication and upload client for the measurement collector.
//!
//! The client never retries. Every call resolves to a typed outcome or to
//! an error whose [`ErrorKind`] tells the caller's scheduler what to do:
//!
//! - [`Outcome`] for successful and skipped uploads
//! - [`LoginFailed`], [`RegistrationFailed`], [`UploadFailed`] for
//!   recoverable failures
//! - [`Fatal`] for conditions that need a fix, not a retry
//!
//! # Example
//!
//! ```no_run
//! # async fn run(measurement: uploader_model::Measurement) -> Result<(), Box<dyn std::error::Error>> {
//! use uploader_client::{
//!     Authenticator, ClientConfig, DefaultAuthenticator, DefaultUploader, Uploader,
//! };
//! use uploader_transfer::IgnoreProgress;
//!
//! let config = ClientConfig::new("https://example.com/api/v4");
//! let token = DefaultAuthenticator::new(&config)?
//!     .authenticate("user@example.com", "secret")
//!     .await?;
//! let outcome = DefaultUploader::new(&config)?
//!     .upload_measurement(&token, &measurement, "m.ccyf".as_ref(), &IgnoreProgress)
//!     .await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;

pub mod authenticator;
pub mod config;
pub mod endpoint;
pub mod error;
mod fault;
pub mod http;
pub mod response;
pub mod uploader;

// Re-export primary types for convenience.
pub use authenticator::{Authenticator, DefaultAuthenticator};
pub use config::{ClientConfig, ConfigError};
pub use endpoint::Endpoints;
pub use error::{
    ErrorKind, Failure, Fatal, LoginError, LoginFailed, RegistrationError, RegistrationFailed,
    UploadError, UploadFailed,
};
pub use http::{Connection, HttpConnection};
pub use response::{Classified, Outcome, classify};
pub use uploader::{DefaultUploader, Uploader};

/// Boxed future returned by the dyn-compatible client traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
