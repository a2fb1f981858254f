//! Failure taxonomy.
//!
//! Every low-level fault and every non-success status ends up as one
//! [`ErrorKind`]. Callers decide what to do from the kind alone: retry
//! later, surface to the user, or skip. The message and source only serve
//! diagnostics.

use std::error::Error as StdError;
use std::fmt;

/// What went wrong, from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 400: the server rejected the request as malformed.
    BadRequest,
    /// 401: credentials or token not accepted.
    Unauthorized,
    /// 403: authenticated but not allowed.
    Forbidden,
    /// 409: the entity already exists.
    Conflict,
    /// 422: the payload could not be parsed.
    EntityNotParsable,
    /// 500
    InternalServerError,
    /// 429
    TooManyRequests,
    /// 428: the account exists but was never activated.
    AccountNotActivated,
    /// 404 on upload: the server forgot the upload session.
    UploadSessionExpired,
    /// A status without a defined meaning.
    UnexpectedResponseCode,
    /// The connection dropped mid-exchange.
    NetworkUnavailable,
    /// The server's name could not be resolved.
    HostUnresolvable,
    /// The server could not be reached or did not answer in time.
    ServerUnavailable,
    /// Any other I/O fault on the transport.
    TransportIo,
    /// The file exceeds the single-chunk ceiling.
    MeasurementTooLarge,
    /// The transfer was cut short or cancelled.
    SynchronizationInterrupted,
}

impl ErrorKind {
    /// Whether repeating the same call later may succeed without any change.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::InternalServerError
                | Self::TooManyRequests
                | Self::UploadSessionExpired
                | Self::NetworkUnavailable
                | Self::HostUnresolvable
                | Self::ServerUnavailable
                | Self::TransportIo
                | Self::SynchronizationInterrupted
        )
    }

    /// Whether a human has to act (log in again, activate the account).
    pub fn needs_user_action(self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::Forbidden | Self::AccountNotActivated
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::Conflict => "conflict",
            Self::EntityNotParsable => "entity not parsable",
            Self::InternalServerError => "internal server error",
            Self::TooManyRequests => "too many requests",
            Self::AccountNotActivated => "account not activated",
            Self::UploadSessionExpired => "upload session expired",
            Self::UnexpectedResponseCode => "unexpected response code",
            Self::NetworkUnavailable => "network unavailable",
            Self::HostUnresolvable => "host unresolvable",
            Self::ServerUnavailable => "server unavailable",
            Self::TransportIo => "transport I/O error",
            Self::MeasurementTooLarge => "measurement too large",
            Self::SynchronizationInterrupted => "synchronization interrupted",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A classified failure: a kind plus diagnostic detail.
#[derive(Debug, thiserror::Error)]
#[error("{}{}", .kind, detail(.message))]
pub struct Failure {
    kind: ErrorKind,
    message: Option<String>,
    #[source]
    source: Option<BoxError>,
}

fn detail(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl Failure {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.message = (!message.is_empty()).then_some(message);
        self
    }

    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Server response body or fault description.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Conditions a caller cannot recover from by retrying.
///
/// These indicate a misconfiguration or a server that violates the
/// protocol; the calling task should stop.
#[derive(Debug, thiserror::Error)]
pub enum Fatal {
    #[error("malformed endpoint URL: {0}")]
    MalformedUrl(String),

    #[error("login response carried no Authorization header")]
    MissingToken,

    #[error("upload session opened without a session URI")]
    MissingSessionUri,

    #[error("server rejected the payload as too large: {0}")]
    PayloadTooLarge(String),

    #[error("failure not expected for this call: {0}")]
    UnexpectedKind(Failure),

    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),
}

/// A recoverable login failure.
#[derive(Debug, thiserror::Error)]
#[error("login failed: {0}")]
pub struct LoginFailed(#[source] pub Failure);

/// A recoverable registration failure.
#[derive(Debug, thiserror::Error)]
#[error("registration failed: {0}")]
pub struct RegistrationFailed(#[source] pub Failure);

/// The single caller-facing failure type of uploads.
#[derive(Debug, thiserror::Error)]
#[error("upload failed: {0}")]
pub struct UploadFailed(#[source] pub Failure);

/// Result error of [`Authenticator::authenticate`](crate::Authenticator::authenticate).
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error(transparent)]
    Failed(#[from] LoginFailed),

    #[error(transparent)]
    Fatal(#[from] Fatal),
}

/// Result error of [`Authenticator::register`](crate::Authenticator::register).
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Failed(#[from] RegistrationFailed),

    #[error(transparent)]
    Fatal(#[from] Fatal),
}

/// Result error of the [`Uploader`](crate::Uploader) calls.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Failed(#[from] UploadFailed),

    #[error(transparent)]
    Fatal(#[from] Fatal),
}

// Shared accessors of the wrapper and call error types.
macro_rules! impl_failure_access {
    ($($failed:ident => $error:ident),+ $(,)?) => {$(
        impl $failed {
            pub fn kind(&self) -> ErrorKind {
                self.0.kind()
            }
        }

        impl $error {
            /// The failure kind, `None` for fatal conditions.
            pub fn kind(&self) -> Option<ErrorKind> {
                match self {
                    Self::Failed(f) => Some(f.kind()),
                    Self::Fatal(_) => None,
                }
            }

            pub fn is_fatal(&self) -> bool {
                matches!(self, Self::Fatal(_))
            }
        }

        impl From<Failure> for $error {
            fn from(failure: Failure) -> Self {
                Self::Failed($failed(failure))
            }
        }
    )+};
}

impl_failure_access!(
    LoginFailed => LoginError,
    RegistrationFailed => RegistrationError,
    UploadFailed => UploadError,
);
