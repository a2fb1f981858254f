//! Transport fault translation.
//!
//! Structured signals (reqwest's timeout/connect flags, `io::ErrorKind`,
//! listener cancellation) decide first. Error text is only consulted for
//! faults the HTTP stack does not expose as types, such as TLS alerts or a
//! peer closing the stream before the message was complete.

use std::error::Error as StdError;
use std::io;

use tracing::warn;
use uploader_transfer::TransferError;

use crate::error::{ErrorKind, Failure, Fatal};

/// Translates a transfer error into a failure kind, or a fatal condition.
pub(crate) fn translate(err: TransferError) -> Result<Failure, Fatal> {
    let kind = match &err {
        TransferError::Cancelled => ErrorKind::SynchronizationInterrupted,
        TransferError::TooLarge { .. } => ErrorKind::MeasurementTooLarge,
        TransferError::InvalidFileName(_) | TransferError::InvalidHeader(_) => {
            ErrorKind::BadRequest
        }
        TransferError::Json(_) => ErrorKind::TransportIo,
        TransferError::Io(e) => io_kind(e).unwrap_or(ErrorKind::TransportIo),
        TransferError::Http(e) => request_kind(e),
        TransferError::MissingSessionUri => return Err(Fatal::MissingSessionUri),
        TransferError::InvalidSessionUri(uri) => return Err(Fatal::MalformedUrl(uri.clone())),
    };
    warn!(%kind, error = %err, "transport fault");
    Ok(Failure::new(kind)
        .with_message(err.to_string())
        .with_source(err))
}

fn request_kind(err: &reqwest::Error) -> ErrorKind {
    if err.is_timeout() {
        return ErrorKind::ServerUnavailable;
    }
    if err.is_connect() {
        return if chain_mentions(err, &["dns error", "failed to lookup address"]) {
            ErrorKind::HostUnresolvable
        } else {
            ErrorKind::ServerUnavailable
        };
    }
    chain_kind(err)
}

/// Kind for a fault after the connection was established.
fn chain_kind(err: &(dyn StdError + 'static)) -> ErrorKind {
    let io = io_in_chain(err);

    if io.is_some_and(|e| e.kind() == io::ErrorKind::TimedOut) {
        return ErrorKind::ServerUnavailable;
    }

    if chain_mentions(err, &["tls", "certificate", "handshake"]) {
        return match io.map(io::Error::kind) {
            Some(io::ErrorKind::BrokenPipe | io::ErrorKind::ConnectionReset) => {
                ErrorKind::NetworkUnavailable
            }
            _ => ErrorKind::TransportIo,
        };
    }

    if let Some(kind) = io.and_then(io_kind) {
        return kind;
    }

    if chain_mentions(
        err,
        &[
            "unexpected end of stream",
            "connection closed before message completed",
            "end of file before message length reached",
        ],
    ) {
        return ErrorKind::SynchronizationInterrupted;
    }

    ErrorKind::TransportIo
}

fn io_kind(err: &io::Error) -> Option<ErrorKind> {
    match err.kind() {
        io::ErrorKind::TimedOut => Some(ErrorKind::ServerUnavailable),
        io::ErrorKind::Interrupted => Some(ErrorKind::NetworkUnavailable),
        io::ErrorKind::UnexpectedEof => Some(ErrorKind::SynchronizationInterrupted),
        _ => None,
    }
}

fn io_in_chain<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a io::Error> {
    let mut cur = Some(err);
    while let Some(e) = cur {
        if let Some(io) = e.downcast_ref::<io::Error>() {
            return Some(io);
        }
        cur = e.source();
    }
    None
}

/// Whether an error in the chain mentions one of `needles`.
///
/// reqwest layers are skipped: their message carries the request URL.
fn chain_mentions(err: &(dyn StdError + 'static), needles: &[&str]) -> bool {
    let mut cur = Some(err);
    while let Some(e) = cur {
        if !e.is::<reqwest::Error>() {
            let text = e.to_string().to_ascii_lowercase();
            if needles.iter().any(|n| text.contains(n)) {
                return true;
            }
        }
        cur = e.source();
    }
    false
}
