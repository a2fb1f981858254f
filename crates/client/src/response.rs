//! Status code classification.
//!
//! [`classify`] is the single place that interprets HTTP status codes.

use tracing::{debug, error, warn};
use uploader_transfer::HttpResponse;

use crate::error::{ErrorKind, Failure, Fatal};

/// Successful end of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 200: credentials accepted (login) or account created (registration).
    LoginSuccessful,
    /// 201: the server stored the upload.
    UploadSuccessful,
    /// 412: the server does not want this upload, e.g. it already has it.
    UploadSkipped,
}

/// Result of classifying one response.
#[derive(Debug)]
pub enum Classified {
    Success(Outcome),
    Recoverable(Failure),
    Fatal(Fatal),
}

/// Maps a response onto an outcome, a recoverable failure or a fatal
/// condition. Total over all status codes.
pub fn classify(response: &HttpResponse) -> Classified {
    let status = response.status;
    let kind = match status {
        200 => {
            debug!(status, "request accepted");
            return Classified::Success(Outcome::LoginSuccessful);
        }
        201 => {
            debug!(status, "upload stored");
            return Classified::Success(Outcome::UploadSuccessful);
        }
        412 => {
            debug!(status, "upload not wanted by server, skipping");
            return Classified::Success(Outcome::UploadSkipped);
        }
        413 => {
            error!(status, body = %response.body, "payload too large");
            return Classified::Fatal(Fatal::PayloadTooLarge(response.body.clone()));
        }
        400 => ErrorKind::BadRequest,
        401 => ErrorKind::Unauthorized,
        403 => ErrorKind::Forbidden,
        404 => ErrorKind::UploadSessionExpired,
        409 => ErrorKind::Conflict,
        422 => ErrorKind::EntityNotParsable,
        428 => ErrorKind::AccountNotActivated,
        429 => ErrorKind::TooManyRequests,
        500 => ErrorKind::InternalServerError,
        _ => {
            error!(status, message = %response.message, "unexpected response code");
            return Classified::Recoverable(
                Failure::new(ErrorKind::UnexpectedResponseCode)
                    .with_message(format!("{status} {}: {}", response.message, response.body)),
            );
        }
    };

    warn!(status, %kind, body = %response.body, "request failed");
    Classified::Recoverable(Failure::new(kind).with_message(response.body.clone()))
}
