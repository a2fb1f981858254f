//! Measurement and attachment uploads.
//!
//! One call walks through
//! `Idle → SizeChecked → StreamOpened → MetadataAttached → Transmitting →
//! AwaitingResponse` and ends in `Succeeded`, `Skipped`, `FailedRecoverable`
//! or `FailedFatal`. The state is traced at debug level.

use std::path::Path;

use reqwest::Url;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::{debug, error, info, warn};
use uploader_model::{Attachment, Measurement, Uploadable, Uuid, WireMap};
use uploader_transfer::{ResumableUpload, SessionRequest, UploadFile, UploadProgressListener};

use crate::BoxFuture;
use crate::config::ClientConfig;
use crate::endpoint::Endpoints;
use crate::error::{ErrorKind, Failure, Fatal, UploadError};
use crate::fault;
use crate::http::HttpConnection;
use crate::response::{Classified, Outcome, classify};

/// Uploads measurement files and their attachments.
///
/// Results are [`Outcome::UploadSuccessful`] or [`Outcome::UploadSkipped`];
/// every recoverable failure is an [`UploadError::Failed`].
pub trait Uploader: Send + Sync {
    fn upload_measurement<'a>(
        &'a self,
        jwt_token: &'a str,
        measurement: &'a Measurement,
        file: &'a Path,
        listener: &'a dyn UploadProgressListener,
    ) -> BoxFuture<'a, Result<Outcome, UploadError>>;

    fn upload_attachment<'a>(
        &'a self,
        jwt_token: &'a str,
        attachment: &'a Attachment,
        file: &'a Path,
        file_name: &'a str,
        listener: &'a dyn UploadProgressListener,
    ) -> BoxFuture<'a, Result<Outcome, UploadError>>;

    fn measurements_endpoint(&self) -> Result<Url, Fatal>;

    fn attachments_endpoint(&self, device_id: Uuid, measurement_id: i64) -> Result<Url, Fatal>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UploadState {
    Idle,
    SizeChecked,
    StreamOpened,
    MetadataAttached,
    Transmitting,
    AwaitingResponse,
    Succeeded,
    Skipped,
    FailedRecoverable,
    FailedFatal,
}

/// [`Uploader`] using the resumable-session transfer.
#[derive(Debug, Clone)]
pub struct DefaultUploader {
    endpoints: Endpoints,
    http: HttpConnection,
}

impl DefaultUploader {
    pub fn new(config: &ClientConfig) -> Result<Self, Fatal> {
        Ok(Self {
            endpoints: Endpoints::new(&config.api_endpoint)?,
            http: HttpConnection::new(config)?,
        })
    }

    async fn upload(
        &self,
        jwt_token: &str,
        metadata: WireMap,
        endpoint: Result<Url, Fatal>,
        path: &Path,
        file_name: Option<&str>,
        listener: &dyn UploadProgressListener,
    ) -> Result<Outcome, UploadError> {
        let id = metadata.get(uploader_model::constants::keys::MEASUREMENT_ID).cloned();
        let trace = |state: UploadState| debug!(?state, measurement = ?id, "upload state");
        trace(UploadState::Idle);

        let result = self
            .transfer(jwt_token, &metadata, endpoint, path, file_name, listener, &trace)
            .await;

        match &result {
            Ok(Outcome::UploadSkipped) => trace(UploadState::Skipped),
            Ok(_) => trace(UploadState::Succeeded),
            Err(UploadError::Failed(f)) => {
                warn!(kind = %f.kind(), measurement = ?id, "upload failed");
                trace(UploadState::FailedRecoverable);
            }
            Err(UploadError::Fatal(e)) => {
                error!(error = %e, measurement = ?id, "upload failed hard");
                trace(UploadState::FailedFatal);
            }
        }
        result
    }

    #[allow(clippy::too_many_arguments)]
    async fn transfer(
        &self,
        jwt_token: &str,
        metadata: &WireMap,
        endpoint: Result<Url, Fatal>,
        path: &Path,
        file_name: Option<&str>,
        listener: &dyn UploadProgressListener,
        trace: &(dyn Fn(UploadState) + Sync),
    ) -> Result<Outcome, UploadError> {
        let endpoint = endpoint?;

        let file = match UploadFile::open(path).await {
            Ok(file) => file,
            Err(e) => return Err(fault::translate(e)?.into()),
        };
        trace(UploadState::SizeChecked);
        trace(UploadState::StreamOpened);

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {jwt_token}")).map_err(|_| {
            Failure::new(ErrorKind::Unauthorized).with_message("token is not a valid header value")
        })?;
        headers.insert(AUTHORIZATION, bearer);
        let request = SessionRequest {
            endpoint,
            headers,
            metadata,
            file_name,
        };
        trace(UploadState::MetadataAttached);

        trace(UploadState::Transmitting);
        let response = match ResumableUpload::new(self.http.client())
            .send(request, file, listener)
            .await
        {
            Ok(r) => r,
            Err(e) => return Err(fault::translate(e)?.into()),
        };
        trace(UploadState::AwaitingResponse);

        match classify(&response) {
            // The resumable protocol may complete a session with 200.
            Classified::Success(Outcome::LoginSuccessful | Outcome::UploadSuccessful) => {
                info!(status = response.status, "upload successful");
                Ok(Outcome::UploadSuccessful)
            }
            Classified::Success(Outcome::UploadSkipped) => {
                info!("upload skipped by server");
                Ok(Outcome::UploadSkipped)
            }
            Classified::Recoverable(failure) => Err(failure.into()),
            Classified::Fatal(fatal) => Err(fatal.into()),
        }
    }
}

impl Uploader for DefaultUploader {
    fn upload_measurement<'a>(
        &'a self,
        jwt_token: &'a str,
        measurement: &'a Measurement,
        file: &'a Path,
        listener: &'a dyn UploadProgressListener,
    ) -> BoxFuture<'a, Result<Outcome, UploadError>> {
        let endpoint = self.measurements_endpoint();
        Box::pin(self.upload(
            jwt_token,
            measurement.to_wire_map(),
            endpoint,
            file,
            None,
            listener,
        ))
    }

    fn upload_attachment<'a>(
        &'a self,
        jwt_token: &'a str,
        attachment: &'a Attachment,
        file: &'a Path,
        file_name: &'a str,
        listener: &'a dyn UploadProgressListener,
    ) -> BoxFuture<'a, Result<Outcome, UploadError>> {
        let endpoint =
            self.attachments_endpoint(attachment.device_id(), attachment.measurement_id());
        Box::pin(self.upload(
            jwt_token,
            attachment.to_wire_map(),
            endpoint,
            file,
            Some(file_name),
            listener,
        ))
    }

    fn measurements_endpoint(&self) -> Result<Url, Fatal> {
        self.endpoints.measurements()
    }

    fn attachments_endpoint(&self, device_id: Uuid, measurement_id: i64) -> Result<Url, Fatal> {
        self.endpoints.attachments(device_id, measurement_id)
    }
}
