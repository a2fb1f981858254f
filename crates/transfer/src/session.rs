use std::collections::BTreeMap;
use std::ops::ControlFlow;

use reqwest::header::{
    CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, HeaderMap, HeaderName,
    HeaderValue, LOCATION,
};
use reqwest::Url;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::chunked::{UploadFile, content_range};
use crate::progress::{SpeedCalculator, UploadProgress, UploadProgressListener};
use crate::types::HttpResponse;
use crate::validation::validate_file_name;
use crate::TransferError;

const OCTET_STREAM: &str = "application/octet-stream";
const X_UPLOAD_CONTENT_TYPE: &str = "x-upload-content-type";
const X_UPLOAD_CONTENT_LENGTH: &str = "x-upload-content-length";

/// Pending progress ticks between the body stream and the listener.
const PROGRESS_CHANNEL_CAPACITY: usize = 64;

/// Everything needed to open and fill one upload session.
#[derive(Debug)]
pub struct SessionRequest<'a> {
    /// Collection URL the session is opened on.
    pub endpoint: Url,
    /// Extra headers for both requests, typically `Authorization`.
    pub headers: HeaderMap,
    /// Wire metadata, sent as the pre-request body and as headers.
    pub metadata: &'a BTreeMap<String, String>,
    /// Announced as `Content-Disposition` on the transfer request.
    pub file_name: Option<&'a str>,
}

/// Single-chunk resumable upload over a borrowed HTTP client.
pub struct ResumableUpload<'a> {
    client: &'a reqwest::Client,
}

impl<'a> ResumableUpload<'a> {
    pub fn new(client: &'a reqwest::Client) -> Self {
        Self { client }
    }

    /// Opens a session for `file` and streams it in one request.
    ///
    /// Returns the final server response: the transfer response, or the
    /// pre-request response when the server refused to open a session.
    /// The file handle is released on every path.
    pub async fn send(
        &self,
        request: SessionRequest<'_>,
        file: UploadFile,
        listener: &dyn UploadProgressListener,
    ) -> Result<HttpResponse, TransferError> {
        if let Some(name) = request.file_name {
            validate_file_name(name)?;
        }

        let mut headers = request.headers.clone();
        append_metadata_headers(&mut headers, request.metadata)?;

        let session_uri = match self.initiate(&request, &headers, file.len()).await? {
            Ok(uri) => uri,
            Err(final_response) => return Ok(final_response),
        };

        self.transmit(&session_uri, headers, request.file_name, file, listener)
            .await
    }

    /// Sends the metadata pre-request.
    ///
    /// `Ok(Err(response))` means the server answered with a non-2xx
    /// status, which ends the exchange. Every 2xx must carry the session
    /// URI in `Location`.
    async fn initiate(
        &self,
        request: &SessionRequest<'_>,
        headers: &HeaderMap,
        len: u64,
    ) -> Result<Result<Url, HttpResponse>, TransferError> {
        let mut url = request.endpoint.clone();
        url.query_pairs_mut().append_pair("uploadType", "resumable");

        let body = serde_json::to_vec(request.metadata)?;
        debug!(%url, len, "opening upload session");

        let response = self
            .client
            .post(url)
            .headers(headers.clone())
            .header(CONTENT_TYPE, "application/json; charset=UTF-8")
            .header(X_UPLOAD_CONTENT_TYPE, OCTET_STREAM)
            .header(X_UPLOAD_CONTENT_LENGTH, len)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let response = HttpResponse::read(response).await;
            info!(status = response.status, "upload session not opened");
            return Ok(Err(response));
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or(TransferError::MissingSessionUri)?;
        // Drain the body so the connection can be reused.
        let _ = response.bytes().await;

        let uri = request
            .endpoint
            .join(&location)
            .map_err(|e| TransferError::InvalidSessionUri(format!("{location}: {e}")))?;
        debug!(session = %uri, "upload session opened");
        Ok(Ok(uri))
    }

    /// Streams the whole file to `session_uri` and reports progress.
    async fn transmit(
        &self,
        session_uri: &Url,
        headers: HeaderMap,
        file_name: Option<&str>,
        file: UploadFile,
        listener: &dyn UploadProgressListener,
    ) -> Result<HttpResponse, TransferError> {
        let total = file.len();
        let (tx, mut rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);

        let mut builder = self
            .client
            .put(session_uri.clone())
            .headers(headers)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .header(CONTENT_LENGTH, total)
            .header(CONTENT_RANGE, content_range(total));
        if let Some(name) = file_name {
            builder = builder.header(CONTENT_DISPOSITION, format!("attachment; filename=\"{name}\""));
        }

        let mut tracker = Tracker::new(total);
        if tracker.report(listener, 0).is_break() {
            return Err(TransferError::Cancelled);
        }

        let send = builder
            .body(reqwest::Body::wrap_stream(file.into_stream(tx)))
            .send();
        tokio::pin!(send);

        let response = loop {
            tokio::select! {
                result = &mut send => break result?,
                Some(sent) = rx.recv() => {
                    if tracker.report(listener, sent).is_break() {
                        warn!(sent, total, "transfer cancelled by listener");
                        return Err(TransferError::Cancelled);
                    }
                }
            }
        };

        // The body may finish before the last ticks were observed.
        while let Ok(sent) = rx.try_recv() {
            let _ = tracker.report(listener, sent);
        }

        let response = HttpResponse::read(response).await;
        debug!(status = response.status, sent = tracker.sent, total, "transfer finished");
        Ok(response)
    }
}

/// Adds every metadata entry as an individual header.
fn append_metadata_headers(
    headers: &mut HeaderMap,
    metadata: &BTreeMap<String, String>,
) -> Result<(), TransferError> {
    for (key, value) in metadata {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| TransferError::InvalidHeader(key.clone()))?;
        let value = HeaderValue::from_bytes(value.as_bytes())
            .map_err(|_| TransferError::InvalidHeader(format!("{key}: {value}")))?;
        headers.insert(name, value);
    }
    Ok(())
}

struct Tracker {
    total: u64,
    sent: u64,
    speed: SpeedCalculator,
}

impl Tracker {
    fn new(total: u64) -> Self {
        Self {
            total,
            sent: 0,
            speed: SpeedCalculator::default(),
        }
    }

    fn report(&mut self, listener: &dyn UploadProgressListener, sent: u64) -> ControlFlow<()> {
        self.speed.add_sample(sent.saturating_sub(self.sent));
        self.sent = sent;
        listener.updated_progress(&UploadProgress {
            bytes_sent: sent,
            total_bytes: self.total,
            bytes_per_second: self.speed.bytes_per_second(),
        })
    }
}
