//! HTTP transport shared by the authenticator and the uploader.

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use reqwest::Url;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use tracing::debug;
use uploader_transfer::{HttpResponse, TransferError};

use crate::config::ClientConfig;
use crate::error::Fatal;

const JSON_UTF8: &str = "application/json; charset=UTF-8";

/// Owns the HTTP client for all calls made through one authenticator or
/// uploader.
///
/// TLS uses rustls with certificate and hostname verification always on.
#[derive(Debug, Clone)]
pub struct HttpConnection {
    client: reqwest::Client,
    compress: bool,
}

impl HttpConnection {
    pub fn new(config: &ClientConfig) -> Result<Self, Fatal> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(config.user_agent.as_str())
            .connect_timeout(config.connect_timeout());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Fatal::ClientSetup(e.to_string()))?;

        Ok(Self {
            client,
            compress: config.compress_credentials,
        })
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Prepares a single JSON POST to `url`.
    pub fn open(&self, url: Url) -> Connection<'_> {
        Connection {
            http: self,
            url,
        }
    }
}

/// One request in flight, consumed by [`Connection::post_json`].
///
/// The underlying connection goes back to the pool, or is closed, when the
/// send finishes or fails.
#[derive(Debug)]
pub struct Connection<'a> {
    http: &'a HttpConnection,
    url: Url,
}

impl Connection<'_> {
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Sends `payload` and reads the whole response.
    pub async fn post_json(self, payload: &str) -> Result<HttpResponse, TransferError> {
        let mut request = self
            .http
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, JSON_UTF8);

        if self.http.compress {
            let body = gzip(payload.as_bytes())?;
            debug!(url = %self.url, raw = payload.len(), compressed = body.len(), "posting gzip payload");
            request = request.header(CONTENT_ENCODING, "gzip").body(body);
        } else {
            debug!(url = %self.url, len = payload.len(), "posting payload");
            request = request.body(payload.to_owned());
        }

        let response = request.send().await?;
        Ok(HttpResponse::read(response).await)
    }
}

fn gzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
