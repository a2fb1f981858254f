use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// A fully read server response.
///
/// The body is consumed before the response is classified, so the
/// underlying connection is released as soon as this value exists.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Canonical reason phrase for `status`, empty for unknown codes.
    ///
    /// reqwest does not expose the phrase the server sent; server-provided
    /// detail is in `body`.
    pub message: String,
    pub body: String,
    pub headers: HeaderMap,
}

impl HttpResponse {
    /// Reads status, headers and body from `response`.
    ///
    /// An unreadable body becomes an empty string; classification only
    /// depends on the status and headers.
    pub async fn read(response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.unwrap_or_default();
        Self {
            status: status.as_u16(),
            message: reason(status),
            body,
            headers,
        }
    }

    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let message = StatusCode::from_u16(status)
            .map(reason)
            .unwrap_or_default();
        Self {
            status,
            message,
            body: body.into(),
            headers: HeaderMap::new(),
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Value of header `name`, if present and valid UTF-8.
    pub fn header(&self, name: impl reqwest::header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

fn reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{mock_server, raw_response};
    use reqwest::header::{AUTHORIZATION, LOCATION};

    #[tokio::test]
    async fn read_uses_canonical_phrase_and_keeps_body() {
        let (base, handle) =
            mock_server(vec![raw_response("409 Already There", "", "duplicate")]).await;
        let response = reqwest::get(base).await.unwrap();

        let r = HttpResponse::read(response).await;
        assert_eq!(r.status, 409);
        assert_eq!(r.message, "Conflict");
        assert_eq!(r.body, "duplicate");
        handle.await.unwrap();
    }

    #[test]
    fn canonical_message() {
        let r = HttpResponse::new(412, "");
        assert_eq!(r.message, "Precondition Failed");
        assert_eq!(HttpResponse::new(200, "").message, "OK");
    }

    #[test]
    fn non_standard_status_has_empty_message() {
        assert_eq!(HttpResponse::new(599, "").message, "");
    }

    #[test]
    fn header_lookup() {
        let r = HttpResponse::new(200, "")
            .with_header(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(r.header(AUTHORIZATION), Some("Bearer abc"));
        assert_eq!(r.header("authorization"), Some("Bearer abc"));
        assert_eq!(r.header(LOCATION), None);
    }
}
