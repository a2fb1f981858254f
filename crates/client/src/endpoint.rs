use reqwest::Url;
use uploader_model::Uuid;

use crate::error::Fatal;

/// Collector endpoints, resolved against the API base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Parses `api` and normalizes it to end with `/`.
    pub fn new(api: &str) -> Result<Self, Fatal> {
        let api = api.trim();
        let normalized = if api.ends_with('/') {
            api.to_string()
        } else {
            format!("{api}/")
        };
        let base =
            Url::parse(&normalized).map_err(|e| Fatal::MalformedUrl(format!("{api}: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(Fatal::MalformedUrl(api.to_string()));
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn login(&self) -> Result<Url, Fatal> {
        self.join("login")
    }

    pub fn registration(&self) -> Result<Url, Fatal> {
        self.join("user")
    }

    pub fn measurements(&self) -> Result<Url, Fatal> {
        self.join("measurements")
    }

    pub fn attachments(&self, device_id: Uuid, measurement_id: i64) -> Result<Url, Fatal> {
        self.join(&format!(
            "measurements/{device_id}/{measurement_id}/attachments"
        ))
    }

    fn join(&self, path: &str) -> Result<Url, Fatal> {
        self.base
            .join(path)
            .map_err(|e| Fatal::MalformedUrl(format!("{}{path}: {e}", self.base)))
    }
}
