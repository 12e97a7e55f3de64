//! HTTP blob store for rendered campaign images.

use std::fmt::Write as _;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::error::UploadError;

/// Client for a PUT-addressable blob store (S3-compatible gateways, R2
/// public buckets behind a token, Vercel-style blob APIs).
pub struct BlobClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

#[derive(Deserialize)]
struct UploadResponse {
    url: Option<String>,
}

impl BlobClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::Http`] if the `reqwest::Client` cannot be built
    /// or [`UploadError::InvalidUrl`] if `base_url` does not parse.
    pub fn new(base_url: &str, token: Option<&str>, timeout_secs: u64) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        // Exactly one trailing slash so `join` appends rather than replaces
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| UploadError::InvalidUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url,
            token: token.map(str::to_owned),
        })
    }

    /// Uploads `bytes` under `name` and returns the public URL.
    ///
    /// If the store answers with a JSON body carrying `url`, that URL is
    /// returned; otherwise the object URL is `<base_url>/<name>`.
    ///
    /// # Errors
    ///
    /// - [`UploadError::InvalidUrl`] if `name` cannot be joined onto the base.
    /// - [`UploadError::Http`] on network failure.
    /// - [`UploadError::Status`] on a non-2xx response.
    pub async fn upload(
        &self,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, UploadError> {
        let object_url = self.base_url.join(name).map_err(|e| UploadError::InvalidUrl {
            url: name.to_owned(),
            reason: e.to_string(),
        })?;

        let mut request = self
            .client
            .put(object_url.clone())
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Status {
                status: status.as_u16(),
                name: name.to_owned(),
            });
        }

        let body = response.text().await.unwrap_or_default();
        let reported = serde_json::from_str::<UploadResponse>(&body)
            .ok()
            .and_then(|r| r.url);
        Ok(reported.unwrap_or_else(|| object_url.to_string()))
    }
}

/// Content-addressed object name: `<prefix>/<first 16 bytes of sha256 as hex>.png`.
#[must_use]
pub fn blob_name(prefix: &str, bytes: &[u8]) -> String {
    let hash = Sha256::digest(bytes);
    let mut name = String::with_capacity(prefix.len() + 38);
    name.push_str(prefix.trim_matches('/'));
    name.push('/');
    for b in &hash[..16] {
        let _ = write!(name, "{b:02x}");
    }
    name.push_str(".png");
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_name_is_deterministic() {
        assert_eq!(blob_name("cs", b"abc"), blob_name("cs", b"abc"));
    }

    #[test]
    fn blob_name_differs_for_different_bytes() {
        assert_ne!(blob_name("cs", b"abc"), blob_name("cs", b"abd"));
    }

    #[test]
    fn blob_name_shape() {
        let name = blob_name("/case-studies/42/", b"image");
        assert!(name.starts_with("case-studies/42/"));
        assert!(name.ends_with(".png"));
        // prefix + '/' + 32 hex chars + ".png"
        assert_eq!(name.len(), "case-studies/42/".len() + 32 + 4);
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        let result = BlobClient::new("not a url", None, 5);
        assert!(matches!(result, Err(UploadError::InvalidUrl { .. })));
    }
}
