//! Prompt to stored image record.

use std::sync::Arc;
use std::time::Duration;

use campaign_clients::blob_name;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::call::guarded;
use crate::error::StageError;
use crate::rate_limit::RateLimiter;
use crate::services::{BlobStore, ImageService, PostStore};

/// Renders, stores and records one image per call.
///
/// Only the image-generation request consumes a rate-limit permit; download,
/// upload and the image record are not paced.
#[derive(Clone)]
pub struct ImageProducer {
    images: Arc<dyn ImageService>,
    blobs: Arc<dyn BlobStore>,
    store: Arc<dyn PostStore>,
    limiter: Arc<RateLimiter>,
    call_timeout: Duration,
    blob_prefix: Arc<str>,
}

impl ImageProducer {
    #[must_use]
    pub fn new(
        images: Arc<dyn ImageService>,
        blobs: Arc<dyn BlobStore>,
        store: Arc<dyn PostStore>,
        limiter: Arc<RateLimiter>,
        call_timeout: Duration,
        blob_prefix: &str,
    ) -> Self {
        Self {
            images,
            blobs,
            store,
            limiter,
            call_timeout,
            blob_prefix: Arc::from(blob_prefix),
        }
    }

    /// Returns the id of the new image record.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's [`StageError`]. Nothing is rolled
    /// back: an uploaded blob without a record is left in place.
    pub async fn produce(
        &self,
        prompt: &str,
        token: &CancellationToken,
    ) -> Result<Uuid, StageError> {
        self.limiter.acquire(token).await?;

        let source_url = guarded(
            "generate_image",
            self.call_timeout,
            token,
            self.images.generate_image(prompt),
        )
        .await?;

        let bytes = guarded(
            "download_image",
            self.call_timeout,
            token,
            self.images.download_image(&source_url),
        )
        .await?;

        let name = blob_name(&self.blob_prefix, &bytes);
        let stored_url = guarded(
            "upload_image",
            self.call_timeout,
            token,
            self.blobs.upload(&name, bytes),
        )
        .await?;

        let image_id = guarded(
            "create_image_record",
            self.call_timeout,
            token,
            self.store.create_image_record(&stored_url, prompt),
        )
        .await?;

        tracing::debug!(%image_id, blob = %name, "image stored");
        Ok(image_id)
    }
}
