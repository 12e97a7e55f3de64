//! Seams between the pipeline and its external collaborators.
//!
//! Production implementations live in [`crate::adapters`]; tests substitute
//! in-memory fakes.

use std::sync::Arc;

use async_trait::async_trait;
use campaign_clients::{ChannelPlans, GenerationError, PlanRequest, UploadError};
use campaign_core::FinalPost;
use uuid::Uuid;

use crate::error::PersistenceError;

#[async_trait]
pub trait TextPlanService: Send + Sync {
    async fn generate_plan(&self, request: &PlanRequest) -> Result<ChannelPlans, GenerationError>;
}

#[async_trait]
pub trait ReferenceAnalyzer: Send + Sync {
    /// One-paragraph visual summary of the reference images.
    async fn analyze(&self, image_urls: &[String]) -> Result<String, GenerationError>;
}

#[async_trait]
pub trait PromptService: Send + Sync {
    async fn derive_prompt(
        &self,
        post_text: &str,
        reference_summary: Option<&str>,
    ) -> Result<String, GenerationError>;

    async fn compress_prompt(&self, prompt: &str, max_chars: usize)
        -> Result<String, GenerationError>;
}

#[async_trait]
pub trait ImageService: Send + Sync {
    /// Render an image and return the URL it can be fetched from.
    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError>;

    async fn download_image(&self, url: &str) -> Result<Vec<u8>, GenerationError>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<String, UploadError>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn create_image_record(&self, url: &str, prompt: &str) -> Result<Uuid, PersistenceError>;

    /// Write the whole batch atomically.
    async fn bulk_create_posts(&self, posts: &[FinalPost]) -> Result<(), PersistenceError>;
}

/// Every collaborator a run needs.
#[derive(Clone)]
pub struct Collaborators {
    pub text: Arc<dyn TextPlanService>,
    pub analyzer: Arc<dyn ReferenceAnalyzer>,
    pub prompts: Arc<dyn PromptService>,
    pub images: Arc<dyn ImageService>,
    pub blobs: Arc<dyn BlobStore>,
    pub store: Arc<dyn PostStore>,
}
