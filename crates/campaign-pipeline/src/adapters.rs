//! Production bindings of the collaborator traits.

use std::sync::Arc;

use async_trait::async_trait;
use campaign_clients::{
    BlobClient, ChannelPlans, GenerationClient, GenerationError, PlanRequest, UploadError,
};
use campaign_core::FinalPost;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::services::{
    BlobStore, Collaborators, ImageService, PostStore, PromptService, ReferenceAnalyzer,
    TextPlanService,
};

const IMAGE_CONTENT_TYPE: &str = "image/png";

#[async_trait]
impl TextPlanService for GenerationClient {
    async fn generate_plan(&self, request: &PlanRequest) -> Result<ChannelPlans, GenerationError> {
        GenerationClient::generate_plan(self, request).await
    }
}

#[async_trait]
impl ReferenceAnalyzer for GenerationClient {
    async fn analyze(&self, image_urls: &[String]) -> Result<String, GenerationError> {
        self.analyze_references(image_urls).await
    }
}

#[async_trait]
impl PromptService for GenerationClient {
    async fn derive_prompt(
        &self,
        post_text: &str,
        reference_summary: Option<&str>,
    ) -> Result<String, GenerationError> {
        GenerationClient::derive_prompt(self, post_text, reference_summary).await
    }

    async fn compress_prompt(
        &self,
        prompt: &str,
        max_chars: usize,
    ) -> Result<String, GenerationError> {
        GenerationClient::compress_prompt(self, prompt, max_chars).await
    }
}

#[async_trait]
impl ImageService for GenerationClient {
    async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError> {
        GenerationClient::generate_image(self, prompt).await
    }

    async fn download_image(&self, url: &str) -> Result<Vec<u8>, GenerationError> {
        GenerationClient::download_image(self, url).await
    }
}

#[async_trait]
impl BlobStore for BlobClient {
    async fn upload(&self, name: &str, bytes: Vec<u8>) -> Result<String, UploadError> {
        BlobClient::upload(self, name, bytes, IMAGE_CONTENT_TYPE).await
    }
}

/// [`PostStore`] backed by the Postgres tables in `campaign-db`.
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn create_image_record(&self, url: &str, prompt: &str) -> Result<Uuid, PersistenceError> {
        Ok(campaign_db::create_image_record(&self.pool, url, prompt).await?)
    }

    async fn bulk_create_posts(&self, posts: &[FinalPost]) -> Result<(), PersistenceError> {
        let inserted = campaign_db::bulk_create_posts(&self.pool, posts).await?;
        tracing::debug!(inserted, "campaign posts inserted");
        Ok(())
    }
}

impl Collaborators {
    /// Wire one generation client (text, prompts, images), a blob store and
    /// the Postgres store into a collaborator set.
    #[must_use]
    pub fn from_clients(
        generation: Arc<GenerationClient>,
        blobs: Arc<BlobClient>,
        store: PgPostStore,
    ) -> Self {
        Self {
            text: generation.clone(),
            analyzer: generation.clone(),
            prompts: generation.clone(),
            images: generation,
            blobs,
            store: Arc::new(store),
        }
    }
}
