//! Post text to image prompt.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::call::guarded;
use crate::error::StageError;
use crate::services::PromptService;

/// Derives a raw image prompt from a post and compresses it to the image
/// service's length limit.
///
/// Derivation is best effort: when it fails the post text itself is
/// compressed instead. Compression failure is returned to the caller and
/// means the post gets no image.
#[derive(Clone)]
pub struct ImagePromptPipeline {
    prompts: Arc<dyn PromptService>,
    reference_summary: Option<Arc<str>>,
    max_chars: usize,
    call_timeout: Duration,
}

impl ImagePromptPipeline {
    #[must_use]
    pub fn new(
        prompts: Arc<dyn PromptService>,
        reference_summary: Option<String>,
        max_chars: usize,
        call_timeout: Duration,
    ) -> Self {
        Self {
            prompts,
            reference_summary: reference_summary.map(Arc::from),
            max_chars,
            call_timeout,
        }
    }

    /// # Errors
    ///
    /// Returns the compression call's [`StageError`], or
    /// [`StageError::Cancelled`] once `token` is cancelled.
    pub async fn prepare(
        &self,
        post_text: &str,
        token: &CancellationToken,
    ) -> Result<String, StageError> {
        let derived = guarded(
            "derive_prompt",
            self.call_timeout,
            token,
            self.prompts
                .derive_prompt(post_text, self.reference_summary.as_deref()),
        )
        .await;

        let raw = match derived {
            Ok(prompt) => prompt,
            Err(StageError::Cancelled) => return Err(StageError::Cancelled),
            Err(e) => {
                tracing::warn!(error = %e, "prompt derivation failed; using post text");
                post_text.to_owned()
            }
        };

        guarded(
            "compress_prompt",
            self.call_timeout,
            token,
            self.prompts.compress_prompt(&raw, self.max_chars),
        )
        .await
    }
}
