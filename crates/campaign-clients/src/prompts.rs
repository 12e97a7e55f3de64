//! Image-prompt calls: reference analysis, prompt derivation and compression.

use serde_json::{json, Value};

use crate::client::GenerationClient;
use crate::error::GenerationError;

impl GenerationClient {
    /// Summarises the visual style of the case study's reference images.
    ///
    /// Run once per campaign; the summary is shared by every post's prompt.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the chat call fails or returns nothing.
    pub async fn analyze_references(&self, image_urls: &[String]) -> Result<String, GenerationError> {
        let mut content: Vec<Value> = vec![json!({
            "type": "text",
            "text": "Describe the shared visual style of these reference images: \
                     palette, lighting, composition, subjects and mood. \
                     Answer in one short paragraph."
        })];
        content.extend(
            image_urls
                .iter()
                .map(|url| json!({ "type": "image_url", "image_url": { "url": url } })),
        );

        let messages = json!([{ "role": "user", "content": content }]);
        self.chat("reference analysis", messages, false).await
    }

    /// Writes an image-generation prompt for one post.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the chat call fails or returns nothing.
    pub async fn derive_prompt(
        &self,
        post_text: &str,
        reference_summary: Option<&str>,
    ) -> Result<String, GenerationError> {
        let style = reference_summary.map_or_else(String::new, |summary| {
            format!("Match this visual style:\n{summary}\n\n")
        });
        let messages = json!([
            {
                "role": "system",
                "content": "You write prompts for an image generation model. \
                            Reply with the prompt only. Never ask for text in the image."
            },
            {
                "role": "user",
                "content": format!("{style}Write an image prompt illustrating this social media post:\n{post_text}")
            }
        ]);
        self.chat("prompt derivation", messages, false).await
    }

    /// Rewrites `prompt` to at most `max_chars` characters.
    ///
    /// The reply is additionally cut on a character boundary if the service
    /// overshoots, so the result never exceeds `max_chars`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError`] if the chat call fails or returns nothing.
    pub async fn compress_prompt(
        &self,
        prompt: &str,
        max_chars: usize,
    ) -> Result<String, GenerationError> {
        let messages = json!([
            {
                "role": "system",
                "content": "You shorten image generation prompts without losing the subject or style. \
                            Reply with the shortened prompt only."
            },
            {
                "role": "user",
                "content": format!("Rewrite this prompt in at most {max_chars} characters:\n{prompt}")
            }
        ]);
        let compressed = self.chat("prompt compression", messages, false).await?;
        Ok(truncate_chars(&compressed, max_chars))
    }
}

/// Keep at most `max_chars` characters of `text`.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_owned(),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_chars_keeps_short_text() {
        assert_eq!(truncate_chars("hello", 10), "hello");
    }

    #[test]
    fn truncate_chars_cuts_at_limit() {
        assert_eq!(truncate_chars("hello world", 5), "hello");
    }

    #[test]
    fn truncate_chars_respects_char_boundaries() {
        let text = "שלום עולם";
        let cut = truncate_chars(text, 4);
        assert_eq!(cut, "שלום");
    }

    #[test]
    fn truncate_chars_exact_length_is_unchanged() {
        assert_eq!(truncate_chars("abc", 3), "abc");
    }
}
