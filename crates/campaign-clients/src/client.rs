//! HTTP client for an OpenAI-compatible generation API.
//!
//! Wraps `reqwest` with bearer authentication, typed response decoding and
//! status-to-error mapping. Higher-level operations (plans, prompts) live in
//! [`crate::plan`] and [`crate::prompts`] and are built on [`GenerationClient::chat`].

use std::time::Duration;

use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::GenerationError;

/// Longest error body kept in [`GenerationError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Client for chat completions and image generation.
///
/// Use [`GenerationClient::new`] with a base URL such as
/// `https://api.openai.com/v1`, or point it at a mock server in tests.
pub struct GenerationClient {
    client: Client,
    base_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
    image_size: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}

impl GenerationClient {
    /// Creates a client with the configured timeout and models.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        base_url: &str,
        api_key: &str,
        text_model: &str,
        image_model: &str,
        image_size: &str,
        timeout_secs: u64,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("campaign-pipeline/0.1")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            text_model: text_model.to_owned(),
            image_model: image_model.to_owned(),
            image_size: image_size.to_owned(),
        })
    }

    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// See [`GenerationClient::new`].
    pub fn from_app_config(config: &campaign_core::AppConfig) -> Result<Self, GenerationError> {
        Self::new(
            &config.ai_base_url,
            &config.ai_api_key,
            &config.text_model,
            &config.image_model,
            &config.image_size,
            config.request_timeout_secs,
        )
    }

    /// Sends a chat completion and returns the first choice's text.
    ///
    /// When `json_mode` is set the service is asked for a JSON object
    /// response. `context` labels errors.
    ///
    /// # Errors
    ///
    /// - [`GenerationError::Http`] on network failure.
    /// - [`GenerationError::Status`] on a non-2xx response.
    /// - [`GenerationError::Deserialize`] if the envelope does not parse.
    /// - [`GenerationError::EmptyResponse`] if no choice carries content.
    pub async fn chat(
        &self,
        context: &str,
        messages: Value,
        json_mode: bool,
    ) -> Result<String, GenerationError> {
        let mut body = json!({
            "model": self.text_model,
            "messages": messages,
            "temperature": 0.7,
        });
        if json_mode {
            body["response_format"] = json!({ "type": "json_object" });
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let text = check_status(response).await?.text().await?;

        let envelope: ChatResponse =
            serde_json::from_str(&text).map_err(|e| GenerationError::Deserialize {
                context: context.to_owned(),
                source: e,
            })?;

        envelope
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| GenerationError::EmptyResponse(context.to_owned()))
    }

    /// Requests one rendered image for `prompt` and returns its URL.
    ///
    /// # Errors
    ///
    /// Same classes as [`GenerationClient::chat`]; a response without an
    /// image URL is [`GenerationError::EmptyResponse`].
    pub async fn generate_image(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = json!({
            "model": self.image_model,
            "prompt": prompt,
            "n": 1,
            "size": self.image_size,
            "response_format": "url",
        });

        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let text = check_status(response).await?.text().await?;

        let envelope: ImageResponse =
            serde_json::from_str(&text).map_err(|e| GenerationError::Deserialize {
                context: "images/generations".to_owned(),
                source: e,
            })?;

        envelope
            .data
            .into_iter()
            .find_map(|d| d.url)
            .ok_or_else(|| GenerationError::EmptyResponse("images/generations".to_owned()))
    }

    /// Downloads the bytes of a rendered image.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::Http`] or [`GenerationError::Status`] if the
    /// fetch fails, and [`GenerationError::EmptyResponse`] for a zero-length body.
    pub async fn download_image(&self, url: &str) -> Result<Vec<u8>, GenerationError> {
        let response = self.client.get(url).send().await?;
        let bytes = check_status(response).await?.bytes().await?;
        if bytes.is_empty() {
            return Err(GenerationError::EmptyResponse(format!("download {url}")));
        }
        Ok(bytes.to_vec())
    }
}

async fn check_status(response: Response) -> Result<Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body: String = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(MAX_ERROR_BODY_CHARS)
        .collect();
    Err(GenerationError::Status {
        status: status.as_u16(),
        body,
    })
}
