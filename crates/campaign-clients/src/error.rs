use thiserror::Error;

/// Any non-success from an AI generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("generation service returned no content for {0}")]
    EmptyResponse(String),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Blob store failure.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("blob store returned status {status} for {name}")]
    Status { status: u16, name: String },

    #[error("invalid blob store URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
