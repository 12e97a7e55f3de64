//! HTTP clients for the services the campaign pipeline depends on.
//!
//! [`GenerationClient`] speaks the OpenAI-compatible chat and image APIs and
//! covers text plans, reference-image analysis, image prompts and image
//! rendering. [`BlobClient`] stores rendered image bytes.

pub mod blob;
pub mod client;
pub mod error;
pub mod language;
pub mod plan;
pub mod prompts;

pub use blob::{blob_name, BlobClient};
pub use client::GenerationClient;
pub use error::{GenerationError, UploadError};
pub use language::{detect_language, Language};
pub use plan::{parse_plan, ChannelPlans, PlanRequest};
