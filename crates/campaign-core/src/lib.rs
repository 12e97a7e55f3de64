//! Domain types, cadence policy and configuration shared by the campaign
//! content pipeline crates.

pub mod app_config;
pub mod cadence;
pub mod campaign;
pub mod config;
pub mod posts;

pub use app_config::{AppConfig, Environment};
pub use cadence::{cadence_for, CadenceRule};
pub use campaign::{
    load_campaign, parse_campaign, CampaignRequest, CampaignSpec, CampaignType, CaseStudy,
    ChannelId, ContentLength,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use posts::{derive_title, FinalPost, PostDraft};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read campaign file {path}: {source}")]
    CampaignFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse campaign file: {0}")]
    CampaignFileParse(#[from] serde_yaml::Error),

    #[error("campaign validation failed: {0}")]
    Validation(String),
}
