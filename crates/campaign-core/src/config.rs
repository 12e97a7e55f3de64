use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = require("DATABASE_URL")?;
    let ai_api_key = require("CAMPAIGN_AI_API_KEY")?;

    let env = parse_environment(&or_default("CAMPAIGN_ENV", "development"))?;
    let log_level = or_default("CAMPAIGN_LOG_LEVEL", "info");

    let ai_base_url = or_default("CAMPAIGN_AI_BASE_URL", "https://api.openai.com/v1");
    let text_model = or_default("CAMPAIGN_TEXT_MODEL", "gpt-4o-mini");
    let image_model = or_default("CAMPAIGN_IMAGE_MODEL", "dall-e-3");
    let image_size = or_default("CAMPAIGN_IMAGE_SIZE", "1024x1024");
    let blob_base_url = or_default(
        "CAMPAIGN_BLOB_BASE_URL",
        "http://localhost:9000/campaign-images",
    );
    let blob_token = lookup("CAMPAIGN_BLOB_TOKEN").ok();

    let request_timeout_secs = parse_or(&lookup, "CAMPAIGN_REQUEST_TIMEOUT_SECS", 120_u64)?;
    let call_timeout_secs = parse_or(&lookup, "CAMPAIGN_CALL_TIMEOUT_SECS", 180_u64)?;
    let image_rate_limit = parse_or(&lookup, "CAMPAIGN_IMAGE_RATE_LIMIT", 6_u32)?;
    let image_rate_window_secs = parse_or(&lookup, "CAMPAIGN_IMAGE_RATE_WINDOW_SECS", 60_u64)?;
    let max_prompt_chars = parse_or(&lookup, "CAMPAIGN_MAX_PROMPT_CHARS", 1000_usize)?;

    require_positive("CAMPAIGN_IMAGE_RATE_LIMIT", u64::from(image_rate_limit))?;
    require_positive("CAMPAIGN_IMAGE_RATE_WINDOW_SECS", image_rate_window_secs)?;

    let db_max_connections = parse_or(&lookup, "CAMPAIGN_DB_MAX_CONNECTIONS", 10_u32)?;
    let db_min_connections = parse_or(&lookup, "CAMPAIGN_DB_MIN_CONNECTIONS", 1_u32)?;
    let db_acquire_timeout_secs = parse_or(&lookup, "CAMPAIGN_DB_ACQUIRE_TIMEOUT_SECS", 10_u64)?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        ai_api_key,
        ai_base_url,
        text_model,
        image_model,
        image_size,
        blob_base_url,
        blob_token,
        request_timeout_secs,
        call_timeout_secs,
        image_rate_limit,
        image_rate_window_secs,
        max_prompt_chars,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse `var` when set; fall back to `default` when it is absent.
fn parse_or<T, F>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    match lookup(var) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        Err(_) => Ok(default),
    }
}

fn require_positive(var: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "production" => Ok(Environment::Production),
        "test" => Ok(Environment::Test),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CAMPAIGN_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
