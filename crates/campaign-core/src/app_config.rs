#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub ai_api_key: String,
    pub ai_base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub image_size: String,
    pub blob_base_url: String,
    pub blob_token: Option<String>,
    pub request_timeout_secs: u64,
    pub call_timeout_secs: u64,
    pub image_rate_limit: u32,
    pub image_rate_window_secs: u64,
    pub max_prompt_chars: usize,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("ai_api_key", &"[redacted]")
            .field("ai_base_url", &self.ai_base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("image_size", &self.image_size)
            .field("blob_base_url", &self.blob_base_url)
            .field(
                "blob_token",
                &self.blob_token.as_ref().map(|_| "[redacted]"),
            )
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("call_timeout_secs", &self.call_timeout_secs)
            .field("image_rate_limit", &self.image_rate_limit)
            .field("image_rate_window_secs", &self.image_rate_window_secs)
            .field("max_prompt_chars", &self.max_prompt_chars)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
