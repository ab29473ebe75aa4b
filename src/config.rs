use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_EMOTION_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: Option<String>,
    pub webhook_url: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub emotion_model: String,
    pub secondary_emotion_model: Option<String>,
    pub chat_model: String,
    pub remote_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let timeout_secs = match get("SOCHO_REMOTE_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| {
                    format!("SOCHO_REMOTE_TIMEOUT_SECS must be whole seconds, got {raw:?}")
                })?,
            None => DEFAULT_REMOTE_TIMEOUT_SECS,
        };

        Ok(Self {
            database_url: get("DATABASE_URL"),
            webhook_url: get("N8N_WEBHOOK_URL"),
            llm_api_key: get("GROQ_API_KEY"),
            llm_base_url: get("SOCHO_LLM_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            emotion_model: get("SOCHO_EMOTION_MODEL")
                .unwrap_or_else(|| DEFAULT_EMOTION_MODEL.to_string()),
            secondary_emotion_model: get("SOCHO_SECONDARY_EMOTION_MODEL"),
            chat_model: get("SOCHO_CHAT_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            remote_timeout: Duration::from_secs(timeout_secs.clamp(1, 60)),
        })
    }

    pub fn database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set to a production Postgres instance")
    }
}
