use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{parse_labels, EmotionAnalysis, Language, RiskLevel};

/// Why a remote tier did not produce a usable answer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FailureReason {
    #[error("capability is not configured")]
    NotConfigured,

    #[error("request failed: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("remote returned HTTP {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("unusable response: {0}")]
    Unusable(String),
}

impl FailureReason {
    pub fn from_reqwest(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            FailureReason::Timeout(timeout)
        } else if error.is_decode() {
            FailureReason::Malformed(error.to_string())
        } else if let Some(status) = error.status() {
            FailureReason::Status(status.as_u16())
        } else {
            FailureReason::Transport(error.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn prompt(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            messages: vec![ChatMessage::user(prompt)],
            temperature: None,
            max_tokens: None,
        }
    }
}

/// Free-form text completion (an LLM behind an HTTP API).
pub trait TextCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, FailureReason>;
}

/// Payload posted to the structured-analysis webhook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub subject_id: String,
    pub journal_text: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub language: Language,
}

/// Body returned by the structured-analysis webhook, before validation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAnalysis {
    pub emotions: Vec<String>,
    pub mood_score: f64,
    #[serde(default)]
    pub insights: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub risk_level: RiskLevel,
}

impl RemoteAnalysis {
    /// Checks the shape against the analysis invariants: at least one known
    /// label and a finite mood score, which is rounded and clamped to 1..=10.
    pub fn into_analysis(self) -> Result<EmotionAnalysis, FailureReason> {
        let emotions = parse_labels(&self.emotions).ok_or_else(|| {
            FailureReason::Unusable(format!("no known emotion in {:?}", self.emotions))
        })?;
        if !self.mood_score.is_finite() {
            return Err(FailureReason::Unusable("mood score is not a number".to_string()));
        }
        let mood_score = self.mood_score.round().clamp(1.0, 10.0) as u8;

        Ok(EmotionAnalysis {
            emotions,
            mood_score,
            insights: self.insights,
            recommendations: self.recommendations,
            risk_level: self.risk_level,
        })
    }
}

/// Structured journal analysis (the automation webhook).
pub trait StructuredAnalysis {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<RemoteAnalysis, FailureReason>;
}

impl<T: TextCompletion> TextCompletion for Option<T> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, FailureReason> {
        match self {
            Some(inner) => inner.complete(request).await,
            None => Err(FailureReason::NotConfigured),
        }
    }
}

impl<T: StructuredAnalysis> StructuredAnalysis for Option<T> {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<RemoteAnalysis, FailureReason> {
        match self {
            Some(inner) => inner.analyze(request).await,
            None => Err(FailureReason::NotConfigured),
        }
    }
}
