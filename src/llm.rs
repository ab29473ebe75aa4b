use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::remote::{ChatMessage, CompletionRequest, FailureReason, TextCompletion};

#[derive(Debug, Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client for the completion API")?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
        })
    }

    /// Client for `model`, or `None` when no API key is configured.
    pub fn from_config(config: &Config, model: &str) -> anyhow::Result<Option<Self>> {
        config
            .llm_api_key
            .as_ref()
            .map(|key| Self::new(&config.llm_base_url, key.clone(), model, config.remote_timeout))
            .transpose()
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn request_body<'a>(model: &'a str, request: &CompletionRequest) -> ChatCompletionBody<'a> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if let Some(system) = &request.system {
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: system.clone(),
        });
    }
    messages.extend(request.messages.iter().cloned());

    ChatCompletionBody {
        model,
        messages,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    }
}

impl TextCompletion for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, FailureReason> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body(&self.model, request))
            .send()
            .await
            .map_err(|error| FailureReason::from_reqwest(error, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FailureReason::Status(status.as_u16()));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|error| FailureReason::from_reqwest(error, self.timeout))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                FailureReason::Malformed("completion had no message content".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::tests::serve_once;

    fn client_for(url: &str) -> LlmClient {
        LlmClient::new(&format!("{url}/v1"), "key", "model", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn body_prepends_system_prompt() {
        let request = CompletionRequest {
            system: Some("be kind".to_string()),
            messages: vec![ChatMessage::user("hi")],
            temperature: Some(0.7),
            max_tokens: Some(500),
        };
        let body = serde_json::to_value(request_body("m", &request)).unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["max_tokens"], 500);

        let bare =
            serde_json::to_value(request_body("m", &CompletionRequest::prompt("x"))).unwrap();
        assert!(bare.get("temperature").is_none());
        assert_eq!(bare["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let url = serve_once(
            "200 OK",
            r#"{"choices":[{"message":{"role":"assistant","content":"[\"sad\"]"}}]}"#,
        )
        .await;
        let client = client_for(&url);
        let text = client.complete(&CompletionRequest::prompt("hi")).await.unwrap();
        assert_eq!(text, r#"["sad"]"#);
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let url = serve_once("429 Too Many Requests", "{}").await;
        let client = client_for(&url);
        let err = client.complete(&CompletionRequest::prompt("hi")).await.unwrap_err();
        assert_eq!(err, FailureReason::Status(429));
    }

    #[tokio::test]
    async fn empty_choices_are_malformed() {
        let url = serve_once("200 OK", r#"{"choices":[]}"#).await;
        let client = client_for(&url);
        let err = client.complete(&CompletionRequest::prompt("hi")).await.unwrap_err();
        assert!(matches!(err, FailureReason::Malformed(_)));
    }

    #[test]
    fn missing_key_means_no_client() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert!(LlmClient::from_config(&config, "m").unwrap().is_none());
    }
}
