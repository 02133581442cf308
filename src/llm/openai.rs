use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::ProviderKind;
use crate::error::{AssessmentError, Result};
use crate::llm::gateway::{classify_http_failure, LlmProvider, LlmRequest, LlmResponse, TokenUsage};
use crate::llm::types::*;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI-compatible chat completions backend.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiProvider {
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            base_url: OPENAI_API_BASE.to_string(),
            timeout,
        })
    }

    /// Point at another OpenAI-compatible endpoint (e.g. OpenRouter).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_payload(&self, request: &LlmRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system_prompt {
            messages.push(ChatMessage::new("system", system.clone()));
        }
        messages.push(ChatMessage::new("user", request.prompt.clone()));

        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: Some(0.2),
            response_format: request.json_mode.then(|| ResponseFormat {
                kind: "json_object".to_string(),
            }),
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> AssessmentError {
        if err.is_timeout() {
            AssessmentError::Timeout {
                provider: ProviderKind::OpenAi,
                after: self.timeout,
            }
        } else {
            transport(err.without_url().to_string())
        }
    }
}

fn transport(details: String) -> AssessmentError {
    AssessmentError::Transport {
        provider: ProviderKind::OpenAi,
        details,
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_payload(request);

        let res = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await.unwrap_or_default();
            return Err(classify_http_failure(
                ProviderKind::OpenAi,
                status.as_u16(),
                &err_text,
            ));
        }

        let parsed: ChatResponse = res.json().await.map_err(|e| self.map_send_error(e))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        let usage = parsed.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        });

        Ok(LlmResponse { content, usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_messages_and_json_format() {
        let provider = OpenAiProvider::new("sk-test", "gpt-4o", Duration::from_secs(5)).unwrap();
        let request = LlmRequest::new("user text").system(Some("sys")).json();
        let payload = provider.build_payload(&request);
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "user text");
        assert_eq!(value["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_plain_payload_omits_response_format() {
        let provider = OpenAiProvider::new("sk-test", "gpt-4o", Duration::from_secs(5)).unwrap();
        let value = serde_json::to_value(provider.build_payload(&LlmRequest::new("q"))).unwrap();
        assert!(value.get("response_format").is_none());
        assert_eq!(value["messages"].as_array().unwrap().len(), 1);
    }
}
