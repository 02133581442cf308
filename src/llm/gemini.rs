use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

use crate::config::ProviderKind;
use crate::error::{AssessmentError, Result};
use crate::llm::gateway::{classify_http_failure, LlmProvider, LlmRequest, LlmResponse, TokenUsage};
use crate::llm::types::*;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiProvider {
    pub fn new(api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
            timeout,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn build_payload(request: &LlmRequest) -> GenerateContentRequest {
        // Gemini rejects a JSON response type combined with tools.
        let mime_type = if request.json_mode && !request.web_search {
            "application/json"
        } else {
            "text/plain"
        };

        GenerateContentRequest {
            contents: vec![Content::user(request.prompt.clone())],
            system_instruction: request.system_prompt.as_ref().map(Content::system),
            generation_config: GenerationConfig {
                response_mime_type: mime_type.to_string(),
                temperature: Some(0.2),
            },
            tools: if request.web_search {
                vec![json!({ "google_search": {} })]
            } else {
                Vec::new()
            },
        }
    }

    fn map_send_error(&self, err: reqwest::Error) -> AssessmentError {
        if err.is_timeout() {
            AssessmentError::Timeout {
                provider: ProviderKind::Gemini,
                after: self.timeout,
            }
        } else {
            // error text reaches users verbatim; drop the request URL
            transport(err.without_url().to_string())
        }
    }
}

fn transport(details: String) -> AssessmentError {
    AssessmentError::Transport {
        provider: ProviderKind::Gemini,
        details,
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let payload = Self::build_payload(request);

        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;
        let status = res.status();

        if !status.is_success() {
            let err_text = res.text().await.unwrap_or_default();
            return Err(classify_http_failure(
                ProviderKind::Gemini,
                status.as_u16(),
                &err_text,
            ));
        }

        let body: GenerateContentResponse =
            res.json().await.map_err(|e| self.map_send_error(e))?;

        let content = body
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.text())
            .unwrap_or_default();

        let usage = body.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
        });

        Ok(LlmResponse { content, usage })
    }
}
