use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ProviderKind;
use crate::error::{AssessmentError, Result};
use crate::llm::json::parse_json_response;
use crate::llm::prompts::JSON_ONLY_INSTRUCTION;

#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    /// Ask the provider for JSON-biased decoding
    pub json_mode: bool,
    /// Let the provider consult live web search where it supports it
    pub web_search: bool,
}

impl LlmRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn system(mut self, system_prompt: Option<&str>) -> Self {
        self.system_prompt = system_prompt.map(str::to_string);
        self
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }

    pub fn web_search(mut self) -> Self {
        self.web_search = true;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub usage: Option<TokenUsage>,
}

/// One chat-completion backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse>;
}

/// Uniform call surface over the configured providers.
#[derive(Clone)]
pub struct LlmGateway {
    providers: BTreeMap<ProviderKind, Arc<dyn LlmProvider>>,
    default_provider: ProviderKind,
    timeout: Option<Duration>,
}

impl LlmGateway {
    pub fn new(default_provider: ProviderKind) -> Self {
        Self {
            providers: BTreeMap::new(),
            default_provider,
            timeout: None,
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    /// Upper bound applied to every call, on top of any client-level timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Registers an HTTP provider for every configured credential.
    #[cfg(feature = "providers")]
    pub fn from_config(config: &crate::config::AssessmentConfig) -> Result<Self> {
        use crate::llm::gemini::GeminiProvider;
        use crate::llm::openai::OpenAiProvider;

        config.validate()?;

        let mut gateway =
            Self::new(config.default_provider).with_timeout(config.request_timeout());

        if let Some(key) = config.credential(ProviderKind::Gemini) {
            let provider =
                GeminiProvider::new(key, &config.gemini_model, config.request_timeout())?;
            gateway = gateway.with_provider(Arc::new(provider));
        }
        if let Some(key) = config.credential(ProviderKind::OpenAi) {
            let provider =
                OpenAiProvider::new(key, &config.openai_model, config.request_timeout())?;
            gateway = gateway.with_provider(Arc::new(provider));
        }

        Ok(gateway)
    }

    pub fn default_provider(&self) -> ProviderKind {
        self.default_provider
    }

    pub async fn send(&self, request: &LlmRequest, provider: ProviderKind) -> Result<LlmResponse> {
        let backend = self
            .providers
            .get(&provider)
            .ok_or(AssessmentError::Authentication { provider })?;

        debug!(
            "Calling {} (prompt: {} chars, json: {}, web search: {})",
            provider,
            request.prompt.len(),
            request.json_mode,
            request.web_search
        );

        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, backend.complete(request))
                .await
                .map_err(|_| AssessmentError::Timeout {
                    provider,
                    after: limit,
                })??,
            None => backend.complete(request).await?,
        };

        if let Some(usage) = response.usage {
            debug!(
                "{} usage: {} prompt + {} completion = {} tokens",
                provider,
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total()
            );
        }

        Ok(response)
    }

    pub async fn call(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        provider: ProviderKind,
    ) -> Result<LlmResponse> {
        let request = LlmRequest::new(prompt).system(system_prompt);
        self.send(&request, provider).await
    }

    /// Calls the provider and parses the reply as `T`.
    ///
    /// The shape of `T` is the only check made here; rubric validation is the
    /// caller's job.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        provider: ProviderKind,
    ) -> Result<T> {
        let request = LlmRequest::new(format!("{}{}", prompt, JSON_ONLY_INSTRUCTION))
            .system(system_prompt)
            .json();
        let response = self.send(&request, provider).await?;

        if response.content.trim().is_empty() {
            warn!("{} returned a blank response to a JSON request", provider);
            return Err(AssessmentError::EmptyResponse { provider });
        }

        parse_json_response(&response.content)
    }
}

/// Maps a non-success HTTP status to the gateway's error taxonomy.
pub fn classify_http_failure(provider: ProviderKind, status: u16, body: &str) -> AssessmentError {
    match status {
        401 | 403 => AssessmentError::Authentication { provider },
        429 => AssessmentError::RateLimited {
            provider,
            details: crate::error::preview(body),
        },
        _ => AssessmentError::Transport {
            provider,
            details: format!("status {}: {}", status, crate::error::preview(body)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::sync::Mutex;

    struct ScriptedProvider {
        reply: String,
        delay: Option<Duration>,
        seen: Mutex<Vec<LlmRequest>>,
    }

    impl ScriptedProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                delay: None,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Gemini
        }

        async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
            self.seen.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Ok(LlmResponse {
                content: self.reply.clone(),
                usage: Some(TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 2,
                }),
            })
        }
    }

    #[tokio::test]
    async fn test_missing_provider_is_authentication_error() {
        let gateway = LlmGateway::new(ProviderKind::Gemini);
        let err = gateway
            .call("hi", None, ProviderKind::OpenAi)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AssessmentError::Authentication {
                provider: ProviderKind::OpenAi
            }
        ));
    }

    #[tokio::test]
    async fn test_call_json_appends_instruction_and_parses() {
        let provider = Arc::new(ScriptedProvider::new("```json\n{\"ok\": true}\n```"));
        let gateway = LlmGateway::new(ProviderKind::Gemini).with_provider(provider.clone());

        let value: Value = gateway
            .call_json("Assess this", Some("system"), ProviderKind::Gemini)
            .await
            .unwrap();
        assert_eq!(value["ok"], true);

        let seen = provider.seen.lock().unwrap();
        assert!(seen[0].prompt.starts_with("Assess this"));
        assert!(seen[0].prompt.contains("valid JSON only"));
        assert!(seen[0].json_mode);
        assert_eq!(seen[0].system_prompt.as_deref(), Some("system"));
    }

    #[tokio::test]
    async fn test_blank_response_is_empty_response_error() {
        let provider = Arc::new(ScriptedProvider::new("   \n"));
        let gateway = LlmGateway::new(ProviderKind::Gemini).with_provider(provider);
        let err = gateway
            .call_json::<Value>("x", None, ProviderKind::Gemini)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::EmptyResponse { .. }));
    }

    #[tokio::test]
    async fn test_gateway_timeout() {
        let provider = Arc::new(ScriptedProvider {
            delay: Some(Duration::from_millis(200)),
            ..ScriptedProvider::new("{}")
        });
        let gateway = LlmGateway::new(ProviderKind::Gemini)
            .with_provider(provider)
            .with_timeout(Duration::from_millis(10));
        let err = gateway
            .call("x", None, ProviderKind::Gemini)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::Timeout { .. }));
    }

    #[test]
    fn test_http_failure_classification() {
        assert!(matches!(
            classify_http_failure(ProviderKind::Gemini, 401, ""),
            AssessmentError::Authentication { .. }
        ));
        assert!(matches!(
            classify_http_failure(ProviderKind::OpenAi, 429, "slow down"),
            AssessmentError::RateLimited { .. }
        ));
        assert!(matches!(
            classify_http_failure(ProviderKind::OpenAi, 500, "boom"),
            AssessmentError::Transport { .. }
        ));
    }
}
