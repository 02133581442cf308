//! Runtime configuration for the assessment pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AssessmentError, Result};

/// The LLM backends the gateway can route to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenAi,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::OpenAi => write!(f, "openai"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = AssessmentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "primary" => Ok(ProviderKind::Gemini),
            "openai" | "secondary" => Ok(ProviderKind::OpenAi),
            other => Err(AssessmentError::Configuration(format!(
                "Unknown LLM provider '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentConfig {
    #[serde(default)]
    pub gemini_api_key: Option<String>,

    #[serde(default)]
    pub openai_api_key: Option<String>,

    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Provider used for DDQ and IM generation
    #[serde(default)]
    pub default_provider: ProviderKind,

    /// Provider used for evidence research queries
    #[serde(default)]
    pub research_provider: ProviderKind,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_extraction_timeout_secs")]
    pub extraction_timeout_secs: u64,

    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,

    #[serde(default)]
    pub evidence: EvidenceConfig,

    /// Characters of extracted document text placed in prompts
    #[serde(default = "default_document_char_limit")]
    pub document_char_limit: usize,

    /// Estimated prompt tokens above which a warning is logged
    #[serde(default = "default_prompt_token_budget")]
    pub prompt_token_budget: usize,

    /// Check DDQ area names and counts against the rubric after parsing
    #[serde(default = "default_true")]
    pub strict_validation: bool,
}

/// Where the Risk Management Framework text is read from.
///
/// The default has no `remote_url`, so only the local paths are tried and the
/// network fallback stays off until a URL is configured
/// (`ESG_KNOWLEDGE_BASE_URL` in [`AssessmentConfig::from_env`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBaseConfig {
    /// Local locations tried in order
    #[serde(default = "default_knowledge_paths")]
    pub local_paths: Vec<PathBuf>,

    /// Network fallback when no local copy is readable
    #[serde(default)]
    pub remote_url: Option<String>,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            local_paths: default_knowledge_paths(),
            remote_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceConfig {
    #[serde(default = "default_inter_query_delay_ms")]
    pub inter_query_delay_ms: u64,

    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,

    #[serde(default = "default_relevance_score")]
    pub default_relevance: f64,
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            inter_query_delay_ms: default_inter_query_delay_ms(),
            query_timeout_secs: default_query_timeout_secs(),
            default_relevance: default_relevance_score(),
        }
    }
}

impl EvidenceConfig {
    pub fn inter_query_delay(&self) -> Duration {
        Duration::from_millis(self.inter_query_delay_ms)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

fn default_true() -> bool {
    true
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

fn default_extraction_timeout_secs() -> u64 {
    300
}

fn default_knowledge_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("knowledge/rmf.md"),
        PathBuf::from("data/rmf.md"),
        PathBuf::from("rmf.md"),
    ]
}

fn default_inter_query_delay_ms() -> u64 {
    500
}

fn default_query_timeout_secs() -> u64 {
    60
}

fn default_relevance_score() -> f64 {
    0.8
}

fn default_document_char_limit() -> usize {
    5000
}

fn default_prompt_token_budget() -> usize {
    200_000
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            openai_api_key: None,
            gemini_model: default_gemini_model(),
            openai_model: default_openai_model(),
            default_provider: ProviderKind::default(),
            research_provider: ProviderKind::default(),
            request_timeout_secs: default_request_timeout_secs(),
            extraction_timeout_secs: default_extraction_timeout_secs(),
            knowledge_base: KnowledgeBaseConfig::default(),
            evidence: EvidenceConfig::default(),
            document_char_limit: default_document_char_limit(),
            prompt_token_budget: default_prompt_token_budget(),
            strict_validation: true,
        }
    }
}

impl AssessmentConfig {
    /// Build a configuration from process environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        config.gemini_api_key = non_empty_env("GEMINI_API_KEY");
        config.openai_api_key = non_empty_env("OPENAI_API_KEY");

        if let Some(model) = non_empty_env("ESG_GEMINI_MODEL") {
            config.gemini_model = model;
        }
        if let Some(model) = non_empty_env("ESG_OPENAI_MODEL") {
            config.openai_model = model;
        }
        if let Some(provider) = non_empty_env("ESG_DEFAULT_PROVIDER") {
            config.default_provider = provider.parse()?;
        } else if let Some(first) = config.available_providers().first() {
            config.default_provider = *first;
        }
        config.research_provider = config.default_provider;
        if let Some(path) = non_empty_env("ESG_KNOWLEDGE_BASE_PATH") {
            config.knowledge_base.local_paths.insert(0, PathBuf::from(path));
        }
        config.knowledge_base.remote_url = non_empty_env("ESG_KNOWLEDGE_BASE_URL");

        Ok(config)
    }

    pub fn credential(&self, provider: ProviderKind) -> Option<&str> {
        let key = match provider {
            ProviderKind::Gemini => self.gemini_api_key.as_deref(),
            ProviderKind::OpenAi => self.openai_api_key.as_deref(),
        };
        key.map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn available_providers(&self) -> Vec<ProviderKind> {
        [ProviderKind::Gemini, ProviderKind::OpenAi]
            .into_iter()
            .filter(|p| self.credential(*p).is_some())
            .collect()
    }

    /// Detects missing credentials before any core work begins.
    pub fn validate(&self) -> Result<()> {
        if self.available_providers().is_empty() {
            return Err(AssessmentError::Configuration(
                "No LLM credential configured. Set GEMINI_API_KEY or OPENAI_API_KEY.".to_string(),
            ));
        }

        for (role, provider) in [
            ("default", self.default_provider),
            ("research", self.research_provider),
        ] {
            if self.credential(provider).is_none() {
                return Err(AssessmentError::Configuration(format!(
                    "The {} provider '{}' has no credential configured",
                    role, provider
                )));
            }
        }

        if self.document_char_limit == 0 {
            return Err(AssessmentError::Configuration(
                "document_char_limit must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_credentials_is_configuration_error() {
        let config = AssessmentConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AssessmentError::Configuration(_)));
    }

    #[test]
    fn test_default_provider_must_have_credential() {
        let config = AssessmentConfig {
            openai_api_key: Some("sk-test".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AssessmentConfig {
            openai_api_key: Some("sk-test".to_string()),
            default_provider: ProviderKind::OpenAi,
            research_provider: ProviderKind::OpenAi,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_credential_is_ignored() {
        let config = AssessmentConfig {
            gemini_api_key: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(config.available_providers().is_empty());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: AssessmentConfig =
            serde_json::from_str(r#"{ "gemini_api_key": "abc", "default_provider": "openai" }"#)
                .unwrap();
        assert_eq!(config.default_provider, ProviderKind::OpenAi);
        assert_eq!(config.research_provider, ProviderKind::Gemini);
        assert_eq!(config.document_char_limit, 5000);
        assert_eq!(config.evidence.inter_query_delay_ms, 500);
        assert!(config.strict_validation);
    }

    #[test]
    fn test_provider_aliases() {
        assert_eq!("primary".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert_eq!("OpenAI".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert!("claude".parse::<ProviderKind>().is_err());
    }
}
