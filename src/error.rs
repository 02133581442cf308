use std::time::Duration;

use thiserror::Error;

use crate::config::ProviderKind;

#[derive(Error, Debug)]
pub enum AssessmentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Knowledge base unavailable: {0}")]
    KnowledgeBaseUnavailable(String),

    #[error("Evidence query '{query}' for {company} failed: {details}")]
    EvidenceQuery {
        company: String,
        query: String,
        details: String,
    },

    #[error("No credential configured for provider {provider}")]
    Authentication { provider: ProviderKind },

    #[error("Provider {provider} rate limited the request: {details}")]
    RateLimited {
        provider: ProviderKind,
        details: String,
    },

    #[error("Provider {provider} timed out after {after:?}")]
    Timeout {
        provider: ProviderKind,
        after: Duration,
    },

    #[error("Provider {provider} transport error: {details}")]
    Transport {
        provider: ProviderKind,
        details: String,
    },

    #[error("Provider {provider} returned an empty response")]
    EmptyResponse { provider: ProviderKind },

    #[error("Malformed JSON in model response: {details} (response preview: {preview})")]
    MalformedJson { details: String, preview: String },

    #[error("Schema mismatch in {category}: {details}")]
    SchemaMismatch { category: String, details: String },

    #[error("DDQ result is incomplete or a placeholder: {0}")]
    IncompleteDdq(String),

    #[error("Company profile still missing required fields after {attempts} attempts: {}", .missing.join(", "))]
    ValidationIncomplete { missing: Vec<String>, attempts: usize },

    #[error("Unsupported document '{name}' ({mime_type})")]
    UnsupportedDocument { name: String, mime_type: String },

    #[error("Document '{0}' contains no extractable text")]
    EmptyDocument(String),

    #[error("Document '{name}' is corrupted: {details}")]
    CorruptedDocument { name: String, details: String },

    #[error("Document extraction timed out after {0:?}")]
    ExtractionTimeout(Duration),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AssessmentError {
    /// Gateway failures a caller may reasonably retry. Engines never retry themselves.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AssessmentError::RateLimited { .. }
                | AssessmentError::Timeout { .. }
                | AssessmentError::Transport { .. }
                | AssessmentError::ExtractionTimeout(_)
        )
    }

    pub fn malformed_json(details: impl Into<String>, raw: &str) -> Self {
        AssessmentError::MalformedJson {
            details: details.into(),
            preview: preview(raw),
        }
    }
}

const PREVIEW_CHARS: usize = 300;

/// First few hundred characters of a raw response, for operator diagnosis.
pub fn preview(raw: &str) -> String {
    let mut chars = raw.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

pub type Result<T> = std::result::Result<T, AssessmentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_long_responses() {
        let raw = "x".repeat(1000);
        let p = preview(&raw);
        assert_eq!(p.len(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_retryable_kinds() {
        let rate = AssessmentError::RateLimited {
            provider: ProviderKind::Gemini,
            details: "429".to_string(),
        };
        let auth = AssessmentError::Authentication {
            provider: ProviderKind::OpenAi,
        };
        assert!(rate.is_retryable());
        assert!(!auth.is_retryable());
        assert!(!AssessmentError::malformed_json("bad", "{").is_retryable());
    }
}
