pub mod context;
pub mod ddq;
pub mod memo;
pub mod pipeline;

pub use ddq::DdqEngine;
pub use memo::MemoEngine;
pub use pipeline::*;

use crate::config::{AssessmentConfig, ProviderKind};

/// Settings shared by the DDQ and IM engines.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub provider: ProviderKind,
    pub document_char_limit: usize,
    pub prompt_token_budget: usize,
    pub strict_validation: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from_config(&AssessmentConfig::default())
    }
}

impl EngineOptions {
    pub fn from_config(config: &AssessmentConfig) -> Self {
        Self {
            provider: config.default_provider,
            document_char_limit: config.document_char_limit,
            prompt_token_budget: config.prompt_token_budget,
            strict_validation: config.strict_validation,
        }
    }
}
