use log::{debug, error, info, warn};
use std::sync::Arc;

use crate::assessment::context::{build_im_prompt, estimate_tokens};
use crate::assessment::EngineOptions;
use crate::error::{AssessmentError, Result};
use crate::knowledge::KnowledgeBase;
use crate::llm::prompts::IM_SYSTEM_PROMPT;
use crate::llm::LlmGateway;
use crate::rubric::validate_ddq;
use crate::schema::{CompanyProfile, DdqResult, ImResult};

/// Produces the Investment Memo from a profile and its completed DDQ.
pub struct MemoEngine {
    gateway: Arc<LlmGateway>,
    knowledge: Arc<KnowledgeBase>,
    options: EngineOptions,
}

impl MemoEngine {
    pub fn new(
        gateway: Arc<LlmGateway>,
        knowledge: Arc<KnowledgeBase>,
        options: EngineOptions,
    ) -> Self {
        Self {
            gateway,
            knowledge,
            options,
        }
    }

    /// Rejects a DDQ that is a placeholder or does not match the rubric.
    ///
    /// The memo quotes DDQ findings by area, so fabricated DDQ content would
    /// carry straight into it.
    pub fn check_ddq(ddq: &DdqResult) -> Result<()> {
        if ddq.is_placeholder() {
            return Err(AssessmentError::IncompleteDdq(
                "no DDQ findings supplied; run the DDQ stage first".to_string(),
            ));
        }
        validate_ddq(ddq).map_err(|e| AssessmentError::IncompleteDdq(e.to_string()))
    }

    pub async fn generate(
        &self,
        profile: &CompanyProfile,
        ddq: &DdqResult,
        extracted_text: Option<&str>,
    ) -> Result<ImResult> {
        Self::check_ddq(ddq).inspect_err(|e| {
            warn!("IM for {} rejected before generation: {}", profile.company_name, e);
        })?;

        let knowledge = self.knowledge.load().await.inspect_err(|e| {
            error!("IM for {} aborted: {}", profile.company_name, e);
        })?;

        info!("Generating Investment Memo for {}", profile.company_name);

        let prompt = build_im_prompt(
            profile,
            ddq,
            extracted_text,
            &knowledge,
            self.options.document_char_limit,
        )?;

        let estimated = estimate_tokens(&prompt) + estimate_tokens(IM_SYSTEM_PROMPT);
        debug!("IM prompt: {} chars, ~{} tokens", prompt.len(), estimated);
        if estimated > self.options.prompt_token_budget {
            warn!(
                "IM prompt for {} is ~{} tokens, over the {} token budget",
                profile.company_name, estimated, self.options.prompt_token_budget
            );
        }

        let memo: ImResult = self
            .gateway
            .call_json(&prompt, Some(IM_SYSTEM_PROMPT), self.options.provider)
            .await
            .inspect_err(|e| {
                error!(
                    "IM generation failed for {} at stage llm: {}",
                    profile.company_name, e
                );
            })?;

        if memo.risk_category.excludes_investment() {
            warn!(
                "{} classified as {}: excluded from investment",
                profile.company_name,
                memo.risk_category.label()
            );
        }

        info!("Investment Memo generated for {}", profile.company_name);
        Ok(memo)
    }
}
