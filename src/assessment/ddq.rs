use log::{debug, error, info, warn};
use std::sync::Arc;

use crate::assessment::context::{build_ddq_prompt, estimate_tokens};
use crate::assessment::EngineOptions;
use crate::error::Result;
use crate::evidence::{EvidenceBundle, EvidenceGatherer};
use crate::knowledge::KnowledgeBase;
use crate::llm::prompts::DDQ_SYSTEM_PROMPT;
use crate::llm::LlmGateway;
use crate::rubric::{hedged_comments, validate_ddq};
use crate::schema::{CompanyProfile, DdqResult};

/// Produces the rubric-scored DDQ for one company.
pub struct DdqEngine {
    gateway: Arc<LlmGateway>,
    knowledge: Arc<KnowledgeBase>,
    evidence: EvidenceGatherer,
    options: EngineOptions,
}

impl DdqEngine {
    pub fn new(
        gateway: Arc<LlmGateway>,
        knowledge: Arc<KnowledgeBase>,
        evidence: EvidenceGatherer,
        options: EngineOptions,
    ) -> Self {
        Self {
            gateway,
            knowledge,
            evidence,
            options,
        }
    }

    /// Loads the framework, gathers evidence, and asks the model for the DDQ.
    ///
    /// Evidence failures only shrink the evidence; a missing framework or any
    /// gateway failure is returned unchanged. Nothing is retried here.
    pub async fn generate(
        &self,
        profile: &CompanyProfile,
        extracted_text: Option<&str>,
    ) -> Result<DdqResult> {
        let knowledge = self.knowledge.load().await.inspect_err(|e| {
            error!("DDQ for {} aborted: {}", profile.company_name, e);
        })?;

        let evidence = self.evidence.gather_all(&profile.company_name).await;
        self.generate_with_evidence(profile, extracted_text, &evidence, &knowledge)
            .await
    }

    /// Same as [`generate`](Self::generate) with evidence gathered by the caller.
    pub async fn generate_with_evidence(
        &self,
        profile: &CompanyProfile,
        extracted_text: Option<&str>,
        evidence: &EvidenceBundle,
        knowledge: &str,
    ) -> Result<DdqResult> {
        info!(
            "Generating DDQ for {} ({} evidence results, {} failed queries)",
            profile.company_name,
            evidence.total_results(),
            evidence.failures.len()
        );

        let prompt = build_ddq_prompt(
            profile,
            extracted_text,
            evidence,
            knowledge,
            self.options.document_char_limit,
        )?;

        let estimated = estimate_tokens(&prompt) + estimate_tokens(DDQ_SYSTEM_PROMPT);
        debug!("DDQ prompt: {} chars, ~{} tokens", prompt.len(), estimated);
        if estimated > self.options.prompt_token_budget {
            warn!(
                "DDQ prompt for {} is ~{} tokens, over the {} token budget",
                profile.company_name, estimated, self.options.prompt_token_budget
            );
        }

        let ddq: DdqResult = self
            .gateway
            .call_json(&prompt, Some(DDQ_SYSTEM_PROMPT), self.options.provider)
            .await
            .inspect_err(|e| {
                error!(
                    "DDQ generation failed for {} at stage llm: {}",
                    profile.company_name, e
                );
            })?;

        if self.options.strict_validation {
            validate_ddq(&ddq).inspect_err(|e| {
                error!(
                    "DDQ for {} does not match the rubric: {}",
                    profile.company_name, e
                );
            })?;
        }

        for (area, phrase) in hedged_comments(&ddq) {
            warn!(
                "DDQ for {} uses hedging language in {}: \"{}\"",
                profile.company_name, area, phrase
            );
        }

        info!("DDQ generated for {}", profile.company_name);
        Ok(ddq)
    }
}
