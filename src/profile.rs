use log::{info, warn};
use std::sync::Arc;

use crate::assessment::context::{output_schema_block, truncate_chars};
use crate::config::ProviderKind;
use crate::error::{AssessmentError, Result};
use crate::llm::prompts::PROFILE_SYSTEM_PROMPT;
use crate::llm::LlmGateway;
use crate::schema::CompanyProfile;

const DEFAULT_MAX_ATTEMPTS: usize = 3;
const DEFAULT_PROFILE_CHAR_LIMIT: usize = 20_000;

/// Builds a [`CompanyProfile`] from document text, re-asking for missing fields.
pub struct ProfileExtractor {
    gateway: Arc<LlmGateway>,
    provider: ProviderKind,
    max_attempts: usize,
    char_limit: usize,
}

impl ProfileExtractor {
    pub fn new(gateway: Arc<LlmGateway>, provider: ProviderKind) -> Self {
        Self {
            gateway,
            provider,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            char_limit: DEFAULT_PROFILE_CHAR_LIMIT,
        }
    }

    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_char_limit(mut self, limit: usize) -> Self {
        self.char_limit = limit;
        self
    }

    pub async fn extract(&self, document_text: &str) -> Result<CompanyProfile> {
        if document_text.trim().is_empty() {
            return Err(AssessmentError::EmptyDocument("profile source".to_string()));
        }

        let excerpt = truncate_chars(document_text.trim(), self.char_limit);
        let schema = output_schema_block::<CompanyProfile>()?;
        let base_prompt = format!(
            "Build the company profile from these documents.\n\n## DOCUMENTS\n{}\n\n{}",
            excerpt, schema
        );

        let mut profile = CompanyProfile::default();
        let mut prompt = base_prompt.clone();

        for attempt in 1..=self.max_attempts {
            let candidate: CompanyProfile = self
                .gateway
                .call_json(&prompt, Some(PROFILE_SYSTEM_PROMPT), self.provider)
                .await?;
            fill_missing(&mut profile, candidate);

            let missing = profile.missing_fields();
            if missing.is_empty() {
                info!(
                    "Extracted profile for {} on attempt {}",
                    profile.company_name, attempt
                );
                return Ok(profile);
            }

            warn!(
                "Profile attempt {}/{} missing fields: {}",
                attempt,
                self.max_attempts,
                missing.join(", ")
            );

            prompt = format!(
                "{}\n\n## CORRECTION NEEDED\nYour previous answer left these required fields empty: {}.\n\
                 Re-read the documents and fill them in. Previous answer:\n{}",
                base_prompt,
                missing.join(", "),
                serde_json::to_string_pretty(&profile)?
            );
        }

        Err(AssessmentError::ValidationIncomplete {
            missing: profile
                .missing_fields()
                .into_iter()
                .map(str::to_string)
                .collect(),
            attempts: self.max_attempts,
        })
    }
}

fn take_if_blank(target: &mut String, candidate: String) {
    if target.trim().is_empty() && !candidate.trim().is_empty() {
        *target = candidate;
    }
}

/// Keeps what earlier attempts found; only blank fields take the new values.
fn fill_missing(profile: &mut CompanyProfile, candidate: CompanyProfile) {
    take_if_blank(&mut profile.company_name, candidate.company_name);
    take_if_blank(&mut profile.sector, candidate.sector);
    take_if_blank(&mut profile.sub_sector, candidate.sub_sector);
    take_if_blank(&mut profile.number_of_employees, candidate.number_of_employees);
    take_if_blank(&mut profile.business_activities, candidate.business_activities);
    take_if_blank(&mut profile.product_description, candidate.product_description);

    let has_countries = profile
        .countries_of_operation
        .iter()
        .any(|c| !c.trim().is_empty());
    if !has_countries {
        profile.countries_of_operation = candidate
            .countries_of_operation
            .into_iter()
            .filter(|c| !c.trim().is_empty())
            .collect();
    }

    if profile.esg_practices.is_none() {
        profile.esg_practices = candidate.esg_practices;
    }
    if profile.esg_policies.is_none() {
        profile.esg_policies = candidate.esg_policies;
    }
    if profile.compliance_history.is_none() {
        profile.compliance_history = candidate.compliance_history;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmProvider, LlmRequest, LlmResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct SequenceProvider {
        replies: Mutex<Vec<&'static str>>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmProvider for SequenceProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Gemini
        }

        async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
            self.prompts.lock().unwrap().push(request.prompt.clone());
            let mut replies = self.replies.lock().unwrap();
            let reply = if replies.len() > 1 {
                replies.remove(0)
            } else {
                replies[0]
            };
            Ok(LlmResponse {
                content: reply.to_string(),
                usage: None,
            })
        }
    }

    fn extractor(replies: Vec<&'static str>) -> (ProfileExtractor, Arc<SequenceProvider>) {
        let provider = Arc::new(SequenceProvider {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
        });
        let gateway = LlmGateway::new(ProviderKind::Gemini).with_provider(provider.clone());
        (
            ProfileExtractor::new(Arc::new(gateway), ProviderKind::Gemini),
            provider,
        )
    }

    const PARTIAL: &str = r#"{"companyName": "Acme Health", "sector": "Healthcare", "countriesOfOperation": ["Vietnam"]}"#;
    const REST: &str = r#"{"subSector": "Telemedicine", "numberOfEmployees": "50-100",
        "businessActivities": "Online consultations", "productDescription": "Video GP app"}"#;

    #[tokio::test]
    async fn test_second_attempt_fills_missing_fields() {
        let (extractor, provider) = extractor(vec![PARTIAL, REST]);
        let profile = extractor.extract("Acme Health annual report").await.unwrap();

        assert_eq!(profile.company_name, "Acme Health");
        assert_eq!(profile.sub_sector, "Telemedicine");
        assert_eq!(profile.countries_of_operation, vec!["Vietnam"]);

        let prompts = provider.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("CORRECTION NEEDED"));
        assert!(prompts[1].contains("subSector"));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let (extractor, provider) = extractor(vec![PARTIAL]);
        let err = extractor
            .with_max_attempts(2)
            .extract("Acme Health annual report")
            .await
            .unwrap_err();

        match err {
            AssessmentError::ValidationIncomplete { missing, attempts } => {
                assert_eq!(attempts, 2);
                assert!(missing.contains(&"productDescription".to_string()));
            }
            other => panic!("expected ValidationIncomplete, got {:?}", other),
        }
        assert_eq!(provider.prompts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_document_rejected() {
        let (extractor, provider) = extractor(vec![PARTIAL]);
        assert!(matches!(
            extractor.extract("   ").await,
            Err(AssessmentError::EmptyDocument(_))
        ));
        assert!(provider.prompts.lock().unwrap().is_empty());
    }
}
