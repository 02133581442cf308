#![allow(dead_code)]

use async_trait::async_trait;
use esg_assessment_builder::rubric::area_names;
use esg_assessment_builder::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const FRAMEWORK_TEXT: &str = "RMF v3: Level 1 requires a written policy approved by management. \
Level 2 requires an operational ESG management system. Level 3 requires external assurance.";

pub fn acme_profile() -> CompanyProfile {
    CompanyProfile {
        company_name: "Acme Health".to_string(),
        sector: "Healthcare".to_string(),
        sub_sector: "Telemedicine".to_string(),
        countries_of_operation: vec![
            "Vietnam".to_string(),
            "Singapore".to_string(),
            "Thailand".to_string(),
        ],
        number_of_employees: "50-100".to_string(),
        business_activities: "Connects patients with licensed doctors for remote consultations \
            and takes card and e-wallet payments."
            .to_string(),
        product_description: "Mobile app for video consultations, e-prescriptions and \
            medical record storage."
            .to_string(),
        ..Default::default()
    }
}

fn rubric_items(category: RubricCategory, high_areas: &[&str]) -> Vec<RubricItem> {
    area_names(category)
        .into_iter()
        .map(|area| RubricItem {
            area: area.to_string(),
            definition: format!("Management of {}", area.to_lowercase()),
            materiality: if high_areas.contains(&area) {
                Materiality::High
            } else {
                Materiality::Medium
            },
            level: Level::Level0,
            comments: "No direct evidence found. Indirect evidence: the company holds a \
                Ministry of Health telemedicine licence."
                .to_string(),
        })
        .collect()
}

/// Areas the three-country and data-handling signals push to High.
pub const MULTI_COUNTRY_AREAS: [&str; 5] = [
    "ESG Risk Identification & Assessment",
    "Regulatory Compliance",
    "Labour & Working Conditions",
    "Supply Chain Management",
    "Data Privacy & Cybersecurity",
];

pub fn canonical_ddq() -> DdqResult {
    DdqResult {
        risk_management: rubric_items(RubricCategory::RiskManagement, &MULTI_COUNTRY_AREAS),
        environment: rubric_items(RubricCategory::Environment, &MULTI_COUNTRY_AREAS),
        social: rubric_items(RubricCategory::Social, &MULTI_COUNTRY_AREAS),
        governance: rubric_items(RubricCategory::Governance, &MULTI_COUNTRY_AREAS),
        track_record: TrackRecord {
            regulatory_breaches: Some(
                "No regulatory breaches found in public records.".to_string(),
            ),
            ..Default::default()
        },
    }
}

pub fn canonical_ddq_json() -> String {
    serde_json::to_string_pretty(&canonical_ddq()).unwrap()
}

pub fn canonical_memo_json() -> String {
    serde_json::json!({
        "companyName": "Acme Health",
        "productDescription": "Mobile app for video consultations",
        "riskCategory": "Category B+",
        "grievanceMechanism": "In-app support chat (DDQ Governance / Grievance Mechanism: Level 0)",
        "sector": "Healthcare",
        "subSector": "Telemedicine",
        "countriesOfOperation": ["Vietnam", "Singapore", "Thailand"],
        "numberOfEmployees": "50-100",
        "currentRisks": [
            {
                "title": "Patient data protection",
                "details": ["DDQ Social / Data Privacy & Cybersecurity: High materiality, Level 0"]
            }
        ],
        "longTermRisks": [],
        "currentOpportunities": [
            { "title": "Access to care", "details": ["Rural patients reach licensed doctors"] }
        ],
        "longTermOpportunities": [],
        "founderCommitment": "No direct evidence found.",
        "customerStakeholders": "Patients across three countries",
        "employeeStakeholders": "Contracted doctors and support staff",
        "communityStakeholders": "Rural communities without clinics",
        "esgGaps": ["No written data protection policy"],
        "actionPlan": [
            {
                "action": "Adopt a data protection policy",
                "responsibleParty": "CTO",
                "deliverable": "Board-approved policy",
                "timeline": "Within 6 months of investment"
            }
        ],
        "limitations": ["Company documents were not audited"]
    })
    .to_string()
}

/// Answers research, DDQ and IM requests with fixed payloads and records every request.
pub struct StubProvider {
    pub ddq_reply: String,
    pub memo_reply: String,
    pub fail_research_on: Option<&'static str>,
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<LlmRequest>>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self {
            ddq_reply: format!("```json\n{}\n```", canonical_ddq_json()),
            memo_reply: canonical_memo_json(),
            fail_research_on: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn assessment_prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.json_mode)
            .map(|r| r.prompt.clone())
            .collect()
    }
}

#[async_trait]
impl LlmProvider for StubProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let system = request.system_prompt.clone().unwrap_or_default();
        let content = if request.web_search {
            if let Some(topic) = self.fail_research_on {
                if request.prompt.contains(topic) {
                    return Err(AssessmentError::RateLimited {
                        provider: ProviderKind::Gemini,
                        details: "quota exceeded".to_string(),
                    });
                }
            }
            if request.prompt.contains("regulatory breaches") {
                "- 2022: Warning letter from the Vietnam Ministry of Health (source: ministry gazette)"
                    .to_string()
            } else {
                "NO INFORMATION FOUND".to_string()
            }
        } else if system.contains("Due Diligence Questionnaire") {
            self.ddq_reply.clone()
        } else if system.contains("Investment Memo") {
            self.memo_reply.clone()
        } else {
            String::new()
        };

        Ok(LlmResponse {
            content,
            usage: Some(TokenUsage {
                prompt_tokens: 1000,
                completion_tokens: 200,
            }),
        })
    }
}

pub fn test_config() -> AssessmentConfig {
    AssessmentConfig {
        gemini_api_key: Some("test-key".to_string()),
        evidence: EvidenceConfig {
            inter_query_delay_ms: 0,
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn pipeline_with(stub: Arc<StubProvider>) -> AssessmentPipeline {
    pipeline_with_knowledge(stub, KnowledgeBase::from_text(FRAMEWORK_TEXT))
}

pub fn pipeline_with_knowledge(
    stub: Arc<StubProvider>,
    knowledge: KnowledgeBase,
) -> AssessmentPipeline {
    let gateway = LlmGateway::new(ProviderKind::Gemini).with_provider(stub);
    AssessmentPipeline::from_parts(Arc::new(gateway), Arc::new(knowledge), &test_config())
}
