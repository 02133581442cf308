//! Per-company research via the LLM gateway's search-capable provider.
//!
//! Every topic always yields an [`EvidenceRecord`]; a failed query produces an
//! empty record plus an entry in the bundle's failure list, so a batch never
//! fails as a whole.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;

use crate::config::{EvidenceConfig, ProviderKind};
use crate::error::{AssessmentError, Result};
use crate::llm::prompts::{
    NEGATIVE_RESULT_PHRASES, NO_INFORMATION_SENTINEL, RESEARCH_SYSTEM_PROMPT,
};
use crate::llm::{LlmGateway, LlmRequest};

pub const TRACK_RECORD_TOPICS: [&str; 5] = [
    "regulatory breaches fines or sanctions",
    "supply chain labour or human rights violations",
    "audit issues or financial restatements",
    "ESG disclosure or sustainability reporting",
    "transparency and corporate governance controversies",
];

pub const PRACTICE_TOPICS: [&str; 5] = [
    "ESG policy and sustainability commitments",
    "environmental practices energy use and emissions",
    "social practices employees customers and communities",
    "governance board structure ethics and compliance",
    "ESG reporting and impact metrics",
];

const NO_EVIDENCE_TEXT: &str =
    "No additional information found from external research for this company.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub source_label: String,
    pub snippet: String,
    pub relevance_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceFailure {
    pub query: String,
    pub error: String,
}

/// Query results in dispatch order, plus the queries that failed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub records: Vec<EvidenceRecord>,
    #[serde(default)]
    pub failures: Vec<EvidenceFailure>,
}

impl EvidenceBundle {
    pub fn get(&self, query: &str) -> Option<&EvidenceRecord> {
        self.records.iter().find(|r| r.query == query)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no query produced a single result.
    pub fn is_empty(&self) -> bool {
        self.records.iter().all(|r| r.results.is_empty())
    }

    pub fn total_results(&self) -> usize {
        self.records.iter().map(|r| r.results.len()).sum()
    }

    pub fn extend(&mut self, other: EvidenceBundle) {
        self.records.extend(other.records);
        self.failures.extend(other.failures);
    }
}

struct QueryOutcome {
    record: EvidenceRecord,
    failure: Option<AssessmentError>,
}

#[derive(Clone)]
pub struct EvidenceGatherer {
    gateway: Arc<LlmGateway>,
    provider: ProviderKind,
    config: EvidenceConfig,
}

impl EvidenceGatherer {
    pub fn new(gateway: Arc<LlmGateway>, provider: ProviderKind, config: EvidenceConfig) -> Self {
        Self {
            gateway,
            provider,
            config,
        }
    }

    /// Runs the topics one after another, pausing between calls.
    pub async fn gather(&self, company_name: &str, topics: &[&str]) -> EvidenceBundle {
        let mut bundle = EvidenceBundle::default();

        for (idx, topic) in topics.iter().enumerate() {
            if idx > 0 && !self.config.inter_query_delay().is_zero() {
                tokio::time::sleep(self.config.inter_query_delay()).await;
            }

            let outcome = self.query_topic(company_name, topic).await;
            if let Some(err) = outcome.failure {
                warn!(
                    "Evidence query failed (company: {}, query: {}): {}",
                    company_name, outcome.record.query, err
                );
                bundle.failures.push(EvidenceFailure {
                    query: outcome.record.query.clone(),
                    error: err.to_string(),
                });
            }
            bundle.records.push(outcome.record);
        }

        debug!(
            "Gathered {} results over {} queries for {} ({} failed)",
            bundle.total_results(),
            bundle.len(),
            company_name,
            bundle.failures.len()
        );
        bundle
    }

    pub async fn gather_track_record(&self, company_name: &str) -> EvidenceBundle {
        self.gather(company_name, &TRACK_RECORD_TOPICS).await
    }

    pub async fn gather_practices(&self, company_name: &str) -> EvidenceBundle {
        self.gather(company_name, &PRACTICE_TOPICS).await
    }

    /// Dispatches both topic batches concurrently and concatenates them.
    pub async fn gather_all(&self, company_name: &str) -> EvidenceBundle {
        info!("Gathering external evidence for {}", company_name);
        let (mut track_record, practices) = futures::join!(
            self.gather_track_record(company_name),
            self.gather_practices(company_name)
        );
        track_record.extend(practices);
        track_record
    }

    async fn query_topic(&self, company_name: &str, topic: &str) -> QueryOutcome {
        let query = format!("{} {}", company_name, topic);
        match self.run_query(&query).await {
            Ok(text) => QueryOutcome {
                record: EvidenceRecord {
                    results: parse_research_response(
                        &query,
                        &text,
                        self.provider,
                        self.config.default_relevance,
                    ),
                    query,
                    timestamp: Utc::now(),
                },
                failure: None,
            },
            Err(err) => QueryOutcome {
                failure: Some(AssessmentError::EvidenceQuery {
                    company: company_name.to_string(),
                    query: query.clone(),
                    details: err.to_string(),
                }),
                record: EvidenceRecord {
                    query,
                    results: Vec::new(),
                    timestamp: Utc::now(),
                },
            },
        }
    }

    async fn run_query(&self, query: &str) -> Result<String> {
        let prompt = format!(
            "Research the following and report verifiable findings with sources:\n\n{}",
            query
        );
        let request = LlmRequest::new(prompt)
            .system(Some(RESEARCH_SYSTEM_PROMPT))
            .web_search();

        let limit = self.config.query_timeout();
        let response = tokio::time::timeout(limit, self.gateway.send(&request, self.provider))
            .await
            .map_err(|_| AssessmentError::Timeout {
                provider: self.provider,
                after: limit,
            })??;

        Ok(response.content)
    }
}

pub fn is_negative_result(text: &str) -> bool {
    if text.trim().eq_ignore_ascii_case(NO_INFORMATION_SENTINEL) {
        return true;
    }
    let lowered = text.to_lowercase();
    NEGATIVE_RESULT_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}

/// A research reply is either a sentinel meaning "nothing found" or one snippet.
pub fn parse_research_response(
    query: &str,
    text: &str,
    provider: ProviderKind,
    relevance: f64,
) -> Vec<SearchResult> {
    let trimmed = text.trim();
    if trimmed.is_empty() || is_negative_result(trimmed) {
        return Vec::new();
    }

    vec![SearchResult {
        title: format!("Research findings: {}", query),
        source_label: format!("Knowledge search ({})", provider),
        snippet: trimmed.to_string(),
        relevance_score: relevance,
    }]
}

/// Renders evidence as prompt-ready text, grouped by query.
pub fn format_evidence(bundle: &EvidenceBundle) -> String {
    if bundle.is_empty() {
        return NO_EVIDENCE_TEXT.to_string();
    }

    let mut out = String::new();
    for record in bundle.records.iter().filter(|r| !r.results.is_empty()) {
        let _ = writeln!(out, "### Query: {}", record.query);
        for (idx, result) in record.results.iter().enumerate() {
            let _ = writeln!(
                out,
                "[{}] {} | {} | relevance {:.2}",
                idx + 1,
                result.title,
                result.source_label,
                result.relevance_score
            );
            let _ = writeln!(out, "{}", result.snippet);
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}
