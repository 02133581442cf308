//! # ESG Assessment Builder
//!
//! A library for turning unstructured company documents into two structured
//! ESG outputs: a rubric-scored Due Diligence Questionnaire (DDQ) and an
//! Investment Memo (IM) derived from it.
//!
//! ## Core Concepts
//!
//! - **Risk Management Framework (RMF)**: the static scoring framework, loaded once and embedded verbatim in every assessment prompt
//! - **Evidence**: per-company research gathered through an LLM search provider; a failed query only empties that query
//! - **DDQ**: four rubric categories (Risk Management, Environment, Social, Governance) plus a track record
//! - **IM**: the investment committee memo, which can only be produced from a completed DDQ
//! - **Gateway**: one call surface over interchangeable LLM providers with typed failures
//!
//! ## Example
//!
//! ```rust,ignore
//! use esg_assessment_builder::*;
//!
//! let config = AssessmentConfig::from_env()?;
//! let pipeline = AssessmentPipeline::from_config(&config)?;
//!
//! let profile = CompanyProfile {
//!     company_name: "Acme Health".to_string(),
//!     sector: "Healthcare".to_string(),
//!     sub_sector: "Telemedicine".to_string(),
//!     countries_of_operation: vec!["Vietnam".into(), "Singapore".into(), "Thailand".into()],
//!     number_of_employees: "50-100".to_string(),
//!     business_activities: "Online GP consultations".to_string(),
//!     product_description: "Video consultation app".to_string(),
//!     ..Default::default()
//! };
//!
//! let report = pipeline.run(&profile, Some(&document_text), None).await?;
//! let memo = MarkdownRenderer.render_memo(&report.memo)?;
//! ```

pub mod assessment;
pub mod config;
pub mod error;
pub mod evidence;
pub mod extraction;
pub mod knowledge;
pub mod llm;
pub mod profile;
pub mod render;
pub mod rubric;
pub mod schema;

pub use assessment::{
    AssessmentEvent, AssessmentPipeline, AssessmentReport, DdqEngine, EngineOptions, MemoEngine,
    PipelineFailure, Stage,
};
pub use config::{AssessmentConfig, EvidenceConfig, KnowledgeBaseConfig, ProviderKind};
pub use error::{AssessmentError, Result};
pub use evidence::{
    format_evidence, EvidenceBundle, EvidenceGatherer, EvidenceRecord, SearchResult,
    PRACTICE_TOPICS, TRACK_RECORD_TOPICS,
};
pub use extraction::{extract_with_timeout, ExtractedDocument, PlainTextExtractor, TextExtractor};
pub use knowledge::{FileSource, KnowledgeBase, KnowledgeSource};
pub use llm::{LlmGateway, LlmProvider, LlmRequest, LlmResponse, TokenUsage};
pub use profile::ProfileExtractor;
pub use render::{MarkdownRenderer, ResultRenderer};
pub use rubric::validate_ddq;
pub use schema::*;
