//! Prompt assembly for the DDQ and IM stages.
//!
//! Everything here is a pure function of its inputs, so the same profile,
//! documents, evidence and framework always give the same prompt.

use schemars::JsonSchema;
use std::fmt::Write as _;

use crate::error::Result;
use crate::evidence::{format_evidence, EvidenceBundle};
use crate::llm::prompts::{DDQ_ASSESSMENT_INSTRUCTIONS, IM_TEMPLATE_GUIDE};
use crate::rubric;
use crate::schema::{CompanyProfile, DdqResult, ImResult, RubricCategory};

pub const MULTI_COUNTRY_THRESHOLD: usize = 3;

// Keywords match whole words; a trailing `*` matches any word with that stem.
const CONSUMER_KEYWORDS: &[&str] = &[
    "consumer*", "patient*", "retail", "student*", "household*", "b2c", "subscriber*",
    "shopper*", "end user*",
];
const DATA_PAYMENT_KEYWORDS: &[&str] = &[
    "personal data", "patient data", "user data", "health data", "payment*", "fintech",
    "wallet*", "personal information", "medical record*", "health record*", "telemedicine",
    "lending",
];
const ENVIRONMENT_KEYWORDS: &[&str] = &[
    "manufactur*", "agricultur*", "farm*", "logistic*", "construction", "energy", "mining",
    "factory", "factories", "chemical*", "transport*",
];
const COMMUNITY_KEYWORDS: &[&str] = &[
    "community", "communities", "clinic*", "hospital*", "school*", "field staff",
    "general public", "public health",
];

/// Rough prompt size; four characters per token.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// At most `limit` characters, cut on a char boundary.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

fn profile_words(profile: &CompanyProfile) -> Vec<String> {
    [
        &profile.sector,
        &profile.sub_sector,
        &profile.business_activities,
        &profile.product_description,
    ]
    .iter()
    .flat_map(|text| text.split(|c: char| !c.is_alphanumeric()))
    .filter(|word| !word.is_empty())
    .map(str::to_lowercase)
    .collect()
}

fn keyword_matches(words: &[String], keyword: &str) -> bool {
    let parts: Vec<&str> = keyword.split_whitespace().collect();
    if parts.is_empty() {
        return false;
    }
    words.windows(parts.len()).any(|window| {
        window.iter().zip(&parts).all(|(word, part)| match part.strip_suffix('*') {
            Some(stem) => word.starts_with(stem),
            None => word == part,
        })
    })
}

fn mentions_any(words: &[String], keywords: &[&str]) -> bool {
    keywords.iter().any(|k| keyword_matches(words, k))
}

/// Profile characteristics that push specific areas to High materiality.
pub fn materiality_signals(profile: &CompanyProfile) -> Vec<String> {
    let words = profile_words(profile);
    let countries = profile
        .countries_of_operation
        .iter()
        .filter(|c| !c.trim().is_empty())
        .count();
    let mut signals = Vec::new();

    if countries >= MULTI_COUNTRY_THRESHOLD {
        signals.push(format!(
            "Operates in {} countries (3+ countries => High materiality for Regulatory Compliance, \
             Labour & Working Conditions, Supply Chain Management and ESG Risk Identification & Assessment).",
            countries
        ));
    }
    if countries > 1 {
        signals.push(
            "Multi-jurisdiction operations => High materiality for Regulatory Compliance and \
             Transparency & Disclosure."
                .to_string(),
        );
    }
    if mentions_any(&words, CONSUMER_KEYWORDS) {
        signals.push(
            "Consumer-facing business => High materiality for Product Responsibility & Customer \
             Welfare and Grievance Mechanism."
                .to_string(),
        );
    }
    if mentions_any(&words, DATA_PAYMENT_KEYWORDS) {
        signals.push(
            "Handles personal data or payments => High materiality for Data Privacy & Cybersecurity."
                .to_string(),
        );
    }
    if mentions_any(&words, ENVIRONMENT_KEYWORDS) {
        signals.push(
            "Business with environmental impact => High materiality for Resource Efficiency & \
             Pollution Prevention and Climate Change & GHG Emissions."
                .to_string(),
        );
    }
    if mentions_any(&words, COMMUNITY_KEYWORDS) {
        signals.push(
            "Community-facing business => High materiality for Community Health, Safety & Security."
                .to_string(),
        );
    }

    signals
}

pub fn company_context(
    profile: &CompanyProfile,
    extracted_text: Option<&str>,
    char_limit: usize,
) -> String {
    let mut out = String::from("## COMPANY CONTEXT\n");
    let _ = writeln!(out, "Company Name: {}", profile.company_name);
    let _ = writeln!(out, "Sector: {}", profile.sector);
    let _ = writeln!(out, "Sub-sector: {}", profile.sub_sector);
    let _ = writeln!(
        out,
        "Countries of Operation: {}",
        profile.countries_of_operation.join(", ")
    );
    let _ = writeln!(out, "Number of Employees: {}", profile.number_of_employees);
    let _ = writeln!(out, "Business Activities: {}", profile.business_activities);
    let _ = writeln!(out, "Product / Service Description: {}", profile.product_description);

    let optional = [
        ("Existing ESG Practices", &profile.esg_practices),
        ("ESG Policies", &profile.esg_policies),
        ("Compliance History", &profile.compliance_history),
    ];
    for (label, value) in optional {
        if let Some(text) = value.as_deref().filter(|t| !t.trim().is_empty()) {
            let _ = writeln!(out, "{}: {}", label, text);
        }
    }

    if let Some(text) = extracted_text.map(str::trim).filter(|t| !t.is_empty()) {
        let excerpt = truncate_chars(text, char_limit);
        let _ = writeln!(
            out,
            "\n### COMPANY DOCUMENTS (first {} characters)\n{}",
            excerpt.chars().count(),
            excerpt
        );
    }

    out
}

pub fn level_definitions_block() -> String {
    let mut out = String::from(
        "## LEVEL DEFINITIONS REFERENCE\n\
         Use this to distinguish \"Non-existent\" (no evidence of any practice) from \"Level 0\" \
         (minimal or basic practice evidenced). When in doubt and any indirect evidence exists, use Level 0.\n",
    );
    for category in RubricCategory::ALL {
        let _ = writeln!(out, "\n### {}", category.title());
        for area in rubric::areas(category) {
            let _ = writeln!(out, "- {}: {}", area.name, area.definition);
            let _ = writeln!(out, "  - Non-existent: {}", area.non_existent);
            let _ = writeln!(out, "  - Level 0: {}", area.level_0);
        }
    }
    out
}

pub fn required_areas_block() -> String {
    let mut out = String::from(
        "## REQUIRED AREAS\nEach category MUST contain exactly these areas, in this order, with these exact names:\n",
    );
    for category in RubricCategory::ALL {
        let names = rubric::area_names(category);
        let _ = writeln!(
            out,
            "- {} ({} areas, key `{}`): {}",
            category.title(),
            names.len(),
            category.field_name(),
            names
                .iter()
                .map(|n| format!("\"{}\"", n))
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    out
}

pub fn output_schema_block<T: JsonSchema>() -> Result<String> {
    let schema = schemars::schema_for!(T);
    Ok(format!(
        "## OUTPUT SCHEMA\n```json\n{}\n```\n",
        serde_json::to_string_pretty(&schema)?
    ))
}

fn knowledge_block(knowledge_base: &str) -> String {
    format!(
        "## RISK MANAGEMENT FRAMEWORK (RMF)\nThe complete scoring framework. Apply it verbatim.\n\n{}\n",
        knowledge_base.trim()
    )
}

pub fn build_ddq_prompt(
    profile: &CompanyProfile,
    extracted_text: Option<&str>,
    evidence: &EvidenceBundle,
    knowledge_base: &str,
    char_limit: usize,
) -> Result<String> {
    let mut prompt = String::from(
        "Complete the ESG Due Diligence Questionnaire for the company below.\n\n",
    );
    prompt.push_str(&company_context(profile, extracted_text, char_limit));

    let signals = materiality_signals(profile);
    if !signals.is_empty() {
        prompt.push_str("\n## MATERIALITY SIGNALS FOR THIS COMPANY\n");
        for signal in &signals {
            let _ = writeln!(prompt, "- {}", signal);
        }
    }

    prompt.push_str("\n## EXTERNAL RESEARCH\n");
    prompt.push_str(&format_evidence(evidence));
    prompt.push_str("\n\n");
    prompt.push_str(&level_definitions_block());
    prompt.push('\n');
    prompt.push_str(&knowledge_block(knowledge_base));
    prompt.push_str(DDQ_ASSESSMENT_INSTRUCTIONS);
    prompt.push('\n');
    prompt.push_str(&required_areas_block());
    prompt.push('\n');
    prompt.push_str(&output_schema_block::<DdqResult>()?);

    Ok(prompt)
}

pub fn build_im_prompt(
    profile: &CompanyProfile,
    ddq: &DdqResult,
    extracted_text: Option<&str>,
    knowledge_base: &str,
    char_limit: usize,
) -> Result<String> {
    let mut prompt = String::from(
        "Draft the ESG section of the Investment Memo for the company below, based on its completed DDQ.\n\n",
    );
    prompt.push_str(&company_context(profile, extracted_text, char_limit));

    prompt.push_str(
        "\n## COMPLETED DDQ\nReference these findings by category and area in every risk, opportunity, gap and action.\n```json\n",
    );
    prompt.push_str(&serde_json::to_string_pretty(ddq)?);
    prompt.push_str("\n```\n\n");
    prompt.push_str(&knowledge_block(knowledge_base));
    prompt.push_str(IM_TEMPLATE_GUIDE);
    prompt.push('\n');
    prompt.push_str(&output_schema_block::<ImResult>()?);

    Ok(prompt)
}
