//! The fixed DDQ rubric: areas per category, level reference definitions, and
//! the post-parse check that a model's DDQ matches the rubric shape.

use log::debug;

use crate::error::{AssessmentError, Result};
use crate::llm::prompts::FORBIDDEN_PHRASES;
use crate::schema::{DdqResult, RubricCategory};

#[derive(Debug, Clone, Copy)]
pub struct RubricArea {
    pub name: &'static str,
    pub definition: &'static str,
    /// What "Non-existent" means for this area
    pub non_existent: &'static str,
    /// What the lowest evidenced maturity looks like
    pub level_0: &'static str,
}

const RISK_MANAGEMENT: [RubricArea; 4] = [
    RubricArea {
        name: "ESG Policy & Commitment",
        definition: "Written commitment to manage environmental, social and governance risks, endorsed by leadership.",
        non_existent: "No policy, statement, or leadership communication on ESG of any kind.",
        level_0: "Informal or verbal commitment, a values statement, or ESG mentioned in marketing or a code of conduct.",
    },
    RubricArea {
        name: "ESG Risk Identification & Assessment",
        definition: "Process to identify and assess ESG risks and impacts of operations, products and value chain.",
        non_existent: "No sign that the company has ever considered ESG risks.",
        level_0: "Ad-hoc awareness of some risks, e.g. licences obtained, safety or data concerns acknowledged.",
    },
    RubricArea {
        name: "ESG Organisational Capacity & Responsibility",
        definition: "Named people, roles and resources accountable for ESG management.",
        non_existent: "Nobody holds or shares any ESG-related responsibility.",
        level_0: "ESG tasks handled informally by founders, HR, or compliance staff alongside other duties.",
    },
    RubricArea {
        name: "ESG Monitoring & Reporting",
        definition: "Tracking of ESG indicators and reporting to management, board or investors.",
        non_existent: "No ESG data is collected or reported at all.",
        level_0: "Basic operational data (headcount, incidents, complaints) collected without ESG framing.",
    },
];

const ENVIRONMENT: [RubricArea; 2] = [
    RubricArea {
        name: "Resource Efficiency & Pollution Prevention",
        definition: "Management of energy, water, materials, waste and emissions to air, water and land.",
        non_existent: "Operations with no evidence of any resource or waste consideration.",
        level_0: "Basic housekeeping such as waste segregation, paperless processes, or regulatory waste permits.",
    },
    RubricArea {
        name: "Climate Change & GHG Emissions",
        definition: "Understanding and reduction of greenhouse gas emissions and climate-related risks.",
        non_existent: "No acknowledgement of climate impact or energy use.",
        level_0: "Energy-saving measures, cloud hosting choices, or remote-work practices that incidentally cut emissions.",
    },
];

const SOCIAL: [RubricArea; 6] = [
    RubricArea {
        name: "Labour & Working Conditions",
        definition: "Fair employment terms, wages, working hours and freedom of association.",
        non_existent: "No employees or no information about employment practices whatsoever.",
        level_0: "Employment contracts, statutory benefits, or an HR function evidenced.",
    },
    RubricArea {
        name: "Occupational Health & Safety",
        definition: "Protection of workers from work-related injury and illness.",
        non_existent: "No reference to worker safety in any form.",
        level_0: "Basic safety rules, insurance, or statutory health checks evidenced.",
    },
    RubricArea {
        name: "Diversity, Equity & Inclusion",
        definition: "Non-discrimination, equal opportunity and inclusion across the workforce.",
        non_existent: "No information on workforce composition or treatment.",
        level_0: "Equal-opportunity wording, diverse founding team, or non-discrimination clauses.",
    },
    RubricArea {
        name: "Community Health, Safety & Security",
        definition: "Management of impacts on surrounding communities and the public.",
        non_existent: "No interaction with or impact on communities is described.",
        level_0: "Community programmes, local hiring, or awareness of public-facing impacts.",
    },
    RubricArea {
        name: "Product Responsibility & Customer Welfare",
        definition: "Safety, quality and fair marketing of products and services; customer protection.",
        non_existent: "No information on product quality or customer treatment.",
        level_0: "Customer support channels, quality checks, or regulatory product approvals.",
    },
    RubricArea {
        name: "Data Privacy & Cybersecurity",
        definition: "Protection of personal and sensitive data and resilience of information systems.",
        non_existent: "Business handles no data, or nothing at all is said about data.",
        level_0: "Privacy notice, basic access controls, or compliance with local data law mentioned.",
    },
];

const GOVERNANCE: [RubricArea; 7] = [
    RubricArea {
        name: "Board Structure & Oversight",
        definition: "Composition, independence and ESG oversight of the board.",
        non_existent: "No board or governing body information.",
        level_0: "A founder-led board or advisory board exists.",
    },
    RubricArea {
        name: "Business Ethics & Anti-Corruption",
        definition: "Policies and controls against bribery, corruption, fraud and conflicts of interest.",
        non_existent: "No reference to ethics or integrity.",
        level_0: "Code of conduct, ethics clauses in contracts, or stated zero-tolerance position.",
    },
    RubricArea {
        name: "Regulatory Compliance",
        definition: "Adherence to applicable laws, licences and permits in every operating jurisdiction.",
        non_existent: "No evidence of any licence, registration or compliance activity.",
        level_0: "Business registration and sector licences held.",
    },
    RubricArea {
        name: "Shareholder Rights & Ownership",
        definition: "Transparent ownership structure and protection of minority shareholders.",
        non_existent: "Ownership is entirely undisclosed.",
        level_0: "Cap table or shareholder agreement referenced.",
    },
    RubricArea {
        name: "Transparency & Disclosure",
        definition: "Timely, accurate disclosure of financial and non-financial information to stakeholders.",
        non_existent: "No reporting to anyone outside management.",
        level_0: "Financial statements or investor updates produced.",
    },
    RubricArea {
        name: "Supply Chain Management",
        definition: "ESG screening and monitoring of suppliers and contractors.",
        non_existent: "No suppliers, or nothing is said about them.",
        level_0: "Supplier contracts, vendor onboarding checks, or preferred-supplier lists.",
    },
    RubricArea {
        name: "Grievance Mechanism",
        definition: "Channels for workers, customers and communities to raise concerns, with a process for resolving them.",
        non_existent: "No channel of any kind for complaints.",
        level_0: "Customer hotline, contact email, or HR open-door policy.",
    },
];

pub fn areas(category: RubricCategory) -> &'static [RubricArea] {
    match category {
        RubricCategory::RiskManagement => &RISK_MANAGEMENT,
        RubricCategory::Environment => &ENVIRONMENT,
        RubricCategory::Social => &SOCIAL,
        RubricCategory::Governance => &GOVERNANCE,
    }
}

pub fn area_names(category: RubricCategory) -> Vec<&'static str> {
    areas(category).iter().map(|a| a.name).collect()
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Checks that every category lists exactly the rubric's areas, in rubric order.
///
/// Only the shape is checked; enum values are already enforced by deserialization.
pub fn validate_ddq(ddq: &DdqResult) -> Result<()> {
    for (category, items) in ddq.categories() {
        let expected = area_names(category);
        let actual: Vec<&str> = items.iter().map(|i| i.area.as_str()).collect();

        if expected.len() != actual.len() {
            return Err(AssessmentError::SchemaMismatch {
                category: category.title().to_string(),
                details: format!(
                    "expected {} areas, got {} ({:?})",
                    expected.len(),
                    actual.len(),
                    actual
                ),
            });
        }

        for (position, (want, got)) in expected.iter().zip(&actual).enumerate() {
            if normalize(want) != normalize(got) {
                return Err(AssessmentError::SchemaMismatch {
                    category: category.title().to_string(),
                    details: format!(
                        "area #{} should be '{}' but was '{}'",
                        position + 1,
                        want,
                        got
                    ),
                });
            }
        }
    }

    debug!("DDQ result matches rubric shape");
    Ok(())
}

/// `(area, phrase)` for every comment that uses forbidden hedging language.
pub fn hedged_comments(ddq: &DdqResult) -> Vec<(&str, &'static str)> {
    let mut found = Vec::new();
    for (_, items) in ddq.categories() {
        for item in items {
            let comments = item.comments.to_lowercase();
            if let Some(phrase) = FORBIDDEN_PHRASES.iter().find(|p| comments.contains(*p)) {
                found.push((item.area.as_str(), *phrase));
            }
        }
    }
    found
}
