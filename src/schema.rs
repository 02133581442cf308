use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured company profile consumed by both assessment engines.
///
/// Missing fields deserialize as empty so that [`CompanyProfile::missing_fields`]
/// can report them instead of the parse failing outright.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CompanyProfile {
    #[schemars(description = "Registered or trading name of the company")]
    pub company_name: String,

    #[schemars(description = "Primary sector, e.g. 'Healthcare'")]
    pub sector: String,

    #[schemars(description = "Sub-sector within the sector, e.g. 'Telemedicine'")]
    pub sub_sector: String,

    #[schemars(description = "Every country the company operates in")]
    pub countries_of_operation: Vec<String>,

    #[schemars(description = "Head count as written in the source, e.g. '50-100'")]
    pub number_of_employees: String,

    #[schemars(description = "Narrative of what the business does and how it earns revenue")]
    pub business_activities: String,

    #[schemars(description = "Narrative of the products or services offered")]
    pub product_description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Existing ESG practices, if described")]
    pub esg_practices: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Written ESG or sustainability policies, if described")]
    pub esg_policies: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Regulatory compliance history, if described")]
    pub compliance_history: Option<String>,
}

impl CompanyProfile {
    /// Names of required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let required = [
            ("companyName", &self.company_name),
            ("sector", &self.sector),
            ("subSector", &self.sub_sector),
            ("numberOfEmployees", &self.number_of_employees),
            ("businessActivities", &self.business_activities),
            ("productDescription", &self.product_description),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                missing.push(name);
            }
        }
        if self
            .countries_of_operation
            .iter()
            .all(|c| c.trim().is_empty())
        {
            missing.push("countriesOfOperation");
        }
        missing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Materiality {
    High,
    Medium,
    Low,
    #[serde(rename = "Non-existent")]
    NonExistent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum Level {
    #[serde(rename = "Non-existent")]
    #[schemars(description = "No evidence of any practice in this area")]
    NonExistent,

    #[serde(rename = "Level 0")]
    #[schemars(description = "Minimal or basic practice is evidenced, directly or indirectly")]
    Level0,

    #[serde(rename = "Level 1")]
    Level1,

    #[serde(rename = "Level 2")]
    Level2,

    #[serde(rename = "Level 3")]
    Level3,
}

/// One scored row of a DDQ category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RubricItem {
    #[schemars(description = "Rubric area name, exactly as listed for the category")]
    pub area: String,

    #[schemars(description = "What the area covers")]
    pub definition: String,

    pub materiality: Materiality,

    pub level: Level,

    #[schemars(
        description = "Direct quote from the source, or 'No direct evidence' followed by labeled indirect reasoning"
    )]
    pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulatory_breaches: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply_chain_issues: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparency_disclosure: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewable_energy: Option<String>,
}

impl TrackRecord {
    pub fn is_empty(&self) -> bool {
        self.regulatory_breaches.is_none()
            && self.supply_chain_issues.is_none()
            && self.transparency_disclosure.is_none()
            && self.renewable_energy.is_none()
    }
}

/// Rubric-scored ESG due diligence questionnaire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DdqResult {
    #[schemars(description = "Exactly 4 items, in rubric order")]
    pub risk_management: Vec<RubricItem>,

    #[schemars(description = "Exactly 2 items, in rubric order")]
    pub environment: Vec<RubricItem>,

    #[schemars(description = "Exactly 6 items, in rubric order")]
    pub social: Vec<RubricItem>,

    #[schemars(description = "Exactly 7 items, in rubric order")]
    pub governance: Vec<RubricItem>,

    #[serde(default)]
    pub track_record: TrackRecord,
}

impl DdqResult {
    pub fn categories(&self) -> [(RubricCategory, &[RubricItem]); 4] {
        [
            (RubricCategory::RiskManagement, self.risk_management.as_slice()),
            (RubricCategory::Environment, self.environment.as_slice()),
            (RubricCategory::Social, self.social.as_slice()),
            (RubricCategory::Governance, self.governance.as_slice()),
        ]
    }

    pub fn items(&self, category: RubricCategory) -> &[RubricItem] {
        match category {
            RubricCategory::RiskManagement => &self.risk_management,
            RubricCategory::Environment => &self.environment,
            RubricCategory::Social => &self.social,
            RubricCategory::Governance => &self.governance,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.categories().iter().all(|(_, items)| items.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RubricCategory {
    RiskManagement,
    Environment,
    Social,
    Governance,
}

impl RubricCategory {
    pub const ALL: [RubricCategory; 4] = [
        RubricCategory::RiskManagement,
        RubricCategory::Environment,
        RubricCategory::Social,
        RubricCategory::Governance,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            RubricCategory::RiskManagement => "Risk Management",
            RubricCategory::Environment => "Environment",
            RubricCategory::Social => "Social",
            RubricCategory::Governance => "Governance",
        }
    }

    /// JSON key of the category in a DDQ payload.
    pub fn field_name(&self) -> &'static str {
        match self {
            RubricCategory::RiskManagement => "riskManagement",
            RubricCategory::Environment => "environment",
            RubricCategory::Social => "social",
            RubricCategory::Governance => "governance",
        }
    }
}

impl fmt::Display for RubricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Overall ESG severity of an investee. Ordered by severity: C < B < B+ < A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum RiskCategory {
    #[serde(rename = "Category C")]
    #[schemars(description = "Minimal or no adverse ESG risk")]
    C,

    #[serde(rename = "Category B")]
    #[schemars(description = "Limited, site-specific, largely reversible ESG risk")]
    B,

    #[serde(rename = "Category B+")]
    #[schemars(description = "Significant but manageable ESG risk requiring enhanced oversight")]
    BPlus,

    #[serde(rename = "Category A")]
    #[schemars(description = "Severe, irreversible or unprecedented ESG risk; excluded from investment")]
    A,
}

impl RiskCategory {
    pub fn severity(&self) -> u8 {
        match self {
            RiskCategory::C => 0,
            RiskCategory::B => 1,
            RiskCategory::BPlus => 2,
            RiskCategory::A => 3,
        }
    }

    pub fn excludes_investment(&self) -> bool {
        matches!(self, RiskCategory::A)
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskCategory::C => "Category C",
            RiskCategory::B => "Category B",
            RiskCategory::BPlus => "Category B+",
            RiskCategory::A => "Category A",
        }
    }
}

impl PartialOrd for RiskCategory {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RiskCategory {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.severity().cmp(&other.severity())
    }
}

/// A title bullet with nested explanation bullets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NarrativePoint {
    pub title: String,

    #[serde(default)]
    #[schemars(description = "Nested explanation bullets citing specific DDQ areas")]
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub action: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_party: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliverable: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
}

/// Investment memo derived from a completed DDQ and the company profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImResult {
    pub company_name: String,
    pub product_description: String,
    pub risk_category: RiskCategory,
    pub grievance_mechanism: String,
    pub sector: String,
    pub sub_sector: String,
    pub countries_of_operation: Vec<String>,
    pub number_of_employees: String,

    pub current_risks: Vec<NarrativePoint>,
    pub long_term_risks: Vec<NarrativePoint>,
    pub current_opportunities: Vec<NarrativePoint>,
    pub long_term_opportunities: Vec<NarrativePoint>,

    #[schemars(description = "Founder and management commitment to ESG")]
    pub founder_commitment: String,

    #[schemars(description = "Impact on and engagement with customers")]
    pub customer_stakeholders: String,

    #[schemars(description = "Impact on and engagement with employees")]
    pub employee_stakeholders: String,

    #[schemars(description = "Impact on and engagement with communities and the environment")]
    pub community_stakeholders: String,

    #[schemars(description = "ESG gaps identified from the DDQ")]
    pub esg_gaps: Vec<String>,

    #[schemars(description = "Actions closing the gaps, each with responsible party, deliverable and timeline")]
    pub action_plan: Vec<ActionItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeframe: Option<String>,

    #[serde(default)]
    pub limitations: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_wire_names() {
        assert_eq!(
            serde_json::to_string(&Materiality::NonExistent).unwrap(),
            "\"Non-existent\""
        );
        assert_eq!(serde_json::to_string(&Level::Level0).unwrap(), "\"Level 0\"");
        let level: Level = serde_json::from_str("\"Level 3\"").unwrap();
        assert_eq!(level, Level::Level3);
        assert!(serde_json::from_str::<Level>("\"Level 4\"").is_err());
    }

    #[test]
    fn test_risk_category_ordering() {
        assert!(RiskCategory::C < RiskCategory::B);
        assert!(RiskCategory::B < RiskCategory::BPlus);
        assert!(RiskCategory::BPlus < RiskCategory::A);
        assert!(RiskCategory::A.excludes_investment());
        let parsed: RiskCategory = serde_json::from_str("\"Category B+\"").unwrap();
        assert_eq!(parsed, RiskCategory::BPlus);
    }

    #[test]
    fn test_missing_profile_fields() {
        let profile = CompanyProfile {
            company_name: "Acme".to_string(),
            sector: "Healthcare".to_string(),
            countries_of_operation: vec!["  ".to_string()],
            ..Default::default()
        };
        let missing = profile.missing_fields();
        assert!(missing.contains(&"subSector"));
        assert!(missing.contains(&"countriesOfOperation"));
        assert!(!missing.contains(&"companyName"));
    }

    #[test]
    fn test_default_ddq_is_placeholder() {
        assert!(DdqResult::default().is_placeholder());
    }
}
