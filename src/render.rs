//! Downloadable documents from assessment results.
//!
//! Sections follow the result's field order. Word output is produced by
//! other [`ResultRenderer`] implementations.

use std::fmt::Write as _;

use crate::error::{AssessmentError, Result};
use crate::schema::{
    ActionItem, DdqResult, ImResult, Level, Materiality, NarrativePoint, RubricCategory,
};

pub trait ResultRenderer {
    fn render_ddq(&self, ddq: &DdqResult) -> Result<Vec<u8>>;

    fn render_memo(&self, memo: &ImResult) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer;

fn materiality_label(m: Materiality) -> &'static str {
    match m {
        Materiality::High => "High",
        Materiality::Medium => "Medium",
        Materiality::Low => "Low",
        Materiality::NonExistent => "Non-existent",
    }
}

fn level_label(l: Level) -> &'static str {
    match l {
        Level::NonExistent => "Non-existent",
        Level::Level0 => "Level 0",
        Level::Level1 => "Level 1",
        Level::Level2 => "Level 2",
        Level::Level3 => "Level 3",
    }
}

/// Table cells cannot hold raw pipes or newlines.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "<br>")
}

fn write_points(out: &mut String, heading: &str, points: &[NarrativePoint]) {
    let _ = writeln!(out, "### {}\n", heading);
    if points.is_empty() {
        out.push_str("- None identified\n\n");
        return;
    }
    for point in points {
        let _ = writeln!(out, "- **{}**", point.title);
        for detail in &point.details {
            let _ = writeln!(out, "  - {}", detail);
        }
    }
    out.push('\n');
}

fn write_actions(out: &mut String, actions: &[ActionItem]) {
    out.push_str("## Action Plan\n\n");
    if actions.is_empty() {
        out.push_str("No actions required.\n\n");
        return;
    }
    out.push_str("| Action | Responsible Party | Deliverable | Timeline |\n");
    out.push_str("|---|---|---|---|\n");
    for action in actions {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} |",
            cell(&action.action),
            cell(action.responsible_party.as_deref().unwrap_or("-")),
            cell(action.deliverable.as_deref().unwrap_or("-")),
            cell(action.timeline.as_deref().unwrap_or("-"))
        );
    }
    out.push('\n');
}

impl MarkdownRenderer {
    pub fn ddq_markdown(&self, ddq: &DdqResult) -> String {
        let mut out = String::from("# ESG Due Diligence Questionnaire\n\n");

        for category in RubricCategory::ALL {
            let _ = writeln!(out, "## {}\n", category.title());
            out.push_str("| Area | Definition | Materiality | Level | Comments |\n");
            out.push_str("|---|---|---|---|---|\n");
            for item in ddq.items(category) {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} | {} |",
                    cell(&item.area),
                    cell(&item.definition),
                    materiality_label(item.materiality),
                    level_label(item.level),
                    cell(&item.comments)
                );
            }
            out.push('\n');
        }

        out.push_str("## Track Record\n\n");
        let track = &ddq.track_record;
        if track.is_empty() {
            out.push_str("No track record findings reported.\n");
            return out;
        }
        let rows = [
            ("Regulatory Breaches", &track.regulatory_breaches),
            ("Supply Chain Issues", &track.supply_chain_issues),
            ("Transparency & Disclosure", &track.transparency_disclosure),
            ("Renewable Energy", &track.renewable_energy),
        ];
        for (label, value) in rows {
            let _ = writeln!(
                out,
                "- **{}**: {}",
                label,
                value.as_deref().unwrap_or("No information found")
            );
        }

        out
    }

    pub fn memo_markdown(&self, memo: &ImResult) -> String {
        let mut out = format!("# Investment Memo: {}\n\n", memo.company_name);

        out.push_str("## Company Overview\n\n");
        let _ = writeln!(out, "- **Product**: {}", memo.product_description);
        let _ = writeln!(out, "- **Risk Category**: {}", memo.risk_category.label());
        let _ = writeln!(out, "- **Grievance Mechanism**: {}", memo.grievance_mechanism);
        let _ = writeln!(out, "- **Sector**: {} / {}", memo.sector, memo.sub_sector);
        let _ = writeln!(
            out,
            "- **Countries of Operation**: {}",
            memo.countries_of_operation.join(", ")
        );
        let _ = writeln!(out, "- **Employees**: {}\n", memo.number_of_employees);

        out.push_str("## ESG Risks and Opportunities\n\n");
        write_points(&mut out, "Current Risks", &memo.current_risks);
        write_points(&mut out, "Long-term Risks", &memo.long_term_risks);
        write_points(&mut out, "Current Opportunities", &memo.current_opportunities);
        write_points(&mut out, "Long-term Opportunities", &memo.long_term_opportunities);

        let _ = writeln!(out, "## Founder Commitment\n\n{}\n", memo.founder_commitment);

        out.push_str("## Stakeholders\n\n");
        let _ = writeln!(out, "- **Customers**: {}", memo.customer_stakeholders);
        let _ = writeln!(out, "- **Employees**: {}", memo.employee_stakeholders);
        let _ = writeln!(out, "- **Communities**: {}\n", memo.community_stakeholders);

        out.push_str("## ESG Gaps\n\n");
        for gap in &memo.esg_gaps {
            let _ = writeln!(out, "- {}", gap);
        }
        out.push('\n');

        write_actions(&mut out, &memo.action_plan);

        if memo.estimated_cost.is_some() || memo.timeframe.is_some() {
            out.push_str("## Cost and Timeframe\n\n");
            if let Some(cost) = &memo.estimated_cost {
                let _ = writeln!(out, "- **Estimated Cost**: {}", cost);
            }
            if let Some(timeframe) = &memo.timeframe {
                let _ = writeln!(out, "- **Timeframe**: {}", timeframe);
            }
            out.push('\n');
        }

        out.push_str("## Limitations\n\n");
        for limitation in &memo.limitations {
            let _ = writeln!(out, "- {}", limitation);
        }

        out
    }
}

impl ResultRenderer for MarkdownRenderer {
    fn render_ddq(&self, ddq: &DdqResult) -> Result<Vec<u8>> {
        if ddq.is_placeholder() {
            return Err(AssessmentError::Render(
                "refusing to render an empty DDQ".to_string(),
            ));
        }
        Ok(self.ddq_markdown(ddq).into_bytes())
    }

    fn render_memo(&self, memo: &ImResult) -> Result<Vec<u8>> {
        Ok(self.memo_markdown(memo).into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RiskCategory, RubricItem, TrackRecord};

    fn item(area: &str) -> RubricItem {
        RubricItem {
            area: area.to_string(),
            definition: "covers | pipes".to_string(),
            materiality: Materiality::High,
            level: Level::Level0,
            comments: "\"We have a hotline\" (company documents)".to_string(),
        }
    }

    #[test]
    fn test_ddq_sections_in_order() {
        let ddq = DdqResult {
            risk_management: vec![item("ESG Policy & Commitment")],
            environment: vec![item("Climate Change & GHG Emissions")],
            social: vec![item("Data Privacy & Cybersecurity")],
            governance: vec![item("Grievance Mechanism")],
            track_record: TrackRecord {
                regulatory_breaches: Some("None reported".to_string()),
                ..Default::default()
            },
        };
        let text = String::from_utf8(MarkdownRenderer.render_ddq(&ddq).unwrap()).unwrap();

        let positions: Vec<usize> = [
            "## Risk Management",
            "## Environment",
            "## Social",
            "## Governance",
            "## Track Record",
        ]
        .iter()
        .map(|h| text.find(h).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.contains("covers \\| pipes"));
        assert!(text.contains("| High | Level 0 |"));
        assert!(text.contains("**Supply Chain Issues**: No information found"));
    }

    #[test]
    fn test_empty_track_record_summarised() {
        let ddq = DdqResult {
            governance: vec![item("Grievance Mechanism")],
            ..Default::default()
        };
        let text = MarkdownRenderer.ddq_markdown(&ddq);
        assert!(text.ends_with("## Track Record\n\nNo track record findings reported.\n"));
        assert!(!text.contains("**Regulatory Breaches**"));
    }

    #[test]
    fn test_empty_ddq_not_rendered() {
        assert!(MarkdownRenderer.render_ddq(&DdqResult::default()).is_err());
    }

    #[test]
    fn test_memo_nested_bullets_and_actions() {
        let memo = ImResult {
            company_name: "Acme Health".to_string(),
            product_description: "Telemedicine app".to_string(),
            risk_category: RiskCategory::BPlus,
            grievance_mechanism: "Support hotline".to_string(),
            sector: "Healthcare".to_string(),
            sub_sector: "Telemedicine".to_string(),
            countries_of_operation: vec!["Vietnam".to_string(), "Thailand".to_string()],
            number_of_employees: "50-100".to_string(),
            current_risks: vec![NarrativePoint {
                title: "Patient data exposure".to_string(),
                details: vec!["DDQ Social / Data Privacy & Cybersecurity: Level 0".to_string()],
            }],
            long_term_risks: vec![],
            current_opportunities: vec![],
            long_term_opportunities: vec![],
            founder_commitment: "Founders signed the ESG policy".to_string(),
            customer_stakeholders: "Patients".to_string(),
            employee_stakeholders: "Doctors".to_string(),
            community_stakeholders: "Rural clinics".to_string(),
            esg_gaps: vec!["No data protection policy".to_string()],
            action_plan: vec![ActionItem {
                action: "Adopt data protection policy".to_string(),
                responsible_party: Some("CTO".to_string()),
                deliverable: Some("Board-approved policy".to_string()),
                timeline: Some("6 months post-investment".to_string()),
            }],
            estimated_cost: None,
            timeframe: None,
            limitations: vec!["Documents were unaudited".to_string()],
        };
        let text = MarkdownRenderer.memo_markdown(&memo);

        assert!(text.contains("**Risk Category**: Category B+"));
        assert!(text.contains("- **Patient data exposure**\n  - DDQ Social"));
        assert!(text.contains("| Adopt data protection policy | CTO | Board-approved policy |"));
        assert!(!text.contains("## Cost and Timeframe"));
        assert!(text.find("## Action Plan").unwrap() < text.find("## Limitations").unwrap());
    }
}
