use dotenv::dotenv;
use esg_assessment_builder::*;
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let path: PathBuf = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("usage: assess_company <company-document.md>"))?;

    println!("🚀 Starting ESG assessment for {}...", path.display());

    let config = AssessmentConfig::from_env()?;
    config.validate()?;
    println!(
        "⚙️  Providers: {:?} (default: {})",
        config.available_providers(),
        config.default_provider
    );

    let document =
        extract_with_timeout(&PlainTextExtractor, &path, config.extraction_timeout()).await?;
    println!("📄 Extracted {} characters.", document.text.chars().count());

    let gateway = Arc::new(LlmGateway::from_config(&config)?);
    let knowledge = Arc::new(KnowledgeBase::from_config(&config.knowledge_base));

    println!("🔍 Building company profile...");
    let profile = ProfileExtractor::new(gateway.clone(), config.default_provider)
        .extract(&document.text)
        .await?;
    println!(
        "✅ {} | {} / {} | {}",
        profile.company_name,
        profile.sector,
        profile.sub_sector,
        profile.countries_of_operation.join(", ")
    );

    let pipeline = AssessmentPipeline::from_parts(gateway, knowledge, &config);
    let (tx, mut rx) = tokio::sync::mpsc::channel(16);
    let progress = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                AssessmentEvent::Started { correlation_id } => {
                    println!("🆔 Run {}", correlation_id)
                }
                AssessmentEvent::GeneratingDdq => println!("📝 Generating DDQ..."),
                AssessmentEvent::DdqGenerated => println!("✅ DDQ complete."),
                AssessmentEvent::GeneratingMemo => println!("📝 Generating Investment Memo..."),
                AssessmentEvent::MemoGenerated => println!("✅ Investment Memo complete."),
                AssessmentEvent::Failed { stage, reason } => {
                    eprintln!("❌ {} failed: {}", stage, reason)
                }
            }
        }
    });

    let result = pipeline.run(&profile, Some(&document.text), Some(tx)).await;
    progress.await?;
    let report = result?;

    let renderer = MarkdownRenderer;
    std::fs::write("ddq.md", renderer.render_ddq(&report.ddq)?)?;
    std::fs::write("investment_memo.md", renderer.render_memo(&report.memo)?)?;
    std::fs::write("assessment.json", serde_json::to_string_pretty(&report)?)?;

    println!(
        "\n🏁 {} rated {}{}",
        report.memo.company_name,
        report.memo.risk_category.label(),
        if report.memo.risk_category.excludes_investment() {
            " (excluded from investment)"
        } else {
            ""
        }
    );
    println!("💾 Wrote ddq.md, investment_memo.md and assessment.json");

    Ok(())
}
