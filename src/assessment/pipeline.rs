use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::Sender;
use uuid::Uuid;

use crate::assessment::{DdqEngine, EngineOptions, MemoEngine};
use crate::config::AssessmentConfig;
use crate::error::AssessmentError;
use crate::evidence::EvidenceGatherer;
use crate::knowledge::KnowledgeBase;
use crate::llm::LlmGateway;
use crate::schema::{CompanyProfile, DdqResult, ImResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Ddq,
    Memo,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Ddq => write!(f, "DDQ"),
            Stage::Memo => write!(f, "Investment Memo"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AssessmentEvent {
    Started { correlation_id: Uuid },
    GeneratingDdq,
    DdqGenerated,
    GeneratingMemo,
    MemoGenerated,
    Failed { stage: Stage, reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub correlation_id: Uuid,
    pub ddq: DdqResult,
    pub memo: ImResult,
}

/// A stage failure tagged with the run's correlation id. The inner error is
/// exactly what the engine returned.
#[derive(Error, Debug)]
#[error("[{correlation_id}] {stage} stage failed: {error}")]
pub struct PipelineFailure {
    pub correlation_id: Uuid,
    pub stage: Stage,
    #[source]
    pub error: AssessmentError,
}

/// DDQ first, then the memo built from it.
pub struct AssessmentPipeline {
    ddq: DdqEngine,
    memo: MemoEngine,
}

impl AssessmentPipeline {
    pub fn new(ddq: DdqEngine, memo: MemoEngine) -> Self {
        Self { ddq, memo }
    }

    /// Wires both engines around one gateway and one framework cache.
    pub fn from_parts(
        gateway: Arc<LlmGateway>,
        knowledge: Arc<KnowledgeBase>,
        config: &AssessmentConfig,
    ) -> Self {
        let options = EngineOptions::from_config(config);
        let evidence = EvidenceGatherer::new(
            gateway.clone(),
            config.research_provider,
            config.evidence.clone(),
        );
        Self {
            ddq: DdqEngine::new(gateway.clone(), knowledge.clone(), evidence, options.clone()),
            memo: MemoEngine::new(gateway, knowledge, options),
        }
    }

    /// Validates credentials and builds the HTTP providers and framework loader.
    #[cfg(feature = "providers")]
    pub fn from_config(config: &AssessmentConfig) -> crate::error::Result<Self> {
        let gateway = Arc::new(LlmGateway::from_config(config)?);
        let knowledge = Arc::new(KnowledgeBase::from_config(&config.knowledge_base));
        Ok(Self::from_parts(gateway, knowledge, config))
    }

    pub fn ddq_engine(&self) -> &DdqEngine {
        &self.ddq
    }

    pub fn memo_engine(&self) -> &MemoEngine {
        &self.memo
    }

    pub async fn run(
        &self,
        profile: &CompanyProfile,
        extracted_text: Option<&str>,
        progress: Option<Sender<AssessmentEvent>>,
    ) -> std::result::Result<AssessmentReport, PipelineFailure> {
        let correlation_id = Uuid::new_v4();
        info!(
            "[{}] Starting ESG assessment for {}",
            correlation_id, profile.company_name
        );
        self.send_event(&progress, AssessmentEvent::Started { correlation_id })
            .await;

        self.send_event(&progress, AssessmentEvent::GeneratingDdq).await;
        let ddq = match self.ddq.generate(profile, extracted_text).await {
            Ok(ddq) => ddq,
            Err(error) => return Err(self.fail(&progress, correlation_id, Stage::Ddq, error).await),
        };
        self.send_event(&progress, AssessmentEvent::DdqGenerated).await;

        self.send_event(&progress, AssessmentEvent::GeneratingMemo).await;
        let memo = match self.memo.generate(profile, &ddq, extracted_text).await {
            Ok(memo) => memo,
            Err(error) => {
                return Err(self.fail(&progress, correlation_id, Stage::Memo, error).await)
            }
        };
        self.send_event(&progress, AssessmentEvent::MemoGenerated).await;

        info!(
            "[{}] Assessment complete for {}: {}",
            correlation_id,
            profile.company_name,
            memo.risk_category.label()
        );

        Ok(AssessmentReport {
            correlation_id,
            ddq,
            memo,
        })
    }

    async fn fail(
        &self,
        progress: &Option<Sender<AssessmentEvent>>,
        correlation_id: Uuid,
        stage: Stage,
        error: AssessmentError,
    ) -> PipelineFailure {
        error!("[{}] {} stage failed: {}", correlation_id, stage, error);
        self.send_event(
            progress,
            AssessmentEvent::Failed {
                stage,
                reason: error.to_string(),
            },
        )
        .await;
        PipelineFailure {
            correlation_id,
            stage,
            error,
        }
    }

    async fn send_event(&self, sender: &Option<Sender<AssessmentEvent>>, event: AssessmentEvent) {
        if let Some(tx) = sender {
            let _ = tx.send(event).await;
        }
    }
}
