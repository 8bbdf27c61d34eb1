//! Analysis run orchestrator.
//!
//! Single entry point that drives the full pipeline:
//! extract → gate → classify (concurrent) → aggregate.
//!
//! Trait-based DI throughout (inference client, OCR, PDF) so the whole
//! run is testable with deterministic doubles. Extraction and gating
//! failures end the run; classification failures never do.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::pipeline::classify::{InferenceClient, RetryPolicy, RiskClassifier, RiskLevel};
use crate::pipeline::extraction::{ChunkExtractor, Document, ExtractionError};
use crate::pipeline::gate::{GateDecision, GateSamplePolicy, LegitimacyGate};
use crate::pipeline::scheduler::{AnalyzedChunk, ChunkScheduler};

// ---------------------------------------------------------------------------
// Run states
// ---------------------------------------------------------------------------

/// States of one analysis run. `Rejected` is reachable only from `Gating`;
/// `Failed` only from an unrecoverable extraction error. `Classifying` is
/// the only state with internal concurrency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Extracting,
    Gating,
    Classifying,
    Aggregating,
    Done,
    Rejected,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extracting => "extracting",
            Self::Gating => "gating",
            Self::Classifying => "classifying",
            Self::Aggregating => "aggregating",
            Self::Done => "done",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Rejected | Self::Failed)
    }

    /// Legal transitions of the run state machine.
    pub fn can_transition_to(&self, next: RunState) -> bool {
        use RunState::*;
        match (self, next) {
            (Extracting, Gating) => true,
            (Gating, Classifying) => true,
            (Gating, Rejected) => true,
            (Classifying, Aggregating) => true,
            (Aggregating, Done) => true,
            (Extracting, Failed) => true,
            _ => false,
        }
    }
}

fn advance(state: &mut RunState, next: RunState, run_id: &Uuid) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal run transition {state:?} -> {next:?}"
    );
    tracing::debug!(run_id = %run_id, from = state.as_str(), to = next.as_str(), "Run state");
    *state = next;
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Terminal output of one analysis run. Handed to the report collaborator
/// and then discarded — nothing is retained after the response returns.
///
/// Invariant: `chunks.len()` equals the extractor's output length unless
/// the gate rejected the document, in which case `chunks` is empty and
/// `rejection_reason` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub chunks: Vec<AnalyzedChunk>,
    pub is_legal_document: bool,
    pub rejection_reason: Option<String>,
}

impl AnalysisResult {
    pub fn rejected(reason: String) -> Self {
        Self {
            chunks: Vec::new(),
            is_legal_document: false,
            rejection_reason: Some(reason),
        }
    }

    /// Document-level verdict: true iff at least one chunk carries a High
    /// label. A pure function of the result set, recomputed on demand —
    /// never stored as separate mutable state.
    pub fn is_compromised(&self) -> bool {
        self.chunks.iter().any(|analyzed| {
            analyzed
                .outcome
                .assessment()
                .is_some_and(|a| a.risk == RiskLevel::High)
        })
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct AnalysisPipeline {
    extractor: ChunkExtractor,
    gate: LegitimacyGate,
    scheduler: ChunkScheduler,
}

impl AnalysisPipeline {
    /// Wire the pipeline from an extractor, an inference client, and the
    /// tuning knobs in `PipelineConfig`.
    pub fn new(
        extractor: ChunkExtractor,
        client: Arc<dyn InferenceClient>,
        config: &PipelineConfig,
    ) -> Self {
        let policy = RetryPolicy {
            max_attempts: config.retry_max_attempts,
            timeout_attempts: config.retry_timeout_attempts,
            base_delay: config.retry_base_delay,
            max_delay: config.retry_max_delay,
        };
        let classifier = Arc::new(RiskClassifier::new(client, policy, config.call_timeout));

        let gate_policy = GateSamplePolicy {
            max_chunks: config.gate_max_chunks,
            max_sample_chars: config.gate_sample_chars,
        };

        Self {
            extractor,
            gate: LegitimacyGate::new(Arc::clone(&classifier), gate_policy),
            scheduler: ChunkScheduler::new(classifier, config.max_concurrent_calls),
        }
    }

    /// Run one document through the full pipeline.
    ///
    /// Extraction failures abort the run — nothing downstream has
    /// meaningful input. A gate rejection is a successful run with empty
    /// chunks and a reason. Per-chunk classification failures degrade to
    /// error entries and never abort.
    pub async fn run(&self, document: &Document) -> Result<AnalysisResult, ExtractionError> {
        let run_id = Uuid::new_v4();
        let mut state = RunState::Extracting;
        tracing::info!(
            run_id = %run_id,
            file_name = %document.file_name,
            size_bytes = document.bytes.len(),
            "Analysis run started"
        );

        let chunks = match self.extractor.extract(document) {
            Ok(chunks) => chunks,
            Err(error) => {
                advance(&mut state, RunState::Failed, &run_id);
                tracing::warn!(run_id = %run_id, %error, "Analysis run failed in extraction");
                return Err(error);
            }
        };
        let extracted_count = chunks.len();

        advance(&mut state, RunState::Gating, &run_id);
        if let GateDecision::Rejected { reason } = self.gate.check(&chunks).await {
            advance(&mut state, RunState::Rejected, &run_id);
            tracing::info!(run_id = %run_id, %reason, "Document rejected by legitimacy gate");
            return Ok(AnalysisResult::rejected(reason));
        }

        advance(&mut state, RunState::Classifying, &run_id);
        let analyzed = self.scheduler.run(chunks).await;

        advance(&mut state, RunState::Aggregating, &run_id);
        debug_assert_eq!(analyzed.len(), extracted_count);
        let result = AnalysisResult {
            chunks: analyzed,
            is_legal_document: true,
            rejection_reason: None,
        };

        advance(&mut state, RunState::Done, &run_id);
        let failed = result
            .chunks
            .iter()
            .filter(|a| a.outcome.assessment().is_none())
            .count();
        tracing::info!(
            run_id = %run_id,
            chunks = result.chunks.len(),
            failed_chunks = failed,
            compromised = result.is_compromised(),
            "Analysis run complete"
        );
        Ok(result)
    }
}
