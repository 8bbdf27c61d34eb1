//! API request/response DTOs and shared handler state.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::middleware::auth::IdentityVerifier;
use crate::pipeline::classify::{RiskAssessment, RiskLevel};
use crate::pipeline::extraction::Chunk;
use crate::pipeline::processor::{AnalysisPipeline, AnalysisResult};
use crate::pipeline::scheduler::{AnalyzedChunk, ChunkOutcome};

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AnalysisPipeline>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

/// One chunk of the analysis as the client sees it: either a risk label
/// with its explanation, or an error note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkReview {
    pub id: usize,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response of `POST /api/documents/analyze`, and the input the report
/// endpoint accepts back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub analysis_id: Uuid,
    pub file_name: String,
    pub is_legal_document: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub compromised: bool,
    pub chunks: Vec<ChunkReview>,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResponse {
    pub fn from_result(file_name: &str, result: &AnalysisResult) -> Self {
        let chunks = result
            .chunks
            .iter()
            .map(|analyzed| match &analyzed.outcome {
                ChunkOutcome::Assessed(assessment) => ChunkReview {
                    id: analyzed.chunk.id,
                    text: analyzed.chunk.text.clone(),
                    risk: Some(assessment.risk),
                    explanation: Some(assessment.explanation.clone()),
                    error: None,
                },
                ChunkOutcome::Failed { reason } => ChunkReview {
                    id: analyzed.chunk.id,
                    text: analyzed.chunk.text.clone(),
                    risk: None,
                    explanation: None,
                    error: Some(reason.clone()),
                },
            })
            .collect();

        Self {
            analysis_id: Uuid::new_v4(),
            file_name: file_name.to_string(),
            is_legal_document: result.is_legal_document,
            rejection_reason: result.rejection_reason.clone(),
            compromised: result.is_compromised(),
            chunks,
            analyzed_at: Utc::now(),
        }
    }

    /// Rebuild the core result from the DTO, for consumers (the report
    /// assembler) that operate on `AnalysisResult`.
    pub fn to_result(&self) -> AnalysisResult {
        let chunks = self
            .chunks
            .iter()
            .map(|review| AnalyzedChunk {
                chunk: Chunk {
                    id: review.id,
                    text: review.text.clone(),
                    source_offset: None,
                },
                outcome: match (review.risk, &review.explanation) {
                    (Some(risk), explanation) => ChunkOutcome::Assessed(RiskAssessment {
                        risk,
                        explanation: explanation.clone().unwrap_or_default(),
                    }),
                    (None, _) => ChunkOutcome::Failed {
                        reason: review
                            .error
                            .clone()
                            .unwrap_or_else(|| "classification failed".to_string()),
                    },
                },
            })
            .collect();

        AnalysisResult {
            chunks,
            is_legal_document: self.is_legal_document,
            rejection_reason: self.rejection_reason.clone(),
        }
    }
}

/// Liveness probe payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::classify::RiskAssessment;

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            chunks: vec![
                AnalyzedChunk {
                    chunk: Chunk {
                        id: 0,
                        text: "Clause one".into(),
                        source_offset: Some(0),
                    },
                    outcome: ChunkOutcome::Assessed(RiskAssessment {
                        risk: RiskLevel::High,
                        explanation: "Uncapped liability".into(),
                    }),
                },
                AnalyzedChunk {
                    chunk: Chunk {
                        id: 1,
                        text: "Clause two".into(),
                        source_offset: Some(20),
                    },
                    outcome: ChunkOutcome::Failed {
                        reason: "oracle down".into(),
                    },
                },
            ],
            is_legal_document: true,
            rejection_reason: None,
        }
    }

    #[test]
    fn response_mirrors_result_order_and_outcomes() {
        let response = AnalysisResponse::from_result("lease.pdf", &sample_result());

        assert!(response.compromised);
        assert_eq!(response.chunks.len(), 2);
        assert_eq!(response.chunks[0].risk, Some(RiskLevel::High));
        assert_eq!(
            response.chunks[0].explanation.as_deref(),
            Some("Uncapped liability")
        );
        assert!(response.chunks[0].error.is_none());
        assert!(response.chunks[1].risk.is_none());
        assert_eq!(response.chunks[1].error.as_deref(), Some("oracle down"));
    }

    #[test]
    fn response_round_trips_back_to_result() {
        let original = sample_result();
        let response = AnalysisResponse::from_result("lease.pdf", &original);
        let rebuilt = response.to_result();

        assert_eq!(rebuilt.chunks.len(), original.chunks.len());
        assert_eq!(rebuilt.is_compromised(), original.is_compromised());
        assert_eq!(
            rebuilt.chunks[0].outcome.assessment().unwrap().risk,
            RiskLevel::High
        );
        assert!(matches!(
            rebuilt.chunks[1].outcome,
            ChunkOutcome::Failed { .. }
        ));
    }

    #[test]
    fn error_chunks_serialize_without_risk_fields() {
        let response = AnalysisResponse::from_result("lease.pdf", &sample_result());
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["chunks"][1].get("risk").is_none());
        assert_eq!(json["chunks"][1]["error"], "oracle down");
    }

    #[test]
    fn rejection_response_has_reason_and_no_chunks() {
        let result = AnalysisResult::rejected("Not a contract.".into());
        let response = AnalysisResponse::from_result("cat.png", &result);
        assert!(!response.is_legal_document);
        assert!(response.chunks.is_empty());
        assert_eq!(response.rejection_reason.as_deref(), Some("Not a contract."));
        assert!(!response.compromised);
    }
}
