//! Report assembly boundary.
//!
//! The external renderer consumes a filtered, ordered view of the
//! analysis: Low-risk chunks are omitted, failed chunks stay visible and
//! are marked as not analyzable. No layout decisions are made here beyond
//! filtering and ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pipeline::classify::RiskLevel;
use crate::pipeline::processor::AnalysisResult;
use crate::pipeline::scheduler::ChunkOutcome;

/// One reviewable finding in the report, in original document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub chunk_id: usize,
    pub text: String,
    /// Absent when the chunk could not be analyzed.
    pub risk: Option<RiskLevel>,
    pub note: String,
}

/// The payload the external report renderer consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub file_name: String,
    pub is_legal_document: bool,
    pub rejection_reason: Option<String>,
    pub compromised: bool,
    pub total_chunks: usize,
    pub flagged_chunks: usize,
    pub failed_chunks: usize,
    pub generated_at: DateTime<Utc>,
    pub entries: Vec<ReportEntry>,
}

/// Assemble the report view of an analysis result.
pub fn assemble_report(file_name: &str, result: &AnalysisResult) -> RiskReport {
    let mut entries = Vec::new();
    let mut flagged = 0usize;
    let mut failed = 0usize;

    for analyzed in &result.chunks {
        match &analyzed.outcome {
            ChunkOutcome::Assessed(assessment) => {
                if assessment.risk == RiskLevel::Low {
                    continue;
                }
                flagged += 1;
                entries.push(ReportEntry {
                    chunk_id: analyzed.chunk.id,
                    text: analyzed.chunk.text.clone(),
                    risk: Some(assessment.risk),
                    note: assessment.explanation.clone(),
                });
            }
            ChunkOutcome::Failed { .. } => {
                failed += 1;
                entries.push(ReportEntry {
                    chunk_id: analyzed.chunk.id,
                    text: analyzed.chunk.text.clone(),
                    risk: None,
                    note: "This section could not be analyzed.".to_string(),
                });
            }
        }
    }

    RiskReport {
        file_name: file_name.to_string(),
        is_legal_document: result.is_legal_document,
        rejection_reason: result.rejection_reason.clone(),
        compromised: result.is_compromised(),
        total_chunks: result.chunks.len(),
        flagged_chunks: flagged,
        failed_chunks: failed,
        generated_at: Utc::now(),
        entries,
    }
}
