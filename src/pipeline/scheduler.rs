//! Chunk scheduler/aggregator: dispatches classification calls under a
//! bounded concurrency cap and reassembles outcomes in original order.
//!
//! Results are collected keyed by chunk id and re-sorted before return —
//! never appended in completion order — so concurrent completion order is
//! invisible in the output. A chunk whose classification ultimately fails
//! becomes an error entry at its correct position; it never aborts the
//! run and is never dropped.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::classify::{RiskAssessment, RiskClassifier};
use super::extraction::Chunk;

/// Terminal per-chunk outcome: a typed assessment, or the reason
/// classification could not complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChunkOutcome {
    Assessed(RiskAssessment),
    Failed { reason: String },
}

impl ChunkOutcome {
    pub fn assessment(&self) -> Option<&RiskAssessment> {
        match self {
            Self::Assessed(a) => Some(a),
            Self::Failed { .. } => None,
        }
    }
}

/// One chunk paired with its terminal outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedChunk {
    pub chunk: Chunk,
    pub outcome: ChunkOutcome,
}

pub struct ChunkScheduler {
    classifier: Arc<RiskClassifier>,
    max_in_flight: usize,
}

impl ChunkScheduler {
    pub fn new(classifier: Arc<RiskClassifier>, max_in_flight: usize) -> Self {
        Self {
            classifier,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Classify every chunk and return outcomes in original chunk order.
    /// Does not return until each dispatched chunk has reached a terminal
    /// outcome — there is no best-effort early return.
    pub async fn run(&self, chunks: Vec<Chunk>) -> Vec<AnalyzedChunk> {
        let semaphore = Arc::new(Semaphore::new(self.max_in_flight));
        let mut tasks = JoinSet::new();

        for chunk in &chunks {
            let semaphore = Arc::clone(&semaphore);
            let classifier = Arc::clone(&self.classifier);
            let id = chunk.id;
            let text = chunk.text.clone();

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("scheduler semaphore never closed");

                let outcome = match classifier.classify(&text).await {
                    Ok(assessment) => ChunkOutcome::Assessed(assessment),
                    Err(error) => {
                        tracing::warn!(chunk_id = id, %error, "Chunk classification failed");
                        ChunkOutcome::Failed {
                            reason: error.to_string(),
                        }
                    }
                };
                (id, outcome)
            });
        }

        let mut by_id: HashMap<usize, ChunkOutcome> = HashMap::with_capacity(chunks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, outcome)) => {
                    by_id.insert(id, outcome);
                }
                Err(join_error) => {
                    // The (id, outcome) pair died with the task; the
                    // reassembly pass below backfills the missing entry.
                    tracing::error!(%join_error, "Classification task aborted");
                }
            }
        }

        chunks
            .into_iter()
            .map(|chunk| {
                let outcome = by_id.remove(&chunk.id).unwrap_or(ChunkOutcome::Failed {
                    reason: "classification task aborted".to_string(),
                });
                AnalyzedChunk { chunk, outcome }
            })
            .collect()
    }
}
