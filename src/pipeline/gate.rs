//! Legitimacy gate: a fast pre-check that rejects uploads which are not
//! contract-like before the full classification budget is spent on them.
//!
//! One classification call over a bounded sample of leading chunks. The
//! check is a heuristic — false accepts and rejects are tolerated — so a
//! failing oracle makes the gate fail OPEN rather than turn an
//! availability blip into a user-visible rejection.

use std::sync::Arc;

use super::classify::RiskClassifier;
use super::extraction::Chunk;

/// How much of the document the gate reads. Pluggable so the sampling
/// threshold can be tuned without touching the gate itself.
#[derive(Debug, Clone)]
pub struct GateSamplePolicy {
    pub max_chunks: usize,
    pub max_sample_chars: usize,
}

impl Default for GateSamplePolicy {
    fn default() -> Self {
        Self {
            max_chunks: 3,
            max_sample_chars: 2000,
        }
    }
}

impl GateSamplePolicy {
    /// Join the leading chunks into one sample, truncated to the char
    /// budget on a char boundary.
    pub fn sample(&self, chunks: &[Chunk]) -> String {
        let mut sample = String::new();
        for chunk in chunks.iter().take(self.max_chunks) {
            if !sample.is_empty() {
                sample.push_str("\n\n");
            }
            sample.push_str(&chunk.text);
            if sample.len() >= self.max_sample_chars {
                break;
            }
        }

        if sample.len() > self.max_sample_chars {
            let mut cut = self.max_sample_chars;
            while !sample.is_char_boundary(cut) {
                cut -= 1;
            }
            sample.truncate(cut);
        }
        sample
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Accepted,
    Rejected { reason: String },
}

pub struct LegitimacyGate {
    classifier: Arc<RiskClassifier>,
    policy: GateSamplePolicy,
}

impl LegitimacyGate {
    pub fn new(classifier: Arc<RiskClassifier>, policy: GateSamplePolicy) -> Self {
        Self { classifier, policy }
    }

    /// Decide whether the document is worth classifying in full.
    pub async fn check(&self, chunks: &[Chunk]) -> GateDecision {
        let sample = self.policy.sample(chunks);
        if sample.is_empty() {
            return GateDecision::Rejected {
                reason: "The document contains no readable text.".to_string(),
            };
        }

        match self.classifier.check_legitimacy(&sample).await {
            Ok(verdict) if verdict.is_legal => GateDecision::Accepted,
            Ok(verdict) => GateDecision::Rejected {
                reason: verdict.reason.unwrap_or_else(|| {
                    "This does not appear to be a legal or contractual document.".to_string()
                }),
            },
            Err(error) => {
                tracing::warn!(%error, "Legitimacy check unavailable — accepting document");
                GateDecision::Accepted
            }
        }
    }
}
