use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ClassifyError;

/// Risk label assigned to one chunk by the classification capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// A risk label plus the classifier's stated reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk: RiskLevel,
    pub explanation: String,
}

/// Verdict of the legitimacy pre-check.
#[derive(Debug, Clone, PartialEq)]
pub struct LegitimacyVerdict {
    pub is_legal: bool,
    pub reason: Option<String>,
}

/// Narrow seam over the external inference capability. The pipeline only
/// ever sends a system instruction plus a prompt and reads back raw text;
/// everything HTTP-shaped stays behind this trait.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, ClassifyError>;
}

/// Mock inference client for testing — returns a configurable response
/// and counts calls.
pub struct MockInferenceClient {
    response: Result<String, ClassifyError>,
    calls: AtomicUsize,
}

impl MockInferenceClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: ClassifyError) -> Self {
        Self {
            response: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InferenceClient for MockInferenceClient {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, ClassifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}
