//! Risk classifier: one chunk in, one typed assessment out.
//!
//! Wraps every inference call in the per-call deadline and the shared
//! retry policy. Parsing failures count as the capability being
//! unavailable, so a malformed response is retried like a 500 and never
//! becomes a guessed label.

use std::sync::Arc;
use std::time::Duration;

use super::parser::{parse_legitimacy_response, parse_risk_response};
use super::prompt::{
    build_legitimacy_prompt, build_risk_prompt, LEGITIMACY_SYSTEM_PROMPT, RISK_SYSTEM_PROMPT,
};
use super::retry::{with_retry, RetryPolicy};
use super::types::{InferenceClient, LegitimacyVerdict, RiskAssessment};
use super::ClassifyError;

pub struct RiskClassifier {
    client: Arc<dyn InferenceClient>,
    policy: RetryPolicy,
    call_timeout: Duration,
}

impl RiskClassifier {
    pub fn new(
        client: Arc<dyn InferenceClient>,
        policy: RetryPolicy,
        call_timeout: Duration,
    ) -> Self {
        Self {
            client,
            policy,
            call_timeout,
        }
    }

    /// Classify one chunk's text. Retries stay inside this call; the
    /// caller sees either a clean assessment or a terminal error.
    pub async fn classify(&self, chunk_text: &str) -> Result<RiskAssessment, ClassifyError> {
        let prompt = build_risk_prompt(chunk_text);
        with_retry(&self.policy, || {
            self.attempt(RISK_SYSTEM_PROMPT, &prompt, parse_risk_response)
        })
        .await
    }

    /// Single legitimacy question over a document sample, same retry
    /// discipline as chunk classification.
    pub async fn check_legitimacy(
        &self,
        sample_text: &str,
    ) -> Result<LegitimacyVerdict, ClassifyError> {
        let prompt = build_legitimacy_prompt(sample_text);
        with_retry(&self.policy, || {
            self.attempt(LEGITIMACY_SYSTEM_PROMPT, &prompt, parse_legitimacy_response)
        })
        .await
    }

    async fn attempt<T>(
        &self,
        system: &str,
        prompt: &str,
        parse: fn(&str) -> Result<T, ClassifyError>,
    ) -> Result<T, ClassifyError> {
        let raw = match tokio::time::timeout(
            self.call_timeout,
            self.client.complete(system, prompt),
        )
        .await
        {
            Ok(result) => result?,
            Err(_elapsed) => return Err(ClassifyError::Timeout),
        };

        parse(&raw)
    }
}
