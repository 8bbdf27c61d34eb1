//! Application constants and runtime configuration.
//!
//! Everything is overridable through environment variables so the same
//! binary serves local development (mock-friendly defaults) and deployment.

use std::net::SocketAddr;
use std::time::Duration;

use serde::Serialize;

/// Application-level constants
pub const APP_NAME: &str = "ClearClause";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "clearclause=info,tower_http=warn".to_string()
}

/// Tuning knobs for a single analysis run.
///
/// The concurrency cap is the only mutual-exclusion discipline protecting
/// the external inference capability's rate limit; it is a small constant
/// independent of document size.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    /// Maximum classification calls in flight at once.
    pub max_concurrent_calls: usize,
    /// Deadline for a single inference call.
    pub call_timeout: Duration,
    /// Total attempts for unavailable/rate-limited calls.
    pub retry_max_attempts: u32,
    /// Extra attempts granted after a timeout. A timed-out call already
    /// burned its full deadline, so it gets at most one more chance.
    pub retry_timeout_attempts: u32,
    /// First backoff delay; doubles per attempt up to `retry_max_delay`.
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
    /// Chunks above this length are split at a sentence boundary.
    pub max_chunk_chars: usize,
    /// Chunks below this length are merged into a neighbor.
    pub min_chunk_chars: usize,
    /// Legitimacy gate reads at most this many leading chunks...
    pub gate_max_chunks: usize,
    /// ...and at most this many characters of them.
    pub gate_sample_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_calls: 4,
            call_timeout: Duration::from_secs(30),
            retry_max_attempts: 3,
            retry_timeout_attempts: 1,
            retry_base_delay: Duration::from_millis(250),
            retry_max_delay: Duration::from_secs(4),
            max_chunk_chars: 1200,
            min_chunk_chars: 80,
            gate_max_chunks: 3,
            gate_sample_chars: 2000,
        }
    }
}

impl PipelineConfig {
    /// Defaults, with env overrides for the operationally interesting knobs.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(n) = env_parse::<usize>("CLEARCLAUSE_MAX_CONCURRENCY") {
            cfg.max_concurrent_calls = n.max(1);
        }
        if let Some(secs) = env_parse::<u64>("CLEARCLAUSE_CALL_TIMEOUT_SECS") {
            cfg.call_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(n) = env_parse::<u32>("CLEARCLAUSE_RETRY_ATTEMPTS") {
            cfg.retry_max_attempts = n.max(1);
        }
        cfg
    }
}

/// Service-level configuration: where we listen and which collaborators
/// (credential-check service, inference API) we talk to.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Base URL of the credential-check service (`/api/auth/me`).
    pub auth_base_url: String,
    pub inference_base_url: String,
    pub inference_api_key: String,
    pub inference_model: String,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("CLEARCLAUSE_BIND")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| {
                "127.0.0.1:5000"
                    .parse()
                    .expect("default bind address parses")
            });

        Self {
            bind_addr,
            auth_base_url: env_or("CLEARCLAUSE_AUTH_URL", "http://localhost:5100"),
            inference_base_url: env_or(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com",
            ),
            inference_api_key: env_or("GEMINI_API_KEY", ""),
            inference_model: env_or("GEMINI_MODEL", "gemini-2.0-flash"),
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pipeline_config_is_bounded() {
        let cfg = PipelineConfig::default();
        assert!(cfg.max_concurrent_calls >= 1);
        assert!(cfg.retry_max_attempts >= 1);
        assert!(cfg.retry_base_delay < cfg.retry_max_delay);
        assert!(cfg.min_chunk_chars < cfg.max_chunk_chars);
    }

    #[test]
    fn env_or_falls_back_to_default() {
        assert_eq!(
            env_or("CLEARCLAUSE_TEST_UNSET_VAR_XYZ", "fallback"),
            "fallback"
        );
    }

    #[test]
    fn env_parse_reads_value() {
        std::env::set_var("CLEARCLAUSE_TEST_PARSE_VAR", "7");
        assert_eq!(env_parse::<u32>("CLEARCLAUSE_TEST_PARSE_VAR"), Some(7));
        std::env::remove_var("CLEARCLAUSE_TEST_PARSE_VAR");
    }

    #[test]
    fn env_parse_rejects_garbage() {
        std::env::set_var("CLEARCLAUSE_TEST_GARBAGE_VAR", "not-a-number");
        assert_eq!(env_parse::<u32>("CLEARCLAUSE_TEST_GARBAGE_VAR"), None);
        std::env::remove_var("CLEARCLAUSE_TEST_GARBAGE_VAR");
    }

    #[test]
    fn app_name_is_clearclause() {
        assert_eq!(APP_NAME, "ClearClause");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
