pub mod classifier;
pub mod gemini;
pub mod parser;
pub mod prompt;
pub mod retry;
pub mod types;

pub use classifier::*;
pub use gemini::*;
pub use parser::*;
pub use prompt::*;
pub use retry::*;
pub use types::*;

use thiserror::Error;

/// Failures of a single classification call. All of these are recovered
/// locally by the retry policy; exhausting retries degrades the chunk to
/// an error outcome instead of failing the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("Classification call timed out")]
    Timeout,

    #[error("Classification capability unavailable: {0}")]
    Unavailable(String),

    #[error("Classification capability rate limited")]
    RateLimited,
}
