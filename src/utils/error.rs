//! Analysis error taxonomy
//!
//! Every failure the client can observe while talking to the analysis service.
//! The orchestrator turns these into the `Failure` message shown to the user;
//! the `Display` form carries the raw detail and is only ever logged.

/// Result alias used by the client and the orchestrator
pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Query text is empty")]
    EmptyQuery,

    #[error("An analysis is already in progress")]
    InFlight,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Analysis service timeout after {0}s")]
    Timeout(u64),

    #[error("Analysis service returned HTTP {0}")]
    Status(u16),

    #[error("Analysis payload error: {0}")]
    Payload(String),

    #[error("Analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    /// Human-readable message for the presentation layer
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyQuery => "Enter a SQL query to analyze.".to_string(),
            Self::InFlight => "An analysis is already in progress.".to_string(),
            Self::Transport(_) => {
                "Failed to analyze query. Please check your connection.".to_string()
            },
            Self::Timeout(secs) => format!(
                "The analysis service did not respond within {}s. Please try again.",
                secs
            ),
            Self::Status(code) => {
                format!("Analysis service returned an error (HTTP {}).", code)
            },
            Self::Payload(_) => "Could not understand the analysis service response.".to_string(),
            Self::Cancelled => "Analysis was cancelled.".to_string(),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_secs)
        } else if err.is_decode() {
            Self::Payload(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
