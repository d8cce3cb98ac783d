//! QueryLens Library
//!
//! Client side of the QueryLens analyzer: submits SQL to the analysis
//! service, validates the returned diagnostic report and renders it.

use std::sync::Arc;

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use config::Config;
pub use models::{Bottleneck, DiagnosticReport, IssueType, Severity};
pub use services::{
    AnalysisBackend, AnalysisClient, AnalysisState, ReportPresenter, RequestOrchestrator,
};
pub use utils::{AnalysisError, AnalysisResult};

/// Application shared state
///
/// One client, one orchestrator and one presenter per process; command
/// handlers borrow what they need.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<AnalysisClient>,
    pub orchestrator: Arc<RequestOrchestrator>,
    pub presenter: ReportPresenter,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let client = Arc::new(AnalysisClient::from_config(&config.service));
        let orchestrator = Arc::new(RequestOrchestrator::new(client.clone()));
        let presenter = ReportPresenter::new(config.display.color);

        Self { client, orchestrator, presenter }
    }
}
