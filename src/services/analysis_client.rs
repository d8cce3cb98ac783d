//! Analysis Service Client - HTTP client for the external query analyzer
//!
//! One `POST` per call with the body `{ "sql": ... }`. Non-success statuses,
//! transport failures and unparseable bodies all come back as
//! [`AnalysisError`]; raw detail is logged here and never surfaced verbatim.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::config::ServiceConfig;
use crate::models::{DiagnosticReport, LegacyAnalysis};
use crate::utils::{AnalysisError, AnalysisResult, StringExt};

/// Structured bottleneck report
pub const ANALYZE_PATH: &str = "/api/bi/analyze";
/// Pre-formatted plain text report
pub const FORMATTED_PATH: &str = "/api/bi/analyze/formatted";
/// Legacy metrics + suggestions endpoint
pub const LEGACY_PATH: &str = "/analyze";

/// Anything that can turn SQL text into a diagnostic report
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(&self, sql: &str) -> AnalysisResult<DiagnosticReport>;
}

#[derive(Debug, Serialize)]
struct AnalyzeRequest<'a> {
    sql: &'a str,
}

pub struct AnalysisClient {
    http_client: Client,
    base_url: String,
    timeout: Duration,
}

impl AnalysisClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::error!("Failed to build HTTP client for {}: {}", base_url, e);
                tracing::warn!("Using default HTTP client configuration as fallback");
                Client::default()
            });

        Self { http_client, base_url, timeout }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch the service's own plain-text rendering of the report
    pub async fn analyze_formatted(&self, sql: &str) -> AnalysisResult<String> {
        let sql = sql.clean().ok_or(AnalysisError::EmptyQuery)?;
        self.post_sql(FORMATTED_PATH, &sql).await
    }

    /// Query the legacy suggestions endpoint
    pub async fn analyze_legacy(&self, sql: &str) -> AnalysisResult<LegacyAnalysis> {
        let sql = sql.clean().ok_or(AnalysisError::EmptyQuery)?;
        let body = self.post_sql(LEGACY_PATH, &sql).await?;

        LegacyAnalysis::from_json(&body).inspect_err(|e| {
            tracing::error!(
                "Failed to parse legacy analysis response: {}. Body: {}",
                e,
                body.preview(500)
            );
        })
    }

    async fn post_sql(&self, path: &str, sql: &str) -> AnalysisResult<String> {
        let url = self.endpoint(path);
        let timeout_secs = self.timeout.as_secs();

        tracing::debug!("Calling analysis service: {} ({} chars of SQL)", url, sql.len());

        let response = self
            .http_client
            .post(&url)
            .header("Content-Type", "application/json")
            .timeout(self.timeout)
            .json(&AnalyzeRequest { sql })
            .send()
            .await
            .map_err(|e| {
                let err = AnalysisError::from_reqwest(e, timeout_secs);
                tracing::warn!("Analysis request to {} failed: {}", url, err);
                err
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!(
                "Analysis service error {} from {}: {}",
                status,
                url,
                error_text.preview(500)
            );
            return Err(AnalysisError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| AnalysisError::from_reqwest(e, timeout_secs))
    }
}

#[async_trait]
impl AnalysisBackend for AnalysisClient {
    async fn analyze(&self, sql: &str) -> AnalysisResult<DiagnosticReport> {
        let body = self.post_sql(ANALYZE_PATH, sql).await?;

        DiagnosticReport::from_json(&body).inspect_err(|e| {
            tracing::error!("Failed to parse analysis response: {}. Body: {}", e, body.preview(500));
        })
    }
}
