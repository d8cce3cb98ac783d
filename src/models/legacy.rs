//! Legacy suggestions payload (`POST /analyze`)
//!
//! The older endpoint answers either with the wrapped form
//! `{ metrics, suggestions, optimizedSql }` or with a bare metrics object.

use serde::{Deserialize, Serialize};

use super::null_as_empty;
use crate::utils::{AnalysisError, AnalysisResult};

/// Static query metrics reported by the legacy analyzer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMetrics {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_processed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_estimate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub tables_used: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_where_clause: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_join_clause: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_limit_clause: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<QueryMetrics>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized_sql: Option<String>,
}

const WRAPPED_KEYS: [&str; 3] = ["metrics", "suggestions", "optimizedSql"];

impl LegacyAnalysis {
    pub fn from_json(body: &str) -> AnalysisResult<Self> {
        let value: serde_json::Value =
            serde_json::from_str(body).map_err(|e| AnalysisError::Payload(e.to_string()))?;

        let object = value
            .as_object()
            .ok_or_else(|| AnalysisError::Payload("expected a JSON object".to_string()))?;

        if WRAPPED_KEYS.iter().any(|k| object.contains_key(*k)) {
            serde_json::from_value(value).map_err(|e| AnalysisError::Payload(e.to_string()))
        } else {
            let metrics: QueryMetrics =
                serde_json::from_value(value).map_err(|e| AnalysisError::Payload(e.to_string()))?;
            Ok(Self { metrics: Some(metrics), ..Default::default() })
        }
    }

    pub fn has_suggestions(&self) -> bool {
        !self.suggestions.is_empty()
    }
}
