//! Diagnostic report models
//!
//! The analysis service answers with camelCase JSON. It is first read into the
//! `Raw*` wire types, then converted with `TryFrom` into the validated
//! [`DiagnosticReport`]. Anything that does not fit the schema becomes
//! [`AnalysisError::Payload`].

use serde::{Deserialize, Serialize};
use std::fmt;

use super::null_as_empty;
use crate::utils::{AnalysisError, AnalysisResult, StringExt};

// ============================================================================
// Taxonomy
// ============================================================================

/// Bottleneck severity assigned by the analysis service
///
/// Closed enumeration on the producer side; values outside it are kept as
/// `Unknown` so rendering can degrade instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Critical,
    Warning,
    Info,
    Unknown(String),
}

impl Severity {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => Self::Critical,
            "WARNING" => Self::Warning,
            "INFO" => Self::Info,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
            Self::Unknown(raw) => raw,
        }
    }

    /// Value used when the service sends no severity at all
    pub const UNSPECIFIED: &'static str = "UNKNOWN";
}

impl From<String> for Severity {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Severity> for String {
    fn from(severity: Severity) -> Self {
        severity.as_str().to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of detected problem
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueType {
    NonSargablePredicate,
    CorrelatedSubquery,
    OrCondition,
    LateFilter,
    MissingIndex,
    HeavyAggregation,
    ExpensiveJoin,
    CartesianProduct,
    Other(String),
}

impl IssueType {
    /// Identifier used when the service omits the issue type
    pub const UNSPECIFIED: &'static str = "UNKNOWN";

    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "NON_SARGABLE_PREDICATE" => Self::NonSargablePredicate,
            "CORRELATED_SUBQUERY" => Self::CorrelatedSubquery,
            "OR_CONDITION" => Self::OrCondition,
            "LATE_FILTER" => Self::LateFilter,
            "MISSING_INDEX" => Self::MissingIndex,
            "HEAVY_AGGREGATION" => Self::HeavyAggregation,
            "EXPENSIVE_JOIN" => Self::ExpensiveJoin,
            "CARTESIAN_PRODUCT" => Self::CartesianProduct,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::NonSargablePredicate => "NON_SARGABLE_PREDICATE",
            Self::CorrelatedSubquery => "CORRELATED_SUBQUERY",
            Self::OrCondition => "OR_CONDITION",
            Self::LateFilter => "LATE_FILTER",
            Self::MissingIndex => "MISSING_INDEX",
            Self::HeavyAggregation => "HEAVY_AGGREGATION",
            Self::ExpensiveJoin => "EXPENSIVE_JOIN",
            Self::CartesianProduct => "CARTESIAN_PRODUCT",
            Self::Other(raw) => raw,
        }
    }

    /// Longer human description for known issue types
    pub fn description(&self) -> Option<&'static str> {
        match self {
            Self::NonSargablePredicate => Some("Non-SARGABLE Predicate"),
            Self::CorrelatedSubquery => Some("Correlated Subquery"),
            Self::OrCondition => Some("OR Condition Blocking Index"),
            Self::LateFilter => Some("Late Filter Application"),
            Self::MissingIndex => Some("Missing Index"),
            Self::HeavyAggregation => Some("Heavy Aggregation"),
            Self::ExpensiveJoin => Some("Expensive JOIN Operation"),
            Self::CartesianProduct => Some("Cartesian Product"),
            Self::Other(_) => None,
        }
    }
}

impl From<String> for IssueType {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<IssueType> for String {
    fn from(issue_type: IssueType) -> Self {
        issue_type.as_str().to_string()
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Domain types
// ============================================================================

/// One detected performance issue
///
/// Optional numeric fields are `None` both when the service omitted them and
/// when it reported `0` ("not estimated").
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bottleneck {
    pub severity: Severity,
    pub issue_type: IssueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_fragment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimized_fragment: Option<String>,
    pub problem_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why_its_a_slow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_improvement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_impact_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_count: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fixes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fix_queries: Vec<String>,
}

impl Bottleneck {
    pub fn new(
        severity: Severity,
        issue_type: IssueType,
        problem_description: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            issue_type,
            cost_percentage: None,
            line_number: None,
            start_line: None,
            end_line: None,
            operator_name: None,
            query_fragment: None,
            optimized_fragment: None,
            problem_description: problem_description.into(),
            why_its_a_slow: None,
            expected_improvement: None,
            time_impact_seconds: None,
            execution_count: None,
            fixes: Vec::new(),
            fix_queries: Vec::new(),
        }
    }
}

/// Result of one analysis request
///
/// Counts are tallied from the bottleneck list when the report is built, so
/// `critical + warning + info + unclassified == total == bottlenecks.len()`
/// always holds. Bottleneck order is the service's significance ranking and
/// is never changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticReport {
    bottlenecks: Vec<Bottleneck>,
    total_bottlenecks: u32,
    critical_count: u32,
    warning_count: u32,
    info_count: u32,
    #[serde(skip_serializing_if = "is_zero")]
    unclassified_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    potential_improvement_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    estimated_baseline_seconds: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    formatted_report: Option<String>,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl DiagnosticReport {
    pub fn new(bottlenecks: Vec<Bottleneck>) -> Self {
        let (mut critical, mut warning, mut info, mut unclassified) = (0u32, 0u32, 0u32, 0u32);
        for bottleneck in &bottlenecks {
            match bottleneck.severity {
                Severity::Critical => critical += 1,
                Severity::Warning => warning += 1,
                Severity::Info => info += 1,
                Severity::Unknown(_) => unclassified += 1,
            }
        }

        Self {
            total_bottlenecks: bottlenecks.len() as u32,
            bottlenecks,
            critical_count: critical,
            warning_count: warning,
            info_count: info,
            unclassified_count: unclassified,
            potential_improvement_percent: None,
            estimated_baseline_seconds: None,
            formatted_report: None,
        }
    }

    /// Non-finite values are dropped; the range is not enforced here
    pub fn with_potential_improvement(mut self, percent: f64) -> Self {
        self.potential_improvement_percent = Some(percent).filter(|p| p.is_finite());
        self
    }

    /// `0`, negative or non-finite means "not estimated"
    pub fn with_estimated_baseline(mut self, seconds: f64) -> Self {
        self.estimated_baseline_seconds = positive(Some(seconds));
        self
    }

    /// Parse and validate a response body
    pub fn from_json(body: &str) -> AnalysisResult<Self> {
        let raw: RawReport =
            serde_json::from_str(body).map_err(|e| AnalysisError::Payload(e.to_string()))?;
        Self::try_from(raw)
    }

    pub fn bottlenecks(&self) -> &[Bottleneck] {
        &self.bottlenecks
    }

    pub fn total_bottlenecks(&self) -> u32 {
        self.total_bottlenecks
    }

    pub fn critical_count(&self) -> u32 {
        self.critical_count
    }

    pub fn warning_count(&self) -> u32 {
        self.warning_count
    }

    pub fn info_count(&self) -> u32 {
        self.info_count
    }

    pub fn unclassified_count(&self) -> u32 {
        self.unclassified_count
    }

    pub fn potential_improvement_percent(&self) -> Option<f64> {
        self.potential_improvement_percent
    }

    pub fn estimated_baseline_seconds(&self) -> Option<f64> {
        self.estimated_baseline_seconds
    }

    /// A successful analysis with zero findings
    pub fn is_empty(&self) -> bool {
        self.bottlenecks.is_empty()
    }
}

// ============================================================================
// Wire types
// ============================================================================

/// Response body of `POST /api/bi/analyze`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReport {
    pub bottlenecks: Vec<RawBottleneck>,
    pub total_bottlenecks: Option<u32>,
    pub critical_count: Option<u32>,
    pub warning_count: Option<u32>,
    pub info_count: Option<u32>,
    pub potential_improvement_percent: Option<f64>,
    pub estimated_baseline_seconds: Option<f64>,
    pub formatted_report: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBottleneck {
    pub severity: Option<String>,
    pub issue_type: Option<String>,
    pub cost_percentage: Option<f64>,
    pub line_number: Option<u32>,
    pub start_line: Option<u32>,
    pub end_line: Option<u32>,
    pub operator_name: Option<String>,
    pub query_fragment: Option<String>,
    pub optimized_fragment: Option<String>,
    pub problem_description: String,
    pub why_its_a_slow: Option<String>,
    pub expected_improvement: Option<String>,
    pub time_impact_seconds: Option<f64>,
    pub execution_count: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub fixes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub fix_queries: Vec<String>,
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn non_zero<T: PartialEq + Default>(value: Option<T>) -> Option<T> {
    value.filter(|v| *v != T::default())
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items.into_iter().filter_map(|s| s.clean()).collect()
}

impl TryFrom<RawBottleneck> for Bottleneck {
    type Error = AnalysisError;

    fn try_from(raw: RawBottleneck) -> Result<Self, Self::Error> {
        let problem_description = raw
            .problem_description
            .clean()
            .ok_or_else(|| AnalysisError::Payload("empty problemDescription".to_string()))?;

        let issue_type = raw
            .issue_type
            .clean()
            .map(IssueType::from)
            .unwrap_or_else(|| IssueType::Other(IssueType::UNSPECIFIED.to_string()));

        Ok(Self {
            severity: raw
                .severity
                .clean()
                .map(Severity::from)
                .unwrap_or_else(|| Severity::Unknown(Severity::UNSPECIFIED.to_string())),
            issue_type,
            cost_percentage: raw
                .cost_percentage
                .filter(|c| c.is_finite())
                .map(|c| c.max(0.0)),
            line_number: non_zero(raw.line_number),
            start_line: non_zero(raw.start_line),
            end_line: non_zero(raw.end_line),
            operator_name: raw.operator_name.clean(),
            query_fragment: raw.query_fragment.clean(),
            optimized_fragment: raw.optimized_fragment.clean(),
            problem_description,
            why_its_a_slow: raw.why_its_a_slow.clean(),
            expected_improvement: raw.expected_improvement.clean(),
            time_impact_seconds: positive(raw.time_impact_seconds),
            execution_count: non_zero(raw.execution_count),
            fixes: clean_list(raw.fixes),
            fix_queries: clean_list(raw.fix_queries),
        })
    }
}

/// Compare a count declared by the service with the tally of the list
fn check_declared(field: &str, declared: Option<u32>, actual: u32) -> AnalysisResult<()> {
    match declared {
        Some(declared) if declared != actual => Err(AnalysisError::Payload(format!(
            "{} is {} but the bottleneck list yields {}",
            field, declared, actual
        ))),
        _ => Ok(()),
    }
}

impl TryFrom<RawReport> for DiagnosticReport {
    type Error = AnalysisError;

    fn try_from(raw: RawReport) -> Result<Self, Self::Error> {
        let bottlenecks = raw
            .bottlenecks
            .into_iter()
            .enumerate()
            .map(|(idx, b)| {
                Bottleneck::try_from(b).map_err(|e| match e {
                    AnalysisError::Payload(msg) => {
                        AnalysisError::Payload(format!("bottleneck #{}: {}", idx + 1, msg))
                    },
                    other => other,
                })
            })
            .collect::<AnalysisResult<Vec<_>>>()?;

        let mut report = DiagnosticReport::new(bottlenecks);

        check_declared("totalBottlenecks", raw.total_bottlenecks, report.total_bottlenecks)?;
        check_declared("criticalCount", raw.critical_count, report.critical_count)?;
        check_declared("warningCount", raw.warning_count, report.warning_count)?;
        check_declared("infoCount", raw.info_count, report.info_count)?;

        report.potential_improvement_percent =
            raw.potential_improvement_percent.filter(|p| p.is_finite());
        report.estimated_baseline_seconds = positive(raw.estimated_baseline_seconds);
        report.formatted_report = raw.formatted_report.clean();

        Ok(report)
    }
}
