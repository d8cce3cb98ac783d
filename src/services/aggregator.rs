//! Report aggregator
//!
//! Summarises a validated report into the figures shown in the report
//! header. Values the service did not estimate stay `None` and are hidden by
//! the presenter.

use crate::models::{DiagnosticReport, Severity};
use crate::services::classifier::{self, ColorToken};

/// Whether the analysis found anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Successful analysis with zero findings
    NoIssues,
    IssuesFound,
}

/// Header badge for one severity with a non-zero count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityBadge {
    pub severity: Severity,
    pub count: u32,
    pub glyph: &'static str,
    pub color: ColorToken,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedSummary {
    pub outcome: ReportOutcome,
    pub total: u32,
    pub critical: u32,
    pub warning: u32,
    pub info: u32,
    pub unclassified: u32,
    /// Full precision as reported
    pub potential_improvement_percent: Option<f64>,
    pub estimated_baseline_seconds: Option<f64>,
    /// Ordered most severe first, zero counts omitted
    pub badges: Vec<SeverityBadge>,
}

impl DerivedSummary {
    /// Potential improvement clamped to `[0, 100]` and rounded
    pub fn improvement_rounded(&self) -> Option<u32> {
        self.potential_improvement_percent
            .map(|p| p.clamp(0.0, 100.0).round() as u32)
    }

    pub fn improvement_display(&self) -> Option<String> {
        self.improvement_rounded().map(|p| format!("{}%", p))
    }

    pub fn baseline_display(&self) -> Option<String> {
        self.estimated_baseline_seconds
            .map(|s| format!("{:.1}s", s))
    }

    pub fn is_clean(&self) -> bool {
        self.outcome == ReportOutcome::NoIssues
    }
}

pub fn summarize(report: &DiagnosticReport) -> DerivedSummary {
    let outcome = if report.is_empty() {
        ReportOutcome::NoIssues
    } else {
        ReportOutcome::IssuesFound
    };

    let badges = [
        (Severity::Critical, report.critical_count(), "Critical"),
        (Severity::Warning, report.warning_count(), "Warnings"),
        (Severity::Info, report.info_count(), "Info"),
    ]
    .into_iter()
    .filter(|(_, count, _)| *count > 0)
    .map(|(severity, count, label)| SeverityBadge {
        glyph: classifier::severity_to_glyph(&severity),
        color: classifier::severity_to_color(&severity),
        severity,
        count,
        label,
    })
    .collect();

    DerivedSummary {
        outcome,
        total: report.total_bottlenecks(),
        critical: report.critical_count(),
        warning: report.warning_count(),
        info: report.info_count(),
        unclassified: report.unclassified_count(),
        potential_improvement_percent: report.potential_improvement_percent(),
        estimated_baseline_seconds: report.estimated_baseline_seconds(),
        badges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bottleneck, IssueType};

    fn bottleneck(severity: Severity) -> Bottleneck {
        Bottleneck::new(severity, IssueType::MissingIndex, "scan")
    }

    #[test]
    fn test_empty_report_is_no_issues() {
        let summary = summarize(&DiagnosticReport::new(vec![]));
        assert_eq!(summary.outcome, ReportOutcome::NoIssues);
        assert!(summary.is_clean());
        assert_eq!(summary.total, 0);
        assert!(summary.badges.is_empty());
        assert_eq!(summary.improvement_display(), None);
        assert_eq!(summary.baseline_display(), None);
    }

    #[test]
    fn test_counts_and_badge_order() {
        let report = DiagnosticReport::new(vec![
            bottleneck(Severity::Info),
            bottleneck(Severity::Critical),
            bottleneck(Severity::Info),
        ]);
        let summary = summarize(&report);

        assert_eq!(summary.outcome, ReportOutcome::IssuesFound);
        assert_eq!((summary.critical, summary.warning, summary.info), (1, 0, 2));
        assert_eq!(summary.critical + summary.warning + summary.info, summary.total);

        let severities: Vec<_> = summary.badges.iter().map(|b| b.severity.clone()).collect();
        assert_eq!(severities, vec![Severity::Critical, Severity::Info]);
        assert_eq!(summary.badges[1].label, "Info");
    }

    #[test]
    fn test_improvement_rounding_keeps_precision() {
        let report = DiagnosticReport::new(vec![bottleneck(Severity::Warning)])
            .with_potential_improvement(87.6);
        let summary = summarize(&report);
        assert_eq!(summary.potential_improvement_percent, Some(87.6));
        assert_eq!(summary.improvement_display().as_deref(), Some("88%"));
    }

    #[test]
    fn test_improvement_clamped() {
        let over = summarize(&DiagnosticReport::new(vec![]).with_potential_improvement(140.2));
        assert_eq!(over.improvement_rounded(), Some(100));
        let under = summarize(&DiagnosticReport::new(vec![]).with_potential_improvement(-3.0));
        assert_eq!(under.improvement_rounded(), Some(0));
    }

    #[test]
    fn test_baseline_hidden_when_zero() {
        let zero = summarize(&DiagnosticReport::new(vec![]).with_estimated_baseline(0.0));
        assert_eq!(zero.baseline_display(), None);
        let set = summarize(&DiagnosticReport::new(vec![]).with_estimated_baseline(12.34));
        assert_eq!(set.baseline_display().as_deref(), Some("12.3s"));
    }

    #[test]
    fn test_unknown_severity_is_unclassified() {
        let report = DiagnosticReport::new(vec![
            bottleneck(Severity::parse("BLOCKER")),
            bottleneck(Severity::Warning),
        ]);
        let summary = summarize(&report);
        assert_eq!(summary.unclassified, 1);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.badges.len(), 1);
    }
}
