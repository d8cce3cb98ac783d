//! Severity / issue-type classifier
//!
//! Total lookups from the report taxonomy to display attributes. Unknown
//! values always land on a neutral fallback.

use crate::models::{Bottleneck, IssueType, Severity};
use crate::utils::group_thousands;

/// Colour assigned to a severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorToken {
    Red,
    Amber,
    Blue,
    Gray,
}

impl ColorToken {
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            Self::Red => (0xef, 0x44, 0x44),
            Self::Amber => (0xf5, 0x9e, 0x0b),
            Self::Blue => (0x3b, 0x82, 0xf6),
            Self::Gray => (0x6b, 0x72, 0x80),
        }
    }
}

pub const NEUTRAL_GLYPH: &str = "⚪";
pub const INSIGHT_GLYPH: &str = "💡";

pub fn severity_to_color(severity: &Severity) -> ColorToken {
    match severity {
        Severity::Critical => ColorToken::Red,
        Severity::Warning => ColorToken::Amber,
        Severity::Info => ColorToken::Blue,
        Severity::Unknown(_) => ColorToken::Gray,
    }
}

pub fn severity_to_glyph(severity: &Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::Warning => "🟡",
        Severity::Info => "🔵",
        Severity::Unknown(_) => NEUTRAL_GLYPH,
    }
}

pub fn issue_type_to_glyph(issue_type: &IssueType) -> &'static str {
    match issue_type {
        IssueType::NonSargablePredicate => "⚡",
        IssueType::CorrelatedSubquery => "🔄",
        IssueType::OrCondition => "🔀",
        IssueType::LateFilter => "🕒",
        IssueType::MissingIndex => "📇",
        IssueType::HeavyAggregation => "📊",
        IssueType::ExpensiveJoin => "🔗",
        IssueType::CartesianProduct => "✖️",
        IssueType::Other(_) => INSIGHT_GLYPH,
    }
}

/// `NON_SARGABLE_PREDICATE` -> `NON SARGABLE PREDICATE`
pub fn issue_type_label(raw: &str) -> String {
    raw.chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect()
}

/// Glyph for a free-text suggestion of the legacy view.
///
/// Best-effort substring heuristic, not an authoritative severity.
pub fn suggestion_glyph(suggestion: &str) -> &'static str {
    let lower = suggestion.to_lowercase();
    if lower.contains("select *") {
        "⚠️"
    } else if lower.contains("sargable") || lower.contains("function") {
        "🔴"
    } else if lower.contains("index") || lower.contains("sequential") {
        "🟡"
    } else if lower.contains("subquery") || lower.contains("cte") {
        "🔵"
    } else {
        INSIGHT_GLYPH
    }
}

// ============================================================================
// Per-bottleneck annotation
// ============================================================================

/// Display attributes of one bottleneck, ready for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedBottleneck<'a> {
    /// 1-based position in the service's ranking
    pub rank: usize,
    pub bottleneck: &'a Bottleneck,
    pub color: ColorToken,
    pub severity_glyph: &'static str,
    pub issue_glyph: &'static str,
    pub label: String,
    pub cost: Option<String>,
    pub location: Option<String>,
    pub time_impact: Option<String>,
    pub executions: Option<String>,
}

impl AnnotatedBottleneck<'_> {
    /// `CRITICAL #1: NON SARGABLE PREDICATE`
    pub fn title(&self) -> String {
        format!("{} #{}: {}", self.bottleneck.severity, self.rank, self.label)
    }
}

pub fn annotate(index: usize, bottleneck: &Bottleneck) -> AnnotatedBottleneck<'_> {
    let location = match (bottleneck.line_number, bottleneck.start_line, bottleneck.end_line) {
        (Some(line), _, _) => Some(format!("Line {}", line)),
        (None, Some(start), Some(end)) if end > start => Some(format!("Lines {}-{}", start, end)),
        (None, Some(start), _) => Some(format!("Line {}", start)),
        _ => None,
    };

    AnnotatedBottleneck {
        rank: index + 1,
        bottleneck,
        color: severity_to_color(&bottleneck.severity),
        severity_glyph: severity_to_glyph(&bottleneck.severity),
        issue_glyph: issue_type_to_glyph(&bottleneck.issue_type),
        label: issue_type_label(bottleneck.issue_type.as_str()),
        cost: bottleneck
            .cost_percentage
            .map(|c| format!("{:.1}% of runtime", c)),
        location,
        time_impact: bottleneck
            .time_impact_seconds
            .map(|s| format!("{:.1} seconds", s)),
        executions: bottleneck
            .execution_count
            .map(|n| format!("{} times", group_thousands(n))),
    }
}

/// Annotate a whole list, preserving order
pub fn annotate_all(bottlenecks: &[Bottleneck]) -> Vec<AnnotatedBottleneck<'_>> {
    bottlenecks
        .iter()
        .enumerate()
        .map(|(idx, b)| annotate(idx, b))
        .collect()
}
