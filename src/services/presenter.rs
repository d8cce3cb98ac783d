//! Terminal presentation layer
//!
//! Renders orchestrator states and reports as plain text, optionally coloured
//! with the classifier's colour tokens.

use owo_colors::OwoColorize;

use crate::models::{DiagnosticReport, LegacyAnalysis};
use crate::services::aggregator::{self, DerivedSummary};
use crate::services::classifier::{self, AnnotatedBottleneck, ColorToken};
use crate::services::orchestrator::AnalysisState;
use crate::services::samples::SAMPLES;

#[derive(Debug, Clone, Copy)]
pub struct ReportPresenter {
    color: bool,
}

impl ReportPresenter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn plain() -> Self {
        Self::new(false)
    }

    fn paint(&self, token: ColorToken, text: &str) -> String {
        if self.color {
            let (r, g, b) = token.rgb();
            text.truecolor(r, g, b).to_string()
        } else {
            text.to_string()
        }
    }

    fn strong(&self, text: &str) -> String {
        if self.color { text.bold().to_string() } else { text.to_string() }
    }

    fn code_block(&self, out: &mut Vec<String>, code: &str) {
        for line in code.lines() {
            let line = format!("    │ {}", line);
            out.push(if self.color { line.cyan().to_string() } else { line });
        }
    }

    pub fn render_state(&self, state: &AnalysisState) -> String {
        match state {
            AnalysisState::Idle => String::new(),
            AnalysisState::Loading { .. } => "⏳ Analyzing...".to_string(),
            AnalysisState::Success(report) => self.render_report(report),
            AnalysisState::Failure(message) => self.render_failure(message),
        }
    }

    pub fn render_failure(&self, message: &str) -> String {
        format!("⚠️  {}", self.paint(ColorToken::Red, message))
    }

    pub fn render_report(&self, report: &DiagnosticReport) -> String {
        let summary = aggregator::summarize(report);
        let mut out = Vec::new();

        self.render_header(&mut out, &summary);
        self.render_performance(&mut out, &summary);

        if summary.is_clean() {
            out.push(String::new());
            out.push(format!("🎉 {}", self.strong("No Performance Issues Detected!")));
            out.push("Your query looks well-optimized.".to_string());
            return out.join("\n");
        }

        out.push(String::new());
        out.push(self.strong("🔍 Bottlenecks Detected"));
        for annotated in classifier::annotate_all(report.bottlenecks()) {
            out.push(String::new());
            self.render_bottleneck(&mut out, &annotated);
        }

        out.join("\n")
    }

    fn render_header(&self, out: &mut Vec<String>, summary: &DerivedSummary) {
        out.push(self.strong("Analysis Results"));
        let badges: Vec<String> = summary
            .badges
            .iter()
            .map(|b| self.paint(b.color, &format!("{} {} {}", b.glyph, b.count, b.label)))
            .collect();
        if !badges.is_empty() {
            out.push(badges.join("  "));
        }
    }

    fn render_performance(&self, out: &mut Vec<String>, summary: &DerivedSummary) {
        out.push(String::new());
        out.push(self.strong("📊 Performance Impact"));
        out.push(format!("  Total Issues:          {}", summary.total));
        if let Some(improvement) = summary.improvement_display() {
            out.push(format!("  Potential Improvement: {}", improvement));
        }
        if let Some(baseline) = summary.baseline_display() {
            out.push(format!("  Estimated Baseline:    {}", baseline));
        }
    }

    fn render_bottleneck(&self, out: &mut Vec<String>, a: &AnnotatedBottleneck<'_>) {
        let b = a.bottleneck;

        let mut title = format!(
            "{} {} {}",
            a.severity_glyph,
            a.issue_glyph,
            self.paint(a.color, &self.strong(&a.title()))
        );
        if let Some(cost) = &a.cost {
            title.push_str(&format!("  [{}]", cost));
        }
        out.push(title);

        if let Some(description) = b.issue_type.description() {
            out.push(format!("  {}", description));
        }
        if let Some(operator) = &b.operator_name {
            out.push(format!("  ⚙️  Operator: {}", operator));
        }
        if let Some(location) = &a.location {
            out.push(format!("  📍 {}", location));
        }
        if let Some(fragment) = &b.query_fragment {
            self.code_block(out, fragment);
        }

        out.push("  ⚠️  Problem:".to_string());
        out.push(format!("    {}", b.problem_description));

        if let Some(why) = &b.why_its_a_slow {
            out.push("  🐌 Why It's Slow:".to_string());
            out.push(format!("    {}", why));
        }
        if let Some(impact) = &a.time_impact {
            out.push(format!("  💰 Impact: {}", impact));
        }
        if let Some(executions) = &a.executions {
            out.push(format!("  🔄 Executes: {}", executions));
        }
        if !b.fixes.is_empty() {
            out.push("  ✅ Recommended Fixes:".to_string());
            for (i, fix) in b.fixes.iter().enumerate() {
                out.push(format!("    {}. {}", i + 1, fix));
            }
        }
        if let Some(optimized) = &b.optimized_fragment {
            out.push("  ✨ Optimized Code:".to_string());
            self.code_block(out, optimized);
        }
        if !b.fix_queries.is_empty() {
            out.push("  💾 Index Recommendations:".to_string());
            for sql in &b.fix_queries {
                self.code_block(out, sql);
            }
        }
        if let Some(expected) = &b.expected_improvement {
            out.push("  📈 Expected Improvement:".to_string());
            out.push(format!("    {}", expected));
        }
    }

    /// Legacy metrics + suggestions view
    pub fn render_legacy(&self, analysis: &LegacyAnalysis) -> String {
        let mut out = vec![self.strong("Analysis Results")];

        if let Some(metrics) = &analysis.metrics {
            out.push(String::new());
            out.push(self.strong("📈 Query Metrics"));
            if let Some(kind) = &metrics.statement_type {
                out.push(format!("  Statement Type:  {}", kind));
            }
            if let Some(ms) = metrics.execution_time {
                out.push(format!("  Execution Time:  {:.2} ms", ms));
            }
            if let Some(rows) = metrics.rows_processed {
                out.push(format!("  Rows Processed:  {}", crate::utils::group_thousands(rows)));
            }
            if let Some(cost) = metrics.cost_estimate {
                out.push(format!("  Cost Estimate:   {:.2}", cost));
            }
            if !metrics.tables_used.is_empty() {
                out.push(format!("  Tables Used:     {}", metrics.tables_used.join(", ")));
            }
        }

        out.push(String::new());
        if analysis.has_suggestions() {
            out.push(self.strong("💡 Optimization Suggestions"));
            for suggestion in &analysis.suggestions {
                out.push(format!("  {} {}", classifier::suggestion_glyph(suggestion), suggestion));
            }
            let n = analysis.suggestions.len();
            out.push(format!("  {} issue{} detected", n, if n == 1 { "" } else { "s" }));
        } else {
            out.push(self.strong("✅ Optimization Suggestions"));
            out.push("  🎉 Great! No optimization issues detected.".to_string());
            out.push("  Your query looks well-optimized.".to_string());
        }

        if let Some(optimized) = &analysis.optimized_sql {
            out.push(String::new());
            out.push(self.strong("✨ Optimized Query"));
            self.code_block(&mut out, optimized);
        }

        out.join("\n")
    }

    pub fn render_samples(&self) -> String {
        SAMPLES
            .iter()
            .enumerate()
            .map(|(i, s)| format!("  {}. {}", i + 1, s.name))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
