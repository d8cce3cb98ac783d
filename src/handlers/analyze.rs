//! `querylens analyze` - structured bottleneck report

use std::time::Instant;

use crate::AppState;
use crate::config::QueryInput;
use crate::services::AnalysisState;
use crate::utils::StringExt;

/// Returns whether the analysis succeeded
pub async fn run(
    state: &AppState,
    input: &QueryInput,
    json: bool,
    formatted: bool,
) -> anyhow::Result<bool> {
    let sql = super::read_query(input).await?;

    if formatted {
        return run_formatted(state, &sql).await;
    }

    match state.orchestrator.submit(&sql).await {
        Err(e) => {
            eprintln!("{}", state.presenter.render_failure(&e.user_message()));
            Ok(false)
        },
        Ok(AnalysisState::Success(report)) if json => {
            println!("{}", serde_json::to_string_pretty(report.as_ref())?);
            Ok(true)
        },
        Ok(settled) => {
            println!("{}", state.presenter.render_state(&settled));
            Ok(settled.report().is_some())
        },
    }
}

async fn run_formatted(state: &AppState, sql: &str) -> anyhow::Result<bool> {
    let t0 = Instant::now();
    match state.client.analyze_formatted(sql).await {
        Ok(text) => {
            tracing::info!(
                "Formatted report for '{}' received in {}ms",
                sql.preview(60),
                t0.elapsed().as_millis()
            );
            println!("{}", text);
            Ok(true)
        },
        Err(e) => {
            tracing::warn!("Formatted report failed: {}", e);
            eprintln!("{}", state.presenter.render_failure(&e.user_message()));
            Ok(false)
        },
    }
}
