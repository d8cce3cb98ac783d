//! `querylens suggest` - legacy metrics and suggestions view

use crate::AppState;
use crate::config::QueryInput;

pub async fn run(state: &AppState, input: &QueryInput) -> anyhow::Result<bool> {
    let sql = super::read_query(input).await?;

    match state.client.analyze_legacy(&sql).await {
        Ok(analysis) => {
            println!("{}", state.presenter.render_legacy(&analysis));
            Ok(true)
        },
        Err(e) => {
            tracing::warn!("Legacy analysis failed: {}", e);
            eprintln!("{}", state.presenter.render_failure(&e.user_message()));
            Ok(false)
        },
    }
}
