//! Command handlers, one per CLI subcommand

pub mod analyze;
pub mod interactive;
pub mod samples;
pub mod suggest;

use anyhow::Context;
use tokio::io::AsyncReadExt;

use crate::config::QueryInput;
use crate::services::samples as sample_queries;

/// Resolve the SQL text from an argument, a file, an example number or stdin
pub async fn read_query(input: &QueryInput) -> anyhow::Result<String> {
    if let Some(sql) = &input.sql {
        return Ok(sql.clone());
    }

    if let Some(path) = &input.file {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read SQL from {}", path.display()));
    }

    if let Some(number) = input.example {
        let sample = sample_queries::by_number(number).with_context(|| {
            format!("No example #{} (choose 1-{})", number, sample_queries::SAMPLES.len())
        })?;
        tracing::debug!("Using example query #{}: {}", number, sample.name);
        return Ok(sample.sql.to_string());
    }

    let mut sql = String::new();
    tokio::io::stdin()
        .read_to_string(&mut sql)
        .await
        .context("Failed to read SQL from stdin")?;
    Ok(sql)
}
