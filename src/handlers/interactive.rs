//! `querylens interactive` - line-oriented analysis session
//!
//! Statements are collected until a line ends with `;` or a blank line is
//! entered, then submitted on a background task. A separate render task
//! follows the orchestrator's state channel, so every transition
//! (Loading, Success, Failure) is printed as it happens.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::AppState;
use crate::services::samples;
use crate::utils::AnalysisError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Quit,
    Cancel,
    Reset,
    Examples,
    Example(usize),
    Unknown(String),
}

pub fn parse_command(line: &str) -> SessionCommand {
    let mut parts = line.trim().trim_start_matches(':').split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("quit" | "q" | "exit"), _) => SessionCommand::Quit,
        (Some("cancel"), _) => SessionCommand::Cancel,
        (Some("reset" | "clear"), _) => SessionCommand::Reset,
        (Some("examples"), _) => SessionCommand::Examples,
        (Some("example"), Some(n)) => match n.parse() {
            Ok(n) => SessionCommand::Example(n),
            Err(_) => SessionCommand::Unknown(line.trim().to_string()),
        },
        _ => SessionCommand::Unknown(line.trim().to_string()),
    }
}

/// Accumulates input lines into complete statements
#[derive(Debug, Default)]
pub struct StatementBuffer {
    buffer: String,
}

impl StatementBuffer {
    /// Feed one line; returns a statement once it is terminated
    pub fn push_line(&mut self, line: &str) -> Option<String> {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            self.buffer.push_str(line);
            self.buffer.push('\n');
        }

        let terminated = trimmed.ends_with(';') || trimmed.is_empty();
        if terminated && !self.buffer.trim().is_empty() {
            Some(std::mem::take(&mut self.buffer))
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    pub fn take(&mut self) -> Option<String> {
        if self.is_empty() { None } else { Some(std::mem::take(&mut self.buffer)) }
    }
}

pub async fn run(state: &AppState) -> anyhow::Result<()> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let render_task = spawn_renderer(state, shutdown_rx);

    println!("QueryLens interactive session");
    println!("End a statement with ';' or a blank line. Commands: :examples, :example N, :cancel, :reset, :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut statement = StatementBuffer::default();
    let mut in_flight: Vec<JoinHandle<()>> = Vec::new();

    while let Some(line) = lines.next_line().await? {
        in_flight.retain(|h| !h.is_finished());

        if statement.is_empty() && line.trim_start().starts_with(':') {
            match parse_command(&line) {
                SessionCommand::Quit => break,
                SessionCommand::Cancel => {
                    if !state.orchestrator.cancel() {
                        println!("Nothing to cancel.");
                    }
                },
                SessionCommand::Reset => {
                    if !state.orchestrator.reset() {
                        println!("{}", AnalysisError::InFlight.user_message());
                    }
                },
                SessionCommand::Examples => println!("{}", state.presenter.render_samples()),
                SessionCommand::Example(n) => match samples::by_number(n) {
                    Some(sample) => {
                        println!("-- {}\n{}", sample.name, sample.sql);
                        submit(state, sample.sql.to_string(), &mut in_flight);
                    },
                    None => println!("No example #{} (choose 1-{})", n, samples::SAMPLES.len()),
                },
                SessionCommand::Unknown(cmd) => println!("Unknown command: {}", cmd),
            }
            continue;
        }

        if let Some(sql) = statement.push_line(&line) {
            submit(state, sql, &mut in_flight);
        }
    }

    // Input closed: analyze whatever is left, then wait for outstanding work
    if let Some(sql) = statement.take() {
        submit(state, sql, &mut in_flight);
    }
    for handle in in_flight {
        let _ = handle.await;
    }

    let _ = shutdown_tx.send(());
    let _ = render_task.await;
    Ok(())
}

fn submit(state: &AppState, sql: String, in_flight: &mut Vec<JoinHandle<()>>) {
    if state.orchestrator.is_loading() {
        println!("{} Use :cancel to abort it.", AnalysisError::InFlight.user_message());
        return;
    }

    let orchestrator = state.orchestrator.clone();
    in_flight.push(tokio::spawn(async move {
        // Settled states are printed by the render task
        if let Err(e) = orchestrator.submit(&sql).await {
            println!("{}", e.user_message());
        }
    }));
}

fn spawn_renderer(state: &AppState, mut shutdown: oneshot::Receiver<()>) -> JoinHandle<()> {
    let presenter = state.presenter;
    let mut rx = state.orchestrator.subscribe();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                },
                _ = &mut shutdown => {
                    if !rx.has_changed().unwrap_or(false) {
                        break;
                    }
                },
            }

            let current = rx.borrow_and_update().clone();
            let text = presenter.render_state(&current);
            if !text.is_empty() {
                println!("{}\n", text);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command(":quit"), SessionCommand::Quit);
        assert_eq!(parse_command(":q"), SessionCommand::Quit);
        assert_eq!(parse_command(" :cancel "), SessionCommand::Cancel);
        assert_eq!(parse_command(":clear"), SessionCommand::Reset);
        assert_eq!(parse_command(":examples"), SessionCommand::Examples);
        assert_eq!(parse_command(":example 3"), SessionCommand::Example(3));
        assert_eq!(
            parse_command(":example x"),
            SessionCommand::Unknown(":example x".to_string())
        );
        assert_eq!(parse_command(":help"), SessionCommand::Unknown(":help".to_string()));
    }

    #[test]
    fn test_statement_terminated_by_semicolon() {
        let mut buf = StatementBuffer::default();
        assert_eq!(buf.push_line("SELECT *"), None);
        assert_eq!(buf.push_line("FROM t;"), Some("SELECT *\nFROM t;\n".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_statement_terminated_by_blank_line() {
        let mut buf = StatementBuffer::default();
        assert_eq!(buf.push_line(""), None);
        assert_eq!(buf.push_line("SELECT 1"), None);
        assert_eq!(buf.push_line("   "), Some("SELECT 1\n".to_string()));
        assert_eq!(buf.take(), None);
    }
}
