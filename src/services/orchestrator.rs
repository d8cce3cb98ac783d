//! Request orchestrator
//!
//! Owns the single analysis lifecycle:
//!
//! ```text
//!   Idle ──submit──▶ Loading ──ok──▶ Success(report)
//!                      │  ▲
//!                      │  └──submit── Success | Failure
//!                      └──err/cancel──▶ Failure(message)
//! ```
//!
//! State is published through a `watch` channel; the presentation layer
//! observes it with [`RequestOrchestrator::subscribe`]. Only one request may
//! be in flight at a time.

use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Notify, watch};
use uuid::Uuid;

use crate::models::DiagnosticReport;
use crate::services::analysis_client::AnalysisBackend;
use crate::utils::{AnalysisError, AnalysisResult, StringExt};

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisState {
    Idle,
    Loading { request_id: Uuid, sql: String },
    Success(Arc<DiagnosticReport>),
    Failure(String),
}

impl AnalysisState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn report(&self) -> Option<&Arc<DiagnosticReport>> {
        match self {
            Self::Success(report) => Some(report),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failure(message) => Some(message),
            _ => None,
        }
    }
}

pub struct RequestOrchestrator {
    backend: Arc<dyn AnalysisBackend>,
    state: watch::Sender<AnalysisState>,
    cancel: Notify,
}

impl RequestOrchestrator {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        let (state, _) = watch::channel(AnalysisState::Idle);
        Self { backend, state, cancel: Notify::new() }
    }

    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.state.subscribe()
    }

    /// Snapshot of the current state
    pub fn state(&self) -> AnalysisState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Submit SQL text for analysis and wait for the outcome.
    ///
    /// Returns `Err(EmptyQuery)` or `Err(InFlight)` without touching the
    /// state; otherwise the settled `Success` or `Failure` state.
    pub async fn submit(&self, sql: &str) -> AnalysisResult<AnalysisState> {
        let Some(sql) = sql.clean() else {
            tracing::debug!("Rejected empty query submission");
            return Err(AnalysisError::EmptyQuery);
        };

        // Armed before the transition so a cancel() issued right after it is not lost
        let cancelled = self.cancel.notified();
        tokio::pin!(cancelled);
        cancelled.as_mut().enable();

        let request_id = Uuid::new_v4();
        let accepted = self.state.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            // Drops any previous report or error before the call starts
            *state = AnalysisState::Loading { request_id, sql: sql.clone() };
            true
        });

        if !accepted {
            tracing::debug!("Rejected submission while another analysis is in flight");
            return Err(AnalysisError::InFlight);
        }

        tracing::info!("Analysis {} started: {}", request_id, sql.preview(80));
        let t0 = Instant::now();

        let outcome = tokio::select! {
            result = self.backend.analyze(&sql) => result,
            _ = &mut cancelled => Err(AnalysisError::Cancelled),
        };

        let ms = t0.elapsed().as_millis() as u64;
        let next = match outcome {
            Ok(report) => {
                tracing::info!(
                    "Analysis {} succeeded in {}ms: {} bottlenecks ({} critical, {} warning, {} info)",
                    request_id,
                    ms,
                    report.total_bottlenecks(),
                    report.critical_count(),
                    report.warning_count(),
                    report.info_count()
                );
                AnalysisState::Success(Arc::new(report))
            },
            Err(e) => {
                tracing::warn!("Analysis {} failed after {}ms: {}", request_id, ms, e);
                AnalysisState::Failure(e.user_message())
            },
        };

        self.state.send_replace(next.clone());
        Ok(next)
    }

    /// Abort the in-flight request, if any. Returns whether one was running.
    pub fn cancel(&self) -> bool {
        if !self.is_loading() {
            return false;
        }
        tracing::info!("Cancelling in-flight analysis");
        self.cancel.notify_waiters();
        true
    }

    /// Return a settled orchestrator to `Idle`, discarding its report or error.
    /// Refused (returns `false`) while a request is in flight.
    pub fn reset(&self) -> bool {
        let mut refused = false;
        self.state.send_if_modified(|state| match state {
            AnalysisState::Loading { .. } => {
                refused = true;
                false
            },
            AnalysisState::Idle => false,
            _ => {
                *state = AnalysisState::Idle;
                true
            },
        });
        !refused
    }
}
