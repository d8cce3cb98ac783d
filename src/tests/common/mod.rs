// Common test utilities and helpers

use async_trait::async_trait;
use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::models::{Bottleneck, DiagnosticReport, IssueType, Severity};
use crate::services::AnalysisBackend;
use crate::utils::{AnalysisError, AnalysisResult};

// ============================================================================
// Fake analysis service (real HTTP on a loopback port)
// ============================================================================

#[derive(Clone)]
struct FakeState {
    status: StatusCode,
    body: String,
    delay: Option<Duration>,
    hits: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<serde_json::Value>>>,
}

async fn respond(
    State(state): State<FakeState>,
    Json(request): Json<serde_json::Value>,
) -> (StatusCode, String) {
    state.hits.fetch_add(1, Ordering::SeqCst);
    *state.last_request.lock().unwrap() = Some(request);
    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }
    (state.status, state.body.clone())
}

/// Serves one canned response on one path; every other path is a 404
pub struct FakeService {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<serde_json::Value>>>,
}

impl FakeService {
    pub async fn start(path: &str, status: StatusCode, body: impl Into<String>) -> Self {
        Self::start_with_delay(path, status, body, None).await
    }

    pub async fn start_with_delay(
        path: &str,
        status: StatusCode,
        body: impl Into<String>,
        delay: Option<Duration>,
    ) -> Self {
        let hits = Arc::new(AtomicUsize::new(0));
        let last_request = Arc::new(Mutex::new(None));
        let state = FakeState {
            status,
            body: body.into(),
            delay,
            hits: Arc::clone(&hits),
            last_request: Arc::clone(&last_request),
        };

        let app = Router::new().route(path, post(respond)).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake service");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { base_url: format!("http://{}", addr), hits, last_request }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<serde_json::Value> {
        self.last_request.lock().unwrap().clone()
    }
}

/// Base URL of a loopback port nothing listens on
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    drop(listener);
    format!("http://{}", addr)
}

// ============================================================================
// Scripted in-process backend
// ============================================================================

/// Replays queued outcomes in order; optionally holds each call until released
pub struct ScriptedBackend {
    outcomes: Mutex<VecDeque<AnalysisResult<DiagnosticReport>>>,
    gate: Option<Semaphore>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(outcomes: Vec<AnalysisResult<DiagnosticReport>>) -> Arc<Self> {
        Arc::new(Self { outcomes: Mutex::new(outcomes.into()), gate: None, calls: AtomicUsize::new(0) })
    }

    pub fn gated(outcomes: Vec<AnalysisResult<DiagnosticReport>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            gate: Some(Semaphore::new(0)),
            calls: AtomicUsize::new(0),
        })
    }

    /// Let one held call finish
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisBackend for ScriptedBackend {
    async fn analyze(&self, _sql: &str) -> AnalysisResult<DiagnosticReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AnalysisError::Transport("no scripted outcome".to_string())))
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub const CRITICAL_REPORT_JSON: &str = r#"{
    "bottlenecks": [{
        "severity": "CRITICAL",
        "issueType": "NON_SARGABLE_PREDICATE",
        "costPercentage": 62.5,
        "lineNumber": 3,
        "queryFragment": "WHERE YEAR(order_date) = 2024",
        "optimizedFragment": "WHERE order_date >= '2024-01-01' AND order_date < '2025-01-01'",
        "problemDescription": "Function call on indexed column prevents index usage",
        "whyItsASlow": "The index on order_date cannot be used",
        "expectedImprovement": "Index range scan instead of full scan",
        "timeImpactSeconds": 4.2,
        "executionCount": 1200000,
        "fixes": ["Rewrite the predicate as a range"],
        "fixQueries": ["CREATE INDEX idx_orders_date ON orders(order_date)"]
    }],
    "totalBottlenecks": 1,
    "criticalCount": 1,
    "warningCount": 0,
    "infoCount": 0,
    "potentialImprovementPercent": 87.6,
    "estimatedBaselineSeconds": 5.3
}"#;

pub fn critical_report() -> DiagnosticReport {
    DiagnosticReport::from_json(CRITICAL_REPORT_JSON).expect("fixture must parse")
}

pub fn report_with(severities: &[Severity]) -> DiagnosticReport {
    DiagnosticReport::new(
        severities
            .iter()
            .map(|s| Bottleneck::new(s.clone(), IssueType::MissingIndex, "No index on join key"))
            .collect(),
    )
}
