pub mod aggregator;
pub mod analysis_client;
pub mod classifier;
pub mod orchestrator;
pub mod presenter;
pub mod samples;

pub use aggregator::{DerivedSummary, ReportOutcome, SeverityBadge, summarize};
pub use analysis_client::{AnalysisBackend, AnalysisClient};
pub use classifier::{AnnotatedBottleneck, ColorToken};
pub use orchestrator::{AnalysisState, RequestOrchestrator};
pub use presenter::ReportPresenter;
pub use samples::{SAMPLES, SampleQuery};
