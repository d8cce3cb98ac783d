pub mod legacy;
pub mod report;

pub use legacy::{LegacyAnalysis, QueryMetrics};
pub use report::{Bottleneck, DiagnosticReport, IssueType, RawBottleneck, RawReport, Severity};

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` list the same as a missing one
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
