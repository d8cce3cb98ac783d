pub mod error;
pub mod string_ext;

pub use error::{AnalysisError, AnalysisResult};
pub use string_ext::{StringExt, group_thousands};
