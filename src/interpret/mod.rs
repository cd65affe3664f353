//! Turns free-text tool output into structured results

pub mod coverage;
pub mod freeze;
pub mod summary;

pub use coverage::{parse_line_rate, read_coverage_report, CoverageError, CoverageSummary};
pub use freeze::parse_freeze;
pub use summary::{parse_summary, SummaryCounts};
