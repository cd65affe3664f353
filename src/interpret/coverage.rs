//! Cobertura XML coverage reports as produced by `coverage xml`

use roxmltree::Document;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("coverage report not found: {0}")]
    Missing(String),

    #[error("failed to read coverage report: {0}")]
    Read(String),

    #[error("malformed coverage report: {0}")]
    Malformed(String),

    #[error("coverage report has no line-rate attribute")]
    MissingLineRate,

    #[error("invalid line-rate value: {0}")]
    InvalidLineRate(String),
}

/// Coverage figure recorded in the Test stage result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub line_pct: f64,
    pub report_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CoverageSummary {
    pub fn unavailable(report_path: &Path, error: impl Into<String>) -> Self {
        Self {
            line_pct: 0.0,
            report_path: report_path.display().to_string(),
            error: Some(error.into()),
        }
    }
}

/// Root `line-rate` of a report, as a percentage rounded to two decimals
pub fn parse_line_rate(xml: &str) -> Result<f64, CoverageError> {
    let doc = Document::parse(xml).map_err(|e| CoverageError::Malformed(e.to_string()))?;
    let raw = doc
        .root_element()
        .attribute("line-rate")
        .ok_or(CoverageError::MissingLineRate)?;
    let rate: f64 = raw
        .trim()
        .parse()
        .map_err(|_| CoverageError::InvalidLineRate(raw.to_string()))?;
    if !rate.is_finite() {
        return Err(CoverageError::InvalidLineRate(raw.to_string()));
    }

    Ok((rate * 100.0 * 100.0).round() / 100.0)
}

/// Read and interpret the report at `path`.
///
/// A missing or unparseable report degrades to `0.0` with the reason kept
/// in `error`; it is never a hard failure.
pub fn read_coverage_report(path: &Path) -> CoverageSummary {
    let result = if path.is_file() {
        fs::read_to_string(path)
            .map_err(|e| CoverageError::Read(e.to_string()))
            .and_then(|xml| parse_line_rate(&xml))
    } else {
        Err(CoverageError::Missing(path.display().to_string()))
    };

    match result {
        Ok(line_pct) => CoverageSummary {
            line_pct,
            report_path: path.display().to_string(),
            error: None,
        },
        Err(e) => CoverageSummary::unavailable(path, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const REPORT: &str = r#"<?xml version="1.0" ?>
<coverage version="7.4.0" timestamp="1700000000000" lines-valid="120" lines-covered="101" line-rate="0.8417" branches-covered="0" branches-valid="0" branch-rate="0" complexity="0">
	<sources><source>/work/src</source></sources>
	<packages/>
</coverage>
"#;

    #[test]
    fn test_parse_line_rate() {
        assert_eq!(parse_line_rate(REPORT).unwrap(), 84.17);
    }

    #[test]
    fn test_full_and_zero_coverage() {
        assert_eq!(parse_line_rate(r#"<coverage line-rate="1"/>"#).unwrap(), 100.0);
        assert_eq!(parse_line_rate(r#"<coverage line-rate="0"/>"#).unwrap(), 0.0);
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse_line_rate("<coverage line-rate=").unwrap_err();
        assert!(matches!(err, CoverageError::Malformed(_)));
    }

    #[test]
    fn test_missing_attribute() {
        let err = parse_line_rate("<coverage/>").unwrap_err();
        assert!(matches!(err, CoverageError::MissingLineRate));
    }

    #[test]
    fn test_non_numeric_rate() {
        let err = parse_line_rate(r#"<coverage line-rate="lots"/>"#).unwrap_err();
        assert!(matches!(err, CoverageError::InvalidLineRate(_)));
    }

    #[test]
    fn test_read_report_from_disk() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("coverage.xml");
        fs::write(&path, REPORT).unwrap();

        let summary = read_coverage_report(&path);

        assert_eq!(summary.line_pct, 84.17);
        assert!(summary.error.is_none());
        assert_eq!(summary.report_path, path.display().to_string());
    }

    #[test]
    fn test_unparseable_report_degrades_to_zero() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("coverage.xml");
        fs::write(&path, "not xml at all").unwrap();

        let summary = read_coverage_report(&path);

        assert_eq!(summary.line_pct, 0.0);
        assert!(summary.error.unwrap().starts_with("malformed coverage report"));
    }

    #[test]
    fn test_missing_report_degrades_to_zero() {
        let temp = TempDir::new().unwrap();
        let summary = read_coverage_report(&temp.path().join("coverage.xml"));

        assert_eq!(summary.line_pct, 0.0);
        assert!(summary.error.unwrap().contains("not found"));
    }
}
