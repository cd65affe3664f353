//! pytest summary line parsing
//!
//! Recognizes the closing banner
//! `===== 3 passed, 1 failed, 2 errors in 1.00s =====` and its quiet-mode
//! form `3 passed, 1 failed in 1.00s`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Outcome counts from one test run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    pub passed: u64,
    pub failed: u64,
    pub errors: u64,
    pub skipped: u64,
    pub xfailed: u64,
    pub xpassed: u64,
    pub rerun: u64,
    pub deselected: u64,
    pub warnings: u64,
}

impl SummaryCounts {
    /// Tests that were actually selected to run
    pub fn selected(&self) -> u64 {
        self.passed
            + self.failed
            + self.errors
            + self.skipped
            + self.xfailed
            + self.xpassed
            + self.rerun
    }

    /// Failures and errors together
    pub fn failed_total(&self) -> u64 {
        self.failed + self.errors
    }

    fn slot(&mut self, label: &str) -> Option<&mut u64> {
        let slot = match label {
            "passed" | "pass" | "passes" => &mut self.passed,
            "failed" | "failure" | "failures" => &mut self.failed,
            "errors" | "error" => &mut self.errors,
            "skipped" => &mut self.skipped,
            "xfailed" => &mut self.xfailed,
            "xpassed" => &mut self.xpassed,
            "rerun" | "reruns" => &mut self.rerun,
            "deselected" => &mut self.deselected,
            "warnings" | "warning" => &mut self.warnings,
            _ => return None,
        };
        Some(slot)
    }
}

fn bare_summary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d+ [A-Za-z_-]+(?:, \d+ [A-Za-z_-]+)* in .+$").expect("valid regex")
    })
}

fn chunk_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+) ([A-Za-z_-]+)").expect("valid regex"))
}

fn find_summary_line(output: &str) -> Option<&str> {
    for line in output.lines().rev() {
        let stripped = line.trim();
        if stripped.is_empty() {
            continue;
        }
        if stripped.starts_with("===") && stripped.contains(" in ") {
            return Some(stripped.trim_matches(|c| c == '=' || c == ' '));
        }
        if bare_summary_re().is_match(stripped) {
            return Some(stripped);
        }
    }
    None
}

/// Parse the last summary line in `output`.
///
/// Never fails: output without a recognizable summary yields all zeros, and
/// labels this parser does not know are skipped.
pub fn parse_summary(output: &str) -> SummaryCounts {
    let mut counts = SummaryCounts::default();

    let Some(line) = find_summary_line(output) else {
        return counts;
    };

    let stats = line.split(" in ").next().unwrap_or_default();
    for chunk in stats.split(',') {
        let Some(caps) = chunk_re().captures(chunk.trim()) else {
            continue;
        };
        let Ok(value) = caps[1].parse::<u64>() else {
            continue;
        };
        let label = caps[2].to_lowercase();
        if let Some(slot) = counts.slot(&label) {
            *slot += value;
        }
    }

    counts
}
