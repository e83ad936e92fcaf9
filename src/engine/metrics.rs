//! Engine run metrics.
//!
//! Collected on every [`Converter::run`](crate::Converter::run); they are cheap
//! (a counter per rule and two clock reads) so there is no separate
//! metrics-only entry point.
//!
//! ## Design notes
//!
//! - `rule_hits` is aligned with the table: `rule_hits[i]` counts applications
//!   of rule `i`, including `Accept` rules.
//! - `candidates_tested` shows how well the first-code-point index prunes; a
//!   value close to `positions * table.len()` means most rules are ranges.

use crate::EncodeError;
use std::time::Duration;

// --- Metrics -----------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunMetrics {
    /// Total elapsed time for the scan.
    pub total: Duration,
    /// Input positions the cursor stopped at.
    pub positions: usize,
    /// Applications per rule, aligned with the table.
    pub rule_hits: Vec<usize>,
    /// Code points copied because no rule matched.
    pub unmatched: usize,
    /// Rules whose pattern was tested against the input.
    pub candidates_tested: usize,
}

impl RunMetrics {
    /// Total rule applications (changes plus `Accept` hits).
    pub fn applied(&self) -> usize {
        self.rule_hits.iter().sum()
    }
}

/// Converter output bundled with timing information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// The rewritten text.
    pub text: String,
    /// Rule applications whose action is not `Accept`.
    pub changes: usize,
    /// Code points that could not be written (replaced by `?`).
    pub diagnostics: Vec<EncodeError>,
    /// Counters and timings for the run.
    pub metrics: RunMetrics,
}
