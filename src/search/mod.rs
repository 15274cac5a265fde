//! Concurrent reference search over a stream of files
pub mod engine;

use crate::hunk::ReferenceHunks;
use std::fmt;
use std::time::Duration;

pub use engine::SearchEngine;

// Defensive limits that keep the uploaded payload bounded on large repos,
// minified files and false positives.
pub const DEFAULT_MAX_FILE_COUNT: usize = 10_000;
pub const DEFAULT_MAX_HUNK_COUNT: usize = 25_000;

/// Output caps applied while draining results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLimits {
    /// Stop once this many files with references were accepted
    pub max_file_count: usize,
    /// Stop once the accepted hunk total exceeds this
    pub max_hunk_count: usize,
    /// Stop draining after this long and return what was collected
    pub timeout: Option<Duration>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_file_count: DEFAULT_MAX_FILE_COUNT,
            max_hunk_count: DEFAULT_MAX_HUNK_COUNT,
            timeout: None,
        }
    }
}

/// Why a search returned before every file was collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    FileLimit,
    HunkLimit,
    Deadline,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::FileLimit => write!(f, "maximum number of files with references"),
            StopReason::HunkLimit => write!(f, "maximum number of hunks"),
            StopReason::Deadline => write!(f, "search deadline"),
        }
    }
}

/// References collected by one search run. Files appear in completion
/// order, not input order.
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub references: Vec<ReferenceHunks>,
    pub total_hunks: usize,
    pub stopped: Option<StopReason>,
}

impl SearchResult {
    pub fn is_truncated(&self) -> bool {
        self.stopped.is_some()
    }
}
