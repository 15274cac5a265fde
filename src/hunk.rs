//! Code reference hunks as sent to the remote service
use serde::{Deserialize, Serialize};

/// A contiguous excerpt of a file that references one flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    pub proj_key: String,
    pub flag_key: String,
    /// 1-based line number of the first line in `lines`
    pub starting_line_number: usize,
    /// Excerpt lines joined by `\n`
    pub lines: String,
    pub aliases: Vec<String>,
}

/// All hunks found in a single file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceHunks {
    pub path: String,
    pub hunks: Vec<Hunk>,
}

impl Hunk {
    /// Number of lines covered by this hunk. Empty text still occupies its
    /// starting line.
    pub fn line_count(&self) -> usize {
        self.lines.split('\n').count()
    }

    /// 1-based number of the last line covered by this hunk.
    pub fn ending_line_number(&self) -> usize {
        self.starting_line_number + self.line_count() - 1
    }
}

impl ReferenceHunks {
    pub fn hunk_count(&self) -> usize {
        self.hunks.len()
    }
}
