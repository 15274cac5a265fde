use crate::aggregate::{aggregate_hunks_for_flag, HunkOptions};
use crate::hunk::ReferenceHunks;
use crate::matcher::IdentifierTable;
use log::trace;
use serde::Deserialize;

/// A file handed to the search, already read into lines.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceFile {
    /// Repository-relative path
    pub path: String,
    pub lines: Vec<String>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            path: path.into(),
            lines,
        }
    }

    /// Split whole file contents on line endings (`\n` or `\r\n`).
    pub fn from_text(path: impl Into<String>, text: &str) -> Self {
        Self::new(path, text.lines().map(str::to_string).collect())
    }

    /// Collect hunks for every flag in `table`. Returns `None` when no flag
    /// is referenced in this file.
    pub fn to_hunks(&self, table: &IdentifierTable, options: &HunkOptions) -> Option<ReferenceHunks> {
        let hunks: Vec<_> = table
            .matchers()
            .iter()
            .flat_map(|matcher| aggregate_hunks_for_flag(&self.lines, matcher, options))
            .collect();

        if hunks.is_empty() {
            return None;
        }
        trace!("{}: {} hunk(s)", self.path, hunks.len());
        Some(ReferenceHunks {
            path: self.path.clone(),
            hunks,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn table() -> IdentifierTable {
        let mut aliases = HashMap::new();
        aliases.insert("dark-mode".to_string(), vec!["DARK_MODE".to_string()]);
        aliases.insert("beta".to_string(), vec![]);
        IdentifierTable::new(&aliases, "'\"").unwrap()
    }

    fn options() -> HunkOptions {
        HunkOptions {
            proj_key: "web".to_string(),
            context_lines: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_file_without_references() {
        let file = SourceFile::from_text("src/app.js", "let a = 1;\nlet b = 2;\n");
        assert_eq!(file.to_hunks(&table(), &options()), None);
    }

    #[test]
    fn test_hunks_for_every_flag() {
        let text = "\
import x
if (flags['dark-mode']) {
  render()
}
// gap
const DARK_MODE = 1
// filler
// filler
// filler
track(\"beta\")
";
        let file = SourceFile::from_text("src/app.js", text);
        let refs = file.to_hunks(&table(), &options()).unwrap();
        assert_eq!(refs.path, "src/app.js");
        assert_eq!(refs.hunk_count(), 3);

        let beta: Vec<_> = refs.hunks.iter().filter(|h| h.flag_key == "beta").collect();
        assert_eq!(beta.len(), 1);
        assert_eq!(beta[0].starting_line_number, 9);
        assert_eq!(beta[0].proj_key, "web");

        let dark: Vec<_> = refs
            .hunks
            .iter()
            .filter(|h| h.flag_key == "dark-mode")
            .collect();
        assert_eq!(dark.len(), 2);
        assert_eq!(dark[0].starting_line_number, 1);
        assert!(dark[0].aliases.is_empty());
        assert_eq!(dark[1].starting_line_number, 5);
        assert_eq!(dark[1].aliases, vec!["DARK_MODE"]);
    }

    #[test]
    fn test_from_text_handles_crlf() {
        let file = SourceFile::from_text("a.txt", "one\r\ntwo\r\n");
        assert_eq!(file.lines, vec!["one", "two"]);
    }

    #[test]
    fn test_deserialize_record() {
        let file: SourceFile =
            serde_json::from_str(r#"{"path":"a.go","lines":["x := \"beta\""]}"#).unwrap();
        assert_eq!(file.path, "a.go");
        assert!(file.to_hunks(&table(), &options()).is_some());
    }
}
