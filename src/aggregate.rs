//! Per-flag hunk aggregation over the lines of one file
use crate::excerpt::ContextWindow;
use crate::hunk::Hunk;
use crate::matcher::FlagMatcher;

pub const DEFAULT_MAX_LINE_CHAR_COUNT: usize = 500;

/// Options applied to every hunk built during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkOptions {
    pub proj_key: String,
    /// Lines of context on each side of a match; negative disables context
    /// and merging
    pub context_lines: i32,
    pub max_line_char_count: usize,
}

impl Default for HunkOptions {
    fn default() -> Self {
        Self {
            proj_key: String::new(),
            context_lines: 2,
            max_line_char_count: DEFAULT_MAX_LINE_CHAR_COUNT,
        }
    }
}

/// One or more merged context windows for a flag, before its text is built.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Excerpt {
    window: ContextWindow,
    aliases: Vec<String>,
}

impl Excerpt {
    /// Combine with a later, touching excerpt. Lines already covered are not
    /// repeated; a later excerpt inside this one only contributes aliases.
    fn merge(self, later: Excerpt) -> Excerpt {
        let mut aliases = self.aliases;
        for alias in later.aliases {
            if !aliases.contains(&alias) {
                aliases.push(alias);
            }
        }
        Excerpt {
            window: self.window.union(&later.window),
            aliases,
        }
    }

    fn into_hunk(self, lines: &[String], flag_key: &str, options: &HunkOptions) -> Hunk {
        Hunk {
            proj_key: options.proj_key.clone(),
            flag_key: flag_key.to_string(),
            starting_line_number: self.window.start + 1,
            lines: self.window.text(lines, options.max_line_char_count),
            aliases: self.aliases,
        }
    }
}

/// Find every reference to one flag in `lines`, merging hunks whose context
/// overlaps or touches.
///
/// Lines are visited in order, so a candidate can only ever touch the most
/// recent excerpt; earlier excerpts are final once passed. Negative
/// `context_lines` disables merging and yields one hunk per matching line.
pub fn aggregate_hunks_for_flag(
    lines: &[String],
    matcher: &FlagMatcher,
    options: &HunkOptions,
) -> Vec<Hunk> {
    let merging = options.context_lines >= 0;
    let mut excerpts: Vec<Excerpt> = Vec::new();

    for (index, line) in lines.iter().enumerate() {
        let Some(line_match) = matcher.match_line(line) else {
            continue;
        };
        let candidate = Excerpt {
            window: ContextWindow::around(index, options.context_lines, lines.len()),
            aliases: line_match.aliases,
        };
        match excerpts.pop() {
            Some(last) if merging && last.window.overlap(&candidate.window) >= 0 => {
                excerpts.push(last.merge(candidate));
            }
            Some(last) => {
                excerpts.push(last);
                excerpts.push(candidate);
            }
            None => excerpts.push(candidate),
        }
    }

    excerpts
        .into_iter()
        .map(|excerpt| excerpt.into_hunk(lines, matcher.flag_key(), options))
        .collect()
}
