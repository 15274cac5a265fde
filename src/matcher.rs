//! Lexical flag matching: delimited flag keys and plain-substring aliases
use crate::error::{CoderefsError, Result};
use aho_corasick::AhoCorasick;
use std::collections::HashMap;

/// What a single line matched for one flag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineMatch {
    /// The flag key appeared between two delimiter characters
    pub flag: bool,
    /// Aliases found anywhere in the line, in alias-list order
    pub aliases: Vec<String>,
}

/// Compiled matcher for one flag key and its aliases.
#[derive(Debug, Clone)]
pub struct FlagMatcher {
    flag_key: String,
    delimited: AhoCorasick,
    aliases: Vec<String>,
    alias_search: AhoCorasick,
}

impl FlagMatcher {
    /// Build the matcher for `flag_key`. Every `left + flag_key + right` with
    /// `left` and `right` drawn from `delimiters` counts as a flag reference.
    pub fn new(flag_key: &str, aliases: &[String], delimiters: &str) -> Result<Self> {
        let mut delims: Vec<char> = Vec::new();
        for c in delimiters.chars() {
            if !delims.contains(&c) {
                delims.push(c);
            }
        }

        let mut forms = Vec::with_capacity(delims.len() * delims.len());
        for left in &delims {
            for right in &delims {
                forms.push(format!("{left}{flag_key}{right}"));
            }
        }

        let mut unique_aliases: Vec<String> = Vec::with_capacity(aliases.len());
        for alias in aliases {
            if !unique_aliases.contains(alias) {
                unique_aliases.push(alias.clone());
            }
        }

        let build_err = |source| CoderefsError::Matcher {
            flag_key: flag_key.to_string(),
            source,
        };
        let delimited = AhoCorasick::new(&forms).map_err(build_err)?;
        let alias_search = AhoCorasick::new(&unique_aliases).map_err(build_err)?;

        Ok(Self {
            flag_key: flag_key.to_string(),
            delimited,
            aliases: unique_aliases,
            alias_search,
        })
    }

    pub fn flag_key(&self) -> &str {
        &self.flag_key
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Match one line. Returns `None` when neither the delimited flag key
    /// nor any alias occurs in it.
    pub fn match_line(&self, line: &str) -> Option<LineMatch> {
        let flag = self.delimited.is_match(line);

        let mut hit = vec![false; self.aliases.len()];
        if !self.aliases.is_empty() {
            for m in self.alias_search.find_overlapping_iter(line) {
                hit[m.pattern().as_usize()] = true;
            }
        }
        let aliases: Vec<String> = self
            .aliases
            .iter()
            .zip(&hit)
            .filter(|(_, found)| **found)
            .map(|(alias, _)| alias.clone())
            .collect();

        if !flag && aliases.is_empty() {
            return None;
        }
        Some(LineMatch { flag, aliases })
    }
}

/// Read-only table of compiled flag matchers shared by every file worker.
#[derive(Debug, Clone, Default)]
pub struct IdentifierTable {
    matchers: Vec<FlagMatcher>,
}

impl IdentifierTable {
    /// Compile a `flag key -> aliases` map. Flags are ordered by key so that
    /// repeated runs produce hunks in the same order within a file.
    pub fn new(aliases: &HashMap<String, Vec<String>>, delimiters: &str) -> Result<Self> {
        let mut keys: Vec<&String> = aliases.keys().collect();
        keys.sort();

        let matchers = keys
            .into_iter()
            .map(|key| FlagMatcher::new(key, &aliases[key], delimiters))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { matchers })
    }

    /// Compile a table from bare flag keys with no aliases.
    pub fn from_keys<I, S>(keys: I, delimiters: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let aliases = keys
            .into_iter()
            .map(|k| (k.into(), Vec::new()))
            .collect::<HashMap<_, _>>();
        Self::new(&aliases, delimiters)
    }

    pub fn matchers(&self) -> &[FlagMatcher] {
        &self.matchers
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}
