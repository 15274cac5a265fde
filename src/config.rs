use crate::aggregate::{HunkOptions, DEFAULT_MAX_LINE_CHAR_COUNT};
use crate::search::{SearchLimits, DEFAULT_MAX_FILE_COUNT, DEFAULT_MAX_HUNK_COUNT};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DELIMITERS: &str = "\"'`";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project_key: String,
    pub context_lines: i32,
    pub delimiters: String,

    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_file_count")]
    pub max_file_count: usize,
    #[serde(default = "default_max_hunk_count")]
    pub max_hunk_count: usize,
    #[serde(default = "default_max_line_char_count")]
    pub max_line_char_count: usize,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_max_file_count() -> usize {
    DEFAULT_MAX_FILE_COUNT
}
fn default_max_hunk_count() -> usize {
    DEFAULT_MAX_HUNK_COUNT
}
fn default_max_line_char_count() -> usize {
    DEFAULT_MAX_LINE_CHAR_COUNT
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_count: default_max_file_count(),
            max_hunk_count: default_max_hunk_count(),
            max_line_char_count: default_max_line_char_count(),
            timeout_secs: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_key: String::new(),
            context_lines: 2,
            delimiters: DEFAULT_DELIMITERS.to_string(),
            limits: LimitsConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay GitHub Actions style inputs (`INPUT_<NAME>`) on top of the
    /// file configuration.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(project_key) = lookup("INPUT_PROJKEY").filter(|v| !v.is_empty()) {
            self.project_key = project_key;
        }
        if let Some(context_lines) = lookup("INPUT_CONTEXTLINES").filter(|v| !v.is_empty()) {
            self.context_lines = context_lines
                .trim()
                .parse()
                .with_context(|| format!("Invalid INPUT_CONTEXTLINES: {context_lines}"))?;
        }
        if let Some(delimiters) = lookup("INPUT_DELIMITERS").filter(|v| !v.is_empty()) {
            self.delimiters = delimiters;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.project_key.trim().is_empty() {
            bail!("project_key must be set");
        }
        if self.delimiters.is_empty() {
            bail!("at least one delimiter character is required");
        }
        if self.limits.max_file_count == 0 || self.limits.max_hunk_count == 0 {
            bail!("file and hunk limits must be greater than zero");
        }
        if self.limits.max_line_char_count == 0 {
            bail!("max_line_char_count must be greater than zero");
        }
        Ok(())
    }

    pub fn hunk_options(&self) -> HunkOptions {
        HunkOptions {
            proj_key: self.project_key.clone(),
            context_lines: self.context_lines,
            max_line_char_count: self.limits.max_line_char_count,
        }
    }

    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_file_count: self.limits.max_file_count,
            max_hunk_count: self.limits.max_hunk_count,
            timeout: self.limits.timeout_secs.map(Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.context_lines, 2);
        assert_eq!(config.limits.max_file_count, 10_000);
        assert_eq!(config.limits.max_hunk_count, 25_000);
        assert_eq!(config.limits.max_line_char_count, 500);
        assert_eq!(config.search_limits().timeout, None);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("coderefs.toml");
        fs::write(
            &path,
            r#"
project_key = "mobile"
context_lines = -1
delimiters = "'"

[limits]
max_hunk_count = 100
timeout_secs = 30
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        config.validate().unwrap();
        assert_eq!(config.project_key, "mobile");
        assert_eq!(config.hunk_options().context_lines, -1);
        assert_eq!(config.limits.max_file_count, 10_000);
        assert_eq!(config.search_limits().max_hunk_count, 100);
        assert_eq!(
            config.search_limits().timeout,
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = Config::load(Path::new("/nonexistent/coderefs.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/coderefs.toml"));
    }

    #[test]
    fn test_validate_rejects_missing_project_key() {
        assert!(Config::default().validate().is_err());
    }

    #[test]
    fn test_apply_env() {
        let env: HashMap<&str, &str> = [
            ("INPUT_PROJKEY", "web"),
            ("INPUT_CONTEXTLINES", "4"),
            ("INPUT_DELIMITERS", ""),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config
            .apply_env(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.project_key, "web");
        assert_eq!(config.context_lines, 4);
        assert_eq!(config.delimiters, DEFAULT_DELIMITERS);
    }

    #[test]
    fn test_apply_env_rejects_bad_context() {
        let mut config = Config::default();
        let result = config.apply_env(|name| {
            (name == "INPUT_CONTEXTLINES").then(|| "lots".to_string())
        });
        assert!(result.is_err());
    }
}
