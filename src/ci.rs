//! GitHub Actions environment resolution
use crate::error::{CoderefsError, Result};
use anyhow::Context;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// The parts of a GitHub webhook event payload a scan needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GithubEvent {
    #[serde(rename = "repository")]
    pub repo: EventRepo,
    #[serde(default)]
    pub sender: Option<EventSender>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventRepo {
    #[serde(rename = "html_url")]
    pub url: String,
    #[serde(default)]
    pub default_branch: String,
    /// Seconds since the epoch
    #[serde(default)]
    pub pushed_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventSender {
    #[serde(rename = "login")]
    pub username: String,
}

impl GithubEvent {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

pub fn parse_event(path: &Path) -> Result<GithubEvent> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read GitHub event payload: {}", path.display()))?;
    GithubEvent::from_json(&json)
}

/// Extract the branch name from a `refs/heads/<branch>` ref.
pub fn parse_branch(git_ref: &str) -> Result<String> {
    let re = Regex::new(r"^refs/heads/(.+)$")?;
    re.captures(git_ref)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| CoderefsError::InvalidRef(git_ref.to_string()))
}

/// Repository context resolved from the Actions runner environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubContext {
    pub branch: String,
    pub repo_name: String,
    pub dir: String,
    pub update_sequence_id: i64,
    pub repo_url: String,
    pub default_branch: String,
}

impl GithubContext {
    pub fn from_env<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required =
            |name: &str| lookup(name).ok_or_else(|| CoderefsError::MissingEnv(name.to_string()));

        let repository = required("GITHUB_REPOSITORY")?;
        let repo_name = match repository.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => name.to_string(),
            _ => return Err(CoderefsError::InvalidRepository(repository)),
        };
        let branch = parse_branch(&required("GITHUB_REF")?)?;
        let event = parse_event(Path::new(&required("GITHUB_EVENT_PATH")?))?;

        let default_branch = lookup("INPUT_DEFAULTBRANCH")
            .filter(|b| !b.is_empty())
            .unwrap_or(event.repo.default_branch);

        Ok(Self {
            branch,
            repo_name,
            dir: lookup("GITHUB_WORKSPACE").unwrap_or_default(),
            update_sequence_id: event.repo.pushed_at * 1000,
            repo_url: event.repo.url,
            default_branch,
        })
    }

    /// Scan options derived from the runner context. Credentials are never
    /// part of this map.
    pub fn options(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("branch", self.branch.clone()),
            ("repoType", "github".to_string()),
            ("repoName", self.repo_name.clone()),
            ("dir", self.dir.clone()),
            ("updateSequenceId", self.update_sequence_id.to_string()),
            ("repoUrl", self.repo_url.clone()),
            ("defaultBranch", self.default_branch.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    const EVENT: &str = r#"{
        "repository": {
            "html_url": "https://github.com/acme/shop",
            "default_branch": "main",
            "pushed_at": 1570000000
        },
        "sender": { "login": "octocat" }
    }"#;

    #[test]
    fn test_parse_branch() {
        assert_eq!(parse_branch("refs/heads/main").unwrap(), "main");
        assert_eq!(
            parse_branch("refs/heads/feature/login").unwrap(),
            "feature/login"
        );
        assert!(matches!(
            parse_branch("refs/tags/v1.0.0"),
            Err(CoderefsError::InvalidRef(_))
        ));
        assert!(parse_branch("refs/heads/").is_err());
    }

    #[test]
    fn test_parse_event() {
        let event = GithubEvent::from_json(EVENT).unwrap();
        assert_eq!(event.repo.url, "https://github.com/acme/shop");
        assert_eq!(event.repo.default_branch, "main");
        assert_eq!(event.repo.pushed_at, 1_570_000_000);
        assert_eq!(event.sender.unwrap().username, "octocat");
    }

    #[test]
    fn test_context_from_env() {
        let dir = tempdir().unwrap();
        let event_path = dir.path().join("event.json");
        fs::write(&event_path, EVENT).unwrap();

        let env: HashMap<&str, String> = [
            ("GITHUB_REPOSITORY", "acme/shop".to_string()),
            ("GITHUB_REF", "refs/heads/release".to_string()),
            ("GITHUB_EVENT_PATH", event_path.display().to_string()),
            ("GITHUB_WORKSPACE", "/github/workspace".to_string()),
        ]
        .into_iter()
        .collect();

        let ctx = GithubContext::from_env(|name| env.get(name).cloned()).unwrap();
        assert_eq!(ctx.branch, "release");
        assert_eq!(ctx.repo_name, "shop");
        assert_eq!(ctx.update_sequence_id, 1_570_000_000_000);
        assert_eq!(ctx.default_branch, "main");

        let options = ctx.options();
        assert_eq!(options["repoType"], "github");
        assert_eq!(options["dir"], "/github/workspace");
        assert!(!options.contains_key("accessToken"));
    }

    #[test]
    fn test_default_branch_input_wins() {
        let dir = tempdir().unwrap();
        let event_path = dir.path().join("event.json");
        fs::write(&event_path, EVENT).unwrap();
        let event_path = event_path.display().to_string();

        let ctx = GithubContext::from_env(|name| match name {
            "GITHUB_REPOSITORY" => Some("acme/shop".to_string()),
            "GITHUB_REF" => Some("refs/heads/main".to_string()),
            "GITHUB_EVENT_PATH" => Some(event_path.clone()),
            "INPUT_DEFAULTBRANCH" => Some("trunk".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(ctx.default_branch, "trunk");
        assert_eq!(ctx.dir, "");
    }

    #[test]
    fn test_invalid_repository() {
        let result = GithubContext::from_env(|name| {
            (name == "GITHUB_REPOSITORY").then(|| "shop".to_string())
        });
        assert!(matches!(result, Err(CoderefsError::InvalidRepository(_))));
    }

    #[test]
    fn test_missing_env() {
        let result = GithubContext::from_env(|_| None);
        assert!(matches!(result, Err(CoderefsError::MissingEnv(name)) if name == "GITHUB_REPOSITORY"));
    }
}
