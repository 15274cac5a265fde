use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoderefsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Failed to build matcher for flag '{flag_key}': {source}")]
    Matcher {
        flag_key: String,
        #[source]
        source: aho_corasick::BuildError,
    },

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnv(String),

    #[error("expected branch name starting with refs/heads/, got: {0}")]
    InvalidRef(String),

    #[error("unable to validate GitHub repository name: {0}")]
    InvalidRepository(String),

    #[error("An unexpected error occurred: {0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CoderefsError>;
