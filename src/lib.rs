pub mod aggregate;
pub mod ci;
pub mod cli;
pub mod config;
pub mod error;
pub mod excerpt;
pub mod hunk;
pub mod matcher;
pub mod metrics;
pub mod processor;
pub mod search;

pub use crate::aggregate::{aggregate_hunks_for_flag, HunkOptions};
pub use crate::config::Config;
pub use crate::error::{CoderefsError, Result};
pub use crate::hunk::{Hunk, ReferenceHunks};
pub use crate::matcher::{FlagMatcher, IdentifierTable, LineMatch};
pub use crate::metrics::Metrics;
pub use crate::processor::SourceFile;
pub use crate::search::{SearchEngine, SearchLimits, SearchResult, StopReason};
pub use clap::Parser;
pub use cli::{Cli, Commands};
