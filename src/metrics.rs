use crate::error::Result;
use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};
use std::sync::Arc;

#[derive(Clone)]
pub struct Metrics {
    pub files_scanned: IntCounter,
    pub files_with_references: IntCounter,
    pub hunks_collected: IntCounter,
    pub searches_truncated: IntCounter,
    registry: Arc<Registry>,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let files_scanned =
            IntCounter::with_opts(Opts::new("files_scanned", "Number of files scanned"))?;
        let files_with_references = IntCounter::with_opts(Opts::new(
            "files_with_references",
            "Number of files accepted with at least one hunk",
        ))?;
        let hunks_collected =
            IntCounter::with_opts(Opts::new("hunks_collected", "Number of hunks accepted"))?;
        let searches_truncated = IntCounter::with_opts(Opts::new(
            "searches_truncated",
            "Number of searches stopped early by a limit or deadline",
        ))?;

        registry.register(Box::new(files_scanned.clone()))?;
        registry.register(Box::new(files_with_references.clone()))?;
        registry.register(Box::new(hunks_collected.clone()))?;
        registry.register(Box::new(searches_truncated.clone()))?;

        Ok(Metrics {
            files_scanned,
            files_with_references,
            hunks_collected,
            searches_truncated,
            registry: Arc::new(registry),
        })
    }

    pub fn gather(&self) -> Result<String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("files_scanned", &self.files_scanned.get())
            .field("files_with_references", &self.files_with_references.get())
            .field("hunks_collected", &self.hunks_collected.get())
            .field("searches_truncated", &self.searches_truncated.get())
            .finish()
    }
}
