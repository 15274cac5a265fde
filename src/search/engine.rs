//! Fan-out over files on the rayon pool, fan-in through a bounded channel
use super::{SearchLimits, SearchResult, StopReason};
use crate::aggregate::HunkOptions;
use crate::error::Result;
use crate::hunk::ReferenceHunks;
use crate::matcher::IdentifierTable;
use crate::metrics::Metrics;
use crate::processor::SourceFile;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Runs the file processor over every file concurrently and collects the
/// capped set of references.
pub struct SearchEngine {
    table: Arc<IdentifierTable>,
    options: Arc<HunkOptions>,
    limits: SearchLimits,
    metrics: Metrics,
}

impl SearchEngine {
    pub fn new(table: IdentifierTable, options: HunkOptions, limits: SearchLimits) -> Result<Self> {
        Ok(Self::with_metrics(table, options, limits, Metrics::new()?))
    }

    pub fn with_metrics(
        table: IdentifierTable,
        options: HunkOptions,
        limits: SearchLimits,
        metrics: Metrics,
    ) -> Self {
        Self {
            table: Arc::new(table),
            options: Arc::new(options),
            limits,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn limits(&self) -> &SearchLimits {
        &self.limits
    }

    /// Search every file produced by `files`.
    ///
    /// Files are pulled on a dispatcher thread and each is processed as its
    /// own rayon task. Results are drained here as they arrive; once a limit
    /// or the deadline is hit the remaining work is abandoned and its
    /// results are discarded.
    pub fn search<I>(&self, files: I) -> SearchResult
    where
        I: IntoIterator<Item = SourceFile>,
        I::IntoIter: Send + 'static,
    {
        let started = Instant::now();
        let deadline = self.limits.timeout.map(|timeout| started + timeout);
        let (tx, rx) = bounded(rayon::current_num_threads().max(1) * 2);
        let cancelled = Arc::new(AtomicBool::new(false));

        let dispatcher = {
            let files = files.into_iter();
            let table = Arc::clone(&self.table);
            let options = Arc::clone(&self.options);
            let metrics = self.metrics.clone();
            let cancelled = Arc::clone(&cancelled);
            thread::spawn(move || process_files(files, tx, &table, &options, &metrics, &cancelled))
        };

        let result = self.collect_references(&rx, deadline);
        match result.stopped {
            Some(reason) => {
                cancelled.store(true, Ordering::Relaxed);
                drop(rx);
                self.metrics.searches_truncated.inc();
                warn!(
                    "Stopped collecting code references at the {reason}: kept {} file(s) with {} hunk(s)",
                    result.references.len(),
                    result.total_hunks
                );
            }
            None => {
                if dispatcher.join().is_err() {
                    error!("File processing panicked; code references may be incomplete");
                }
            }
        }

        info!(
            "Collected {} hunk(s) across {} file(s) in {:.2?}",
            result.total_hunks,
            result.references.len(),
            started.elapsed()
        );
        result
    }

    fn collect_references(
        &self,
        rx: &Receiver<ReferenceHunks>,
        deadline: Option<Instant>,
    ) -> SearchResult {
        let mut result = SearchResult::default();
        loop {
            let next = match deadline {
                Some(deadline) => rx.recv_deadline(deadline),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            let reference = match next {
                Ok(reference) => reference,
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    result.stopped = Some(StopReason::Deadline);
                    break;
                }
            };

            let hunk_count = reference.hunk_count();
            result.references.push(reference);
            result.total_hunks += hunk_count;
            self.metrics.files_with_references.inc();
            self.metrics.hunks_collected.inc_by(hunk_count as u64);

            if result.references.len() >= self.limits.max_file_count {
                result.stopped = Some(StopReason::FileLimit);
                break;
            }
            if result.total_hunks > self.limits.max_hunk_count {
                result.stopped = Some(StopReason::HunkLimit);
                break;
            }
        }
        result
    }
}

/// Dispatch one task per file and publish non-empty results. `tx` is dropped
/// only after the scope has joined every task, which closes the channel.
fn process_files<I>(
    files: I,
    tx: Sender<ReferenceHunks>,
    table: &IdentifierTable,
    options: &HunkOptions,
    metrics: &Metrics,
    cancelled: &AtomicBool,
) where
    I: Iterator<Item = SourceFile>,
{
    let mut dispatched = 0usize;
    rayon::in_place_scope(|scope| {
        for file in files {
            if cancelled.load(Ordering::Relaxed) {
                debug!("Collection stopped, no longer dispatching files");
                break;
            }
            dispatched += 1;
            let tx = tx.clone();
            scope.spawn(move |_| {
                if cancelled.load(Ordering::Relaxed) {
                    return;
                }
                metrics.files_scanned.inc();
                if let Some(reference) = file.to_hunks(table, options) {
                    if tx.send(reference).is_err() {
                        debug!("Collector closed, discarding references in {}", file.path);
                    }
                }
            });
        }
    });
    debug!("Finished processing {dispatched} dispatched file(s)");
}
