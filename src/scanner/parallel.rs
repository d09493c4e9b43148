//! Directory traversal and the parallel scan pipeline.
//!
//! The walker enumerates candidate files (pruning excluded directories before
//! descending into them), then fans the paths out over a bounded
//! producer/consumer pool: one producer thread feeds a work channel, N
//! workers scan files, and the calling thread drains outcomes into the sink.
//! File scans are independent, so the only shared mutable state is inside the
//! sink.

use anyhow::{anyhow, Result};
use crossbeam::channel::{bounded, Receiver, Sender};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::sink::ResultSink;

use super::core::Scanner;
use super::exclude::ExclusionRules;
use super::types::{ScanFileOutcome, ScanStats};

pub struct Walker {
    scanner: Scanner,
    rules: ExclusionRules,
    /// Worker cap; 0 means one worker per available core.
    max_threads: usize,
}

impl Walker {
    pub fn new(scanner: Scanner, rules: ExclusionRules, max_threads: usize) -> Self {
        Walker {
            scanner,
            rules,
            max_threads,
        }
    }

    /// Traverse `root`, scan every eligible file, and forward all produced
    /// records to `sink`. Per-file and per-pattern failures are recorded and
    /// recovered; only a sink write failure aborts the run.
    pub fn run(&self, root: &Path, sink: &ResultSink) -> Result<ScanStats> {
        let start = Instant::now();
        let mut stats = ScanStats::default();

        let file_paths = self.collect_candidates(root, &mut stats);
        let workers = self.worker_count(file_paths.len());
        debug!(files = file_paths.len(), workers, "starting scan");

        if !file_paths.is_empty() {
            self.scan_all(file_paths, workers, sink, &mut stats)?;
        }

        stats.scan_duration_ms = start.elapsed().as_millis() as u64;
        Ok(stats)
    }

    /// Enumerate non-excluded regular files under `root`. Excluded
    /// directories are pruned before descent; extension and filename rules
    /// are still checked per file since they cannot be decided at directory
    /// level.
    fn collect_candidates(&self, root: &Path, stats: &mut ScanStats) -> Vec<PathBuf> {
        let mut file_paths = Vec::new();
        let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
            !(entry.file_type().is_dir() && self.rules.matches_directory(entry.path()))
        });
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    if self.rules.should_skip(entry.path()) {
                        stats.files_skipped += 1;
                    } else {
                        file_paths.push(entry.path().to_path_buf());
                    }
                }
                Err(e) => {
                    warn!("walk error: {e}");
                    stats.files_skipped += 1;
                }
            }
        }
        file_paths
    }

    fn worker_count(&self, file_count: usize) -> usize {
        let cores = num_cpus::get();
        let cap = if self.max_threads > 0 {
            self.max_threads.min(cores)
        } else {
            cores
        };
        cap.min(file_count.max(1))
    }

    fn scan_all(
        &self,
        file_paths: Vec<PathBuf>,
        workers: usize,
        sink: &ResultSink,
        stats: &mut ScanStats,
    ) -> Result<()> {
        let total = file_paths.len();
        let (work_tx, work_rx): (Sender<PathBuf>, Receiver<PathBuf>) = bounded(workers * 2);
        let (result_tx, result_rx): (Sender<ScanFileOutcome>, Receiver<ScanFileOutcome>) =
            bounded(workers * 4);
        let progress = Arc::new(AtomicUsize::new(0));

        let drained = crossbeam::thread::scope(|s| {
            for _ in 0..workers {
                let work_rx = work_rx.clone();
                let result_tx = result_tx.clone();
                let progress = progress.clone();
                s.spawn(move |_| self.scan_worker(work_rx, result_tx, progress, total));
            }

            let producer_tx = work_tx.clone();
            s.spawn(move |_| {
                for path in file_paths {
                    if producer_tx.send(path).is_err() {
                        break; // workers dropped
                    }
                }
            });

            // Drop the originals so channels close once producer and workers
            // finish.
            drop(work_tx);
            drop(result_tx);

            Self::drain_results(result_rx, sink, stats, total)
        })
        .map_err(|_| anyhow!("worker thread panicked during scan"))?;
        drained
    }

    fn scan_worker(
        &self,
        work_rx: Receiver<PathBuf>,
        result_tx: Sender<ScanFileOutcome>,
        progress: Arc<AtomicUsize>,
        total: usize,
    ) {
        while let Ok(path) = work_rx.recv() {
            let outcome = self.scanner.scan_file(&path);
            if result_tx.send(outcome).is_err() {
                break; // collector dropped
            }
            let done = progress.fetch_add(1, Ordering::Relaxed) + 1;
            if done % 100 == 0 || done == total {
                debug!(done, total, "scan progress");
            }
        }
    }

    /// Forward worker outcomes to the sink. Returning early on a sink failure
    /// drops the receiver, which unblocks and winds down the workers.
    fn drain_results(
        result_rx: Receiver<ScanFileOutcome>,
        sink: &ResultSink,
        stats: &mut ScanStats,
        total: usize,
    ) -> Result<()> {
        let mut processed = 0;
        while let Ok(outcome) = result_rx.recv() {
            processed += 1;
            if outcome.read_failed() {
                stats.files_skipped += 1;
            } else {
                stats.files_scanned += 1;
            }
            stats.total_matches += outcome.matches.len();
            stats.total_errors += outcome.errors.len();

            for m in &outcome.matches {
                sink.record_match(m)?;
            }
            for e in &outcome.errors {
                if e.pattern_name.is_none() {
                    warn!("{}", e.message);
                }
                sink.record_error(e)?;
            }

            if processed >= total {
                break;
            }
        }
        Ok(())
    }
}
