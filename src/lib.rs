//! # Leakscan - Concurrent Sensitive-Data Scanner
//!
//! Leakscan recursively scans a file tree for lines matching a directory of
//! named regex patterns (secret and credential detectors), grouping matches
//! by pattern and appending them, with surrounding context, to per-pattern
//! result files.
//!
//! ## How a run works
//!
//! Patterns are loaded once from a pattern-source tree (directories named
//! `disabled` are skipped), eagerly compiled, and shared read-only with a
//! pool of scan workers. The walker prunes excluded directories before
//! descent, workers scan files line by line, and a per-output-file mutex
//! registry serializes the appends.
//!
//! ## Quick Start
//!
//! ```bash
//! leakscan /path/to/code -r ./regex -o results
//! ```
//!
//! A run always exits 0 when the traversal completes; unreadable files and
//! malformed patterns are reported into the output directory rather than
//! aborting the scan.

pub mod cli;
pub mod patterns;
pub mod scanner;
pub mod sink;

pub use cli::{Cli, Output};
pub use patterns::{LanguageTag, Pattern, PatternScope, PatternStore};
pub use scanner::{ExclusionRules, PatternMatch, ScanError, ScanStats, Scanner, Walker};
pub use sink::ResultSink;

/// Result type alias for leakscan operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
