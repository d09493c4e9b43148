//! Event and statistics types produced by scanning.

use serde::Serialize;

/// One pattern hit on one line of one file, with surrounding context.
///
/// Immutable once produced; created by the scanner and consumed immediately
/// by the result sink.
#[derive(Debug, Clone)]
pub struct PatternMatch {
    pub file_path: String,
    /// 1-based line number of the matching line.
    pub line_number: usize,
    pub pattern_name: String,
    /// Every non-overlapping match of the pattern on this line, in order.
    pub matched_substrings: Vec<String>,
    /// The matching line, trimmed.
    pub matched_line: String,
    /// Up to 21 lines centered on the match (10 before, 10 after), clipped at
    /// file boundaries and trimmed as a block.
    pub context: String,
}

/// A recoverable failure scoped to one file, or to one pattern within it.
///
/// `pattern_name` is `Some` for pattern-scoped failures (routed to that
/// pattern's error file) and `None` for whole-file read failures.
#[derive(Debug, Clone)]
pub struct ScanError {
    pub file_path: String,
    pub pattern_name: Option<String>,
    pub message: String,
}

/// Everything one file's scan produced.
#[derive(Debug, Default)]
pub struct ScanFileOutcome {
    pub matches: Vec<PatternMatch>,
    pub errors: Vec<ScanError>,
}

impl ScanFileOutcome {
    pub fn read_failure(file_path: String, message: String) -> Self {
        ScanFileOutcome {
            matches: Vec::new(),
            errors: vec![ScanError {
                file_path,
                pattern_name: None,
                message,
            }],
        }
    }

    /// True when the file itself could not be read.
    pub fn read_failed(&self) -> bool {
        self.errors.iter().any(|e| e.pattern_name.is_none())
    }
}

/// Statistics from a scanning run.
#[derive(Debug, Default, Serialize)]
pub struct ScanStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub total_matches: usize,
    pub total_errors: usize,
    pub scan_duration_ms: u64,
}
