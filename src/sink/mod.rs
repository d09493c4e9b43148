//! Per-pattern append-only result files.
//!
//! Each pattern gets `<output_dir>/<name>_matches.txt` and
//! `<output_dir>/<name>_errors.txt`, created on first write; whole-file read
//! failures land in `file_read_errors.txt`. Handles are long-lived and kept
//! in a registry, one mutex per output file, so concurrent workers targeting
//! the same pattern never interleave records. A write failure here is the one
//! error class that escalates: it indicates a broken output destination.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::scanner::sanitize::strip_disallowed;
use crate::scanner::{PatternMatch, ScanError};

/// Destination for read failures not attributable to any pattern.
pub const FILE_READ_ERRORS: &str = "file_read_errors.txt";

pub struct ResultSink {
    output_dir: PathBuf,
    strip_bad_chars: bool,
    handles: Mutex<HashMap<String, Arc<Mutex<File>>>>,
}

impl ResultSink {
    /// Create the sink, creating the output directory if absent.
    pub fn new(output_dir: &Path, strip_bad_chars: bool) -> Result<Self> {
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;
        Ok(ResultSink {
            output_dir: output_dir.to_path_buf(),
            strip_bad_chars,
            handles: Mutex::new(HashMap::new()),
        })
    }

    /// Append one match block to its pattern's match file.
    pub fn record_match(&self, m: &PatternMatch) -> Result<()> {
        let block = self.format_match(m);
        self.append(&format!("{}_matches.txt", m.pattern_name), &block)
    }

    /// Append one error line to its pattern's error file, or to the shared
    /// read-error file when no pattern is implicated.
    pub fn record_error(&self, e: &ScanError) -> Result<()> {
        let target = match &e.pattern_name {
            Some(name) => format!("{name}_errors.txt"),
            None => FILE_READ_ERRORS.to_string(),
        };
        self.append(&target, &format!("{}\n", e.message))
    }

    fn format_match(&self, m: &PatternMatch) -> String {
        let transform = |text: &str| {
            if self.strip_bad_chars {
                strip_disallowed(text)
            } else {
                text.to_string()
            }
        };
        let keywords = m
            .matched_substrings
            .iter()
            .map(|s| transform(s))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "Match found in {} at line {} for pattern {}. \n\
             Keywords: {}\n\
             Matching String: {}\n\n\
             {}\n\n",
            m.file_path,
            m.line_number,
            m.pattern_name,
            keywords,
            transform(&m.matched_line),
            transform(&m.context),
        )
    }

    fn append(&self, file_name: &str, text: &str) -> Result<()> {
        let handle = self.handle_for(file_name)?;
        let mut file = handle.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(text.as_bytes())
            .with_context(|| format!("Failed to append to {file_name}"))
    }

    fn handle_for(&self, file_name: &str) -> Result<Arc<Mutex<File>>> {
        let mut registry = self.handles.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = registry.get(file_name) {
            return Ok(handle.clone());
        }
        let path = self.output_dir.join(file_name);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open output file {}", path.display()))?;
        let handle = Arc::new(Mutex::new(file));
        registry.insert(file_name.to_string(), handle.clone());
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_match() -> PatternMatch {
        PatternMatch {
            file_path: "src/a.py".to_string(),
            line_number: 3,
            pattern_name: "generic_secret".to_string(),
            matched_substrings: vec!["password = \"hunter2\"".to_string()],
            matched_line: "password = \"hunter2\"".to_string(),
            context: "line before\npassword = \"hunter2\"\nline after".to_string(),
        }
    }

    #[test]
    fn test_match_block_contains_all_fields_in_order() {
        let temp = TempDir::new().unwrap();
        let sink = ResultSink::new(temp.path(), false).unwrap();
        sink.record_match(&sample_match()).unwrap();

        let written = fs::read_to_string(temp.path().join("generic_secret_matches.txt")).unwrap();
        assert!(written.contains("Match found in src/a.py at line 3 for pattern generic_secret."));
        assert!(written.contains("Keywords: password = \"hunter2\""));
        assert!(written.contains("Matching String: password = \"hunter2\""));
        assert!(written.contains("line before\npassword = \"hunter2\"\nline after"));
        assert!(written.ends_with("\n\n"));

        let header = written.find("Match found").unwrap();
        let keywords = written.find("Keywords:").unwrap();
        let line = written.find("Matching String:").unwrap();
        let context = written.find("line before").unwrap();
        assert!(header < keywords && keywords < line && line < context);
    }

    #[test]
    fn test_pattern_errors_and_read_errors_route_to_different_files() {
        let temp = TempDir::new().unwrap();
        let sink = ResultSink::new(temp.path(), false).unwrap();

        sink.record_error(&ScanError {
            file_path: "a.py".to_string(),
            pattern_name: Some("broken".to_string()),
            message: "Error compiling regex 'broken'".to_string(),
        })
        .unwrap();
        sink.record_error(&ScanError {
            file_path: "b.py".to_string(),
            pattern_name: None,
            message: "Error reading b.py: permission denied".to_string(),
        })
        .unwrap();

        let pattern_errors = fs::read_to_string(temp.path().join("broken_errors.txt")).unwrap();
        assert!(pattern_errors.contains("Error compiling regex 'broken'"));
        let read_errors = fs::read_to_string(temp.path().join(FILE_READ_ERRORS)).unwrap();
        assert!(read_errors.contains("permission denied"));
    }

    #[test]
    fn test_appends_accumulate() {
        let temp = TempDir::new().unwrap();
        let sink = ResultSink::new(temp.path(), false).unwrap();
        sink.record_match(&sample_match()).unwrap();
        sink.record_match(&sample_match()).unwrap();

        let written = fs::read_to_string(temp.path().join("generic_secret_matches.txt")).unwrap();
        assert_eq!(written.matches("Match found").count(), 2);
    }

    #[test]
    fn test_strip_transform_applies_to_substrings_line_and_context() {
        let temp = TempDir::new().unwrap();
        let sink = ResultSink::new(temp.path(), true).unwrap();
        let mut m = sample_match();
        m.matched_substrings = vec!["pa$$word%".to_string()];
        m.matched_line = "pa$$word% = `x`".to_string();
        m.context = "ctx €line".to_string();
        sink.record_match(&m).unwrap();

        let written = fs::read_to_string(temp.path().join("generic_secret_matches.txt")).unwrap();
        assert!(written.contains("Keywords: password"));
        assert!(!written.contains('$'));
        assert!(!written.contains('%'));
        assert!(!written.contains('`'));
        assert!(written.contains("ctx line"));
        // The header fields are not transformed.
        assert!(written.contains("Match found in src/a.py at line 3"));
    }

    #[test]
    fn test_output_directory_created_if_absent() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("out").join("deep");
        let sink = ResultSink::new(&nested, false).unwrap();
        sink.record_match(&sample_match()).unwrap();
        assert!(nested.join("generic_secret_matches.txt").exists());
    }

    #[test]
    fn test_concurrent_writers_do_not_interleave_blocks() {
        use std::sync::Arc;

        let temp = TempDir::new().unwrap();
        let sink = Arc::new(ResultSink::new(temp.path(), false).unwrap());

        let mut joins = Vec::new();
        for _ in 0..8 {
            let sink = sink.clone();
            joins.push(std::thread::spawn(move || {
                for _ in 0..50 {
                    sink.record_match(&sample_match()).unwrap();
                }
            }));
        }
        for join in joins {
            join.join().unwrap();
        }

        let written = fs::read_to_string(temp.path().join("generic_secret_matches.txt")).unwrap();
        assert_eq!(written.matches("Match found in src/a.py").count(), 400);
        // Every block is intact: splitting on the double blank line yields
        // only well-formed blocks.
        for block in written.split("\n\n").filter(|b| !b.trim().is_empty()) {
            assert!(
                block.starts_with("Match found") || block.starts_with("line before"),
                "corrupted block: {block:?}"
            );
        }
    }
}
