//! Per-file pattern application.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::trace;

use crate::patterns::{LanguageTag, PatternScope};

use super::types::{PatternMatch, ScanFileOutcome};

/// Lines of context captured on each side of a matching line.
const CONTEXT_RADIUS: usize = 10;

/// Applies a file's applicable pattern set line by line.
///
/// Holds only shared read-only state, so it is cheap to clone into workers.
#[derive(Clone)]
pub struct Scanner {
    scope: Arc<PatternScope>,
}

impl Scanner {
    pub fn new(scope: Arc<PatternScope>) -> Self {
        Scanner { scope }
    }

    /// Scan one file with every pattern applicable to its language tag.
    ///
    /// Decoding is permissive: malformed byte sequences are replaced, never
    /// fatal. A file that cannot be opened or read yields a single
    /// whole-file error and no matches.
    pub fn scan_file(&self, path: &Path) -> ScanFileOutcome {
        let file_path = path.to_string_lossy().into_owned();

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                return ScanFileOutcome::read_failure(
                    file_path.clone(),
                    format!("Error reading {file_path}: {e}"),
                );
            }
        };
        let content = String::from_utf8_lossy(&bytes);
        let lines: Vec<&str> = content.lines().collect();

        let tag = LanguageTag::classify(path);
        let patterns = self.scope.applicable(tag);
        trace!(file = %file_path, ?tag, patterns = patterns.len(), "scanning file");

        let mut outcome = ScanFileOutcome::default();
        for (index, line) in lines.iter().enumerate() {
            for pattern in patterns {
                let matched: Vec<String> = pattern
                    .regex
                    .find_iter(line)
                    .map(|m| m.as_str().to_string())
                    .collect();
                if matched.is_empty() {
                    continue;
                }
                // One record per occurrence, each carrying the full ordered
                // list of this line's matches for that pattern.
                for _ in 0..matched.len() {
                    outcome.matches.push(PatternMatch {
                        file_path: file_path.clone(),
                        line_number: index + 1,
                        pattern_name: pattern.name.clone(),
                        matched_substrings: matched.clone(),
                        matched_line: line.trim().to_string(),
                        context: context_window(&lines, index),
                    });
                }
            }
        }
        outcome
    }
}

/// Join up to `CONTEXT_RADIUS` lines on each side of `index`, clipped at the
/// file boundaries, trimmed as a block.
fn context_window(lines: &[&str], index: usize) -> String {
    let start = index.saturating_sub(CONTEXT_RADIUS);
    let end = (index + CONTEXT_RADIUS + 1).min(lines.len());
    lines[start..end].join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternStore;
    use std::fs;
    use tempfile::TempDir;

    fn scanner_with(patterns: &[(&str, &str)]) -> (Scanner, TempDir) {
        let temp = TempDir::new().unwrap();
        for (name, source) in patterns {
            fs::write(temp.path().join(format!("{name}.txt")), source).unwrap();
        }
        let (store, errors) = PatternStore::load(temp.path());
        assert!(errors.is_empty());
        let scanner = Scanner::new(Arc::new(PatternScope::build(&store)));
        (scanner, temp)
    }

    #[test]
    fn test_match_carries_line_number_and_substrings() {
        let (scanner, _patterns) = scanner_with(&[("secret", r#"password\s*=\s*".*""#)]);
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.py");
        fs::write(&file, "password = \"hunter2\"\n").unwrap();

        let outcome = scanner.scan_file(&file);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.matches.len(), 1);
        let m = &outcome.matches[0];
        assert_eq!(m.line_number, 1);
        assert_eq!(m.pattern_name, "secret");
        assert_eq!(m.matched_substrings, vec!["password = \"hunter2\""]);
        assert_eq!(m.matched_line, "password = \"hunter2\"");
    }

    #[test]
    fn test_multiple_occurrences_on_one_line() {
        let (scanner, _patterns) = scanner_with(&[("token", r"tok_[a-z]+")]);
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("env.sh");
        fs::write(&file, "A=tok_one B=tok_two\n").unwrap();

        let outcome = scanner.scan_file(&file);
        // One record per occurrence, each listing both in order.
        assert_eq!(outcome.matches.len(), 2);
        for m in &outcome.matches {
            assert_eq!(m.matched_substrings, vec!["tok_one", "tok_two"]);
        }
    }

    #[test]
    fn test_context_clipped_at_file_start_and_end() {
        let (scanner, _patterns) = scanner_with(&[("hit", "needle")]);
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("f.txt");
        let mut content = String::from("needle at top\n");
        for i in 0..30 {
            content.push_str(&format!("filler {i}\n"));
        }
        content.push_str("needle at bottom\n");
        fs::write(&file, &content).unwrap();

        let outcome = scanner.scan_file(&file);
        assert_eq!(outcome.matches.len(), 2);

        let top = &outcome.matches[0];
        assert_eq!(top.line_number, 1);
        // Clipped at file start: the line itself plus 10 after.
        assert_eq!(top.context.lines().count(), 11);
        assert!(top.context.starts_with("needle at top"));

        let bottom = &outcome.matches[1];
        assert_eq!(bottom.line_number, 32);
        assert_eq!(bottom.context.lines().count(), 11);
        assert!(bottom.context.ends_with("needle at bottom"));
    }

    #[test]
    fn test_full_context_window_is_21_lines() {
        let (scanner, _patterns) = scanner_with(&[("hit", "needle")]);
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("f.txt");
        let mut content = String::new();
        for i in 0..20 {
            content.push_str(&format!("before {i}\n"));
        }
        content.push_str("needle here\n");
        for i in 0..20 {
            content.push_str(&format!("after {i}\n"));
        }
        fs::write(&file, &content).unwrap();

        let outcome = scanner.scan_file(&file);
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].line_number, 21);
        assert_eq!(outcome.matches[0].context.lines().count(), 21);
    }

    #[test]
    fn test_invalid_utf8_is_decoded_lossily() {
        let (scanner, _patterns) = scanner_with(&[("hit", "needle")]);
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("bin.dat");
        let mut bytes = b"needle ".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, 0xfd]);
        bytes.extend_from_slice(b" end\n");
        fs::write(&file, &bytes).unwrap();

        let outcome = scanner.scan_file(&file);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.matches.len(), 1);
    }

    #[test]
    fn test_unreadable_file_yields_single_read_error() {
        let (scanner, _patterns) = scanner_with(&[("hit", "needle")]);
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("gone.txt");

        let outcome = scanner.scan_file(&missing);
        assert!(outcome.matches.is_empty());
        assert!(outcome.read_failed());
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].pattern_name.is_none());
        assert!(outcome.errors[0].message.starts_with("Error reading "));
    }

    #[test]
    fn test_no_patterns_means_no_matches() {
        let (scanner, _patterns) = scanner_with(&[]);
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.py");
        fs::write(&file, "password = \"hunter2\"\n").unwrap();

        let outcome = scanner.scan_file(&file);
        assert!(outcome.matches.is_empty());
        assert!(outcome.errors.is_empty());
    }
}
