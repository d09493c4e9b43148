//! Pattern loading and scoping.
//!
//! Patterns live as plain-text `.txt` files in a directory tree; each file's
//! trimmed contents is one regex, keyed by the file's base name with the
//! extension stripped. Directories literally named `disabled` are skipped at
//! any depth. Compilation is eager: a pattern that fails to load or compile is
//! dropped from the store and reported, never fatal to the run.

use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::scanner::ScanError;

pub mod language;
pub mod scope;

pub use language::LanguageTag;
pub use scope::PatternScope;

/// Pattern source files must carry this extension.
const PATTERN_EXTENSION: &str = "txt";

/// Directories with this exact name are ignored, contents included.
const DISABLED_DIR: &str = "disabled";

/// A named, compiled matching rule.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub name: String,
    pub source: String,
    pub regex: Regex,
}

/// A pattern source file that could not be turned into a usable [`Pattern`].
#[derive(Debug)]
pub struct PatternLoadError {
    pub name: Option<String>,
    pub path: PathBuf,
    pub message: String,
}

impl PatternLoadError {
    /// Convert into the sink-routable error record.
    pub fn into_scan_error(self) -> ScanError {
        ScanError {
            file_path: self.path.to_string_lossy().into_owned(),
            pattern_name: self.name,
            message: self.message,
        }
    }
}

/// Immutable mapping of pattern name to compiled pattern, built once at
/// startup and shared read-only by every scan worker.
#[derive(Debug, Default, Clone)]
pub struct PatternStore {
    patterns: BTreeMap<String, Arc<Pattern>>,
}

impl PatternStore {
    /// Load every eligible pattern file under `root`.
    ///
    /// Never fails as a whole: an unreadable root or a bad pattern file ends
    /// up in the returned error list and the store carries whatever loaded.
    pub fn load(root: &Path) -> (PatternStore, Vec<PatternLoadError>) {
        let mut patterns = BTreeMap::new();
        let mut errors = Vec::new();

        let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
            !(entry.file_type().is_dir() && entry.file_name().to_str() == Some(DISABLED_DIR))
        });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    errors.push(PatternLoadError {
                        name: None,
                        path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf()),
                        message: format!("Error reading pattern source: {e}"),
                    });
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(PATTERN_EXTENSION) {
                continue;
            }
            let name = match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(stem) => stem.to_string(),
                None => continue,
            };

            match Self::load_one(&name, path) {
                Ok(pattern) => {
                    debug!(pattern = %name, "loaded pattern");
                    if patterns.insert(name.clone(), Arc::new(pattern)).is_some() {
                        warn!(pattern = %name, path = %path.display(), "duplicate pattern name, keeping later file");
                    }
                }
                Err(error) => {
                    warn!(pattern = %name, "failed to load pattern: {}", error.message);
                    errors.push(error);
                }
            }
        }

        (PatternStore { patterns }, errors)
    }

    fn load_one(name: &str, path: &Path) -> Result<Pattern, PatternLoadError> {
        let source = fs::read_to_string(path).map_err(|e| PatternLoadError {
            name: Some(name.to_string()),
            path: path.to_path_buf(),
            message: format!("Error reading regex '{}' from {}: {}", name, path.display(), e),
        })?;
        let source = source.trim().to_string();
        let regex = Regex::new(&source).map_err(|e| PatternLoadError {
            name: Some(name.to_string()),
            path: path.to_path_buf(),
            message: format!("Error compiling regex '{}' from {}: {}", name, path.display(), e),
        })?;
        Ok(Pattern {
            name: name.to_string(),
            source,
            regex,
        })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Pattern>> {
        self.patterns.get(name)
    }

    /// Iterate patterns in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Pattern>> {
        self.patterns.values()
    }
}
