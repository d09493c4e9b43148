//! Path exclusion rules.
//!
//! All three rule kinds are case-insensitive and independent OR-conditions.
//! Directory exclusion is a plain substring test against the full path, not
//! path-segment matching: excluding `"test"` also excludes a path containing
//! `"latest"`. That imprecision is a documented behavioral contract; see
//! [`ExclusionRules::matches_directory`] for the extension point if stricter
//! segment matching is ever wanted.

use std::path::Path;

/// Directory substrings always excluded, regardless of CLI arguments.
pub const DEFAULT_EXCLUDED_DIRS: [&str; 4] = ["test", "tests", "testing", ".git"];

/// Case-insensitive skip rules applied to every candidate path.
/// Built once before traversal and shared read-only by all workers.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    extensions: Vec<String>,
    directories: Vec<String>,
    filenames: Vec<String>,
}

impl ExclusionRules {
    /// Build rules from raw lists, lowercasing everything and dropping empty
    /// entries left over from comma splitting.
    pub fn new<S: AsRef<str>>(extensions: &[S], directories: &[S], filenames: &[S]) -> Self {
        fn normalize<S: AsRef<str>>(items: &[S]) -> Vec<String> {
            items
                .iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        }
        ExclusionRules {
            extensions: normalize(extensions),
            directories: normalize(directories),
            filenames: normalize(filenames),
        }
    }

    /// Like [`ExclusionRules::new`], with the built-in directory defaults
    /// unioned into the directory list.
    pub fn with_builtin_dirs<S: AsRef<str>>(
        extensions: &[S],
        directories: &[S],
        filenames: &[S],
    ) -> Self {
        let mut rules = Self::new(extensions, directories, filenames);
        for builtin in DEFAULT_EXCLUDED_DIRS {
            if !rules.directories.iter().any(|d| d == builtin) {
                rules.directories.push(builtin.to_string());
            }
        }
        rules
    }

    /// Whether `path` must not be scanned. Pure and total; never fails.
    pub fn should_skip(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension() {
            let ext = format!(".{}", ext.to_string_lossy().to_lowercase());
            if self.extensions.iter().any(|excluded| *excluded == ext) {
                return true;
            }
        }

        if self.matches_directory(path) {
            return true;
        }

        if let Some(name) = path.file_name() {
            let name = name.to_string_lossy().to_lowercase();
            if self.filenames.iter().any(|excluded| *excluded == name) {
                return true;
            }
        }

        false
    }

    /// The directory-substring rule on its own, used by the walker to prune
    /// whole subtrees before descending into them. Substring semantics are
    /// contractual; swap this body for segment-aware matching to tighten it.
    pub fn matches_directory(&self, path: &Path) -> bool {
        let lowered = path.to_string_lossy().to_lowercase();
        self.directories
            .iter()
            .any(|excluded| lowered.contains(excluded))
    }
}
