pub mod core;
pub mod exclude;
pub mod parallel;
pub mod sanitize;
pub mod types;

// Re-export main types for easier access
pub use core::Scanner;
pub use exclude::{ExclusionRules, DEFAULT_EXCLUDED_DIRS};
pub use parallel::Walker;
pub use types::{PatternMatch, ScanError, ScanFileOutcome, ScanStats};
