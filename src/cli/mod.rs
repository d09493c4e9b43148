//! Command-line interface for leakscan.
//!
//! A single command, no subcommands: point it at a directory, give it a
//! directory of regex pattern files, and it writes per-pattern result files.
//! The process exits 0 on any completed traversal; per-file and per-pattern
//! failures are reported into the output files, not via the exit code.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

mod output;

pub use output::Output;

use crate::patterns::{PatternScope, PatternStore};
use crate::scanner::{ExclusionRules, ScanStats, Scanner, Walker};
use crate::sink::ResultSink;

/// Scan a directory tree for sensitive data using a directory of regex pattern files
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to search
    pub directory: PathBuf,

    /// Output directory for per-pattern result files
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// File extensions to exclude (comma-separated, include the dot)
    #[arg(
        short = 'e',
        long = "exclude_ext",
        value_delimiter = ',',
        default_value = ".jpg,.png"
    )]
    pub exclude_ext: Vec<String>,

    /// File names to exclude (comma-separated)
    #[arg(
        short = 'f',
        long = "exclude_files",
        value_delimiter = ',',
        default_value = "config.json,secrets.yml"
    )]
    pub exclude_files: Vec<String>,

    /// Directory substrings to exclude (comma-separated), unioned with the
    /// built-in defaults test,tests,testing,.git
    #[arg(short = 'd', long = "exclude_dirs", value_delimiter = ',', default_value = "")]
    pub exclude_dirs: Vec<String>,

    /// Directory containing regex .txt pattern files
    #[arg(short = 'r', long = "regex_dir", default_value = "./regex")]
    pub regex_dir: PathBuf,

    /// Strip characters outside the output allow-list from matches
    #[arg(short = 's', long = "strip_bad_chars")]
    pub strip_bad_chars: bool,

    /// Worker threads (0 = one per available core)
    #[arg(short = 'j', long, default_value_t = 0)]
    pub threads: usize,

    /// Summary format (text, json)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable quiet output (minimal)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Execute the scan.
    pub async fn run(self) -> Result<()> {
        let output = Output::new(self.verbose, self.quiet);

        let (store, load_errors) = PatternStore::load(&self.regex_dir);
        output.info(&format!(
            "Loaded {} pattern(s) from {}",
            store.len(),
            self.regex_dir.display()
        ));
        if store.is_empty() && load_errors.is_empty() {
            output.warning("No patterns loaded; the scan will produce no matches");
        }

        let sink = ResultSink::new(&self.output, self.strip_bad_chars)?;

        // Malformed or unreadable patterns are isolated: reported into the
        // sink and to stderr, never fatal to the run.
        if !load_errors.is_empty() {
            output.warning(&format!("{} pattern(s) failed to load", load_errors.len()));
            for error in load_errors {
                output.error(&error.message);
                if error.name.is_some() {
                    sink.record_error(&error.into_scan_error())?;
                }
            }
        }

        let scope = Arc::new(PatternScope::build(&store));
        let scanner = Scanner::new(scope);
        let rules = ExclusionRules::with_builtin_dirs(
            &self.exclude_ext,
            &self.exclude_dirs,
            &self.exclude_files,
        );
        let walker = Walker::new(scanner, rules, self.threads);

        output.step(&format!("Scanning {}", self.directory.display()));
        let stats = walker.run(&self.directory, &sink)?;

        self.report(&stats, &output)?;
        Ok(())
    }

    fn report(&self, stats: &ScanStats, output: &Output) -> Result<()> {
        match self.format.as_str() {
            "json" => println!("{}", serde_json::to_string_pretty(stats)?),
            _ => {
                output.separator();
                output.summary_stats("Files scanned", stats.files_scanned);
                output.summary_stats("Files skipped", stats.files_skipped);
                output.summary_stats("Matches", stats.total_matches);
                output.summary_stats("Errors", stats.total_errors);
                output.success(&format!(
                    "Scan completed in {:.2}s, results in {}",
                    stats.scan_duration_ms as f64 / 1000.0,
                    self.output.display()
                ));
            }
        }
        Ok(())
    }
}
