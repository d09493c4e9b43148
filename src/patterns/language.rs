//! File type classification based on a fixed extension table.

use std::path::Path;

/// Coarse language classification for a scanned file.
///
/// Derived purely from the file extension; anything unmapped is `Generic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageTag {
    Python,
    Bash,
    C,
    Cpp,
    Javascript,
    Html,
    Java,
    Perl,
    Typescript,
    Generic,
}

impl LanguageTag {
    /// Every tag, used to precompute the scope table.
    pub const ALL: [LanguageTag; 10] = [
        LanguageTag::Python,
        LanguageTag::Bash,
        LanguageTag::C,
        LanguageTag::Cpp,
        LanguageTag::Javascript,
        LanguageTag::Html,
        LanguageTag::Java,
        LanguageTag::Perl,
        LanguageTag::Typescript,
        LanguageTag::Generic,
    ];

    /// The tag string that pattern names are matched against for scoping.
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageTag::Python => "python",
            LanguageTag::Bash => "bash",
            LanguageTag::C => "c",
            LanguageTag::Cpp => "cpp",
            LanguageTag::Javascript => "javascript",
            LanguageTag::Html => "html",
            LanguageTag::Java => "java",
            LanguageTag::Perl => "perl",
            LanguageTag::Typescript => "typescript",
            LanguageTag::Generic => "generic",
        }
    }

    /// Classify a path by its extension. Case-sensitive, no I/O.
    pub fn classify(path: &Path) -> LanguageTag {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("py") => LanguageTag::Python,
            Some("sh") => LanguageTag::Bash,
            Some("c") => LanguageTag::C,
            Some("cpp") => LanguageTag::Cpp,
            Some("js") => LanguageTag::Javascript,
            Some("html") => LanguageTag::Html,
            Some("java") => LanguageTag::Java,
            Some("pl") | Some("pm") => LanguageTag::Perl,
            Some("ts") => LanguageTag::Typescript,
            _ => LanguageTag::Generic,
        }
    }
}
