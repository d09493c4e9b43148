//! Optional output sanitization.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Everything outside the output allow-list: letters, digits, whitespace,
    // and the punctuation set . , ; : ! ? ' " ( ) { } [ ] @ # & * - _ + =
    static ref DISALLOWED: Regex =
        Regex::new(r#"[^A-Za-z0-9\s.,;:!?'"(){}\[\]@#&*\-_+=]"#).unwrap();
}

/// Remove every character outside the allow-list. Removal only: nothing is
/// added, reordered, or substituted.
pub fn strip_disallowed(text: &str) -> String {
    DISALLOWED.replace_all(text, "").into_owned()
}
