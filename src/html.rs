use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LINE_BREAKS: Regex = Regex::new(r"[\r\n]+").unwrap();
    static ref LINE_BREAKS_AND_TABS: Regex = Regex::new(r"[\r\n\t]+").unwrap();
}

/// Escape HTML special characters
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Trim the text and fold every run of CR/LF into a single space.
pub fn collapse_line_breaks(text: &str) -> String {
    LINE_BREAKS.replace_all(text.trim(), " ").into_owned()
}

/// Like [`collapse_line_breaks`] but tabs are folded too, so the result is safe
/// to use as one field of tab separated text.
pub fn collapse_for_tsv(text: &str) -> String {
    LINE_BREAKS_AND_TABS
        .replace_all(text.trim(), " ")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape("a<b & 'c'"), "a&lt;b &amp; &#39;c&#39;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn collapses_runs_not_single_spaces() {
        assert_eq!(collapse_line_breaks("  one\r\n\r\ntwo \n"), "one two");
        assert_eq!(collapse_line_breaks("a\tb"), "a\tb");
        assert_eq!(collapse_for_tsv("a\t\tb\nc"), "a b c");
    }
}
