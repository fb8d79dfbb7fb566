//! Markdown stripping for LLM output.
//!
//! The summarization models routinely answer in markdown; reports and the
//! dashboard want plain prose. Markers are removed, the text and line
//! structure are kept.

use regex::Regex;
use std::sync::LazyLock;

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static UNDERSCORE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_{1,2}(.+?)_{1,2}").unwrap());
static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)(^|[ \t])#{1,6}[ \t]+").unwrap());
static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*[-*+]\s+").unwrap());
static FENCED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```.*?```").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`(.+?)`").unwrap());
static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(.+?)\]\(.+?\)").unwrap());
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Remove markdown formatting while preserving the underlying text.
///
/// Handles emphasis markers, headings, list bullets, fenced code blocks,
/// inline code spans, and links (link text is kept). Runs of three or more
/// newlines collapse to a single blank line.
pub fn strip_markdown(text: &str) -> String {
    let text = FENCED.replace_all(text, "");
    let text = BOLD.replace_all(&text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = UNDERSCORE.replace_all(&text, "$1");
    let text = HEADING.replace_all(&text, "$1");
    let text = BULLET.replace_all(&text, "");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = LINK.replace_all(&text, "$1");
    let text = BLANK_RUN.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_emphasis_heading_and_bullet() {
        let input = "**bold** and *italic* and # Heading\n- item";
        assert_eq!(strip_markdown(input), "bold and italic and Heading\nitem");
    }

    #[test]
    fn strips_heading_at_line_start() {
        assert_eq!(strip_markdown("# Title\nbody"), "Title\nbody");
        assert_eq!(strip_markdown("### Deep Title"), "Deep Title");
    }

    #[test]
    fn keeps_link_text() {
        assert_eq!(
            strip_markdown("see [the study](https://example.org/p1)"),
            "see the study"
        );
    }

    #[test]
    fn removes_fenced_blocks_and_inline_code() {
        let input = "before\n```json\n{\"a\": 1}\n```\nafter `code` end";
        let out = strip_markdown(input);
        assert!(!out.contains("{\"a\": 1}"));
        assert!(out.contains("code"));
        assert!(!out.contains('`'));
    }

    #[test]
    fn collapses_blank_line_runs() {
        assert_eq!(strip_markdown("a\n\n\n\n\nb"), "a\n\nb");
    }

    #[test]
    fn strips_underscore_emphasis() {
        assert_eq!(strip_markdown("__strong__ and _soft_"), "strong and soft");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(strip_markdown("no markup at all"), "no markup at all");
    }
}
