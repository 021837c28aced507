//! Regex cleanup applied after screen reconstruction.
//!
//! The screen buffer absorbs almost every escape sequence, but bodies longer
//! than its scan window and bracket sequences that do not fit the CSI grammar
//! are left behind as literal text. This pass strips those remnants and
//! normalizes whitespace so pattern matching sees compact text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Escape sequences and bracket remnants.
/// Matches:
/// - CSI sequences: ESC [ ... letter
/// - OSC sequences: ESC ] ... BEL or ESC \
/// - Character set selection: ESC ( or ESC ) followed by a character
/// - Other single-char escapes and any remaining bare ESC
/// - Bare bracket bodies without ESC: `[1;32m`, `[2K`, `[38;5;196m`
static ANSI_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\x1b\[[0-9;?]*[A-Za-z]",
        r"|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)",
        r"|\x1b[()][A-Z0-9]",
        r"|\x1b[=>MNOP78]",
        r"|\x1b",
        r"|\[[0-9;]+[A-Za-z]",
    ))
    .expect("Invalid ANSI regex")
});

static MULTI_SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").expect("Invalid space regex"));

/// Three or more consecutive blank lines (a blank line may hold stray spaces).
static BLANK_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n(?:[ \t]*\n){3,}").expect("Invalid blank line regex"));

/// Remove escape sequences and bracket remnants from `text`.
pub fn strip_ansi_codes(text: &str) -> String {
    ANSI_REGEX.replace_all(text, "").into_owned()
}

/// Full cleanup: strip remnants, collapse runs of spaces to one, collapse
/// three or more blank lines to a single blank line.
pub fn clean_text(text: &str) -> String {
    let stripped = strip_ansi_codes(text);
    let spaced = MULTI_SPACE_RE.replace_all(&stripped, " ");
    let collapsed = BLANK_RUN_RE.replace_all(&spaced, "\n\n");
    collapsed.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi_codes() {
        let input = "\x1b[32mHello\x1b[0m World";
        assert_eq!(strip_ansi_codes(input), "Hello World");
    }

    #[test]
    fn test_strip_ansi_hyperlinks_and_titles() {
        let input = "\x1b]0;title\x07text \x1b]8;;http://a\x1b\\link\x1b]8;;\x1b\\";
        assert_eq!(strip_ansi_codes(input), "text link");
    }

    #[test]
    fn test_strip_bare_bracket_remnants() {
        assert_eq!(strip_ansi_codes("[1;2;3mbold[0m"), "bold");
        assert_eq!(strip_ansi_codes("[38;5;196mred"), "red");
    }

    #[test]
    fn test_bracketed_words_are_kept() {
        assert_eq!(
            strip_ansi_codes("[main abc1234] Fix the thing"),
            "[main abc1234] Fix the thing"
        );
        assert_eq!(strip_ansi_codes("items[3] = x"), "items[3] = x");
    }

    #[test]
    fn test_digit_letter_brackets_in_prose_are_stripped() {
        assert_eq!(strip_ansi_codes("arr[0x10]"), "arr10]");
        assert_eq!(clean_text("see note[1a] below"), "see note] below");
        assert_eq!(clean_text(&crate::screen::render("arr[0x10]")), "arr10]");
    }

    #[test]
    fn test_collapses_spaces() {
        assert_eq!(clean_text("a    b  c d"), "a b c d");
    }

    #[test]
    fn test_collapses_blank_line_runs() {
        assert_eq!(clean_text("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(clean_text("a\n \n  \n\nb"), "a\n\nb");
        // Two blank lines are left alone.
        assert_eq!(clean_text("a\n\n\nb"), "a\n\n\nb");
    }
}
