//! Whitespace normalization for rendered text.

use std::sync::LazyLock;

use regex::Regex;

/// Collapse every whitespace run to a single space and trim the ends.
///
/// Accepts `&str` or `Option<&str>`; absent input yields an empty string.
pub fn normalize<'a>(text: impl Into<Option<&'a str>>) -> String {
    static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

    let Some(text) = text.into() else {
        return String::new();
    };

    WS_RE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_runs_and_trims() {
        assert_eq!(normalize("  Hello   world \n\t again  "), "Hello world again");
    }

    #[test]
    fn empty_and_blank_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \n\t\r "), "");
        assert_eq!(normalize(None::<&str>), "");
    }

    #[test]
    fn unicode_whitespace_is_collapsed() {
        assert_eq!(normalize("a\u{00A0}\u{2003} b"), "a b");
    }

    #[test]
    fn no_adjacent_whitespace_remains() {
        let inputs = [
            "x\n\n\ny",
            "\t\tlead",
            "trail \r\n",
            "mid  \t \n  dle",
            "one",
            "  a b  c   d    e ",
        ];

        for input in inputs {
            let out = normalize(input);
            assert_eq!(out, out.trim(), "ends not trimmed for {input:?}");
            let chars: Vec<char> = out.chars().collect();
            assert!(
                !chars.windows(2).any(|w| w[0].is_whitespace() && w[1].is_whitespace()),
                "adjacent whitespace in {out:?}"
            );
        }
    }

    #[test]
    fn optional_input_passes_through() {
        assert_eq!(normalize(Some(" x ")), "x");
    }
}
