// Word tokenizer for language detection.
//
// Fenced code blocks are removed first so that code (which is mostly English
// keywords) never counts against the prose around it. What remains is
// lowercased and split into maximal runs of Latin letters, including the
// accented ranges à-ö and ø-ÿ. No diacritic folding, no Unicode normalization.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Markdown code fence delimiter.
pub const CODE_FENCE: &str = "```";

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[a-zà-öø-ÿ]+").expect("token pattern is valid"));

/// Drop everything between pairs of code fences.
///
/// Splits on the fence marker and keeps the even-indexed segments (the text
/// outside fences), joined with a single space. An unterminated fence hides
/// everything after it.
pub fn strip_code_fences(text: &str) -> String {
    text.split(CODE_FENCE)
        .step_by(2)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract lowercase word tokens from prose, ignoring fenced code.
pub fn tokens(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let lowered = strip_code_fences(text).to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_keeps_text_outside_fences() {
        let text = "voor```let x = 1;```na";
        assert_eq!(strip_code_fences(text), "voor na");
    }

    #[test]
    fn test_strip_unterminated_fence_hides_tail() {
        assert_eq!(strip_code_fences("awel ```print('hi')"), "awel ");
    }

    #[test]
    fn test_tokens_lowercases_and_splits() {
        assert_eq!(tokens("Awel, Gij DAAR!"), vec!["awel", "gij", "daar"]);
    }

    #[test]
    fn test_tokens_keep_accented_letters() {
        assert_eq!(tokens("Réponds en français"), vec!["réponds", "en", "français"]);
    }

    #[test]
    fn test_tokens_split_on_digits_and_symbols() {
        assert_eq!(tokens("abc123def_ghi"), vec!["abc", "def", "ghi"]);
    }

    #[test]
    fn test_tokens_ignore_german_sharp_s() {
        // ß sits outside the accepted ranges and splits the word.
        assert_eq!(tokens("straße"), vec!["stra", "e"]);
    }

    #[test]
    fn test_tokens_fence_only_is_empty() {
        assert!(tokens("```\nplease explain the code\n```").is_empty());
    }

    #[test]
    fn test_tokens_empty_input() {
        assert!(tokens("").is_empty());
    }
}
