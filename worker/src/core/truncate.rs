//! Output truncation for prompt embedding.

/// Number of trailing build-output characters embedded in a fix prompt.
pub const FIX_LOG_TAIL_CHARS: usize = 1000;

/// Return the suffix of `text` holding at most `max_chars` characters.
///
/// Counts Unicode scalar values, so a multi-byte character is never split.
pub fn tail_chars(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return "";
    }
    match text.char_indices().rev().nth(max_chars - 1) {
        Some((start, _)) => &text[start..],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_returned_whole() {
        assert_eq!(tail_chars("error: boom", FIX_LOG_TAIL_CHARS), "error: boom");
    }

    #[test]
    fn long_text_keeps_the_suffix() {
        let text = format!("{}{}", "a".repeat(10), "b".repeat(FIX_LOG_TAIL_CHARS));
        let tail = tail_chars(&text, FIX_LOG_TAIL_CHARS);
        assert_eq!(tail.chars().count(), FIX_LOG_TAIL_CHARS);
        assert!(text.ends_with(tail));
        assert!(!tail.contains('a'));
    }

    #[test]
    fn exact_length_is_untouched() {
        let text = "x".repeat(FIX_LOG_TAIL_CHARS);
        assert_eq!(tail_chars(&text, FIX_LOG_TAIL_CHARS), text);
    }

    #[test]
    fn multibyte_characters_are_counted_not_bytes() {
        let text = "ÄÖÜ✓✓";
        assert_eq!(tail_chars(text, 2), "✓✓");
        assert_eq!(tail_chars(text, 4), "ÖÜ✓✓");
    }

    #[test]
    fn zero_yields_empty() {
        assert_eq!(tail_chars("abc", 0), "");
    }
}
