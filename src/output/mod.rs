// Output formatting: terminal display of topics and predictions.

pub mod terminal;

/// Truncate a label to at most `max_chars` characters, appending "..." if cut.
///
/// Counts characters rather than bytes so multi-byte labels never split
/// inside a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("Física cuántica", 6), "Física...");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
