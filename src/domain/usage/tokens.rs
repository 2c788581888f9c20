//! Token estimation for providers that omit usage

/// Token estimate used when the provider reports no usage: words / 0.75
pub fn estimate_tokens(text: &str) -> u32 {
    (text.split_whitespace().count() as f64 / 0.75) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens("one two three"), 4);
        assert_eq!(estimate_tokens("  spaced\tout\nwords "), 4);
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn test_single_word_rounds_down() {
        assert_eq!(estimate_tokens("{}"), 1);
    }
}
