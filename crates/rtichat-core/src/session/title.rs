//! Session title derivation.

/// Maximum number of words carried into a derived title.
const TITLE_WORD_LIMIT: usize = 4;

/// Derives a session title from the first message of a conversation.
///
/// Messages of at most 3 whitespace-delimited words become the title
/// verbatim. Longer messages are cut to the first 4 words joined by single
/// spaces, with `…` appended when words were actually dropped.
///
/// Deterministic, no side effects.
pub fn derive_title(first_message: &str) -> String {
    let words: Vec<&str> = first_message.split_whitespace().collect();
    if words.len() < TITLE_WORD_LIMIT {
        return first_message.to_string();
    }

    let mut title = words[..TITLE_WORD_LIMIT].join(" ");
    if words.len() > TITLE_WORD_LIMIT {
        title.push('…');
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_message_is_title_verbatim() {
        assert_eq!(derive_title("What is RTI?"), "What is RTI?");
        assert_eq!(derive_title("hi"), "hi");
        assert_eq!(derive_title(""), "");
    }

    #[test]
    fn verbatim_includes_original_spacing() {
        // Three words keep the exact input, extra whitespace included.
        assert_eq!(derive_title("passport   delay  query"), "passport   delay  query");
    }

    #[test]
    fn four_words_join_without_ellipsis() {
        assert_eq!(
            derive_title("How to file RTI"),
            "How to file RTI"
        );
    }

    #[test]
    fn long_message_truncates_with_ellipsis() {
        let title = derive_title("How do I file an RTI for my delayed passport");
        assert_eq!(title, "How do I file…");
        assert!(title.ends_with('…'));
    }

    #[test]
    fn truncation_collapses_whitespace() {
        assert_eq!(
            derive_title("one  two\tthree   four five"),
            "one two three four…"
        );
    }
}
