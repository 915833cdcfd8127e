/// Split `text` into sentences on terminal punctuation (`.` `?` `!`) followed
/// by whitespace or end-of-text (§4.1). Returns each sentence including its
/// trailing punctuation, with any text after the final terminator kept as a
/// trailing (non-terminated) sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return vec![];
    }

    let bytes = text.as_bytes();
    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        let c = bytes[i];
        if c == b'.' || c == b'?' || c == b'!' {
            let at_end = i + 1 == bytes.len();
            let followed_by_space = !at_end && (bytes[i + 1] as char).is_whitespace();
            if at_end || followed_by_space {
                sentences.push(text[start..=i].trim_start());
                start = i + 1;
            }
        }
        i += 1;
    }

    if start < bytes.len() {
        let tail = text[start..].trim_start();
        if !tail.is_empty() {
            sentences.push(tail);
        }
    }

    if sentences.is_empty() {
        vec![text]
    } else {
        sentences
    }
}

/// Per-sentence character length, used to populate `srcSentLen`/`transSentLen`
/// (§3). Lengths are counted in `char`s, not bytes, so multi-byte UTF-8 text
/// compares consistently across source and translated languages.
pub fn sentence_lengths(text: &str) -> Vec<u32> {
    split_sentences(text)
        .into_iter()
        .map(|s| s.chars().count() as u32)
        .collect()
}

/// Number of sentences terminated by punctuation (i.e. excluding a trailing
/// non-terminated fragment). Used to decide whether a soft unit has
/// accumulated the configured minimum before it is considered "stable"
/// (§4.1 sentence segmentation: default 2, or 1 once the unit is final).
pub fn terminated_sentence_count(text: &str) -> usize {
    split_sentences(text)
        .into_iter()
        .filter(|s| {
            s.ends_with('.') || s.ends_with('?') || s.ends_with('!')
        })
        .count()
}

/// Whether `text` has reached the configured sentence-count threshold to be
/// considered stable. A unit that is already final only needs one.
pub fn has_min_sentences(text: &str, min_sentences: u32, unit_is_final: bool) -> bool {
    let required = if unit_is_final { 1 } else { min_sentences.max(1) };
    terminated_sentence_count(text) as u32 >= required
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminal_punctuation() {
        let sentences = split_sentences("Hello world. How are you? Great!");
        assert_eq!(sentences, vec!["Hello world.", "How are you?", "Great!"]);
    }

    #[test]
    fn keeps_trailing_fragment_without_terminator() {
        let sentences = split_sentences("Hello world. and then");
        assert_eq!(sentences, vec!["Hello world.", "and then"]);
    }

    #[test]
    fn single_fragment_with_no_terminator() {
        let sentences = split_sentences("hello world");
        assert_eq!(sentences, vec!["hello world"]);
    }

    #[test]
    fn empty_text_has_no_sentences() {
        assert!(split_sentences("").is_empty());
    }

    #[test]
    fn does_not_split_on_decimal_points() {
        // No trailing whitespace after the period -> not a sentence boundary.
        let sentences = split_sentences("The rate is 3.5 percent.");
        assert_eq!(sentences, vec!["The rate is 3.5 percent."]);
    }

    #[test]
    fn sentence_lengths_match_sentence_count() {
        let lens = sentence_lengths("Hi there. Bye now.");
        assert_eq!(lens.len(), 2);
        assert_eq!(lens[0], "Hi there.".chars().count() as u32);
    }

    #[test]
    fn terminated_count_excludes_trailing_fragment() {
        assert_eq!(terminated_sentence_count("One. Two. trailing"), 2);
        assert_eq!(terminated_sentence_count("One. Two."), 2);
    }

    #[test]
    fn min_sentences_relaxes_to_one_when_unit_final() {
        assert!(!has_min_sentences("One.", 2, false));
        assert!(has_min_sentences("One.", 2, true));
        assert!(has_min_sentences("One. Two.", 2, false));
    }
}
