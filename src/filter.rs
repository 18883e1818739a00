//! Profanity filtering
//!
//! The hub only sees the `ProfanityFilter` trait. `WordListFilter` masks
//! whole words from a case-insensitive block list with `*`.

use std::collections::HashSet;

/// Replaces offensive words in outgoing chat text
pub trait ProfanityFilter: Send {
    fn clean(&self, text: &str) -> String;
}

/// Words masked by [`WordListFilter::default`]
const DEFAULT_WORDS: &[&str] = &[
    "arse", "arsehole", "ass", "asshole", "bastard", "bitch", "bollocks", "bullshit", "crap",
    "cunt", "damn", "dick", "dickhead", "fuck", "fucker", "fucking", "motherfucker", "piss",
    "prick", "shit", "shitty", "slut", "twat", "wanker", "whore",
];

/// Block-list filter masking whole words
#[derive(Debug, Clone)]
pub struct WordListFilter {
    words: HashSet<String>,
    placeholder: char,
}

impl WordListFilter {
    /// Create a filter for the given words
    pub fn with_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
            placeholder: '*',
        }
    }

    fn mask_word(&self, word: &str, out: &mut String) {
        if self.words.contains(&word.to_lowercase()) {
            out.extend(std::iter::repeat(self.placeholder).take(word.chars().count()));
        } else {
            out.push_str(word);
        }
    }
}

impl Default for WordListFilter {
    fn default() -> Self {
        Self::with_words(DEFAULT_WORDS)
    }
}

impl ProfanityFilter for WordListFilter {
    fn clean(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut word_start = None;

        for (idx, ch) in text.char_indices() {
            if ch.is_alphanumeric() {
                word_start.get_or_insert(idx);
            } else {
                if let Some(start) = word_start.take() {
                    self.mask_word(&text[start..idx], &mut out);
                }
                out.push(ch);
            }
        }
        if let Some(start) = word_start {
            self.mask_word(&text[start..], &mut out);
        }

        out
    }
}

/// Filter that leaves text unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl ProfanityFilter for PassThrough {
    fn clean(&self, text: &str) -> String {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_whole_words_case_insensitive() {
        let filter = WordListFilter::default();
        assert_eq!(filter.clean("well SHIT happens"), "well **** happens");
    }

    #[test]
    fn test_keeps_punctuation_and_spacing() {
        let filter = WordListFilter::default();
        assert_eq!(filter.clean("damn!  ok, crap."), "****!  ok, ****.");
    }

    #[test]
    fn test_does_not_mask_inside_longer_words() {
        let filter = WordListFilter::default();
        assert_eq!(filter.clean("classic assessment"), "classic assessment");
    }

    #[test]
    fn test_clean_text_unchanged() {
        let filter = WordListFilter::default();
        assert_eq!(filter.clean("hello there 👋"), "hello there 👋");
    }

    #[test]
    fn test_custom_words() {
        let filter = WordListFilter::with_words(["heck", "Darn"]);
        assert_eq!(filter.clean("heck darn shit"), "**** **** shit");
    }

    #[test]
    fn test_pass_through() {
        assert_eq!(PassThrough.clean("damn"), "damn");
    }
}
