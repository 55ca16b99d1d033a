//! Keyword matching over free-text facility tags.
//!
//! Tags are split into lowercase alphanumeric words. A keyword matches a tag
//! when its words appear consecutively in the tag. A trailing `*` lets the
//! last keyword word match as a prefix, so `cataract*` matches
//! "Cataract surgery" and "cataracts" while `ct` only matches the word "CT".

use std::collections::BTreeSet;

/// One parsed keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Keyword {
    words: Vec<String>,
    prefix: bool,
}

impl Keyword {
    fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let (body, prefix) = match trimmed.strip_suffix('*') {
            Some(body) => (body, true),
            None => (trimmed, false),
        };
        let words = tokenize(body);
        if words.is_empty() {
            return None;
        }
        Some(Self { words, prefix })
    }

    fn matches_tokens(&self, tokens: &[String]) -> bool {
        let n = self.words.len();
        if n == 0 || tokens.len() < n {
            return false;
        }
        let last = n - 1;
        tokens.windows(n).any(|window| {
            window[..last] == self.words[..last]
                && if self.prefix {
                    window[last].starts_with(self.words[last].as_str())
                } else {
                    window[last] == self.words[last]
                }
        })
    }
}

/// Splits text into lowercase alphanumeric words.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// A set of keywords, any of which may match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
}

impl KeywordSet {
    /// Builds a set from keyword strings. Blank keywords are ignored.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .filter_map(|k| Keyword::parse(k.as_ref()))
                .collect(),
        }
    }

    /// Returns true if the set has no keywords.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Returns true if any keyword matches the text.
    pub fn matches(&self, text: &str) -> bool {
        let tokens = tokenize(text);
        self.keywords.iter().any(|k| k.matches_tokens(&tokens))
    }

    /// Returns true if any keyword matches any tag.
    pub fn matches_any(&self, tags: &BTreeSet<String>) -> bool {
        tags.iter().any(|tag| self.matches(tag))
    }
}
