use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Pads every word on both sides before trigrams are taken
pub const BOUNDARY: char = '_';

pub type Trigram = [char; 3];

/// Frequency histogram over character trigrams
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrigramProfile {
    #[serde(with = "indexmap::map::serde_seq")]
    counts: IndexMap<Trigram, u64>,
    total: u64,
}

impl TrigramProfile {
    pub fn new() -> Self {
        Self {
            counts: IndexMap::new(),
            total: 0,
        }
    }

    /// Histogram of a running text: lowercased, split on non-letters, and
    /// each word padded separately.
    pub fn from_text(text: &str) -> Self {
        let mut profile = Self::new();
        for word in words(text) {
            profile.add_word(&word);
        }
        profile
    }

    /// Union of the histograms of `words`, counts summed (not re-normalized)
    pub fn from_words<S>(words: &[S]) -> Self
    where
        S: AsRef<str>,
    {
        let mut profile = Self::new();
        for word in words {
            profile.add_word(&word.as_ref().trim().to_lowercase());
        }
        profile
    }

    /// Add every overlapping window of `_word_`
    pub fn add_word(&mut self, word: &str) {
        if word.is_empty() {
            return;
        }
        let padded: Vec<char> = std::iter::once(BOUNDARY)
            .chain(word.chars())
            .chain(std::iter::once(BOUNDARY))
            .collect();
        for window in padded.windows(3) {
            let tri = [window[0], window[1], window[2]];
            *self.counts.entry(tri).or_insert(0) += 1;
            self.total += 1;
        }
    }

    #[inline]
    pub fn count(&self, tri: &Trigram) -> u64 {
        self.counts.get(tri).copied().unwrap_or(0)
    }

    /// Number of distinct trigrams
    #[inline]
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts
    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Trigram, u64)> {
        self.counts.iter().map(|(t, &c)| (t, c))
    }

    /// Unnormalized dot product of two histograms.
    ///
    /// Only trigrams present in both contribute. Denser profiles score
    /// higher on purpose; this is not a cosine.
    pub fn dot(&self, other: &TrigramProfile) -> u64 {
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .iter()
            .map(|(tri, count)| count * large.count(tri))
            .sum()
    }
}

/// Lowercased words of `text`, split on anything that is not a letter
fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_is_padded_and_windowed() {
        let mut p = TrigramProfile::new();
        p.add_word("cat");
        assert_eq!(p.len(), 3);
        assert_eq!(p.count(&['_', 'c', 'a']), 1);
        assert_eq!(p.count(&['c', 'a', 't']), 1);
        assert_eq!(p.count(&['a', 't', '_']), 1);
        assert_eq!(p.total(), 3);
    }

    #[test]
    fn single_letter_word_yields_one_trigram() {
        let p = TrigramProfile::from_text("a");
        assert_eq!(p.count(&['_', 'a', '_']), 1);
        assert_eq!(p.total(), 1);
    }

    #[test]
    fn repeated_trigrams_accumulate() {
        let p = TrigramProfile::from_text("Banana, BANANA!");
        assert_eq!(p.count(&['a', 'n', 'a']), 4);
        assert_eq!(p.count(&['_', 'b', 'a']), 2);
    }

    #[test]
    fn from_words_sums_histograms() {
        let p = TrigramProfile::from_words(&["the", "then"]);
        assert_eq!(p.count(&['_', 't', 'h']), 2);
        assert_eq!(p.count(&['t', 'h', 'e']), 2);
        assert_eq!(p.count(&['h', 'e', '_']), 1);
        assert_eq!(p.total(), 7);
    }

    #[test]
    fn dot_only_counts_shared_trigrams() {
        let a = TrigramProfile::from_text("hello hello");
        let b = TrigramProfile::from_text("help");
        // shared: "_he" (2 x 1) and "hel" (2 x 1)
        assert_eq!(a.dot(&b), 4);
        assert_eq!(b.dot(&a), 4);
        assert_eq!(a.dot(&TrigramProfile::new()), 0);
    }
}
