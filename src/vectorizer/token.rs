use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// TermFrequency 構造体
/// Counts term occurrences within one document.
///
/// Terms keep the order in which they were first added, so iterating a
/// `TermFrequency` replays the document's first-occurrence order.
///
/// # Examples
/// ```
/// use tf_idf_analytics::TermFrequency;
/// let mut freq = TermFrequency::new();
/// freq.add_terms(&["cat", "dog", "cat"]);
/// assert_eq!(freq.term_count("cat"), 2);
/// assert_eq!(freq.term_sum(), 3);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TermFrequency {
    #[serde(with = "indexmap::map::serde_seq")]
    term_count: IndexMap<Box<str>, u32>,
    total_term_count: u64,
}

/// termの追加
impl TermFrequency {
    pub fn new() -> Self {
        TermFrequency {
            term_count: IndexMap::new(),
            total_term_count: 0,
        }
    }

    /// termを追加する
    ///
    /// # Arguments
    /// * `term` - 追加するターム
    #[inline]
    pub fn add_term(&mut self, term: &str) -> &mut Self {
        let count = self.term_count.entry(term.into()).or_insert(0);
        *count += 1;
        self.total_term_count += 1;
        self
    }

    /// 複数のtermを追加する
    ///
    /// # Arguments
    /// * `terms` - 追加するタームのスライス
    #[inline]
    pub fn add_terms<T>(&mut self, terms: &[T]) -> &mut Self
    where
        T: AsRef<str>,
    {
        for term in terms {
            self.add_term(term.as_ref());
        }
        self
    }

    /// Add `count` occurrences of `term` at once.
    /// A zero count is ignored so every stored term has a positive count.
    #[inline]
    pub fn add_term_count(&mut self, term: &str, count: u32) -> &mut Self {
        if count == 0 {
            return self;
        }
        *self.term_count.entry(term.into()).or_insert(0) += count;
        self.total_term_count += count as u64;
        self
    }
}

impl<T> FromIterator<T> for TermFrequency
where
    T: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut freq = TermFrequency::new();
        for term in iter {
            freq.add_term(term.as_ref());
        }
        freq
    }
}

/// 情報取得
impl TermFrequency {
    /// あるtermの出現回数を取得します
    ///
    /// # Returns
    /// * `u32` - 出現回数 (存在しなければ 0)
    #[inline]
    pub fn term_count(&self, term: &str) -> u32 {
        self.term_count.get(term).copied().unwrap_or(0)
    }

    /// 全termのカウントの合計
    #[inline]
    pub fn term_sum(&self) -> u64 {
        self.total_term_count
    }

    /// Number of distinct terms
    #[inline]
    pub fn term_num(&self) -> usize {
        self.term_count.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.term_count.is_empty()
    }

    #[inline]
    pub fn contains_term(&self, term: &str) -> bool {
        self.term_count.contains_key(term)
    }

    /// Distinct terms in first-occurrence order
    #[inline]
    pub fn term_set_ref_str(&self) -> Vec<&str> {
        self.term_count.keys().map(|k| &**k).collect()
    }

    /// `(term, count)` in first-occurrence order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.term_count.iter().map(|(term, &count)| (term.as_ref(), count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_order_follow_first_occurrence() {
        let freq: TermFrequency = ["b", "a", "b", "c", "a", "b"].into_iter().collect();
        assert_eq!(freq.term_set_ref_str(), vec!["b", "a", "c"]);
        assert_eq!(freq.term_count("b"), 3);
        assert_eq!(freq.term_count("zzz"), 0);
        assert_eq!(freq.term_sum(), 6);
    }

    #[test]
    fn zero_count_is_not_stored() {
        let mut freq = TermFrequency::new();
        freq.add_term_count("x", 0).add_term_count("y", 4);
        assert!(!freq.contains_term("x"));
        assert_eq!(freq.term_sum(), 4);
    }
}
