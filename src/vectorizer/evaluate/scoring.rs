use std::fmt::{self, Debug};

use serde::{Deserialize, Serialize};

use crate::vectorizer::dtm::DocumentTermMatrix;

/// Ranked `(key, score)` list
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Hits<K> {
    pub list: Vec<(K, f64)>,
}

impl<K> Default for Hits<K> {
    fn default() -> Self {
        Self { list: Vec::new() }
    }
}

impl<K> Hits<K> {
    pub fn new(list: Vec<(K, f64)>) -> Self {
        Hits { list }
    }

    /// Sort by descending score.
    /// NaN scores are removed; equal scores keep their current order.
    pub fn sort_by_score(&mut self) -> &mut Self {
        self.list.retain(|(_, s)| !s.is_nan());
        // sort_by は安定ソートなので同点は挿入順のまま
        self.list.sort_by(|a, b| b.1.total_cmp(&a.1));
        self
    }

    /// Keep the first `n` entries
    pub fn top(&mut self, n: usize) -> &mut Self {
        self.list.truncate(n);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.list.iter().map(|(k, _)| k)
    }

    pub fn into_vec(self) -> Vec<(K, f64)> {
        self.list
    }
}

impl<K> Debug for Hits<K>
where
    K: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Hits [")?;
            for (key, score) in &self.list {
                writeln!(f, "    {:?}: {:.6}", key, score)?;
            }
            write!(f, "]")
        } else {
            f.debug_list().entries(&self.list).finish()
        }
    }
}

/// Collection-level term importance.
///
/// `score = tf * (ln(N / df) + 1)` where `tf` is the column sum and `df` the
/// number of documents using the term. Terms with `df == 0` are skipped.
/// Ties keep vocabulary order.
///
/// # Arguments
/// * `dtm` - 文書単語行列
/// * `top_m` - 返す件数
pub fn rank_terms(dtm: &DocumentTermMatrix, top_m: usize) -> Hits<String> {
    let doc_num = dtm.doc_num() as f64;
    let mut hits = Hits::new(
        dtm.vocabulary()
            .iter()
            .filter_map(|term| {
                let df = dtm.doc_freq(term);
                if df == 0 {
                    return None;
                }
                let tf = dtm.term_total(term) as f64;
                Some((term.to_string(), tf * ((doc_num / df as f64).ln() + 1.0)))
            })
            .collect(),
    );
    hits.sort_by_score().top(top_m);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_terms_prefers_frequent_and_rare() {
        let lists = vec![
            vec!["engine", "engine", "rust", "engine"],
            vec!["rust", "garden"],
            vec!["rust", "garden"],
        ];
        let dtm = DocumentTermMatrix::from_token_lists(&lists);
        let hits = rank_terms(&dtm, 10);
        let keys: Vec<&String> = hits.keys().collect();
        // engine: 3 * (ln 3 + 1); garden: 2 * (ln 1.5 + 1); rust: 3 * 1
        assert_eq!(keys, vec!["engine", "rust", "garden"]);
        assert!((hits.list[0].1 - 3.0 * (3.0f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn ties_keep_vocabulary_order_and_top_truncates() {
        let lists = vec![vec!["b", "a", "c"]];
        let dtm = DocumentTermMatrix::from_token_lists(&lists);
        let hits = rank_terms(&dtm, 2);
        assert_eq!(hits.keys().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn zero_doc_freq_terms_are_skipped() {
        let rows = vec![vec![("ghost", 0i64), ("real", 2)]];
        let dtm = DocumentTermMatrix::from_counts(&rows).unwrap();
        let hits = rank_terms(&dtm, 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.list[0].0, "real");
    }

    #[test]
    fn sort_drops_nan() {
        let mut hits = Hits::new(vec![("x", f64::NAN), ("y", 1.0), ("z", 2.0)]);
        hits.sort_by_score();
        assert_eq!(hits.keys().copied().collect::<Vec<_>>(), vec!["z", "y"]);
    }
}
