use crate::{
    utils::math::vector::SparseVec,
    vectorizer::{corpus::Corpus, token::TermFrequency, Vocabulary},
};

/// TF-IDF の計算方式
///
/// Implementations decide how raw counts become weights; the vector space
/// builder handles vocabulary, layout and normalization.
pub trait TFIDFEngine {
    /// IDF per vocabulary position
    ///
    /// # Arguments
    /// * `corpus` - コーパス
    /// * `vocab` - 語彙 (次元の並び)
    fn idf_vec(corpus: &Corpus, vocab: &Vocabulary) -> Vec<f64>;

    /// TF per vocabulary position, sparse
    fn tf_vec(freq: &TermFrequency, vocab: &Vocabulary) -> SparseVec<f64>;
}

/// デフォルトの TF-IDF エンジン
///
/// - TF: raw count
/// - IDF: `ln((N + 1) / (df + 1)) + 1`, which is finite and `>= 1` for `df <= N`
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTFIDFEngine;

impl DefaultTFIDFEngine {
    #[inline]
    pub fn idf_calc(doc_num: u64, doc_freq: u64) -> f64 {
        ((doc_num as f64 + 1.0) / (doc_freq as f64 + 1.0)).ln() + 1.0
    }
}

impl TFIDFEngine for DefaultTFIDFEngine {
    fn idf_vec(corpus: &Corpus, vocab: &Vocabulary) -> Vec<f64> {
        let doc_num = corpus.doc_num();
        vocab
            .iter()
            .map(|term| Self::idf_calc(doc_num, corpus.doc_freq(term)))
            .collect()
    }

    fn tf_vec(freq: &TermFrequency, vocab: &Vocabulary) -> SparseVec<f64> {
        SparseVec::from_pairs(
            freq.iter()
                .filter_map(|(term, count)| vocab.index_of(term).map(|idx| (idx, count as f64))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idf_is_at_least_one_and_non_increasing() {
        let n = 10;
        let mut prev = f64::INFINITY;
        for df in 0..=n {
            let idf = DefaultTFIDFEngine::idf_calc(n, df);
            assert!(idf.is_finite());
            assert!(idf >= 1.0);
            assert!(idf <= prev);
            prev = idf;
        }
        assert_eq!(DefaultTFIDFEngine::idf_calc(n, n), 1.0);
    }

    #[test]
    fn tf_vec_is_raw_counts_in_vocab_order() {
        let freq: TermFrequency = ["b", "a", "b"].into_iter().collect();
        let vocab: Vocabulary = ["a", "b", "c"].into_iter().collect();
        let tf = DefaultTFIDFEngine::tf_vec(&freq, &vocab);
        assert_eq!(tf.get(0), 1.0);
        assert_eq!(tf.get(1), 2.0);
        assert_eq!(tf.get(2), 0.0);
    }
}
