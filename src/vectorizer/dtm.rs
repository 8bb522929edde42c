use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    vectorizer::{corpus::Corpus, token::TermFrequency, Vocabulary},
};

/// Document-term matrix.
///
/// Conceptually dense (every vocabulary term is addressable for every
/// document, absent cells read as 0) but stored as one sparse
/// `TermFrequency` row per document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentTermMatrix {
    vocabulary: Vocabulary,
    rows: Vec<TermFrequency>,
}

impl DocumentTermMatrix {
    /// Build from token sequences; row `i` is document `i`.
    pub fn from_token_lists<S>(token_lists: &[Vec<S>]) -> Self
    where
        S: AsRef<str>,
    {
        let rows: Vec<TermFrequency> = token_lists
            .iter()
            .map(|tokens| tokens.iter().collect())
            .collect();
        let vocabulary = rows
            .iter()
            .flat_map(|row| row.term_set_ref_str())
            .collect();
        Self { vocabulary, rows }
    }

    /// Build from caller-supplied counts.
    ///
    /// Terms with a zero count still enter the vocabulary.
    ///
    /// # Errors
    /// `InvalidInput` when any count is negative or does not fit in `u32`.
    pub fn from_counts<S>(rows: &[Vec<(S, i64)>]) -> Result<Self>
    where
        S: AsRef<str>,
    {
        let mut vocabulary = Vocabulary::new();
        let mut out = Vec::with_capacity(rows.len());
        for (doc, row) in rows.iter().enumerate() {
            let mut freq = TermFrequency::new();
            for (term, count) in row {
                let term = term.as_ref();
                let count = u32::try_from(*count).map_err(|_| {
                    Error::invalid_input(format!(
                        "count {} for term {:?} in document {} is not a non-negative 32-bit value",
                        count, term, doc
                    ))
                })?;
                vocabulary.insert(term);
                freq.add_term_count(term, count);
            }
            out.push(freq);
        }
        Ok(Self {
            vocabulary,
            rows: out,
        })
    }

    #[inline]
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    #[inline]
    pub fn doc_num(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn row(&self, doc: usize) -> Option<&TermFrequency> {
        self.rows.get(doc)
    }

    pub fn rows(&self) -> &[TermFrequency] {
        &self.rows
    }

    /// Cell value; 0 for absent terms and out-of-range documents
    #[inline]
    pub fn count(&self, doc: usize, term: &str) -> u32 {
        self.rows.get(doc).map_or(0, |row| row.term_count(term))
    }

    /// Column sum: total occurrences of `term` across the collection
    pub fn term_total(&self, term: &str) -> u64 {
        self.rows.iter().map(|row| row.term_count(term) as u64).sum()
    }

    /// Number of documents with a non-zero cell for `term`
    pub fn doc_freq(&self, term: &str) -> u64 {
        self.rows.iter().filter(|row| row.contains_term(term)).count() as u64
    }

    pub fn corpus(&self) -> Corpus {
        Corpus::from_documents(&self.rows)
    }

    /// Keep only the given documents, in the given order.
    /// The vocabulary shrinks to terms those documents use.
    pub fn select(&self, docs: &[usize]) -> Self {
        let rows: Vec<TermFrequency> = docs
            .iter()
            .filter_map(|&doc| self.rows.get(doc).cloned())
            .collect();
        let vocabulary = rows
            .iter()
            .flat_map(|row| row.term_set_ref_str())
            .collect();
        Self { vocabulary, rows }
    }
}
