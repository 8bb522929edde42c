use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::vectorizer::{token::TermFrequency, Vocabulary};

/// Document statistics of a collection:
/// the number of documents and, per term, how many documents contain it.
///
/// Terms are kept in order of first appearance across the collection, which
/// fixes the vocabulary enumeration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Corpus {
    doc_num: u64,
    #[serde(with = "indexmap::map::serde_seq")]
    term_doc_counts: IndexMap<Box<str>, u64>,
}

impl Corpus {
    pub fn new() -> Self {
        Self {
            doc_num: 0,
            term_doc_counts: IndexMap::new(),
        }
    }

    /// Build from per-document frequencies, in collection order
    pub fn from_documents<'a, I>(docs: I) -> Self
    where
        I: IntoIterator<Item = &'a TermFrequency>,
    {
        let mut corpus = Self::new();
        for doc in docs {
            corpus.add_document(doc);
        }
        corpus
    }

    /// Add a document's distinct terms to the corpus
    pub fn add_document(&mut self, doc: &TermFrequency) {
        self.add_set(&doc.term_set_ref_str());
    }

    /// Add one document given its distinct terms
    pub fn add_set<T>(&mut self, terms: &[T])
    where
        T: AsRef<str>,
    {
        self.doc_num += 1;
        for term in terms {
            *self.term_doc_counts.entry(term.as_ref().into()).or_insert(0) += 1;
        }
    }

    /// Number of documents in the corpus
    #[inline]
    pub fn doc_num(&self) -> u64 {
        self.doc_num
    }

    /// Number of documents containing `term`
    #[inline]
    pub fn doc_freq(&self, term: &str) -> u64 {
        self.term_doc_counts.get(term).copied().unwrap_or(0)
    }

    pub fn vocabulary(&self) -> Vocabulary {
        self.term_doc_counts.keys().map(|k| &**k).collect()
    }
}
