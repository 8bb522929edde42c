pub mod compute;
pub mod corpus;
pub mod dtm;
pub mod evaluate;
pub mod tfidf;
pub mod token;

use std::marker::PhantomData;

use indexmap::{IndexMap, IndexSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    utils::math::vector::SparseVec,
    vectorizer::{
        compute::SimilarityMatrix,
        dtm::DocumentTermMatrix,
        tfidf::{DefaultTFIDFEngine, TFIDFEngine},
    },
};

/// Distinct terms of a collection with a fixed enumeration order.
///
/// Position `i` is dimension `i` of every vector built against this vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: IndexSet<Box<str>>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self {
            terms: IndexSet::new(),
        }
    }

    /// Insert a term if unseen; returns its position either way
    pub fn insert(&mut self, term: &str) -> usize {
        match self.terms.get_index_of(term) {
            Some(idx) => idx,
            None => self.terms.insert_full(term.into()).0,
        }
    }

    #[inline]
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.get_index_of(term)
    }

    #[inline]
    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get_index(index).map(|t| &**t)
    }

    #[inline]
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|t| &**t)
    }
}

impl<T> FromIterator<T> for Vocabulary
where
    T: AsRef<str>,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vocab = Vocabulary::new();
        for term in iter {
            vocab.insert(term.as_ref());
        }
        vocab
    }
}

/// IDF value per vocabulary term, in vocabulary order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdfTable {
    #[serde(with = "indexmap::map::serde_seq")]
    values: IndexMap<Box<str>, f64>,
}

impl IdfTable {
    pub fn from_vocab(vocab: &Vocabulary, idf_vec: Vec<f64>) -> Self {
        Self {
            values: vocab.iter().map(Box::<str>::from).zip(idf_vec).collect(),
        }
    }

    #[inline]
    pub fn get(&self, term: &str) -> Option<f64> {
        self.values.get(term).copied()
    }

    #[inline]
    pub fn get_index(&self, index: usize) -> Option<f64> {
        self.values.get_index(index).map(|(_, &v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(t, &v)| (&**t, v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// TF-IDF vector space of one collection.
///
/// `vectors[i]` belongs to document `i`; every vector is L2-normalized or
/// the zero vector (documents without usable terms).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TfIdfSpace {
    pub vectors: Vec<SparseVec<f64>>,
    pub vocabulary: Vocabulary,
    pub idf: IdfTable,
}

impl TfIdfSpace {
    #[inline]
    pub fn doc_num(&self) -> usize {
        self.vectors.len()
    }

    #[inline]
    pub fn vector(&self, doc: usize) -> Option<&SparseVec<f64>> {
        self.vectors.get(doc)
    }

    /// Document vector as a `term -> weight` map (non-zero weights only)
    pub fn term_weights(&self, doc: usize) -> IndexMap<String, f64> {
        self.vectors
            .get(doc)
            .map(|v| v.to_term_map(&self.vocabulary))
            .unwrap_or_default()
    }

    pub fn similarity_matrix(&self) -> SimilarityMatrix {
        compute::similarity_matrix(&self.vectors)
    }
}

/// Turns token sequences into a vocabulary, a document-term matrix and a
/// TF-IDF vector space.
///
/// `E` picks the weighting scheme; `DefaultTFIDFEngine` implements raw-count
/// TF with smoothed IDF.
#[derive(Debug, Clone, Copy)]
pub struct VectorSpaceBuilder<E = DefaultTFIDFEngine>
where
    E: TFIDFEngine,
{
    _marker: PhantomData<E>,
}

impl<E> Default for VectorSpaceBuilder<E>
where
    E: TFIDFEngine,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E> VectorSpaceBuilder<E>
where
    E: TFIDFEngine,
{
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    /// Raw counts per document; the vocabulary travels with the matrix
    pub fn build_document_term_matrix<S>(&self, token_lists: &[Vec<S>]) -> DocumentTermMatrix
    where
        S: AsRef<str>,
    {
        DocumentTermMatrix::from_token_lists(token_lists)
    }

    pub fn build_tf_idf<S>(&self, token_lists: &[Vec<S>]) -> TfIdfSpace
    where
        S: AsRef<str>,
    {
        self.build_tf_idf_from_dtm(&self.build_document_term_matrix(token_lists))
    }

    /// Weight = TF x IDF, then each document vector is scaled to unit length
    pub fn build_tf_idf_from_dtm(&self, dtm: &DocumentTermMatrix) -> TfIdfSpace {
        let vocab = dtm.vocabulary();
        let corpus = dtm.corpus();
        let idf_vec = E::idf_vec(&corpus, vocab);

        // ドキュメントごとに独立なので並列化
        let vectors: Vec<SparseVec<f64>> = dtm
            .rows()
            .par_iter()
            .map(|row| {
                let tf = E::tf_vec(row, vocab);
                let mut weighted = SparseVec::with_capacity(tf.nnz());
                for (idx, tf_val) in tf.iter() {
                    let idf = idf_vec.get(idx).copied().unwrap_or(0.0);
                    weighted.push(idx, tf_val * idf);
                }
                weighted.normalized()
            })
            .collect();

        debug!(
            documents = vectors.len(),
            vocabulary = vocab.len(),
            "built tf-idf vector space"
        );

        TfIdfSpace {
            vectors,
            vocabulary: vocab.clone(),
            idf: IdfTable::from_vocab(vocab, idf_vec),
        }
    }
}
