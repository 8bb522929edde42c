/// This crate is a statistical text analytics engine built on a TF-IDF vector space.
pub mod analyzer;
pub mod cache;
pub mod cluster;
pub mod config;
pub mod error;
pub mod language;
pub mod text;
pub mod topic;
pub mod utils;
pub mod vectorizer;

/// Text Analyzer
/// The top-level struct of this crate.
/// It takes raw texts through tokenization, stop-word removal and stemming,
/// builds a TF-IDF vector space and runs language identification, clustering
/// and topic extraction on top of it.
///
/// Internally, it holds:
/// - The configuration
/// - A text pipeline (tokenizer, stop words, stemmers)
/// - Trigram language profiles built from the stop-word lexicons
/// - The clustering and topic engines
/// - An optional memoization cache
///
/// Document ids in every result are positions in the input slice.
pub use analyzer::{Document, TextAnalyzer};

/// Configuration
/// Nested settings for every component, loadable from defaults, a TOML file
/// and `TEXT_ANALYTICS_*` environment variables.
pub use config::AnalyticsConfig;

/// Error and Result
/// Only broken input contracts (non UTF-8 text, negative counts, misaligned
/// collections) are errors; degenerate parameters give empty results.
pub use error::{Error, Result};

/// Language Identification
/// Character-trigram profiles scored by an unnormalized dot product.
/// `Identification` tells whether the language was detected, preferred from
/// context, or a fallback.
pub use language::{FallbackReason, Identification, LanguageProfiler};

/// Trigram Profile
/// Frequency histogram over boundary-padded character trigrams.
pub use language::profile::TrigramProfile;

/// Vector Space Builder
/// Converts token lists into a vocabulary, a document-term matrix and an
/// L2-normalized TF-IDF vector space.
///
/// The weighting scheme is a type parameter implementing `TFIDFEngine`;
/// `DefaultTFIDFEngine` uses raw counts and smoothed IDF `ln((N+1)/(df+1)) + 1`.
pub use vectorizer::{IdfTable, TfIdfSpace, VectorSpaceBuilder, Vocabulary};

/// TF IDF Calculation Engine Trait
pub use vectorizer::tfidf::{DefaultTFIDFEngine, TFIDFEngine};

/// Document-Term Matrix
/// Raw counts per document; every vocabulary term is addressable for every
/// document.
pub use vectorizer::dtm::DocumentTermMatrix;

/// Corpus
/// Document count and per-term document frequency of a collection.
/// It is the base data for IDF calculation.
pub use vectorizer::corpus::Corpus;

/// Term Frequency structure
/// Occurrence counts of each term within one document, plus the total.
///
/// Used as base data for TF calculation and as one row of the
/// document-term matrix.
pub use vectorizer::token::TermFrequency;

/// Similarity
/// Cosine similarity and the symmetric pairwise similarity matrix.
pub use vectorizer::compute::{cosine_similarity, similarity_matrix, SimilarityMatrix};

/// Ranked Results
/// `Hits` holds `(key, score)` pairs with a stable descending sort.
pub use vectorizer::evaluate::scoring::{rank_terms, Hits};

/// Sparse Vector
/// Sorted index/value pairs with zeros omitted.
pub use utils::math::vector::SparseVec;

/// Clustering
/// k-means, average-linkage hierarchical clustering and threshold grouping.
pub use cluster::{CentroidInit, Cluster, ClusterEngine, Dendrogram, DendrogramNode, KMeansResult};

/// Topics and Keyphrases
pub use topic::{Keyphrase, Topic, TopicExtractor};

/// Text Collaborators
/// Pluggable tokenizer, stop-word source and stemmer, with default
/// implementations.
pub use text::{
    pipeline::TextPipeline,
    stemmer::{Stem, StemmerRegistry},
    stopwords::{LexiconStopWords, StopWordSource},
    tokenizer::{SimpleTokenizer, Tokenizer},
};

/// Memoization
/// Optional cache consulted by `TextAnalyzer`; results are the same without it.
pub use cache::{CacheKey, InMemoryCache, MemoCache};
