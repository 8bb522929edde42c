use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::{
    cache::{memoize, try_memoize, CacheKey, MemoCache},
    cluster::{CentroidInit, Cluster, ClusterEngine, Dendrogram, KMeansResult},
    config::AnalyticsConfig,
    error::{Error, Result},
    language::{Identification, LanguageProfiler},
    text::pipeline::TextPipeline,
    topic::{Keyphrase, Topic, TopicExtractor},
    vectorizer::{
        compute::SimilarityMatrix, dtm::DocumentTermMatrix, evaluate::scoring::Hits, TfIdfSpace,
        VectorSpaceBuilder,
    },
};

/// Input text with its position in the collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: usize,
    pub text: String,
}

impl Document {
    pub fn new(id: usize, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// # Errors
    /// `InvalidInput` when `bytes` is not UTF-8
    pub fn from_bytes(id: usize, bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes).map_err(|err| {
            Error::invalid_input(format!("document {} is not valid UTF-8: {}", id, err))
        })?;
        Ok(Self::new(id, text))
    }

    /// Number each text by its position
    pub fn collection<I, S>(texts: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .enumerate()
            .map(|(id, text)| Self::new(id, text))
            .collect()
    }
}

impl AsRef<str> for Document {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Text analytics engine.
///
/// Wires the text pipeline, language profiles, vector space construction,
/// clustering and topic extraction behind one handle. Document ids in every
/// output are positions in the `texts` slice passed in.
///
/// A `MemoCache` can be attached with `with_cache`; results are identical
/// with or without it.
#[derive(Clone)]
pub struct TextAnalyzer {
    config: AnalyticsConfig,
    pipeline: TextPipeline,
    profiler: LanguageProfiler,
    clusters: ClusterEngine,
    topics: TopicExtractor,
    builder: VectorSpaceBuilder,
    cache: Option<Arc<dyn MemoCache>>,
    /// Pipeline digest; the language profiles derive from the same pipeline
    fingerprint: CacheKey,
}

impl fmt::Debug for TextAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextAnalyzer")
            .field("config", &self.config)
            .field("pipeline", &self.pipeline)
            .field("languages", &self.profiler.languages().collect::<Vec<_>>())
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

impl Default for TextAnalyzer {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

impl TextAnalyzer {
    pub fn new(config: AnalyticsConfig) -> Self {
        let pipeline = TextPipeline::new(config.vectorizer.clone());
        Self::with_parts(config, pipeline)
    }

    fn with_parts(config: AnalyticsConfig, pipeline: TextPipeline) -> Self {
        let profiler = LanguageProfiler::from_stop_words(config.language.clone(), pipeline.stop_words());
        Self {
            profiler,
            clusters: ClusterEngine::new(config.kmeans.clone()),
            topics: TopicExtractor::new(config.topics.clone()),
            builder: VectorSpaceBuilder::new(),
            cache: None,
            fingerprint: pipeline.fingerprint(),
            pipeline,
            config,
        }
    }

    /// Replace the text pipeline; language profiles are rebuilt from its stop words
    pub fn with_pipeline(self, pipeline: TextPipeline) -> Self {
        let cache = self.cache;
        Self {
            cache,
            ..Self::with_parts(self.config, pipeline)
        }
    }

    pub fn with_cache(mut self, cache: Arc<dyn MemoCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &TextPipeline {
        &self.pipeline
    }

    pub fn profiler(&self) -> &LanguageProfiler {
        &self.profiler
    }

    #[inline]
    fn cache(&self) -> Option<&dyn MemoCache> {
        self.cache.as_deref()
    }

    fn key<S>(&self, op: &str, texts: &[S], lang: &str, extra: &[String]) -> CacheKey
    where
        S: AsRef<str>,
    {
        let mut params = vec![self.fingerprint.to_string(), lang.to_string()];
        params.extend_from_slice(extra);
        CacheKey::derive(op, texts, &params)
    }

    /// Language of `text`; `context` is preferred on low confidence and used
    /// as the fallback.
    pub fn detect_language(&self, text: &str, context: Option<&str>) -> Identification {
        let key = CacheKey::derive(
            "detect_language",
            &[text],
            &[
                self.fingerprint.to_string(),
                context.unwrap_or_default().to_string(),
                format!("{:?}", self.config.language),
            ],
        );
        memoize(self.cache(), key, || self.profiler.identify(text, context))
    }

    /// Analysis tokens per document
    pub fn analyze<S>(&self, texts: &[S], lang: &str) -> Vec<Vec<String>>
    where
        S: AsRef<str> + Sync,
    {
        self.pipeline.analyze_all(texts, lang)
    }

    pub fn document_term_matrix<S>(&self, texts: &[S], lang: &str) -> DocumentTermMatrix
    where
        S: AsRef<str> + Sync,
    {
        self.builder.build_document_term_matrix(&self.analyze(texts, lang))
    }

    /// TF-IDF vector space of the collection
    pub fn vectorize<S>(&self, texts: &[S], lang: &str) -> TfIdfSpace
    where
        S: AsRef<str> + Sync,
    {
        let key = self.key("vectorize", texts, lang, &[]);
        memoize(self.cache(), key, || self.builder.build_tf_idf(&self.analyze(texts, lang)))
    }

    pub fn similarity_matrix<S>(&self, texts: &[S], lang: &str) -> SimilarityMatrix
    where
        S: AsRef<str> + Sync,
    {
        let key = self.key("similarity_matrix", texts, lang, &[]);
        memoize(self.cache(), key, || self.vectorize(texts, lang).similarity_matrix())
    }

    /// Collection-level term ranking
    pub fn term_scores<S>(&self, texts: &[S], lang: &str, top_m: usize) -> Hits<String>
    where
        S: AsRef<str> + Sync,
    {
        self.topics.term_scores(&self.document_term_matrix(texts, lang), top_m)
    }

    /// k-means with randomly sampled initial centroids (`kmeans.seed` if set)
    pub fn kmeans<S>(&self, texts: &[S], lang: &str, k: usize) -> Result<KMeansResult>
    where
        S: AsRef<str> + Sync,
    {
        let init = CentroidInit::Random {
            seed: self.config.kmeans.seed,
        };
        self.kmeans_with_init(texts, lang, k, &init)
    }

    pub fn kmeans_with_init<S>(
        &self,
        texts: &[S],
        lang: &str,
        k: usize,
        init: &CentroidInit,
    ) -> Result<KMeansResult>
    where
        S: AsRef<str> + Sync,
    {
        let key = self.key(
            "kmeans",
            texts,
            lang,
            &[k.to_string(), format!("{:?}", init), format!("{:?}", self.config.kmeans)],
        );
        try_memoize(self.cache(), key, || {
            let space = self.vectorize(texts, lang);
            self.clusters.kmeans_with_init(&space.vectors, texts, k, init)
        })
    }

    /// Agglomerative clustering; `None` uses `hierarchical.distance_threshold`
    pub fn hierarchical<S>(
        &self,
        texts: &[S],
        lang: &str,
        distance_threshold: Option<f64>,
    ) -> Result<Dendrogram>
    where
        S: AsRef<str> + Sync,
    {
        let threshold = distance_threshold.unwrap_or(self.config.hierarchical.distance_threshold);
        let key = self.key("hierarchical", texts, lang, &[threshold.to_string()]);
        try_memoize(self.cache(), key, || {
            let space = self.vectorize(texts, lang);
            self.clusters.hierarchical(&space.vectors, texts, threshold)
        })
    }

    /// Greedy grouping; `None` uses `grouping.similarity_threshold`
    pub fn group_by_similarity<S>(
        &self,
        texts: &[S],
        lang: &str,
        similarity_threshold: Option<f64>,
    ) -> Result<Vec<Cluster>>
    where
        S: AsRef<str> + Sync,
    {
        let threshold = similarity_threshold.unwrap_or(self.config.grouping.similarity_threshold);
        let key = self.key("group_by_similarity", texts, lang, &[threshold.to_string()]);
        try_memoize(self.cache(), key, || {
            let space = self.vectorize(texts, lang);
            self.clusters.group_by_similarity(&space.vectors, texts, threshold)
        })
    }

    /// Topics from k-means with `k = num_topics`
    pub fn discover_topics<S>(&self, texts: &[S], lang: &str, num_topics: usize) -> Result<Vec<Topic>>
    where
        S: AsRef<str> + Sync,
    {
        let init = CentroidInit::Random {
            seed: self.config.kmeans.seed,
        };
        self.discover_topics_with_init(texts, lang, num_topics, &init)
    }

    pub fn discover_topics_with_init<S>(
        &self,
        texts: &[S],
        lang: &str,
        num_topics: usize,
        init: &CentroidInit,
    ) -> Result<Vec<Topic>>
    where
        S: AsRef<str> + Sync,
    {
        let key = self.key(
            "discover_topics",
            texts,
            lang,
            &[
                num_topics.to_string(),
                format!("{:?}", init),
                format!("{:?}", self.config.kmeans),
                format!("{:?}", self.config.topics),
            ],
        );
        try_memoize(self.cache(), key, || {
            let dtm = self.document_term_matrix(texts, lang);
            let space = self.builder.build_tf_idf_from_dtm(&dtm);
            self.topics
                .discover_topics(&self.clusters, &dtm, &space.vectors, num_topics, init)
        })
    }

    /// Keyphrases of a single text
    pub fn keyphrases(&self, text: &str, lang: &str) -> Vec<Keyphrase> {
        let key = self.key("keyphrases", &[text], lang, &[format!("{:?}", self.config.topics)]);
        memoize(self.cache(), key, || {
            self.topics.keyphrases(text, lang, self.pipeline.stop_words())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cache::InMemoryCache, text::stopwords::LexiconStopWords};

    const PETS: [&str; 4] = ["the cat sleeps", "a dog plays", "cats and felines", "dogs are loyal"];

    /// `RUST_LOG=tf_idf_analytics=debug` shows k-means and merge progress
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    #[test]
    fn cat_and_dog_documents_cluster_apart() {
        init_tracing();
        let analyzer = TextAnalyzer::default();
        let result = analyzer
            .kmeans_with_init(&PETS, "en", 2, &CentroidInit::Indices(vec![0, 1]))
            .unwrap();
        let members: Vec<Vec<usize>> = result.clusters.iter().map(|c| c.members.clone()).collect();
        assert_eq!(members, vec![vec![0, 2], vec![1, 3]]);
        assert_eq!(result.clusters[0].texts, vec!["the cat sleeps", "cats and felines"]);

        let sims = analyzer.similarity_matrix(&PETS, "en");
        let mut cross = 0.0;
        for &a in &members[0] {
            for &b in &members[1] {
                cross += sims.get(a, b);
            }
        }
        let cross = cross / 4.0;
        for cluster in &result.clusters {
            assert!(cluster.coherence > cross, "{} <= {}", cluster.coherence, cross);
        }
    }

    #[test]
    fn pet_documents_analyze_to_stems() {
        let tokens = TextAnalyzer::default().analyze(&PETS, "en");
        assert_eq!(tokens[0], vec!["cat", "sleep"]);
        assert_eq!(tokens[2][0], "cat");
        assert_eq!(tokens[3][0], "dog");
    }

    #[test]
    fn detects_french_with_builtin_profiles() {
        let analyzer = TextAnalyzer::default();
        let id = analyzer.detect_language("Ceci est un texte en français avec plusieurs mots", None);
        assert_eq!(id.language(), "fr");
    }

    #[test]
    fn cached_and_uncached_results_agree() {
        init_tracing();
        let cache = Arc::new(InMemoryCache::new());
        let cached = TextAnalyzer::default().with_cache(cache.clone());
        let plain = TextAnalyzer::default();

        let first = cached.vectorize(&PETS, "en");
        let second = cached.vectorize(&PETS, "en");
        assert_eq!(first, second);
        assert_eq!(first, plain.vectorize(&PETS, "en"));
        assert_eq!(cache.len(), 1);

        let groups = cached.group_by_similarity(&PETS, "en", Some(0.3)).unwrap();
        assert_eq!(groups, plain.group_by_similarity(&PETS, "en", Some(0.3)).unwrap());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn analyzers_sharing_a_cache_keep_their_own_pipelines() {
        let cache = Arc::new(InMemoryCache::new());
        let builtin = TextAnalyzer::default().with_cache(cache.clone());
        let pipeline = TextPipeline::default()
            .with_stop_words(Arc::new(LexiconStopWords::empty().with_words("en", ["cat"])));
        let custom = TextAnalyzer::default().with_pipeline(pipeline.clone());
        let custom_cached = TextAnalyzer::default()
            .with_pipeline(pipeline)
            .with_cache(cache.clone());

        let texts = ["the cat sleeps", "a dog plays"];
        let first: Vec<String> = builtin.vectorize(&texts, "en").vocabulary.iter().map(String::from).collect();
        assert_eq!(first, vec!["cat", "sleep", "dog", "play"]);

        let expected = custom.vectorize(&texts, "en");
        let vocab: Vec<&str> = expected.vocabulary.iter().collect();
        assert_eq!(vocab, vec!["the", "sleep", "dog", "play"]);
        assert_eq!(custom_cached.vectorize(&texts, "en"), expected);
        assert_eq!(cache.len(), 2);

        let text = "Ceci est un texte en français avec plusieurs mots";
        assert_eq!(
            custom_cached.detect_language(text, None),
            custom.detect_language(text, None)
        );
        assert_eq!(
            builtin.detect_language(text, None),
            TextAnalyzer::default().detect_language(text, None)
        );
    }

    #[test]
    fn hierarchical_uses_configured_threshold() {
        let analyzer = TextAnalyzer::default();
        let dendrogram = analyzer.hierarchical(&PETS, "en", None).unwrap();
        // within-pair distance is about 0.62, above the 0.5 default
        assert_eq!(dendrogram.root_ids().len(), 4);
        let merged = analyzer.hierarchical(&PETS, "en", Some(0.7)).unwrap();
        let roots: Vec<Vec<usize>> = merged.roots().map(|n| n.cluster.members.clone()).collect();
        assert_eq!(roots, vec![vec![0, 2], vec![1, 3]]);
        assert_eq!(merged.roots().next().unwrap().cluster.texts.len(), 2);
    }

    #[test]
    fn topics_and_keyphrases() {
        let analyzer = TextAnalyzer::default();
        let topics = analyzer
            .discover_topics_with_init(&PETS, "en", 2, &CentroidInit::Indices(vec![0, 1]))
            .unwrap();
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].terms[0].0, "cat");
        assert_eq!(topics[1].terms[0].0, "dog");

        let phrases = analyzer.keyphrases("Machine learning is powerful. Machine learning is everywhere.", "en");
        assert_eq!(phrases[0].phrase, "machine learning");
        assert_eq!(phrases[0].frequency, 2);
    }

    #[test]
    fn documents_from_bytes_must_be_utf8() {
        assert_eq!(Document::from_bytes(3, "ok".as_bytes()).unwrap(), Document::new(3, "ok"));
        let err = Document::from_bytes(0, &[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let docs = Document::collection(PETS);
        assert_eq!(docs[1].id, 1);
        let space = TextAnalyzer::default().vectorize(&docs, "en");
        assert_eq!(space.doc_num(), 4);
    }

    #[test]
    fn invalid_k_is_empty_not_error() {
        let result = TextAnalyzer::default().kmeans(&PETS, "en", 9).unwrap();
        assert!(result.clusters.is_empty());
    }
}
