pub mod keyphrase;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    cluster::{CentroidInit, Cluster, ClusterEngine},
    config::TopicConfig,
    error::{Error, Result},
    text::stopwords::StopWordSource,
    utils::math::vector::SparseVec,
    vectorizer::{
        dtm::DocumentTermMatrix,
        evaluate::scoring::{rank_terms, Hits},
    },
};

pub use keyphrase::Keyphrase;

/// A cluster described by its highest scoring terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: usize,
    pub terms: Vec<(String, f64)>,
    pub members: Vec<usize>,
    /// coherence of the cluster the topic came from
    pub coherence: f64,
}

/// Term ranking, clustering-based topic discovery and keyphrases.
///
/// Topics approximate a topic model by clustering documents with k-means and
/// ranking terms inside each cluster.
#[derive(Debug, Clone, Default)]
pub struct TopicExtractor {
    config: TopicConfig,
}

impl TopicExtractor {
    pub fn new(config: TopicConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TopicConfig {
        &self.config
    }

    /// Collection-level term importance, best `top_m` first
    pub fn term_scores(&self, dtm: &DocumentTermMatrix, top_m: usize) -> Hits<String> {
        rank_terms(dtm, top_m)
    }

    /// One topic per cluster, terms ranked over the cluster's rows only.
    /// Topics are ordered by member count, largest first.
    pub fn topics_from_clusters(&self, dtm: &DocumentTermMatrix, clusters: &[Cluster]) -> Vec<Topic> {
        let mut topics: Vec<Topic> = clusters
            .iter()
            .map(|cluster| Topic {
                id: cluster.id,
                terms: rank_terms(&dtm.select(&cluster.members), self.config.terms_per_topic).into_vec(),
                members: cluster.members.clone(),
                coherence: cluster.coherence,
            })
            .collect();
        // 安定ソート: 同数なら cluster 順
        topics.sort_by(|a, b| b.members.len().cmp(&a.members.len()));
        topics
    }

    /// k-means with `k = num_topics`, then per-cluster term ranking.
    ///
    /// # Errors
    /// `InvalidInput` when `dtm` and `vectors` describe different numbers of
    /// documents, or `init` is an invalid explicit seeding.
    pub fn discover_topics(
        &self,
        engine: &ClusterEngine,
        dtm: &DocumentTermMatrix,
        vectors: &[SparseVec<f64>],
        num_topics: usize,
        init: &CentroidInit,
    ) -> Result<Vec<Topic>> {
        if dtm.doc_num() != vectors.len() {
            return Err(Error::invalid_input(format!(
                "document-term matrix has {} rows but {} vectors were given",
                dtm.doc_num(),
                vectors.len()
            )));
        }
        let no_texts: [&str; 0] = [];
        let result = engine.kmeans_with_init(vectors, &no_texts, num_topics, init)?;
        let topics = self.topics_from_clusters(dtm, &result.clusters);
        debug!(topics = topics.len(), iterations = result.iterations, "discovered topics");
        Ok(topics)
    }

    /// Keyphrases of one document, `config.keyphrases` at most
    pub fn keyphrases(&self, text: &str, lang: &str, stop_words: &dyn StopWordSource) -> Vec<Keyphrase> {
        keyphrase::extract_keyphrases(text, lang, stop_words, self.config.keyphrases)
    }
}
