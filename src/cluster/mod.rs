pub mod hierarchical;
pub mod kmeans;
pub mod threshold;

use serde::{Deserialize, Serialize};

use crate::{
    config::KMeansConfig,
    error::{Error, Result},
    utils::math::vector::SparseVec,
    vectorizer::compute::SimilarityMatrix,
};

pub use hierarchical::{Dendrogram, DendrogramNode};
pub use kmeans::{CentroidInit, KMeansResult};

/// A group of documents.
///
/// `members` are document ids (positions in the input collection) in
/// ascending order; `texts[i]` is the payload of `members[i]` when payloads
/// were supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: usize,
    pub members: Vec<usize>,
    pub texts: Vec<String>,
    pub centroid: Option<SparseVec<f64>>,
    /// mean pairwise similarity of the members, 1.0 for 0 or 1 member
    pub coherence: f64,
}

impl Cluster {
    /// Cluster over `members` with centroid and coherence computed from `vectors`
    pub fn from_members(id: usize, members: Vec<usize>, vectors: &[SparseVec<f64>]) -> Self {
        let centroid = SparseVec::mean(members.iter().filter_map(|&m| vectors.get(m)));
        let coherence = coherence(&members, vectors);
        Self {
            id,
            members,
            texts: Vec::new(),
            centroid: Some(centroid),
            coherence,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[inline]
    pub fn contains(&self, doc: usize) -> bool {
        self.members.binary_search(&doc).is_ok()
    }

    /// Fill `texts` from the collection payloads; no-op for empty payloads
    pub fn attach_texts<S>(&mut self, texts: &[S])
    where
        S: AsRef<str>,
    {
        if texts.is_empty() {
            return;
        }
        self.texts = self
            .members
            .iter()
            .filter_map(|&m| texts.get(m).map(|t| t.as_ref().to_string()))
            .collect();
    }
}

/// Mean pairwise cosine similarity among `members`
pub fn coherence(members: &[usize], vectors: &[SparseVec<f64>]) -> f64 {
    mean_pairwise(members, |a, b| match (vectors.get(a), vectors.get(b)) {
        (Some(va), Some(vb)) => va.cosine_similarity(vb),
        _ => 0.0,
    })
}

/// Same as `coherence`, read from a precomputed similarity matrix
pub fn coherence_from_matrix(members: &[usize], sims: &SimilarityMatrix) -> f64 {
    mean_pairwise(members, |a, b| sims.get(a, b))
}

fn mean_pairwise<F>(members: &[usize], sim: F) -> f64
where
    F: Fn(usize, usize) -> f64,
{
    if members.len() <= 1 {
        return 1.0;
    }
    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, &a) in members.iter().enumerate() {
        for &b in &members[i + 1..] {
            total += sim(a, b);
            pairs += 1;
        }
    }
    total / pairs as f64
}

/// Entry point for the three clustering strategies.
///
/// Every method takes the document vectors plus optional text payloads
/// (`texts` empty, or aligned with `vectors`).
#[derive(Debug, Clone, Default)]
pub struct ClusterEngine {
    kmeans: KMeansConfig,
}

impl ClusterEngine {
    pub fn new(kmeans: KMeansConfig) -> Self {
        Self { kmeans }
    }

    /// Partitional clustering with uniformly sampled initial centroids
    pub fn kmeans<S>(&self, vectors: &[SparseVec<f64>], texts: &[S], k: usize) -> Result<KMeansResult>
    where
        S: AsRef<str>,
    {
        let init = CentroidInit::Random {
            seed: self.kmeans.seed,
        };
        self.kmeans_with_init(vectors, texts, k, &init)
    }

    pub fn kmeans_with_init<S>(
        &self,
        vectors: &[SparseVec<f64>],
        texts: &[S],
        k: usize,
        init: &CentroidInit,
    ) -> Result<KMeansResult>
    where
        S: AsRef<str>,
    {
        check_payloads(vectors.len(), texts.len())?;
        let mut result = kmeans::kmeans(vectors, k, self.kmeans.max_iterations, init)?;
        for cluster in &mut result.clusters {
            cluster.attach_texts(texts);
        }
        Ok(result)
    }

    /// Agglomerative clustering with average linkage, stopping above `distance_threshold`
    pub fn hierarchical<S>(
        &self,
        vectors: &[SparseVec<f64>],
        texts: &[S],
        distance_threshold: f64,
    ) -> Result<Dendrogram>
    where
        S: AsRef<str>,
    {
        check_payloads(vectors.len(), texts.len())?;
        let mut dendrogram = hierarchical::agglomerate(vectors, distance_threshold);
        dendrogram.attach_texts(texts);
        Ok(dendrogram)
    }

    /// Greedy single-pass grouping around seeds in collection order
    pub fn group_by_similarity<S>(
        &self,
        vectors: &[SparseVec<f64>],
        texts: &[S],
        similarity_threshold: f64,
    ) -> Result<Vec<Cluster>>
    where
        S: AsRef<str>,
    {
        check_payloads(vectors.len(), texts.len())?;
        let mut clusters = threshold::group(vectors, similarity_threshold);
        for cluster in &mut clusters {
            cluster.attach_texts(texts);
        }
        Ok(clusters)
    }
}

fn check_payloads(vectors: usize, texts: usize) -> Result<()> {
    if texts != 0 && texts != vectors {
        return Err(Error::invalid_input(format!(
            "{} text payloads supplied for {} document vectors",
            texts, vectors
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vecs() -> Vec<SparseVec<f64>> {
        vec![
            SparseVec::from_pairs([(0, 1.0)]),
            SparseVec::from_pairs([(0, 0.6), (1, 0.8)]),
            SparseVec::from_pairs([(1, 1.0)]),
        ]
    }

    #[test]
    fn coherence_is_one_for_tiny_clusters() {
        assert_eq!(coherence(&[], &vecs()), 1.0);
        assert_eq!(coherence(&[2], &vecs()), 1.0);
    }

    #[test]
    fn coherence_is_mean_pairwise_similarity() {
        let c = coherence(&[0, 1, 2], &vecs());
        // (0.6 + 0.0 + 0.8) / 3
        assert!((c - 1.4 / 3.0).abs() < 1e-12);
        let sims = crate::vectorizer::compute::similarity_matrix(&vecs());
        assert!((coherence_from_matrix(&[0, 1, 2], &sims) - c).abs() < 1e-12);
    }

    #[test]
    fn attach_texts_follows_members() {
        let mut cluster = Cluster::from_members(0, vec![0, 2], &vecs());
        cluster.attach_texts(&["a", "b", "c"]);
        assert_eq!(cluster.texts, vec!["a", "c"]);
        assert!(cluster.contains(2));
        assert!(!cluster.contains(1));
    }

    #[test]
    fn misaligned_payloads_are_invalid_input() {
        let engine = ClusterEngine::default();
        let err = engine
            .group_by_similarity(&vecs(), &["only one"], 0.5)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        let empty: [&str; 0] = [];
        assert!(engine.group_by_similarity(&vecs(), &empty, 0.5).is_ok());
    }
}
