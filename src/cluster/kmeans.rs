use rand::{rngs::StdRng, seq::index, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    cluster::Cluster,
    error::{Error, Result},
    utils::math::vector::SparseVec,
};

/// How the initial centroids are chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CentroidInit {
    /// `k` distinct documents sampled uniformly; a fixed seed makes runs repeatable
    Random { seed: Option<u64> },
    /// exactly these documents, in order
    Indices(Vec<usize>),
}

impl Default for CentroidInit {
    fn default() -> Self {
        CentroidInit::Random { seed: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansResult {
    /// non-empty clusters, ordered by centroid index
    pub clusters: Vec<Cluster>,
    pub iterations: usize,
    /// false when the iteration cap stopped the loop
    pub converged: bool,
}

impl KMeansResult {
    pub fn empty() -> Self {
        Self {
            clusters: Vec::new(),
            iterations: 0,
            converged: true,
        }
    }

    /// Cluster id of each document, `None` if it is in no cluster
    pub fn assignments(&self, doc_num: usize) -> Vec<Option<usize>> {
        let mut out = vec![None; doc_num];
        for cluster in &self.clusters {
            for &m in &cluster.members {
                if let Some(slot) = out.get_mut(m) {
                    *slot = Some(cluster.id);
                }
            }
        }
        out
    }
}

/// Lloyd's k-means under cosine similarity.
///
/// # Arguments
/// * `vectors` - 文書ベクトル
/// * `k` - クラスタ数, `0` or more than `vectors.len()` gives an empty result
/// * `max_iterations` - assignment passes before giving up (at least one runs)
/// * `init` - initial centroid choice
///
/// # Returns
/// Clusters whose members are the documents closest to the same centroid.
/// Ties go to the lowest centroid index; a centroid that loses all members
/// keeps its previous position and its empty cluster is omitted.
pub fn kmeans(
    vectors: &[SparseVec<f64>],
    k: usize,
    max_iterations: usize,
    init: &CentroidInit,
) -> Result<KMeansResult> {
    let n = vectors.len();
    if k == 0 || k > n {
        warn!(k, doc_num = n, "k out of range, nothing to cluster");
        return Ok(KMeansResult::empty());
    }
    let seeds = initial_indices(n, k, init)?;
    let mut centroids: Vec<SparseVec<f64>> = seeds.iter().map(|&i| vectors[i].clone()).collect();

    let mut previous: Option<Vec<Vec<usize>>> = None;
    let mut partition = Vec::new();
    let mut iterations = 0;
    let mut converged = false;
    while iterations < max_iterations.max(1) {
        iterations += 1;
        partition = partition_of(&assign(vectors, &centroids), k);
        if previous.as_ref() == Some(&partition) {
            converged = true;
            break;
        }
        update(&mut centroids, &partition, vectors);
        previous = Some(partition.clone());
    }
    debug!(k, iterations, converged, "k-means finished");

    let clusters = partition
        .into_iter()
        .zip(centroids)
        .enumerate()
        .filter(|(_, (members, _))| !members.is_empty())
        .map(|(id, (members, centroid))| Cluster {
            id,
            coherence: super::coherence(&members, vectors),
            members,
            texts: Vec::new(),
            centroid: Some(centroid),
        })
        .collect();
    Ok(KMeansResult {
        clusters,
        iterations,
        converged,
    })
}

fn initial_indices(n: usize, k: usize, init: &CentroidInit) -> Result<Vec<usize>> {
    match init {
        CentroidInit::Random { seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(*seed),
                None => StdRng::from_os_rng(),
            };
            Ok(index::sample(&mut rng, n, k).into_vec())
        }
        CentroidInit::Indices(indices) => {
            if indices.len() != k {
                return Err(Error::invalid_input(format!(
                    "{} initial centroids given for k = {}",
                    indices.len(),
                    k
                )));
            }
            for (pos, &idx) in indices.iter().enumerate() {
                if idx >= n {
                    return Err(Error::invalid_input(format!(
                        "initial centroid {} out of range for {} documents",
                        idx, n
                    )));
                }
                if indices[..pos].contains(&idx) {
                    return Err(Error::invalid_input(format!(
                        "initial centroid {} given twice",
                        idx
                    )));
                }
            }
            Ok(indices.clone())
        }
    }
}

/// Nearest centroid of every document
fn assign(vectors: &[SparseVec<f64>], centroids: &[SparseVec<f64>]) -> Vec<usize> {
    vectors
        .par_iter()
        .map(|v| {
            let mut best = 0;
            let mut best_sim = f64::NEG_INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let sim = v.cosine_similarity(centroid);
                if sim > best_sim {
                    best = c;
                    best_sim = sim;
                }
            }
            best
        })
        .collect()
}

/// Members per centroid, each list ascending
fn partition_of(assignment: &[usize], k: usize) -> Vec<Vec<usize>> {
    let mut partition = vec![Vec::new(); k];
    for (doc, &c) in assignment.iter().enumerate() {
        partition[c].push(doc);
    }
    partition
}

fn update(centroids: &mut [SparseVec<f64>], partition: &[Vec<usize>], vectors: &[SparseVec<f64>]) {
    for (centroid, members) in centroids.iter_mut().zip(partition) {
        if members.is_empty() {
            continue;
        }
        *centroid = SparseVec::mean(members.iter().map(|&m| &vectors[m]));
    }
}
