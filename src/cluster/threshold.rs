use tracing::debug;

use crate::{cluster::Cluster, utils::math::vector::SparseVec};

/// Single-pass grouping around seeds.
///
/// Documents are visited in collection order; each one not yet grouped
/// becomes a seed and pulls in every ungrouped document whose similarity to
/// the seed is at least `similarity_threshold`. The result depends on input
/// order and members are not compared with each other.
pub fn group(vectors: &[SparseVec<f64>], similarity_threshold: f64) -> Vec<Cluster> {
    let n = vectors.len();
    let mut grouped = vec![false; n];
    let mut clusters = Vec::new();
    for seed in 0..n {
        if grouped[seed] {
            continue;
        }
        grouped[seed] = true;
        let mut members = vec![seed];
        for other in seed + 1..n {
            if grouped[other] {
                continue;
            }
            if vectors[seed].cosine_similarity(&vectors[other]) >= similarity_threshold {
                grouped[other] = true;
                members.push(other);
            }
        }
        clusters.push(Cluster::from_members(clusters.len(), members, vectors));
    }
    debug!(groups = clusters.len(), doc_num = n, "grouped by similarity");
    clusters
}
