use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    cluster::{coherence_from_matrix, Cluster},
    utils::math::vector::SparseVec,
    vectorizer::compute::similarity_matrix,
};

/// One node of the merge tree.
///
/// Leaves have no children, distance 0 and height 0. An inner node records
/// the average-linkage distance at which its children were joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DendrogramNode {
    pub cluster: Cluster,
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub distance: f64,
    pub height: usize,
}

impl DendrogramNode {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Arena of merge tree nodes.
///
/// Nodes `0..n` are the leaves in document order; merges are appended.
/// `roots` lists the nodes still unmerged when agglomeration stopped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dendrogram {
    nodes: Vec<DendrogramNode>,
    roots: Vec<usize>,
}

impl Dendrogram {
    pub fn nodes(&self) -> &[DendrogramNode] {
        &self.nodes
    }

    pub fn node(&self, id: usize) -> Option<&DendrogramNode> {
        self.nodes.get(id)
    }

    pub fn root_ids(&self) -> &[usize] {
        &self.roots
    }

    /// Top-level clusters
    pub fn roots(&self) -> impl Iterator<Item = &DendrogramNode> + '_ {
        self.roots.iter().filter_map(move |&id| self.nodes.get(id))
    }

    pub fn merges(&self) -> usize {
        self.nodes.len() - self.leaf_count()
    }

    fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub(crate) fn attach_texts<S>(&mut self, texts: &[S])
    where
        S: AsRef<str>,
    {
        for node in &mut self.nodes {
            node.cluster.attach_texts(texts);
        }
    }
}

/// Agglomerative clustering with average linkage over `1 - cosine`.
///
/// Repeatedly joins the two closest clusters until one remains or the
/// closest pair is farther apart than `distance_threshold`. Among equally
/// close pairs the first found (lowest slot pair) is merged.
pub fn agglomerate(vectors: &[SparseVec<f64>], distance_threshold: f64) -> Dendrogram {
    let n = vectors.len();
    if n == 0 {
        return Dendrogram::default();
    }
    let sims = similarity_matrix(vectors);

    // slot x slot linkage distance, updated in place on merge
    let mut linkage: Vec<f64> = (0..n * n).map(|c| 1.0 - sims.get(c / n, c % n)).collect();
    let mut nodes: Vec<DendrogramNode> = (0..n)
        .map(|i| DendrogramNode {
            cluster: Cluster {
                id: i,
                members: vec![i],
                texts: Vec::new(),
                centroid: Some(vectors[i].clone()),
                coherence: 1.0,
            },
            left: None,
            right: None,
            distance: 0.0,
            height: 0,
        })
        .collect();
    let mut slots: Vec<Option<usize>> = (0..n).map(Some).collect();
    let mut active = n;

    while active > 1 {
        let mut closest: Option<(usize, usize, f64)> = None;
        for a in 0..n {
            if slots[a].is_none() {
                continue;
            }
            for b in a + 1..n {
                if slots[b].is_none() {
                    continue;
                }
                let d = linkage[a * n + b];
                if closest.map_or(true, |(_, _, best)| d < best) {
                    closest = Some((a, b, d));
                }
            }
        }
        let (a, b, distance) = match closest {
            Some(c) if c.2 <= distance_threshold => c,
            _ => break,
        };
        let (left, right) = match (slots[a], slots[b]) {
            (Some(l), Some(r)) => (l, r),
            _ => break,
        };

        let size_a = nodes[left].cluster.len() as f64;
        let size_b = nodes[right].cluster.len() as f64;
        for x in 0..n {
            if x == a || x == b || slots[x].is_none() {
                continue;
            }
            let d = (size_a * linkage[a * n + x] + size_b * linkage[b * n + x]) / (size_a + size_b);
            linkage[a * n + x] = d;
            linkage[x * n + a] = d;
        }

        let mut members = nodes[left].cluster.members.clone();
        members.extend_from_slice(&nodes[right].cluster.members);
        members.sort_unstable();
        let id = nodes.len();
        let cluster = Cluster {
            id,
            coherence: coherence_from_matrix(&members, &sims),
            centroid: Some(SparseVec::mean(members.iter().map(|&m| &vectors[m]))),
            members,
            texts: Vec::new(),
        };
        debug!(left, right, distance, size = cluster.len(), "merged clusters");
        nodes.push(DendrogramNode {
            cluster,
            left: Some(left),
            right: Some(right),
            distance,
            height: nodes[left].height.max(nodes[right].height) + 1,
        });
        slots[a] = Some(id);
        slots[b] = None;
        active -= 1;
    }

    let roots = slots.into_iter().flatten().collect();
    Dendrogram { nodes, roots }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vectorizer::compute::cosine_similarity;

    fn vecs() -> Vec<SparseVec<f64>> {
        vec![
            SparseVec::from_pairs([(0, 1.0)]),
            SparseVec::from_pairs([(1, 1.0)]),
            SparseVec::from_pairs([(0, 0.9), (2, 0.1)]),
            SparseVec::from_pairs([(1, 0.8), (3, 0.2)]),
        ]
    }

    fn root_members(d: &Dendrogram) -> Vec<Vec<usize>> {
        d.roots().map(|n| n.cluster.members.clone()).collect()
    }

    #[test]
    fn threshold_stops_merging() {
        let d = agglomerate(&vecs(), 0.5);
        assert_eq!(root_members(&d), vec![vec![0, 2], vec![1, 3]]);
        assert_eq!(d.merges(), 2);
        for root in d.roots() {
            assert_eq!(root.height, 1);
            assert!(root.distance < 0.5);
            assert!(root.cluster.coherence > 0.9);
        }
    }

    #[test]
    fn large_threshold_merges_everything() {
        let d = agglomerate(&vecs(), 1.0);
        assert_eq!(d.root_ids().len(), 1);
        let root = d.roots().next().unwrap();
        assert_eq!(root.cluster.members, vec![0, 1, 2, 3]);
        assert_eq!(root.height, 2);
        // average of the four cross pairs, all at distance 1
        assert!((root.distance - 1.0).abs() < 1e-12);
        assert_eq!(d.merges(), 3);
    }

    #[test]
    fn merge_distance_is_mean_over_member_pairs() {
        let docs = vec![
            SparseVec::from_pairs([(0, 1.0)]),
            SparseVec::from_pairs([(0, 0.9), (1, 0.1)]),
            SparseVec::from_pairs([(0, 0.5), (1, 0.5)]),
            SparseVec::from_pairs([(1, 1.0)]),
            SparseVec::from_pairs([(1, 0.7), (2, 0.7)]),
        ];
        let d = agglomerate(&docs, 2.0);
        assert_eq!(d.root_ids().len(), 1);
        assert_eq!(d.merges(), 4);

        let mut uneven = 0;
        for node in d.nodes().iter().filter(|n| !n.is_leaf()) {
            let left = &d.node(node.left.unwrap()).unwrap().cluster.members;
            let right = &d.node(node.right.unwrap()).unwrap().cluster.members;
            if left.len() != right.len() {
                uneven += 1;
            }
            let mut total = 0.0;
            for &l in left {
                for &r in right {
                    total += 1.0 - cosine_similarity(&docs[l], &docs[r]);
                }
            }
            let mean = total / (left.len() * right.len()) as f64;
            assert!(
                (node.distance - mean).abs() < 1e-9,
                "node {} joined at {} but member pairs average {}",
                node.cluster.id,
                node.distance,
                mean
            );
        }
        // five leaves cannot end in an even split
        assert!(uneven > 0);
    }

    #[test]
    fn zero_threshold_keeps_leaves() {
        let d = agglomerate(&vecs(), 0.0);
        assert_eq!(d.merges(), 0);
        assert_eq!(root_members(&d), vec![vec![0], vec![1], vec![2], vec![3]]);
        assert!(d.nodes().iter().all(DendrogramNode::is_leaf));
    }

    #[test]
    fn identical_documents_merge_at_zero_distance() {
        let v = SparseVec::from_pairs([(4, 2.0)]);
        let d = agglomerate(&[v.clone(), v], 0.0);
        let root = d.roots().next().unwrap();
        assert_eq!(root.cluster.members, vec![0, 1]);
        assert_eq!(root.left, Some(0));
        assert_eq!(root.right, Some(1));
    }

    #[test]
    fn empty_input_is_empty_dendrogram() {
        let d = agglomerate(&[], 0.5);
        assert!(d.nodes().is_empty());
        assert_eq!(d.roots().count(), 0);
    }
}
