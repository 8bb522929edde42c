use std::fmt::{self, Debug};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::math::vector::SparseVec;

/// Cosine similarity in `[0, 1]` for non-negative vectors.
/// A zero-magnitude side yields 0.
#[inline]
pub fn cosine_similarity(a: &SparseVec<f64>, b: &SparseVec<f64>) -> f64 {
    a.cosine_similarity(b)
}

/// Square, symmetric matrix of pairwise cosine similarities.
/// The diagonal is exactly 1.0.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    n: usize,
    data: Vec<f64>,
}

impl SimilarityMatrix {
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// # Panics
    /// When `i` or `j` is out of range
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.n && j < self.n, "similarity index out of range");
        self.data[i * self.n + j]
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.n).map(|i| self.row(i).to_vec()).collect()
    }
}

impl Debug for SimilarityMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "SimilarityMatrix {}x{} [", self.n, self.n)?;
            for i in 0..self.n {
                let cells: Vec<String> = self.row(i).iter().map(|v| format!("{:.4}", v)).collect();
                writeln!(f, "    [{}]", cells.join(", "))?;
            }
            write!(f, "]")
        } else {
            f.debug_list().entries((0..self.n).map(|i| self.row(i))).finish()
        }
    }
}

/// Pairwise similarity of `vectors`.
///
/// Each unordered pair is computed once and mirrored; self-similarity is not
/// computed, the diagonal is set to 1.0. Rows of the upper triangle run in
/// parallel and are written back in index order.
pub fn similarity_matrix(vectors: &[SparseVec<f64>]) -> SimilarityMatrix {
    let n = vectors.len();
    let upper: Vec<Vec<f64>> = (0..n)
        .into_par_iter()
        .map(|i| {
            vectors[i + 1..]
                .iter()
                .map(|other| vectors[i].cosine_similarity(other))
                .collect()
        })
        .collect();

    let mut data = vec![0.0; n * n];
    for (i, row) in upper.into_iter().enumerate() {
        data[i * n + i] = 1.0;
        for (offset, sim) in row.into_iter().enumerate() {
            let j = i + 1 + offset;
            data[i * n + j] = sim;
            data[j * n + i] = sim;
        }
    }
    SimilarityMatrix { n, data }
}
