pub mod math;

use std::fmt::{self, Debug};

use indexmap::IndexMap;
use num::Num;
use serde::{Deserialize, Serialize};

use crate::vectorizer::Vocabulary;

/// SparseVec は 0 要素を省略した疎ベクトルです
///
/// Holds parallel `inds` / `vals` arrays.
/// `inds` is strictly ascending and no stored value is zero, so two vectors
/// with the same entries always compare equal.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVec<N = f64>
where
    N: Num + Copy,
{
    inds: Vec<usize>,
    vals: Vec<N>,
}

impl<N> Default for SparseVec<N>
where
    N: Num + Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N> SparseVec<N>
where
    N: Num + Copy,
{
    pub fn new() -> Self {
        Self {
            inds: Vec::new(),
            vals: Vec::new(),
        }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inds: Vec::with_capacity(cap),
            vals: Vec::with_capacity(cap),
        }
    }

    /// Build from unordered `(index, value)` pairs.
    /// Duplicate indices are summed and zeros are dropped.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, N)>,
    {
        let mut pairs: Vec<(usize, N)> = pairs.into_iter().collect();
        pairs.sort_by_key(|(idx, _)| *idx);
        let mut out = Self::with_capacity(pairs.len());
        for (idx, val) in pairs {
            match out.inds.last() {
                Some(&last) if last == idx => {
                    if let Some(v) = out.vals.last_mut() {
                        *v = *v + val;
                    }
                }
                _ => {
                    out.inds.push(idx);
                    out.vals.push(val);
                }
            }
        }
        out.drop_zeros();
        out
    }

    /// Append an entry whose index is larger than every stored index.
    ///
    /// # Arguments
    /// * `index` - 次元のインデックス
    /// * `value` - 値 (0 は保存しない)
    #[inline]
    pub fn push(&mut self, index: usize, value: N) {
        debug_assert!(
            self.inds.last().map_or(true, |&last| last < index),
            "SparseVec::push requires ascending indices"
        );
        if value != N::zero() {
            self.inds.push(index);
            self.vals.push(value);
        }
    }

    /// Value at `index`, zero when absent
    #[inline]
    pub fn get(&self, index: usize) -> N {
        match self.inds.binary_search(&index) {
            Ok(pos) => self.vals[pos],
            Err(_) => N::zero(),
        }
    }

    #[inline]
    pub fn nnz(&self) -> usize {
        self.inds.len()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.inds.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (usize, N)> + '_ {
        self.inds.iter().copied().zip(self.vals.iter().copied())
    }

    pub fn indices(&self) -> &[usize] {
        &self.inds
    }

    pub fn values(&self) -> &[N] {
        &self.vals
    }

    /// Resolve dimensions to their terms.
    /// Indices outside the vocabulary are ignored.
    pub fn to_term_map(&self, vocab: &Vocabulary) -> IndexMap<String, N> {
        self.iter()
            .filter_map(|(idx, val)| vocab.term(idx).map(|term| (term.to_string(), val)))
            .collect()
    }

    fn drop_zeros(&mut self) {
        let zero = N::zero();
        let mut write = 0;
        for read in 0..self.inds.len() {
            if self.vals[read] != zero {
                self.inds[write] = self.inds[read];
                self.vals[write] = self.vals[read];
                write += 1;
            }
        }
        self.inds.truncate(write);
        self.vals.truncate(write);
    }
}

impl<N> Debug for SparseVec<N>
where
    N: Num + Copy + Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "SparseVec [")?;
            for (idx, val) in self.iter() {
                writeln!(f, "    {}: {:?}", idx, val)?;
            }
            write!(f, "]")
        } else {
            f.debug_map().entries(self.iter()).finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pairs_sorts_merges_and_drops_zeros() {
        let v = SparseVec::from_pairs(vec![(5, 1.0), (1, 2.0), (5, 0.5), (3, 0.0)]);
        assert_eq!(v.indices(), &[1, 5]);
        assert_eq!(v.values(), &[2.0, 1.5]);
    }

    #[test]
    fn get_returns_zero_for_absent_dimension() {
        let mut v = SparseVec::new();
        v.push(2, 4.0);
        v.push(7, 1.0);
        assert_eq!(v.get(2), 4.0);
        assert_eq!(v.get(3), 0.0);
        assert_eq!(v.get(100), 0.0);
    }

    #[test]
    fn push_skips_zero_values() {
        let mut v: SparseVec<f64> = SparseVec::new();
        v.push(0, 0.0);
        assert!(v.is_zero());
    }
}
