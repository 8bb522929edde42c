use std::cmp::Ordering;

use num::Float;

use super::SparseVec;

impl<N> SparseVec<N>
where
    N: Float,
{
    /// ドット積
    /// d(a, b) = Σ(a_i * b_i)
    ///
    /// Only dimensions present in both vectors contribute.
    #[inline]
    pub fn dot(&self, other: &Self) -> N {
        let (a_inds, a_vals) = (self.indices(), self.values());
        let (b_inds, b_vals) = (other.indices(), other.values());
        let mut i = 0;
        let mut j = 0;
        let mut acc = N::zero();
        while i < a_inds.len() && j < b_inds.len() {
            match a_inds[i].cmp(&b_inds[j]) {
                Ordering::Equal => {
                    acc = acc + a_vals[i] * b_vals[j];
                    i += 1;
                    j += 1;
                }
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
            }
        }
        acc
    }

    #[inline]
    pub fn norm_sq(&self) -> N {
        self.values().iter().fold(N::zero(), |acc, &v| acc + v * v)
    }

    /// ユークリッドノルム ||a|| = sqrt(Σ(a_i^2))
    #[inline]
    pub fn norm(&self) -> N {
        self.norm_sq().sqrt()
    }

    /// Unit-length copy. The zero vector stays the zero vector.
    pub fn normalized(&self) -> Self {
        let norm = self.norm();
        if norm == N::zero() {
            return self.clone();
        }
        let mut out = SparseVec::with_capacity(self.nnz());
        for (idx, val) in self.iter() {
            out.push(idx, val / norm);
        }
        out
    }

    /// コサイン類似度
    /// cos(θ) = Σ(a_i * b_i) / (||a|| * ||b||)
    ///
    /// Walks the union of both index sets; a dimension missing on one side
    /// counts as zero. Returns 0 when either side has zero magnitude.
    #[inline]
    pub fn cosine_similarity(&self, other: &Self) -> N {
        let mut a_it = self.iter().fuse();
        let mut b_it = other.iter().fuse();
        let mut a_next = a_it.next();
        let mut b_next = b_it.next();
        let mut norm_a = N::zero();
        let mut norm_b = N::zero();
        let mut dot = N::zero();
        while let (Some((ia, va)), Some((ib, vb))) = (a_next, b_next) {
            match ia.cmp(&ib) {
                Ordering::Equal => {
                    norm_a = norm_a + va * va;
                    norm_b = norm_b + vb * vb;
                    dot = dot + va * vb;
                    a_next = a_it.next();
                    b_next = b_it.next();
                }
                Ordering::Less => {
                    norm_a = norm_a + va * va;
                    a_next = a_it.next();
                }
                Ordering::Greater => {
                    norm_b = norm_b + vb * vb;
                    b_next = b_it.next();
                }
            }
        }
        while let Some((_, va)) = a_next {
            norm_a = norm_a + va * va;
            a_next = a_it.next();
        }
        while let Some((_, vb)) = b_next {
            norm_b = norm_b + vb * vb;
            b_next = b_it.next();
        }
        if norm_a == N::zero() || norm_b == N::zero() {
            N::zero()
        } else {
            // 丸め誤差で 1 を超えないように
            (dot / (norm_a.sqrt() * norm_b.sqrt())).min(N::one())
        }
    }

    /// Element-wise mean of `vectors`. Empty input gives the zero vector.
    pub fn mean<'a, I>(vectors: I) -> Self
    where
        I: IntoIterator<Item = &'a Self>,
        N: 'a,
    {
        let mut count = 0usize;
        let mut pairs = Vec::new();
        for v in vectors {
            count += 1;
            pairs.extend(v.iter());
        }
        if count == 0 {
            return Self::new();
        }
        let n = match N::from(count) {
            Some(n) => n,
            None => return Self::new(),
        };
        let summed = Self::from_pairs(pairs);
        let mut out = Self::with_capacity(summed.nnz());
        for (idx, val) in summed.iter() {
            out.push(idx, val / n);
        }
        out
    }
}
