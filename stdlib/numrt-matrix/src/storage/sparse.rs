//! Coordinate sparse storage.

use super::dense::DenseData;
use super::{Resized, Storage, Transform};
use crate::scalar::{Field, Scalar};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Sparse coefficients keyed by `(column, row)`.
///
/// Keying by column first makes map order the column-major order. Unsigned
/// zeros are never stored; `-0.0` is kept so it survives a layout change.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SparseData<S> {
    rows: usize,
    cols: usize,
    entries: BTreeMap<(usize, usize), S>,
}

impl<S: Scalar> SparseData<S> {
    pub(crate) fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: BTreeMap::new(),
        }
    }

    /// Collect `(row, col, value)` triples, dropping unsigned zeros. Later triples
    /// for the same position replace earlier ones.
    pub(crate) fn from_triples(
        rows: usize,
        cols: usize,
        triples: impl IntoIterator<Item = (usize, usize, S)>,
    ) -> Self {
        let mut sparse = Self::zeros(rows, cols);
        for (r, c, v) in triples {
            sparse.set(r, c, v);
        }
        sparse
    }

    pub(crate) fn from_dense(dense: &DenseData<S>) -> Self {
        let rows = dense.rows();
        let entries = dense
            .as_slice()
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_unsigned_zero())
            .map(|(i, &v)| ((i / rows.max(1), i % rows.max(1)), v))
            .collect();
        Self {
            rows,
            cols: dense.cols(),
            entries,
        }
    }

    pub(crate) fn to_dense(&self) -> DenseData<S> {
        let mut data = vec![S::zero(); self.rows * self.cols];
        for (&(c, r), &v) in &self.entries {
            data[c * self.rows + r] = v;
        }
        DenseData::from_column_major(self.rows, self.cols, data)
    }

    #[inline]
    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub(crate) fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored (non-zero) coefficients.
    pub(crate) fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn at(&self, row: usize, col: usize) -> S {
        self.entries
            .get(&(col, row))
            .copied()
            .unwrap_or_else(S::zero)
    }

    /// Store `value` at `(row, col)`; an unsigned zero removes the entry.
    /// Returns `false` out of bounds.
    pub(crate) fn set(&mut self, row: usize, col: usize, value: S) -> bool {
        if row >= self.rows || col >= self.cols {
            return false;
        }
        if value.is_unsigned_zero() {
            self.entries.remove(&(col, row));
        } else {
            self.entries.insert((col, row), value);
        }
        true
    }

    /// Stored coefficients as `(row, col, value)`, column-major.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, usize, S)> + '_ {
        self.entries.iter().map(|(&(c, r), &v)| (r, c, v))
    }

    /// Stored coefficients at their logical positions under `transform`,
    /// multiplied by `scale`.
    fn transformed(
        &self,
        transform: Transform,
        scale: S,
    ) -> impl Iterator<Item = (usize, usize, S)> + '_ {
        self.iter().map(move |(r, c, v)| {
            let v = if transform.conjugate { v.conj() } else { v };
            let (r, c) = if transform.transpose { (c, r) } else { (r, c) };
            (r, c, scale.times(v))
        })
    }

    fn read(&self, transform: Transform, row: usize, col: usize) -> S {
        let v = if transform.transpose {
            self.at(col, row)
        } else {
            self.at(row, col)
        };
        if transform.conjugate {
            v.conj()
        } else {
            v
        }
    }

    pub(crate) fn map<T: Scalar>(&self, f: impl Fn(S) -> T) -> SparseData<T> {
        SparseData::from_triples(self.rows, self.cols, self.iter().map(|(r, c, v)| (r, c, f(v))))
    }

    // ------------------------------------------------------------------
    // Reshaping
    // ------------------------------------------------------------------

    /// Dropping out-of-range entries never moves the others.
    pub(crate) fn resize_in_place_to(&mut self, rows: usize, cols: usize) -> bool {
        self.entries.retain(|&(c, r), _| r < rows && c < cols);
        self.rows = rows;
        self.cols = cols;
        true
    }

    pub(crate) fn resize_to(&mut self, rows: usize, cols: usize, always_reallocate: bool) -> Resized<Self> {
        if always_reallocate {
            let fresh = Self::from_triples(
                rows,
                cols,
                self.iter().filter(|&(r, c, _)| r < rows && c < cols),
            );
            return Resized::Fresh(fresh);
        }
        self.resize_in_place_to(rows, cols);
        Resized::InPlace
    }

    pub(crate) fn column_reverse(&self) -> Self {
        let cols = self.cols;
        Self::from_triples(self.rows, cols, self.iter().map(|(r, c, v)| (r, cols - 1 - c, v)))
    }

    pub(crate) fn row_reverse(&self) -> Self {
        let rows = self.rows;
        Self::from_triples(rows, self.cols, self.iter().map(|(r, c, v)| (rows - 1 - r, c, v)))
    }

    pub(crate) fn combine_left_to_right(&self, other: &Self) -> Self {
        let shift = self.cols;
        Self::from_triples(
            self.rows.max(other.rows),
            self.cols + other.cols,
            self.iter()
                .chain(other.iter().map(|(r, c, v)| (r, c + shift, v))),
        )
    }

    pub(crate) fn combine_top_to_bottom(&self, other: &Self) -> Self {
        let shift = self.rows;
        Self::from_triples(
            self.rows + other.rows,
            self.cols.max(other.cols),
            self.iter()
                .chain(other.iter().map(|(r, c, v)| (r + shift, c, v))),
        )
    }

    // ------------------------------------------------------------------
    // Fused arithmetic. Each declines (returns `None`) when `other` is
    // dense, since the result would not be sparse. Shapes are validated by
    // the caller.
    // ------------------------------------------------------------------

    pub(crate) fn add(
        &self,
        a_t: Transform,
        a_scale: S,
        other: &Storage<S>,
        b_t: Transform,
        b_scale: S,
    ) -> Option<Self> {
        let Storage::Sparse(other) = other else {
            return None;
        };
        let (rows, cols) = a_t.shape(self.rows, self.cols);
        let mut sum = Self::from_triples(rows, cols, self.transformed(a_t, a_scale));
        for (r, c, v) in other.transformed(b_t, b_scale) {
            let current = sum.at(r, c);
            sum.set(r, c, current.plus(v));
        }
        Some(sum)
    }

    pub(crate) fn multiply(
        &self,
        a_t: Transform,
        other: &Storage<S>,
        b_t: Transform,
        scale: S,
    ) -> Option<Self> {
        let Storage::Sparse(other) = other else {
            return None;
        };
        let (m, _) = a_t.shape(self.rows, self.cols);
        let (_, n) = b_t.shape(other.rows, other.cols);

        let mut b_rows: BTreeMap<usize, Vec<(usize, S)>> = BTreeMap::new();
        for (p, j, v) in other.transformed(b_t, S::one()) {
            b_rows.entry(p).or_default().push((j, v));
        }

        let mut product: BTreeMap<(usize, usize), S> = BTreeMap::new();
        for (i, p, a) in self.transformed(a_t, S::one()) {
            let Some(row) = b_rows.get(&p) else {
                continue;
            };
            for &(j, b) in row {
                let slot = product.entry((j, i)).or_insert_with(S::zero);
                *slot = slot.plus(a.times(b));
            }
        }
        Some(Self::from_triples(
            m,
            n,
            product.into_iter().map(|((c, r), v)| (r, c, scale.times(v))),
        ))
    }

    pub(crate) fn hadamard(
        &self,
        a_t: Transform,
        a_scale: S,
        other: &Storage<S>,
        b_t: Transform,
        b_scale: S,
    ) -> Option<Self> {
        let Storage::Sparse(other) = other else {
            return None;
        };
        let scale = a_scale.times(b_scale);
        let (rows, cols) = a_t.shape(self.rows, self.cols);
        Some(Self::from_triples(
            rows,
            cols,
            self.transformed(a_t, S::one())
                .map(|(r, c, a)| (r, c, scale.times(a.times(other.read(b_t, r, c))))),
        ))
    }

    pub(crate) fn kronecker(
        &self,
        a_t: Transform,
        a_scale: S,
        other: &Storage<S>,
        b_t: Transform,
        b_scale: S,
    ) -> Option<Self> {
        let Storage::Sparse(other) = other else {
            return None;
        };
        let scale = a_scale.times(b_scale);
        let (ar, ac) = a_t.shape(self.rows, self.cols);
        let (br, bc) = b_t.shape(other.rows, other.cols);
        let b_entries: Vec<_> = other.transformed(b_t, S::one()).collect();
        let mut triples = Vec::with_capacity(self.nnz() * b_entries.len());
        for (i, j, a) in self.transformed(a_t, S::one()) {
            for &(k, l, b) in &b_entries {
                triples.push((i * br + k, j * bc + l, scale.times(a.times(b))));
            }
        }
        Some(Self::from_triples(ar * br, ac * bc, triples))
    }

    pub(crate) fn apply_transform_and_scaling(&self, transform: Transform, scale: S) -> Self {
        let (rows, cols) = transform.shape(self.rows, self.cols);
        Self::from_triples(rows, cols, self.transformed(transform, scale))
    }

    /// Coefficient equality; a stored `-0.0` equals an implicit zero.
    pub(crate) fn is_equal_to(&self, other: &Self) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && self.iter().all(|(r, c, v)| v == other.at(r, c))
            && other.iter().all(|(r, c, v)| v == self.at(r, c))
    }

    /// Order by shape, then column-major coefficients (implicit zeros
    /// included).
    pub(crate) fn relative_order(&self, other: &Self) -> Ordering {
        let shape = self
            .rows
            .cmp(&other.rows)
            .then(self.cols.cmp(&other.cols));
        if shape.is_ne() {
            return shape;
        }
        let mut a = self.entries.iter().peekable();
        let mut b = other.entries.iter().peekable();
        loop {
            let ka = a.peek().map(|(k, _)| **k);
            let kb = b.peek().map(|(k, _)| **k);
            let (va, vb) = match (ka, kb) {
                (None, None) => return Ordering::Equal,
                (Some(x), Some(y)) if x == y => (next_value(&mut a), next_value(&mut b)),
                (Some(x), Some(y)) if x < y => (next_value(&mut a), S::zero()),
                (Some(_), Some(_)) | (None, Some(_)) => (S::zero(), next_value(&mut b)),
                (Some(_), None) => (next_value(&mut a), S::zero()),
            };
            let order = va.total_cmp(&vb);
            if order.is_ne() {
                return order;
            }
        }
    }
}

fn next_value<'a, S: Scalar>(
    iter: &mut impl Iterator<Item = (&'a (usize, usize), &'a S)>,
) -> S {
    iter.next().map_or_else(S::zero, |(_, &v)| v)
}

impl<S: Field> SparseData<S> {
    pub(crate) fn divide(&self, transform: Transform, numerator: S, denominator: S) -> Self {
        let (rows, cols) = transform.shape(self.rows, self.cols);
        Self::from_triples(
            rows,
            cols,
            self.transformed(transform, numerator)
                .map(|(r, c, v)| (r, c, v.divide(denominator))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sparse(rows: usize, cols: usize, triples: &[(usize, usize, i64)]) -> SparseData<i64> {
        SparseData::from_triples(rows, cols, triples.iter().copied())
    }

    #[test]
    fn test_zeros_never_stored() {
        let mut s = sparse(3, 3, &[(0, 0, 1), (1, 1, 0)]);
        assert_eq!(s.nnz(), 1);
        s.set(0, 0, 0);
        assert_eq!(s.nnz(), 0);
        assert!(!s.set(3, 0, 5));
    }

    #[test]
    fn test_dense_round_trip() {
        let s = sparse(2, 3, &[(1, 0, 4), (0, 2, 7)]);
        let d = s.to_dense();
        assert_eq!(d.as_slice(), &[0, 4, 0, 0, 7, 0]);
        assert_eq!(SparseData::from_dense(&d), s);
    }

    #[test]
    fn test_signed_zero_survives_layout_change() {
        let d = DenseData::from_column_major(1, 3, vec![-0.0, 0.0, 1.0]);
        let s = SparseData::from_dense(&d);
        assert_eq!(s.nnz(), 2);
        assert!(s.at(0, 0).is_sign_negative());
        assert!(s.to_dense().as_slice()[0].is_sign_negative());
        assert_eq!(s.relative_order(&SparseData::from_dense(&s.to_dense())), Ordering::Equal);
        assert!(s.is_equal_to(&SparseData::from_triples(1, 3, [(0, 2, 1.0)])));
    }

    #[test]
    fn test_declines_dense_operand() {
        let s = sparse(2, 2, &[(0, 0, 1)]);
        let d = Storage::Dense(DenseData::zeros(2, 2));
        let t = Transform::IDENTITY;
        assert!(s.add(t, 1, &d, t, 1).is_none());
        assert!(s.multiply(t, &d, t, 1).is_none());
        assert!(s.hadamard(t, 1, &d, t, 1).is_none());
        assert!(s.kronecker(t, 1, &d, t, 1).is_none());
    }

    #[test]
    fn test_add_cancels_to_nothing() {
        let s = sparse(2, 2, &[(0, 1, 3), (1, 0, 2)]);
        let other = Storage::Sparse(s.clone());
        let t = Transform::IDENTITY;
        let diff = s.add(t, 1, &other, t, -1).unwrap();
        assert_eq!(diff.nnz(), 0);
    }

    #[test]
    fn test_multiply_transposed() {
        // A = [[0, 2], [3, 0]]; Aᵀ·A = [[9, 0], [0, 4]]
        let a = sparse(2, 2, &[(0, 1, 2), (1, 0, 3)]);
        let other = Storage::Sparse(a.clone());
        let p = a
            .multiply(Transform::IDENTITY.transposed(), &other, Transform::IDENTITY, 1)
            .unwrap();
        assert_eq!(p.to_dense().as_slice(), &[9, 0, 0, 4]);
    }

    #[test]
    fn test_kronecker_entries() {
        let a = sparse(2, 2, &[(0, 0, 1), (1, 1, 1)]);
        let other = Storage::Sparse(a.clone());
        let t = Transform::IDENTITY;
        let k = a.kronecker(t, 1, &other, t, 2).unwrap();
        assert_eq!((k.rows(), k.cols()), (4, 4));
        assert_eq!(k.nnz(), 4);
        assert_eq!(k.at(3, 3), 2);
    }

    #[test]
    fn test_relative_order_with_implicit_zeros() {
        let a = sparse(2, 2, &[(1, 0, 5)]);
        let b = sparse(2, 2, &[(0, 1, 5)]);
        // Column-major: a = [0, 5, 0, 0], b = [0, 0, 5, 0]
        assert_eq!(a.relative_order(&b), Ordering::Greater);
        assert_eq!(a.relative_order(&a.clone()), Ordering::Equal);
        let neg = sparse(2, 2, &[(0, 0, -1)]);
        assert_eq!(neg.relative_order(&a), Ordering::Less);
    }

    #[test]
    fn test_reverse_and_combine() {
        let s = sparse(2, 2, &[(0, 0, 1)]);
        assert_eq!(s.column_reverse().at(0, 1), 1);
        assert_eq!(s.row_reverse().at(1, 0), 1);
        let wide = s.combine_left_to_right(&sparse(1, 1, &[(0, 0, 9)]));
        assert_eq!((wide.rows(), wide.cols()), (2, 3));
        assert_eq!(wide.at(0, 2), 9);
    }
}
