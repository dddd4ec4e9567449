//! Prefix-sum kernels shared by the incrementally-computable cost
//! functions (L2, Gaussian, Poisson, Bernoulli, Binomial, RBF).

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::Signal;

/// Kahan-compensated running sum, used when accumulating the `N + 1`
/// entries of a prefix array so that long signals don't lose precision
/// to naive sequential summation.
#[derive(Debug, Default, Clone, Copy)]
struct KahanSum {
    sum: f64,
    compensation: f64,
}

impl KahanSum {
    #[inline]
    fn add(&mut self, value: f64) {
        let adjusted = value - self.compensation;
        let new_sum = self.sum + adjusted;
        self.compensation = (new_sum - self.sum) - adjusted;
        self.sum = new_sum;
    }
}

/// Compute `prefix[i] = sum(row[0..i])` for `i` in `0..=row.len()`.
///
/// `prefix[0] == 0.0` and the array has length `row.len() + 1`, per the
/// fitted-state invariant in the data model.
pub(crate) fn prefix_sums(row: ArrayView1<'_, f64>) -> Vec<f64> {
    let mut out = Vec::with_capacity(row.len() + 1);
    let mut acc = KahanSum::default();
    out.push(0.0);
    for &value in row {
        acc.add(value);
        out.push(acc.sum);
    }
    out
}

/// Compute `prefix[i] = sum(row[0..i].powi(2))` for `i` in `0..=row.len()`.
pub(crate) fn prefix_sum_sqr(row: ArrayView1<'_, f64>) -> Vec<f64> {
    let mut out = Vec::with_capacity(row.len() + 1);
    let mut acc = KahanSum::default();
    out.push(0.0);
    for &value in row {
        acc.add(value * value);
        out.push(acc.sum);
    }
    out
}

/// Sum of `row[start..end]` using a fitted prefix-sum array, read
/// straight out of a per-dimension row of a `(D, N + 1)` prefix matrix.
pub(crate) fn range_sum(prefix: ArrayView1<'_, f64>, start: usize, end: usize) -> f64 {
    prefix[end] - prefix[start]
}

/// 2-D prefix sum over a square Gram matrix, so that the sum of any
/// axis-aligned sub-rectangle can be answered in O(1). Used by the RBF
/// cost function.
pub(crate) fn prefix_sum_2d(matrix: ArrayView2<'_, f64>) -> Array2<f64> {
    let (rows, cols) = matrix.dim();
    let mut prefix = Array2::zeros((rows + 1, cols + 1));

    for i in 0..rows {
        for j in 0..cols {
            prefix[[i + 1, j + 1]] =
                matrix[[i, j]] + prefix[[i, j + 1]] + prefix[[i + 1, j]] - prefix[[i, j]];
        }
    }

    prefix
}

/// Sum of the rectangle `[a, b) x [a, b)` from a 2-D prefix sum built
/// by [`prefix_sum_2d`].
pub(crate) fn rect_sum_2d(prefix: &Array2<f64>, a: usize, b: usize) -> f64 {
    prefix[[b, b]] - prefix[[a, b]] - prefix[[b, a]] + prefix[[a, a]]
}

/// Build the per-dimension prefix-sum matrix for a whole signal, shape
/// `(D, N + 1)`.
pub(crate) fn fit_prefix_sums(signal: &Signal) -> Array2<f64> {
    stack_per_dim(signal, prefix_sums)
}

/// Build the per-dimension prefix-squared-sum matrix for a whole
/// signal, shape `(D, N + 1)`.
pub(crate) fn fit_prefix_sum_sqr(signal: &Signal) -> Array2<f64> {
    stack_per_dim(signal, prefix_sum_sqr)
}

/// Run `per_dim` over every dimension of `signal` and stack the results
/// into a `(D, N + 1)` matrix.
fn stack_per_dim(signal: &Signal, per_dim: impl Fn(ArrayView1<'_, f64>) -> Vec<f64>) -> Array2<f64> {
    let d = signal.n_dims();
    let n = signal.n_points();
    let mut out = Array2::zeros((d, n + 1));

    for dim in 0..d {
        let row = per_dim(signal.row(dim));
        out.index_axis_mut(Axis(0), dim).assign(&ArrayView1::from(&row));
    }

    out
}
