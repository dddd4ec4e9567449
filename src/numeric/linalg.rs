//! Householder QR least-squares solver, used by the AR(p) cost function
//! to fit its design matrix. Returns `None` on a singular or
//! rank-deficient system rather than failing, per `spec.md` §4.1.6
//! ("on singular / rank-deficient systems return `+∞` rather than
//! failing").

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use super::epsilon::STRICT_EPS;

/// Solve the linear least-squares problem `design * x ≈ target` via
/// Householder QR decomposition, returning the coefficient vector `x`.
///
/// `design` has shape `(m, n)` with `m >= n`. Returns `None` if a
/// pivot collapses below the strict epsilon, signalling a singular or
/// rank-deficient system.
pub(crate) fn least_squares(design: ArrayView2<'_, f64>, target: ArrayView1<'_, f64>) -> Option<Vec<f64>> {
    let (rows, cols) = design.dim();
    debug_assert_eq!(target.len(), rows, "target length must match design rows");

    if rows < cols {
        return None;
    }

    let mut r = design.to_owned();
    let mut y = target.to_owned();

    for k in 0..cols {
        let column = r.column(k).slice(ndarray::s![k..]).to_owned();
        let norm = sum_of_squares(&column).sqrt();

        if norm <= STRICT_EPS {
            return None;
        }

        // Householder vector for column k, reflecting it onto
        // `(+-norm, 0, 0, ...)`.
        let sign = if column[0] >= 0.0 { 1.0 } else { -1.0 };
        let mut v = column;
        v[0] += sign * norm;
        let v_norm_sqr = sum_of_squares(&v);

        if v_norm_sqr <= STRICT_EPS {
            // The column was already aligned with the target axis;
            // nothing to reflect.
            continue;
        }

        apply_householder(&mut r, &v, v_norm_sqr, k);
        apply_householder_vec(&mut y, &v, v_norm_sqr, k);
    }

    // Back-substitute R[0..cols, 0..cols] * x = y[0..cols].
    let mut solution = Array1::zeros(cols);
    for row in (0..cols).rev() {
        let diagonal = r[[row, row]];

        if diagonal.abs() <= STRICT_EPS {
            return None;
        }

        let mut sum = y[row];
        for col in (row + 1)..cols {
            sum -= r[[row, col]] * solution[col];
        }
        solution[row] = sum / diagonal;
    }

    Some(solution.to_vec())
}

/// Apply a Householder reflection defined by `v` (already offset by
/// `offset` rows) to every column of `matrix` from `offset` onward.
fn apply_householder(matrix: &mut Array2<f64>, v: &Array1<f64>, v_norm_sqr: f64, offset: usize) {
    let cols = matrix.ncols();

    for col in offset..cols {
        let mut segment = matrix.column_mut(col);
        let mut slice = segment.slice_mut(ndarray::s![offset..]);
        let dot: f64 = slice.iter().zip(v.iter()).map(|(a, b)| a * b).sum();
        let scale = 2.0 * dot / v_norm_sqr;

        for (entry, v_i) in slice.iter_mut().zip(v.iter()) {
            *entry -= scale * v_i;
        }
    }
}

/// Apply the same Householder reflection to a single vector (the
/// right-hand side `y`).
fn apply_householder_vec(vector: &mut Array1<f64>, v: &Array1<f64>, v_norm_sqr: f64, offset: usize) {
    let mut slice = vector.slice_mut(ndarray::s![offset..]);
    let dot: f64 = slice.iter().zip(v.iter()).map(|(a, b)| a * b).sum();
    let scale = 2.0 * dot / v_norm_sqr;

    for (entry, v_i) in slice.iter_mut().zip(v.iter()) {
        *entry -= scale * v_i;
    }
}

/// Sum of squares of a 1-D array, without relying on `ndarray`'s
/// `LinalgScalar`-gated `dot` implementation.
fn sum_of_squares(values: &Array1<f64>) -> f64 {
    values.iter().map(|value| value * value).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn solves_exact_linear_system() {
        // y = 2x, sampled exactly: solution should recover slope 2.
        let design = array![[1.0], [2.0], [3.0], [4.0]];
        let target = array![2.0, 4.0, 6.0, 8.0];

        let solution = least_squares(design.view(), target.view()).expect("solvable system");
        assert_relative_eq!(solution[0], 2.0, epsilon = 1e-8);
    }

    #[test]
    fn solves_overdetermined_system_by_least_squares() {
        // Fit y = a + b*x to noisy-but-linear data with an intercept column.
        let design = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
        let target = array![1.0, 3.0, 5.0, 7.0];

        let solution = least_squares(design.view(), target.view()).expect("solvable system");
        assert_relative_eq!(solution[0], 1.0, epsilon = 1e-8);
        assert_relative_eq!(solution[1], 2.0, epsilon = 1e-8);
    }

    #[test]
    fn rejects_singular_system() {
        // Constant column collapses to zero variance: singular with an intercept.
        let design = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
        let target = array![1.0, 2.0, 3.0];

        assert!(least_squares(design.view(), target.view()).is_none());
    }
}
