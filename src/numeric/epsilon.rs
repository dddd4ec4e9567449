//! The three-tier epsilon policy from the design notes.

/// Default epsilon for generic value comparisons and integer-closeness
/// checks (e.g. "is this Bernoulli sample within tolerance of 0 or 1").
pub(crate) const DEFAULT_EPS: f64 = 1e-9;

/// Variance floor used only to avoid `log(0)` in the Gaussian cost.
pub(crate) const VAR_EPS: f64 = 1e-10;

/// Strict epsilon reserved for matrix pivot rejection in the AR(p)
/// least-squares solver.
pub(crate) const STRICT_EPS: f64 = 1e-12;

/// Relative-equality comparison: `|a - b| <= abs_tol + rel_tol * |b|`.
pub(crate) fn approx_eq(a: f64, b: f64, abs_tol: f64, rel_tol: f64) -> bool {
    (a - b).abs() <= abs_tol + rel_tol * b.abs()
}

/// Whether `value` is within [`DEFAULT_EPS`] of `target`.
pub(crate) fn close_to(value: f64, target: f64) -> bool {
    (value - target).abs() <= DEFAULT_EPS
}
