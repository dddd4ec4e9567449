//! Automatic penalty selection via BIC/AIC/AICc.

use crate::cost::CostFunction;
use crate::pelt::PeltEngine;
use crate::{Error, Signal};

/// Information criterion used to score a candidate penalty
/// (`spec.md` §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyMethod {
    /// Bayesian Information Criterion.
    Bic,
    /// Akaike Information Criterion.
    Aic,
    /// Corrected AIC, for small samples.
    Aicc,
}

/// One candidate penalty tried during selection, kept for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct PenaltyCandidate {
    /// The penalty value tried.
    pub penalty: f64,
    /// Its score under the selected [`PenaltyMethod`], or `None` if the
    /// candidate was discarded (too-short segment, non-finite metric,
    /// or an AICc sample-size guard).
    pub score: Option<f64>,
    /// Number of interior change points this candidate produced.
    pub change_point_count: usize,
}

/// Result of a successful [`PenaltySelector::fit_and_select`] call.
#[derive(Debug, Clone)]
pub struct PenaltySelection {
    /// The penalty with the smallest score (ties broken by fewer change points).
    pub penalty: f64,
    /// Breakpoints produced by that penalty.
    pub breakpoints: Vec<usize>,
    /// The scoring method used.
    pub method: PenaltyMethod,
    /// Every candidate tried, in grid order.
    pub diagnostics: Vec<PenaltyCandidate>,
}

/// A cooperative cancellation signal, polled between candidate
/// penalties and between segments during score accumulation.
pub trait CancellationToken {
    /// Returns `true` once cancellation has been requested.
    fn is_cancelled(&self) -> bool;
}

impl<F: Fn() -> bool> CancellationToken for F {
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// An `Arc<AtomicBool>`-backed [`CancellationToken`], the common case
/// of flipping a shared flag from another thread.
#[derive(Debug, Clone)]
pub struct AtomicCancellationToken(std::sync::Arc<std::sync::atomic::AtomicBool>);

impl AtomicCancellationToken {
    /// Construct a new, not-yet-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self(std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false)))
    }

    /// Request cancellation. Observable by any clone of this token.
    pub fn cancel(&self) {
        self.0.store(true, std::sync::atomic::Ordering::Relaxed);
    }
}

impl Default for AtomicCancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationToken for AtomicCancellationToken {
    fn is_cancelled(&self) -> bool {
        self.0.load(std::sync::atomic::Ordering::Relaxed)
    }
}

/// Never-cancels token, used when the caller doesn't supply one.
struct NeverCancelled;

impl CancellationToken for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

const DEFAULT_NUM_STEPS: usize = 50;
const MIN_PENALTY_FLOOR: f64 = 0.1;

/// Automatic penalty selection over a likelihood-capable cost function
/// (`spec.md` §4.3).
#[derive(Debug, Clone)]
pub struct PenaltySelector {
    cost: CostFunction,
    min_size: usize,
    jump: usize,
    method: PenaltyMethod,
    min_penalty: Option<f64>,
    max_penalty: Option<f64>,
    num_steps: usize,
}

impl PenaltySelector {
    /// Construct a new selector. `min_size`/`jump` are forwarded to the
    /// internal [`PeltEngine`] used for each candidate penalty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] immediately if `cost` doesn't
    /// implement the likelihood protocol.
    pub fn new(cost: CostFunction, min_size: usize, jump: usize, method: PenaltyMethod) -> Result<Self, Error> {
        if !cost.supports_information_criteria() {
            return Err(Error::unsupported(
                "penalty selection requires a cost function implementing the likelihood protocol",
            ));
        }

        Ok(Self {
            cost,
            min_size: min_size.max(1),
            jump: jump.max(1),
            method,
            min_penalty: None,
            max_penalty: None,
            num_steps: DEFAULT_NUM_STEPS,
        })
    }

    /// Override the penalty search range. Both bounds must be
    /// non-negative and `min <= max`.
    #[must_use]
    pub fn with_penalty_range(mut self, min: f64, max: f64) -> Self {
        self.min_penalty = Some(min);
        self.max_penalty = Some(max);
        self
    }

    /// Override the number of candidate penalties in the grid (default 50).
    #[must_use]
    pub fn with_num_steps(mut self, num_steps: usize) -> Self {
        self.num_steps = num_steps.max(1);
        self
    }

    /// Fit the cost function to `signal` and search for the
    /// best-scoring penalty, with no cancellation support.
    ///
    /// # Errors
    ///
    /// See [`Self::fit_and_select_cancellable`].
    pub fn fit_and_select(&mut self, signal: &Signal) -> Result<PenaltySelection, Error> {
        self.fit_and_select_cancellable(signal, &NeverCancelled)
    }

    /// Fit the cost function to `signal` and search for the
    /// best-scoring penalty, polling `token` between candidates and
    /// between segments.
    ///
    /// # Errors
    ///
    /// Returns whatever error `cost.fit` produces, [`Error::Cancelled`]
    /// if `token` fires mid-search, or [`Error::NoSolution`] if no
    /// candidate in the grid produced a finite, valid score.
    pub fn fit_and_select_cancellable(
        &mut self,
        signal: &Signal,
        token: &dyn CancellationToken,
    ) -> Result<PenaltySelection, Error> {
        self.cost.fit(signal)?;
        let n = signal.n_points();

        let (min_p, max_p) = self.penalty_range(n)?;
        let grid = penalty_grid(min_p, max_p, self.num_steps);

        let mut engine = PeltEngine::new(self.cost.clone(), self.min_size, self.jump);
        engine.fit(signal)?;

        let mut diagnostics = Vec::with_capacity(grid.len());
        let mut best: Option<(f64, Vec<usize>, f64)> = None;

        for &penalty in &grid {
            if token.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let breakpoints = engine.detect(penalty)?;
            let score = self.score_candidate(n, penalty, &breakpoints, token)?;

            diagnostics.push(PenaltyCandidate {
                penalty,
                score,
                change_point_count: breakpoints.len(),
            });

            let Some(score) = score else { continue };

            let replace = match &best {
                None => true,
                Some((best_score, best_breakpoints, _)) => {
                    is_better(score, breakpoints.len(), *best_score, best_breakpoints.len())
                }
            };

            if replace {
                best = Some((score, breakpoints, penalty));
            }
        }

        let Some((_, breakpoints, penalty)) = best else {
            return Err(Error::NoSolution {
                candidates_tried: grid.len(),
                diagnostics,
            });
        };

        Ok(PenaltySelection {
            penalty,
            breakpoints,
            method: self.method,
            diagnostics,
        })
    }

    fn penalty_range(&self, n: usize) -> Result<(f64, f64), Error> {
        if let (Some(min_p), Some(max_p)) = (self.min_penalty, self.max_penalty) {
            return Ok((min_p, max_p));
        }

        let representative_len = (n / 2).max(self.min_size);
        let param_count = self.cost.segment_parameter_count(representative_len)? as f64;
        let log_n = (n as f64).ln();

        let min_p = MIN_PENALTY_FLOOR.max(param_count * log_n);
        let max_p = (n as f64 * log_n).max(20.0 * min_p).max(min_p.mul_add(1.1, 1.0));

        Ok((min_p, max_p))
    }

    fn score_candidate(
        &self,
        n: usize,
        _penalty: f64,
        breakpoints: &[usize],
        token: &dyn CancellationToken,
    ) -> Result<Option<f64>, Error> {
        let mut bounds = Vec::with_capacity(breakpoints.len() + 2);
        bounds.push(0);
        bounds.extend_from_slice(breakpoints);
        bounds.push(n);

        let mut total_metric = 0.0;
        let mut total_params = 0usize;

        for window in bounds.windows(2) {
            if token.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let (a, b) = (window[0], window[1]);
            if b - a < self.min_size {
                return Ok(None);
            }

            let Ok(metric) = self.cost.compute_likelihood_metric(a, b) else {
                return Ok(None);
            };
            if !metric.is_finite() {
                return Ok(None);
            }

            let Ok(params) = self.cost.segment_parameter_count(b - a) else {
                return Ok(None);
            };

            total_metric += metric;
            total_params += params;
        }

        let k = breakpoints.len();
        let p = (total_params + k) as f64;
        let n_f = n as f64;

        let score = match self.method {
            PenaltyMethod::Bic => total_metric + p * n_f.ln(),
            PenaltyMethod::Aic => total_metric + 2.0 * p,
            PenaltyMethod::Aicc => {
                let aic = total_metric + 2.0 * p;
                let denom = n_f - p - 1.0;
                if denom <= 0.0 {
                    return Ok(None);
                }
                aic + 2.0 * p * (p + 1.0) / denom
            }
        };

        if !score.is_finite() {
            return Ok(None);
        }

        Ok(Some(score))
    }
}

/// `true` when `(score_a, k_a)` should replace `(score_b, k_b)` as the
/// best candidate: strictly smaller score, or a tie (within tolerance)
/// broken by fewer change points.
fn is_better(score_a: f64, k_a: usize, score_b: f64, k_b: usize) -> bool {
    use crate::numeric::epsilon::{approx_eq, DEFAULT_EPS};

    if approx_eq(score_a, score_b, DEFAULT_EPS, DEFAULT_EPS) {
        return k_a < k_b;
    }

    score_a < score_b
}

/// Log-spaced grid of `num_steps` candidate penalties over `[min_p, max_p]`,
/// special-cased when `min_p == 0` (`spec.md` §4.3 step 2).
fn penalty_grid(min_p: f64, max_p: f64, num_steps: usize) -> Vec<f64> {
    if min_p <= 0.0 {
        let floor = (max_p * 1e-6).max(1e-9);
        let mut grid = Vec::with_capacity(num_steps);
        grid.push(0.0);

        if num_steps <= 1 {
            return grid;
        }

        let rest = log_space(floor, max_p, num_steps - 1);
        grid.extend(rest);
        return grid;
    }

    log_space(min_p, max_p, num_steps)
}

/// `num_steps` log-spaced values over `[low, high]`, with the last
/// value forced to equal `high` exactly.
fn log_space(low: f64, high: f64, num_steps: usize) -> Vec<f64> {
    if num_steps == 0 {
        return Vec::new();
    }

    if num_steps == 1 {
        return vec![high];
    }

    let log_low = low.ln();
    let log_high = high.ln();
    let step = (log_high - log_low) / (num_steps - 1) as f64;

    let mut values: Vec<f64> = (0..num_steps)
        .map(|i| (log_low + step * i as f64).exp())
        .collect();

    if let Some(last) = values.last_mut() {
        *last = high;
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::Gaussian;

    #[test]
    fn rejects_non_likelihood_cost_function() {
        let cost = CostFunction::L2(crate::cost::L2::new());
        assert!(matches!(
            PenaltySelector::new(cost, 2, 1, PenaltyMethod::Bic),
            Err(Error::Unsupported { .. })
        ));
    }

    #[test]
    fn selects_a_finite_penalty_for_a_clear_step() {
        // S8: a clear step should yield a finite BIC score and a
        // non-empty candidate grid.
        let values: Vec<f64> = (0..40).map(|i| if i < 20 { 0.0 } else { 5.0 }).collect();
        let signal = Signal::from_1d(&values).expect("valid signal");

        let cost = CostFunction::Gaussian(Gaussian::new());
        let mut selector = PenaltySelector::new(cost, 2, 1, PenaltyMethod::Bic).expect("likelihood-capable");

        let selection = selector.fit_and_select(&signal).expect("selection succeeds");
        assert!(!selection.diagnostics.is_empty());
        assert!(selection.penalty >= 0.0);
    }

    #[test]
    fn grid_includes_zero_when_min_penalty_is_zero() {
        let grid = penalty_grid(0.0, 100.0, 10);
        assert_eq!(grid[0], 0.0);
        assert!((grid.last().copied().unwrap_or(0.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn log_space_last_value_is_exact() {
        let values = log_space(1.0, 50.0, 5);
        assert_eq!(values.len(), 5);
        assert_eq!(values[0], 1.0);
        assert_eq!(*values.last().expect("non-empty"), 50.0);
    }

    #[test]
    fn cancellation_token_stops_selection() {
        let values: Vec<f64> = (0..10).map(f64::from).collect();
        let signal = Signal::from_1d(&values).expect("valid signal");
        let cost = CostFunction::Gaussian(Gaussian::new());
        let mut selector = PenaltySelector::new(cost, 2, 1, PenaltyMethod::Bic).expect("likelihood-capable");

        let token = AtomicCancellationToken::new();
        token.cancel();

        let result = selector.fit_and_select_cancellable(&signal, &token);
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
