//! Gaussian likelihood cost: detects a change in mean *and* variance.

use ndarray::Array2;

use crate::numeric::epsilon::VAR_EPS;
use crate::numeric::prefix::{fit_prefix_sum_sqr, fit_prefix_sums, range_sum};
use crate::{Error, Signal};

/// Gaussian (Normal) likelihood segment cost (`spec.md` §4.1.3).
#[derive(Debug, Clone, Default)]
pub struct Gaussian {
    fitted: Option<FittedGaussian>,
}

#[derive(Debug, Clone)]
struct FittedGaussian {
    n: usize,
    d: usize,
    sum: Array2<f64>,
    sum_sqr: Array2<f64>,
}

impl Gaussian {
    /// Construct an unfitted Gaussian cost function.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, signal: &Signal) -> Result<(), Error> {
        self.fitted = Some(FittedGaussian {
            n: signal.n_points(),
            d: signal.n_dims(),
            sum: fit_prefix_sums(signal),
            sum_sqr: fit_prefix_sum_sqr(signal),
        });
        Ok(())
    }

    pub const fn min_segment_length(&self) -> usize {
        1
    }

    fn fitted(&self) -> Result<&FittedGaussian, Error> {
        self.fitted.as_ref().ok_or(Error::Uninitialized)
    }

    pub fn compute_cost(&self, start: usize, end: usize) -> Result<f64, Error> {
        self.compute_likelihood_metric(start, end)
    }

    /// `ComputeCost` and `ComputeLikelihoodMetric` coincide for the
    /// Gaussian cost, per `spec.md` §4.1 ("ComputeCost for
    /// likelihood-based functions returns the same value as
    /// ComputeLikelihoodMetric").
    pub fn compute_likelihood_metric(&self, start: usize, end: usize) -> Result<f64, Error> {
        let fitted = self.fitted()?;

        if start > end || end > fitted.n {
            return Err(Error::OutOfRange {
                start,
                end,
                signal_len: fitted.n,
            });
        }

        if end == start {
            return Ok(0.0);
        }

        let n = (end - start) as f64;
        let mut total = 0.0;

        for dim in 0..fitted.d {
            let sum = range_sum(fitted.sum.row(dim), start, end);
            let sum_sqr = range_sum(fitted.sum_sqr.row(dim), start, end);

            let sum_sq_dev = (sum_sqr - sum * sum / n).max(0.0);
            let variance_mle = sum_sq_dev / n;
            let variance_eff = variance_mle.max(VAR_EPS);

            total += n * variance_eff.ln();
        }

        Ok(total)
    }

    pub fn segment_parameter_count(&self, _segment_len: usize) -> Result<usize, Error> {
        Ok(2 * self.fitted()?.d)
    }
}
