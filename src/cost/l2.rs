//! L2 cost: sum of squared deviations from the segment mean.

use ndarray::Array2;

use crate::numeric::prefix::{fit_prefix_sum_sqr, fit_prefix_sums, range_sum};
use crate::{Error, Signal};

/// Least-squared-deviation segment cost (`spec.md` §4.1.1).
#[derive(Debug, Clone, Default)]
pub struct L2 {
    fitted: Option<FittedL2>,
}

#[derive(Debug, Clone)]
struct FittedL2 {
    n: usize,
    sum: Array2<f64>,
    sum_sqr: Array2<f64>,
}

impl L2 {
    /// Construct an unfitted L2 cost function.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, signal: &Signal) -> Result<(), Error> {
        self.fitted = Some(FittedL2 {
            n: signal.n_points(),
            sum: fit_prefix_sums(signal),
            sum_sqr: fit_prefix_sum_sqr(signal),
        });
        Ok(())
    }

    pub const fn min_segment_length(&self) -> usize {
        1
    }

    pub fn compute_cost(&self, start: usize, end: usize) -> Result<f64, Error> {
        let fitted = self.fitted.as_ref().ok_or(Error::Uninitialized)?;

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

        for dim in 0..fitted.sum.nrows() {
            let sum = range_sum(fitted.sum.row(dim), start, end);
            let sum_sqr = range_sum(fitted.sum_sqr.row(dim), start, end);
            total += sum_sqr - sum * sum / n;
        }

        Ok(total.max(0.0))
    }
}
