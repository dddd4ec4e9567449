//! Poisson likelihood cost: detects a change in event rate on counts.

use ndarray::Array2;

use crate::numeric::epsilon::DEFAULT_EPS;
use crate::numeric::prefix::range_sum;
use crate::{Error, Signal};

/// Poisson likelihood segment cost (`spec.md` §4.1.4).
#[derive(Debug, Clone, Default)]
pub struct Poisson {
    fitted: Option<FittedPoisson>,
}

#[derive(Debug, Clone)]
struct FittedPoisson {
    n: usize,
    d: usize,
    sum: Array2<f64>,
}

impl Poisson {
    /// Construct an unfitted Poisson cost function.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, signal: &Signal) -> Result<(), Error> {
        let d = signal.n_dims();
        let n = signal.n_points();
        let mut sum = Array2::zeros((d, n + 1));

        for dim in 0..d {
            let mut acc = 0.0;
            for (index, &value) in signal.row(dim).iter().enumerate() {
                if value < -DEFAULT_EPS {
                    return Err(Error::invalid_argument(format!(
                        "poisson input at dimension {dim}, index {index} is negative: {value}"
                    )));
                }

                let clamped = if value < 0.0 { 0.0 } else { value };
                acc += clamped;
                sum[[dim, index + 1]] = acc;
            }
        }

        self.fitted = Some(FittedPoisson { n, d, sum });
        Ok(())
    }

    pub const fn min_segment_length(&self) -> usize {
        1
    }

    fn fitted(&self) -> Result<&FittedPoisson, Error> {
        self.fitted.as_ref().ok_or(Error::Uninitialized)
    }

    pub fn compute_cost(&self, start: usize, end: usize) -> Result<f64, Error> {
        self.compute_likelihood_metric(start, end)
    }

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
            let s = range_sum(fitted.sum.row(dim), start, end);

            if s <= DEFAULT_EPS {
                continue;
            }

            total += 2.0 * (s - s * s.ln() + s * n.ln());
        }

        Ok(total)
    }

    pub fn segment_parameter_count(&self, _segment_len: usize) -> Result<usize, Error> {
        Ok(self.fitted()?.d)
    }
}
