//! Bernoulli likelihood cost: detects a change in success probability.

use ndarray::Array2;

use crate::numeric::epsilon::{close_to, DEFAULT_EPS};
use crate::numeric::prefix::range_sum;
use crate::{Error, Signal};

/// Bernoulli likelihood segment cost (`spec.md` §4.1.5).
#[derive(Debug, Clone, Default)]
pub struct Bernoulli {
    fitted: Option<FittedBernoulli>,
}

#[derive(Debug, Clone)]
struct FittedBernoulli {
    n: usize,
    d: usize,
    ones: Array2<f64>,
}

impl Bernoulli {
    /// Construct an unfitted Bernoulli cost function.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, signal: &Signal) -> Result<(), Error> {
        let d = signal.n_dims();
        let n = signal.n_points();
        let mut ones = Array2::zeros((d, n + 1));

        for dim in 0..d {
            let mut acc = 0.0_f64;
            for (index, &value) in signal.row(dim).iter().enumerate() {
                let clamped = clamp_to_bit(value).ok_or_else(|| {
                    Error::invalid_argument(format!(
                        "bernoulli input at dimension {dim}, index {index} is not within tolerance of 0 or 1: {value}"
                    ))
                })?;

                acc += clamped;
                ones[[dim, index + 1]] = acc;
            }
        }

        self.fitted = Some(FittedBernoulli { n, d, ones });
        Ok(())
    }

    pub const fn min_segment_length(&self) -> usize {
        1
    }

    fn fitted(&self) -> Result<&FittedBernoulli, Error> {
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
            let s = range_sum(fitted.ones.row(dim), start, end);

            if s <= DEFAULT_EPS || (n - s) <= DEFAULT_EPS {
                continue;
            }

            let n_minus_s = n - s;
            total -= 2.0 * (s * s.ln() + n_minus_s * n_minus_s.ln() - n * n.ln());
        }

        Ok(total)
    }

    pub fn segment_parameter_count(&self, _segment_len: usize) -> Result<usize, Error> {
        Ok(self.fitted()?.d)
    }
}

/// Clamp a value to `0.0` or `1.0` if it is within tolerance of either,
/// otherwise reject it.
fn clamp_to_bit(value: f64) -> Option<f64> {
    if close_to(value, 0.0) {
        Some(0.0)
    } else if close_to(value, 1.0) {
        Some(1.0)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn matches_hand_computed_value() {
        // S4: [0,1,0,1], S=2, n=4 -> cost = 8 * ln 2.
        let signal = Signal::from_1d(&[0.0, 1.0, 0.0, 1.0]).expect("valid signal");
        let mut cost = Bernoulli::new();
        cost.fit(&signal).expect("fit succeeds");

        let value = cost.compute_cost(0, 4).expect("cost computed");
        assert_relative_eq!(value, 8.0 * 2.0_f64.ln(), epsilon = 1e-9);
    }

    #[test]
    fn all_same_value_has_zero_cost() {
        let signal = Signal::from_1d(&[1.0, 1.0, 1.0]).expect("valid signal");
        let mut cost = Bernoulli::new();
        cost.fit(&signal).expect("fit succeeds");
        assert_eq!(cost.compute_cost(0, 3).expect("cost computed"), 0.0);
    }

    #[test]
    fn rejects_non_bernoulli_values() {
        let signal = Signal::from_1d(&[0.0, 0.5, 1.0]).expect("valid signal");
        let mut cost = Bernoulli::new();
        assert!(cost.fit(&signal).is_err());
    }
}
