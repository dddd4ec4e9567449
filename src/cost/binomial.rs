//! Binomial likelihood cost: detects a change in success probability
//! across grouped trials.

use crate::numeric::epsilon::DEFAULT_EPS;
use crate::{Error, Signal};

/// Binomial likelihood segment cost (`spec.md` §4.1.5). Requires a
/// 2×N signal: row 0 is successes `k_i`, row 1 is trials `n_i`.
#[derive(Debug, Clone, Default)]
pub struct Binomial {
    fitted: Option<FittedBinomial>,
}

#[derive(Debug, Clone)]
struct FittedBinomial {
    n: usize,
    successes: Vec<f64>,
    trials: Vec<f64>,
}

impl Binomial {
    /// Construct an unfitted Binomial cost function.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, signal: &Signal) -> Result<(), Error> {
        if signal.n_dims() != 2 {
            return Err(Error::unsupported(format!(
                "binomial cost requires a 2xN signal (successes, trials), got {} dimensions",
                signal.n_dims()
            )));
        }

        let n = signal.n_points();
        let successes_row = signal.row(0);
        let trials_row = signal.row(1);

        let mut successes = vec![0.0; n + 1];
        let mut trials = vec![0.0; n + 1];

        for index in 0..n {
            let k = round_to_integer(successes_row[index]).ok_or_else(|| {
                Error::invalid_argument(format!(
                    "binomial successes at index {index} is not an integer: {}",
                    successes_row[index]
                ))
            })?;
            let trial_count = round_to_integer(trials_row[index]).ok_or_else(|| {
                Error::invalid_argument(format!(
                    "binomial trials at index {index} is not an integer: {}",
                    trials_row[index]
                ))
            })?;

            if trial_count < 1.0 {
                return Err(Error::invalid_argument(format!(
                    "binomial trials at index {index} must be at least 1, got {trial_count}"
                )));
            }

            if k < 0.0 || k > trial_count {
                return Err(Error::invalid_argument(format!(
                    "binomial successes at index {index} must be within [0, trials], got k={k}, trials={trial_count}"
                )));
            }

            successes[index + 1] = successes[index] + k;
            trials[index + 1] = trials[index] + trial_count;
        }

        self.fitted = Some(FittedBinomial {
            n,
            successes,
            trials,
        });
        Ok(())
    }

    pub const fn min_segment_length(&self) -> usize {
        1
    }

    fn fitted(&self) -> Result<&FittedBinomial, Error> {
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

        let k = fitted.successes[end] - fitted.successes[start];
        let total_trials = fitted.trials[end] - fitted.trials[start];

        if k <= DEFAULT_EPS || (total_trials - k) <= DEFAULT_EPS {
            return Ok(0.0);
        }

        let n_minus_k = total_trials - k;
        Ok(-(k * k.ln() + n_minus_k * n_minus_k.ln() - total_trials * total_trials.ln()))
    }

    pub fn segment_parameter_count(&self, _segment_len: usize) -> Result<usize, Error> {
        self.fitted()?;
        Ok(1)
    }
}

/// Round `value` to the nearest integer if it is within
/// [`DEFAULT_EPS`] of one, otherwise reject it.
fn round_to_integer(value: f64) -> Option<f64> {
    let rounded = value.round();
    ((value - rounded).abs() <= DEFAULT_EPS).then_some(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn matches_hand_computed_value() {
        // S5: k=[1,2,8,9], n=[10,10,10,10] -> cost = 40 * ln 2.
        let data = array![[1.0, 2.0, 8.0, 9.0], [10.0, 10.0, 10.0, 10.0]];
        let signal = Signal::from_array(data).expect("valid signal");
        let mut cost = Binomial::new();
        cost.fit(&signal).expect("fit succeeds");

        let value = cost.compute_cost(0, 4).expect("cost computed");
        assert_relative_eq!(value, 40.0 * 2.0_f64.ln(), epsilon = 1e-9);
    }

    #[test]
    fn rejects_one_dimensional_input() {
        let signal = Signal::from_1d(&[1.0, 2.0, 3.0]).expect("valid signal");
        let mut cost = Binomial::new();
        assert!(matches!(cost.fit(&signal), Err(Error::Unsupported { .. })));
    }

    #[test]
    fn rejects_successes_exceeding_trials() {
        let data = array![[5.0], [3.0]];
        let signal = Signal::from_array(data).expect("valid signal");
        let mut cost = Binomial::new();
        assert!(cost.fit(&signal).is_err());
    }
}
