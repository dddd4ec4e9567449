//! L1 cost: sum of absolute deviations from the segment median.

use crate::numeric::median::median_mut;
use crate::{Error, Signal};

/// Least-absolute-deviation segment cost (`spec.md` §4.1.2).
#[derive(Debug, Clone, Default)]
pub struct L1 {
    fitted: Option<Signal>,
}

impl L1 {
    /// Construct an unfitted L1 cost function.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, signal: &Signal) -> Result<(), Error> {
        self.fitted = Some(signal.clone());
        Ok(())
    }

    pub const fn min_segment_length(&self) -> usize {
        1
    }

    pub fn compute_cost(&self, start: usize, end: usize) -> Result<f64, Error> {
        let signal = self.fitted.as_ref().ok_or(Error::Uninitialized)?;
        signal.check_range(start, end)?;

        if end == start {
            return Ok(0.0);
        }

        let mut total = 0.0;
        for dim in 0..signal.n_dims() {
            let row = signal.row(dim);
            let mut segment: Vec<f64> = row.iter().skip(start).take(end - start).copied().collect();
            let median = median_mut(&mut segment);
            total += segment.iter().map(|value| (value - median).abs()).sum::<f64>();
        }

        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cost_is_zero_for_constant_segment() {
        let signal = Signal::from_1d(&[5.0, 5.0, 5.0, 5.0]).expect("valid signal");
        let mut cost = L1::new();
        cost.fit(&signal).expect("fit succeeds");
        assert_eq!(cost.compute_cost(0, 4).expect("cost computed"), 0.0);
    }

    #[test]
    fn matches_hand_computed_value() {
        // median is 20, deviations are 10, 10, 0 -> total 20.
        let signal = Signal::from_1d(&[10.0, 30.0, 20.0]).expect("valid signal");
        let mut cost = L1::new();
        cost.fit(&signal).expect("fit succeeds");
        assert_eq!(cost.compute_cost(0, 3).expect("cost computed"), 20.0);
    }

    #[test]
    fn uninitialized_before_fit() {
        let cost = L1::new();
        assert!(matches!(
            cost.compute_cost(0, 1),
            Err(Error::Uninitialized)
        ));
    }
}
