//! Autoregressive AR(p) cost: detects a change in autoregressive
//! dynamics. Univariate only.

use ndarray::Array2;

use crate::numeric::linalg::least_squares;
use crate::{Error, Signal};

/// Autoregressive segment cost (`spec.md` §4.1.6).
#[derive(Debug, Clone)]
pub struct Ar {
    order: usize,
    include_intercept: bool,
    fitted: Option<Vec<f64>>,
}

impl Ar {
    /// Construct an unfitted AR(p) cost function with the given order
    /// and whether to include an intercept term. `order` must be `>= 1`.
    #[must_use]
    pub fn new(order: usize, include_intercept: bool) -> Self {
        Self {
            order: order.max(1),
            include_intercept,
            fitted: None,
        }
    }

    pub fn fit(&mut self, signal: &Signal) -> Result<(), Error> {
        if signal.n_dims() != 1 {
            return Err(Error::unsupported(format!(
                "AR cost is univariate only, got {} dimensions",
                signal.n_dims()
            )));
        }

        self.fitted = Some(signal.row(0).to_vec());
        Ok(())
    }

    pub fn min_segment_length(&self) -> usize {
        let p = self.order;
        let doubled = 2 * p + usize::from(self.include_intercept);
        (p + 1).max(doubled)
    }

    pub fn compute_cost(&self, start: usize, end: usize) -> Result<f64, Error> {
        let values = self.fitted.as_ref().ok_or(Error::Uninitialized)?;
        let signal_len = values.len();

        if start > end || end > signal_len {
            return Err(Error::OutOfRange {
                start,
                end,
                signal_len,
            });
        }

        let n = end - start;
        let min_required = self.min_segment_length();

        if n < min_required {
            return Err(Error::SegmentTooShort {
                start,
                end,
                length: n,
                min_required,
            });
        }

        let segment = &values[start..end];
        let p = self.order;
        let equations = n - p;
        let extra_cols = usize::from(self.include_intercept);
        let cols = p + extra_cols;

        let mut design = Array2::zeros((equations, cols));
        let mut target = Vec::with_capacity(equations);

        for (row, t) in (p..n).enumerate() {
            let mut col = 0;

            if self.include_intercept {
                design[[row, col]] = 1.0;
                col += 1;
            }

            for lag in 1..=p {
                design[[row, col]] = segment[t - lag];
                col += 1;
            }

            target.push(segment[t]);
        }

        let target = ndarray::Array1::from_vec(target);

        let Some(coefficients) = least_squares(design.view(), target.view()) else {
            // Singular / rank-deficient system: return +infinity rather
            // than failing, per spec.
            return Ok(f64::INFINITY);
        };

        let mut rss = 0.0;
        for row in 0..equations {
            let mut prediction = 0.0;
            for (col, &coefficient) in coefficients.iter().enumerate() {
                prediction += design[[row, col]] * coefficient;
            }
            let residual = target[row] - prediction;
            rss += residual * residual;
        }

        if !rss.is_finite() {
            return Err(Error::CostDomain { start, end });
        }

        Ok(rss)
    }
}
