//! The `Signal` data model: a `D`-dimensional, `N`-point numeric matrix.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::Error;

/// A fitted or to-be-fitted time series, stored as `D` rows
/// (dimensions) by `N` columns (time points), per the data model's own
/// shape convention.
#[derive(Debug, Clone)]
pub struct Signal {
    data: Array2<f64>,
}

impl Signal {
    /// Build a signal from a one-dimensional series (`D = 1`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if any value is NaN or
    /// infinite.
    pub fn from_1d(values: &[f64]) -> Result<Self, Error> {
        let data = Array2::from_shape_vec((1, values.len()), values.to_vec())
            .map_err(|err| Error::invalid_argument(format!("could not build 1-D signal: {err}")))?;

        Self::from_array(data)
    }

    /// Build a signal from a `D x N` matrix (`D` dimensions, `N` time
    /// points).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the matrix is empty in the
    /// dimension axis, or any value is NaN or infinite.
    pub fn from_array(data: Array2<f64>) -> Result<Self, Error> {
        if data.nrows() == 0 {
            return Err(Error::invalid_argument(
                "signal must have at least one dimension",
            ));
        }

        if let Some(value) = data.iter().find(|value| !value.is_finite()) {
            return Err(Error::invalid_argument(format!(
                "signal contains a non-finite value: {value}"
            )));
        }

        Ok(Self { data })
    }

    /// Build a signal from row-major `(successes, trials)` pairs, used
    /// by the binomial cost function. Row 0 holds successes, row 1
    /// holds trials.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the two rows have
    /// different lengths or contain non-finite values.
    pub fn from_successes_and_trials(successes: &[f64], trials: &[f64]) -> Result<Self, Error> {
        if successes.len() != trials.len() {
            return Err(Error::invalid_argument(
                "successes and trials rows must have the same length",
            ));
        }

        let n = successes.len();
        let mut data = Array2::zeros((2, n));
        data.row_mut(0).assign(&ArrayView1::from(successes));
        data.row_mut(1).assign(&ArrayView1::from(trials));

        Self::from_array(data)
    }

    /// Number of dimensions (`D`).
    #[must_use]
    pub fn n_dims(&self) -> usize {
        self.data.nrows()
    }

    /// Number of time points (`N`).
    #[must_use]
    pub fn n_points(&self) -> usize {
        self.data.ncols()
    }

    /// View of the full `D x N` matrix.
    #[must_use]
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// View of a single dimension's time series.
    ///
    /// # Panics
    ///
    /// Panics if `dim >= n_dims()`; callers within this crate always
    /// bound `dim` by `n_dims()` first.
    #[must_use]
    pub fn row(&self, dim: usize) -> ArrayView1<'_, f64> {
        self.data.index_axis(Axis(0), dim)
    }

    /// Validate that `[start, end)` is a well-formed sub-range of this
    /// signal.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if `start > end` or `end` exceeds
    /// `n_points()`.
    pub(crate) fn check_range(&self, start: usize, end: usize) -> Result<(), Error> {
        if start > end || end > self.n_points() {
            return Err(Error::OutOfRange {
                start,
                end,
                signal_len: self.n_points(),
            });
        }

        Ok(())
    }
}
