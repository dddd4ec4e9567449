//! Error types.

/// Errors that can occur while fitting or querying a cost function,
/// running the PELT engine, or selecting a penalty.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input was null, had an invalid shape, carried a
    /// non-finite value, or a hyperparameter was out of range.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Description of what was wrong with the argument.
        reason: String,
    },

    /// The requested operation is not defined for this cost function or
    /// configuration (e.g. a 1-D signal given to the binomial cost, or
    /// penalty selection against a cost function without the
    /// likelihood protocol).
    #[error("unsupported operation: {reason}")]
    Unsupported {
        /// Description of the unsupported combination.
        reason: String,
    },

    /// A compute call was made before `fit` was called.
    #[error("cost function or engine was not fitted before use")]
    Uninitialized,

    /// `start`/`end` indices were out of the valid `[0, N]` range, or
    /// `start > end`.
    #[error("segment [{start}, {end}) is out of range for signal of length {signal_len}")]
    OutOfRange {
        /// Requested segment start.
        start: usize,
        /// Requested segment end.
        end: usize,
        /// Length of the fitted signal.
        signal_len: usize,
    },

    /// The segment `[start, end)` is shorter than the cost function's
    /// minimum required length.
    #[error("segment [{start}, {end}) of length {length} is shorter than the minimum of {min_required}")]
    SegmentTooShort {
        /// Requested segment start.
        start: usize,
        /// Requested segment end.
        end: usize,
        /// Length of the requested segment (`end - start`).
        length: usize,
        /// Minimum length the cost function requires.
        min_required: usize,
    },

    /// A cost computation produced a NaN or infinite value because of
    /// an ill-conditioned input (only raised by the AR(p) cost; other
    /// cost functions translate this situation into a `+∞` return).
    #[error("cost computation for segment [{start}, {end}) diverged to a non-finite value")]
    CostDomain {
        /// Requested segment start.
        start: usize,
        /// Requested segment end.
        end: usize,
    },

    /// The penalty selector exhausted its candidate grid without
    /// finding any segmentation with a finite, valid score.
    #[error("penalty selection exhausted its grid of {candidates_tried} candidates without a valid score")]
    NoSolution {
        /// Number of candidate penalties that were tried.
        candidates_tried: usize,
        /// Every candidate tried, in grid order, for diagnosis.
        diagnostics: Vec<crate::penalty::PenaltyCandidate>,
    },

    /// The caller's cancellation token fired before selection completed.
    #[error("operation was cancelled")]
    Cancelled,
}

impl Error {
    /// Build an [`Error::InvalidArgument`] from a formatted reason.
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Build an [`Error::Unsupported`] from a formatted reason.
    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Self::Unsupported {
            reason: reason.into(),
        }
    }
}
