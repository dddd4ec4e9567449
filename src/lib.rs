//! Multiple changepoint detection with Pruned Exact Linear Time.
//!
//! Fit a [`Signal`] to a [`cost::CostFunction`], then either run
//! [`PeltEngine`] directly with a chosen penalty, or hand the cost
//! function to [`PenaltySelector`] to pick one automatically via an
//! information criterion.

pub mod cost;
mod error;
mod numeric;
mod pelt;
mod penalty;
mod signal;

pub use cost::CostFunction;
pub use error::Error;
pub use pelt::PeltEngine;
pub use penalty::{
    AtomicCancellationToken, CancellationToken, PenaltyCandidate, PenaltyMethod, PenaltySelection,
    PenaltySelector,
};
pub use signal::Signal;
