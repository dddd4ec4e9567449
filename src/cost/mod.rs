//! Segment cost functions.
//!
//! `CostFunction` is a tagged-variant enum, continuing the teacher
//! crate's own `SegmentCostFunction` idiom: each variant owns its
//! fitted state rather than going through a trait object.

mod ar;
mod bernoulli;
mod binomial;
mod gaussian;
mod l1;
mod l2;
mod poisson;
mod rbf;

pub use ar::Ar;
pub use bernoulli::Bernoulli;
pub use binomial::Binomial;
pub use gaussian::Gaussian;
pub use l1::L1;
pub use l2::L2;
pub use poisson::Poisson;
pub use rbf::Rbf;

use crate::{Error, Signal};

/// A segment cost function, fitted to a [`Signal`] and queried over
/// sub-ranges of it.
#[derive(Debug, Clone)]
pub enum CostFunction {
    /// Sum of absolute deviations from the segment median.
    L1(L1),
    /// Sum of squared deviations from the segment mean.
    L2(L2),
    /// Gaussian likelihood: mean and variance change.
    Gaussian(Gaussian),
    /// Poisson likelihood: rate change on counts.
    Poisson(Poisson),
    /// Bernoulli likelihood: success-probability change.
    Bernoulli(Bernoulli),
    /// Binomial likelihood: success-probability change over grouped trials.
    Binomial(Binomial),
    /// Autoregressive AR(p) residual cost.
    Ar(Ar),
    /// RBF kernel-distribution cost.
    Rbf(Rbf),
}

impl CostFunction {
    /// Fit this cost function to `signal`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] if `signal`'s shape doesn't match
    /// this variant's requirements (e.g. AR on a multivariate signal),
    /// or [`Error::InvalidArgument`] if values fall outside the
    /// variant's domain (e.g. negative Poisson counts).
    pub fn fit(&mut self, signal: &Signal) -> Result<(), Error> {
        match self {
            Self::L1(cost) => cost.fit(signal),
            Self::L2(cost) => cost.fit(signal),
            Self::Gaussian(cost) => cost.fit(signal),
            Self::Poisson(cost) => cost.fit(signal),
            Self::Bernoulli(cost) => cost.fit(signal),
            Self::Binomial(cost) => cost.fit(signal),
            Self::Ar(cost) => cost.fit(signal),
            Self::Rbf(cost) => cost.fit(signal),
        }
    }

    /// Minimum number of points this cost function needs in a segment.
    #[must_use]
    pub fn min_segment_length(&self) -> usize {
        match self {
            Self::L1(cost) => cost.min_segment_length(),
            Self::L2(cost) => cost.min_segment_length(),
            Self::Gaussian(cost) => cost.min_segment_length(),
            Self::Poisson(cost) => cost.min_segment_length(),
            Self::Bernoulli(cost) => cost.min_segment_length(),
            Self::Binomial(cost) => cost.min_segment_length(),
            Self::Ar(cost) => cost.min_segment_length(),
            Self::Rbf(cost) => cost.min_segment_length(),
        }
    }

    /// Cost of the segment `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Uninitialized`] if `fit` was not called,
    /// [`Error::OutOfRange`] for invalid indices, or
    /// [`Error::SegmentTooShort`] when the segment is shorter than
    /// [`Self::min_segment_length`].
    pub fn compute_cost(&self, start: usize, end: usize) -> Result<f64, Error> {
        match self {
            Self::L1(cost) => cost.compute_cost(start, end),
            Self::L2(cost) => cost.compute_cost(start, end),
            Self::Gaussian(cost) => cost.compute_cost(start, end),
            Self::Poisson(cost) => cost.compute_cost(start, end),
            Self::Bernoulli(cost) => cost.compute_cost(start, end),
            Self::Binomial(cost) => cost.compute_cost(start, end),
            Self::Ar(cost) => cost.compute_cost(start, end),
            Self::Rbf(cost) => cost.compute_cost(start, end),
        }
    }

    /// Whether this variant implements the likelihood protocol
    /// (`ComputeLikelihoodMetric` / `GetSegmentParameterCount`), and so
    /// can be driven by [`crate::PenaltySelector`]'s information-criterion
    /// scoring.
    #[must_use]
    pub const fn supports_information_criteria(&self) -> bool {
        matches!(
            self,
            Self::Gaussian(_) | Self::Poisson(_) | Self::Bernoulli(_) | Self::Binomial(_)
        )
    }

    /// Likelihood metric for the segment `[start, end)`, for variants
    /// where [`Self::supports_information_criteria`] is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] for variants that don't implement
    /// the likelihood protocol (L1, L2, AR, RBF), otherwise the same
    /// errors as [`Self::compute_cost`].
    pub fn compute_likelihood_metric(&self, start: usize, end: usize) -> Result<f64, Error> {
        match self {
            Self::Gaussian(cost) => cost.compute_likelihood_metric(start, end),
            Self::Poisson(cost) => cost.compute_likelihood_metric(start, end),
            Self::Bernoulli(cost) => cost.compute_likelihood_metric(start, end),
            Self::Binomial(cost) => cost.compute_likelihood_metric(start, end),
            other => Err(Error::unsupported(format!(
                "{} does not implement the likelihood protocol",
                other.name()
            ))),
        }
    }

    /// Number of free parameters estimated per segment, for variants
    /// where [`Self::supports_information_criteria`] is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] for variants that don't implement
    /// the likelihood protocol.
    pub fn segment_parameter_count(&self, segment_len: usize) -> Result<usize, Error> {
        match self {
            Self::Gaussian(cost) => cost.segment_parameter_count(segment_len),
            Self::Poisson(cost) => cost.segment_parameter_count(segment_len),
            Self::Bernoulli(cost) => cost.segment_parameter_count(segment_len),
            Self::Binomial(cost) => cost.segment_parameter_count(segment_len),
            other => Err(Error::unsupported(format!(
                "{} does not implement the likelihood protocol",
                other.name()
            ))),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::L1(_) => "L1",
            Self::L2(_) => "L2",
            Self::Gaussian(_) => "Gaussian",
            Self::Poisson(_) => "Poisson",
            Self::Bernoulli(_) => "Bernoulli",
            Self::Binomial(_) => "Binomial",
            Self::Ar(_) => "AR",
            Self::Rbf(_) => "RBF",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_likelihood_family_supports_information_criteria() {
        assert!(!CostFunction::L1(L1::new()).supports_information_criteria());
        assert!(!CostFunction::L2(L2::new()).supports_information_criteria());
        assert!(CostFunction::Gaussian(Gaussian::new()).supports_information_criteria());
        assert!(CostFunction::Poisson(Poisson::new()).supports_information_criteria());
        assert!(CostFunction::Bernoulli(Bernoulli::new()).supports_information_criteria());
        assert!(CostFunction::Binomial(Binomial::new()).supports_information_criteria());
        assert!(!CostFunction::Ar(Ar::new(1, false)).supports_information_criteria());
        assert!(!CostFunction::Rbf(Rbf::new(Some(1.0))).supports_information_criteria());
    }

    #[test]
    fn likelihood_metric_rejected_for_non_capable_variant() {
        let mut cost = CostFunction::L1(L1::new());
        let signal = Signal::from_1d(&[1.0, 2.0, 3.0]).expect("valid signal");
        cost.fit(&signal).expect("fit succeeds");
        assert!(matches!(
            cost.compute_likelihood_metric(0, 3),
            Err(Error::Unsupported { .. })
        ));
    }

    #[test]
    fn dispatch_matches_inner_variant_cost() {
        let signal = Signal::from_1d(&[1.0, 1.5, 2.0, 2.5, 3.0]).expect("valid signal");
        let mut via_enum = CostFunction::L2(L2::new());
        via_enum.fit(&signal).expect("fit succeeds");

        let mut direct = L2::new();
        direct.fit(&signal).expect("fit succeeds");

        assert_eq!(
            via_enum.compute_cost(1, 4).expect("cost computed"),
            direct.compute_cost(1, 4).expect("cost computed")
        );
    }
}
