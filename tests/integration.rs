//! End-to-end scenarios from the data model / testable properties.

mod common;

use pelt::{CostFunction, PeltEngine, PenaltyMethod, PenaltySelector, Signal};
use pelt::cost::{Ar, Bernoulli, Binomial, Gaussian, L2};

#[test]
fn s1_l2_step_in_mean() {
    let signal = Signal::from_1d(&[1.0, 1.0, 1.0, 10.0, 10.0, 10.0, 1.0, 1.0, 1.0]).expect("valid signal");
    let mut engine = PeltEngine::new(CostFunction::L2(L2::new()), 2, 1);
    engine.fit(&signal).expect("fit succeeds");

    for penalty in [5.0, 15.0, 25.0, 40.0] {
        let breakpoints = engine.detect(penalty).expect("detect succeeds");
        assert_eq!(breakpoints, vec![3, 6], "penalty {penalty} gave {breakpoints:?}");
    }
}

#[test]
fn s2_l2_subset_cost() {
    let signal = Signal::from_1d(&[1.0, 1.5, 2.0, 2.5, 3.0]).expect("valid signal");
    let mut cost = L2::new();
    cost.fit(&signal).expect("fit succeeds");
    assert!((cost.compute_cost(1, 4).expect("cost computed") - 0.5).abs() < 1e-9);
}

#[test]
fn s3_gaussian_variance_change() {
    let signal = Signal::from_1d(&[-0.1, 0.0, 0.1, -2.0, 0.0, 2.0]).expect("valid signal");
    let mut cost = Gaussian::new();
    cost.fit(&signal).expect("fit succeeds");

    let whole = cost.compute_cost(0, 6).expect("cost computed");
    let expected = 6.0 * (8.02_f64 / 6.0).ln();
    assert!((whole - expected).abs() < 1e-6);

    let split = cost.compute_cost(0, 3).expect("cost computed") + cost.compute_cost(3, 6).expect("cost computed");
    assert!(split < whole);
}

#[test]
fn s4_bernoulli() {
    let signal = Signal::from_1d(&[0.0, 1.0, 0.0, 1.0]).expect("valid signal");
    let mut cost = Bernoulli::new();
    cost.fit(&signal).expect("fit succeeds");
    let value = cost.compute_cost(0, 4).expect("cost computed");
    assert!((value - 8.0 * 2.0_f64.ln()).abs() < 1e-9);
}

#[test]
fn s5_binomial() {
    let data = ndarray::array![[1.0, 2.0, 8.0, 9.0], [10.0, 10.0, 10.0, 10.0]];
    let signal = Signal::from_array(data).expect("valid signal");
    let mut cost = Binomial::new();
    cost.fit(&signal).expect("fit succeeds");
    let value = cost.compute_cost(0, 4).expect("cost computed");
    assert!((value - 40.0 * 2.0_f64.ln()).abs() < 1e-9);
}

#[test]
fn s6_ar1_no_intercept_near_perfect_fit() {
    let signal = Signal::from_1d(&[1.0, 0.8, 0.64, 0.512, 0.4096]).expect("valid signal");
    let mut cost = Ar::new(1, false);
    cost.fit(&signal).expect("fit succeeds");
    let value = cost.compute_cost(0, 5).expect("cost computed");
    assert!(value.abs() < 1e-6, "expected near zero, got {value}");
}

#[test]
fn s7_ar1_with_intercept_on_constants_is_infinite() {
    let signal = Signal::from_1d(&[2.0, 2.0, 2.0, 2.0, 2.0]).expect("valid signal");
    let mut cost = Ar::new(1, true);
    cost.fit(&signal).expect("fit succeeds");
    let value = cost.compute_cost(0, 5).expect("cost computed");
    assert!(value.is_infinite());
}

#[test]
fn s8_penalty_selector_finds_the_single_regime_change() {
    let mut values = common::step_signal(200, 100, 0.0, 3.0);
    let noise = common::deterministic_noise(200, 42);
    for (value, noise) in values.iter_mut().zip(noise) {
        *value += noise * 0.2;
    }

    let signal = Signal::from_1d(&values).expect("valid signal");
    let cost = CostFunction::Gaussian(Gaussian::new());
    let mut selector = PenaltySelector::new(cost, 2, 1, PenaltyMethod::Bic).expect("likelihood-capable");

    let selection = selector.fit_and_select(&signal).expect("selection succeeds");
    assert_eq!(selection.breakpoints.len(), 1, "breakpoints: {:?}", selection.breakpoints);
    let change_point = selection.breakpoints[0] as i64;
    assert!((change_point - 100).abs() <= 10, "expected a change point near 100, got {change_point}");
}

#[test]
fn empty_and_too_short_signals_detect_nothing() {
    let signal = Signal::from_1d(&[1.0]).expect("valid signal");
    let mut engine = PeltEngine::new(CostFunction::L2(L2::new()), 2, 1);
    engine.fit(&signal).expect("fit succeeds");
    assert!(engine.detect(1.0).expect("detect succeeds").is_empty());
}
