//! Shared quickselect median, used by the L1 and RBF cost functions.
//! Mirrors the teacher crate's own `cost.rs::median` helper.

/// Median of `values`, reordering it in place. Returns `0.0` for an
/// empty slice.
pub(crate) fn median_mut(values: &mut [f64]) -> f64 {
    let len = values.len();

    match len {
        0 => return 0.0,
        1 => return values[0],
        _ => {}
    }

    if len.is_multiple_of(2) {
        let (_, left, rest) = values.select_nth_unstable_by(len / 2 - 1, f64::total_cmp);
        let left = *left;
        let (_, right, _) = rest.select_nth_unstable_by(0, f64::total_cmp);
        left.midpoint(*right)
    } else {
        let (_, mid, _) = values.select_nth_unstable_by(len / 2, f64::total_cmp);
        *mid
    }
}
