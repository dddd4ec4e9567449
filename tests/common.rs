//! Shared signal generators for integration tests.

/// A step in mean at `change_at`, holding `before` up to that index and
/// `after` afterward.
#[must_use]
pub fn step_signal(length: usize, change_at: usize, before: f64, after: f64) -> Vec<f64> {
    (0..length)
        .map(|i| if i < change_at { before } else { after })
        .collect()
}

/// A deterministic pseudo-random walk, for signals that need some
/// texture without pulling in a dependency on a RNG crate.
///
/// Draws from the top 53 bits of each xorshift64 state so two distinct
/// states can't collide onto the same `f64` the way a low-resolution
/// `% 1000` reduction would.
#[must_use]
pub fn deterministic_noise(length: usize, seed: u64) -> Vec<f64> {
    let mut state = seed.max(1);
    (0..length)
        .map(|_| {
            // xorshift64
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let unit = (state >> 11) as f64 / (1_u64 << 53) as f64;
            unit - 0.5
        })
        .collect()
}
