//! Pruned Exact Linear Time changepoint detection engine.

use smallvec::SmallVec;

use crate::cost::CostFunction;
use crate::{Error, Signal};

/// Most admissible-set queries return a handful of candidates; inline
/// storage avoids a heap allocation for the common case.
type CandidateList = SmallVec<usize, 8>;

/// PELT engine: a fitted cost function driven over a signal to produce
/// a changepoint segmentation for a given penalty (`spec.md` §4.2).
#[derive(Debug, Clone)]
pub struct PeltEngine {
    cost: CostFunction,
    min_size: usize,
    jump: usize,
    signal_len: Option<usize>,
}

impl PeltEngine {
    /// Construct a new engine. `min_size` is clamped to at least `1`
    /// and `jump` to at least `1`; the effective minimum segment length
    /// used during detection is `max(min_size, cost.min_segment_length())`.
    #[must_use]
    pub fn new(cost: CostFunction, min_size: usize, jump: usize) -> Self {
        Self {
            cost,
            min_size: min_size.max(1),
            jump: jump.max(1),
            signal_len: None,
        }
    }

    /// Fit the underlying cost function to `signal`.
    ///
    /// # Errors
    ///
    /// Propagates any error from the cost function's own `fit`.
    pub fn fit(&mut self, signal: &Signal) -> Result<(), Error> {
        self.cost.fit(signal)?;
        self.signal_len = Some(signal.n_points());
        Ok(())
    }

    fn effective_min_size(&self) -> usize {
        self.min_size.max(self.cost.min_segment_length())
    }

    /// Detect changepoints under the given non-negative `penalty`.
    ///
    /// Returns the interior changepoint indices (never including `0`
    /// or the signal length) minimizing
    /// `F(N) = min over segmentations of sum(cost(segment)) + penalty * K`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Uninitialized`] if `fit` was not called.
    pub fn detect(&self, penalty: f64) -> Result<Vec<usize>, Error> {
        let n = self.signal_len.ok_or(Error::Uninitialized)?;
        let min_size = self.effective_min_size();

        if n < 2 * min_size {
            return Ok(Vec::new());
        }

        let mut f = vec![f64::INFINITY; n + 1];
        f[0] = -penalty;
        let mut cp: Vec<Option<usize>> = vec![None; n + 1];
        let mut admissible: Vec<usize> = vec![0];

        for t in min_size..=n {
            let mut best: Option<(usize, f64)> = None;

            for &s in &self.candidate_predecessors(t, min_size, &admissible) {
                if t - s < min_size {
                    continue;
                }

                match self.cost.compute_cost(s, t) {
                    Ok(cost_value) => {
                        let candidate = f[s] + cost_value + penalty;
                        if candidate.is_finite() && best.is_none_or(|(_, best_value)| candidate < best_value) {
                            best = Some((s, candidate));
                        }
                    }
                    Err(err) => {
                        branches::mark_unlikely();
                        log::warn!("PELT: cost({s}, {t}) failed during main loop, skipping: {err}");
                    }
                }
            }

            if let Some((s_star, value)) = best {
                f[t] = value;
                cp[t] = Some(s_star);
            }

            admissible = self.prune(&admissible, &f, t, min_size);
        }

        Ok(backtrack(&cp, n))
    }

    /// Candidates considered in step 1 of the algorithm: the full
    /// admissible set when `jump == 1`, or a strided subset (always
    /// including `0` when admissible) when `jump > 1`.
    fn candidate_predecessors(&self, t: usize, min_size: usize, admissible: &[usize]) -> CandidateList {
        if self.jump <= 1 {
            return admissible.iter().copied().collect();
        }

        let mut out = CandidateList::new();
        let mut s = t.saturating_sub(min_size);

        loop {
            if admissible.binary_search(&s).is_ok() {
                out.push(s);
            }

            if s < self.jump {
                break;
            }
            s -= self.jump;
        }

        if !out.contains(&0) && admissible.binary_search(&0).is_ok() {
            out.push(0);
        }

        out
    }

    /// Step 3 of the algorithm: build the next admissible set.
    fn prune(&self, admissible: &[usize], f: &[f64], t: usize, min_size: usize) -> Vec<usize> {
        let mut next = Vec::with_capacity(admissible.len() + 1);

        for &s in admissible {
            if !f[s].is_finite() {
                continue;
            }

            if t - s < min_size {
                next.push(s);
                continue;
            }

            match self.cost.compute_cost(s, t) {
                Ok(cost_value) => {
                    if f[s] + cost_value <= f[t] {
                        next.push(s);
                    }
                }
                Err(err) => {
                    branches::mark_unlikely();
                    log::warn!("PELT: cost({s}, {t}) failed during pruning, keeping conservatively: {err}");
                    next.push(s);
                }
            }
        }

        if f[t].is_finite() {
            next.push(t);
        }

        next
    }
}

/// Reconstruct the interior changepoints from the `CP` array: from
/// `t = N`, repeatedly prepend `CP[t]` and follow it until `CP[t] <= 0`,
/// then drop the trailing `0` — it marks the sentinel start, not a
/// genuine change point.
fn backtrack(cp: &[Option<usize>], n: usize) -> Vec<usize> {
    let mut breakpoints = Vec::new();
    let mut t = n;

    loop {
        let Some(Some(s)) = cp.get(t) else { break };
        breakpoints.push(*s);

        if *s == 0 || breakpoints.len() > n {
            break;
        }
        t = *s;
    }

    breakpoints.retain(|&x| x > 0);
    breakpoints.sort_unstable();
    breakpoints
}
