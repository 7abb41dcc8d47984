//! Per-vertex learning automata over the partition label space.
//!
//! Every vertex owns a probability vector over the `K = k + Δ` candidate
//! partitions and an accumulator of reinforcement signals received since its
//! last update. Both live in one contiguous slab indexed by vertex row, so
//! the migration-stage sweep walks memory linearly.
//!
//! ## Action selection
//!
//! Sampling uses recursive bisection of the event space: the candidate range
//! is split where the prefix sum crosses 1/2 (splitting the crossing
//! element's mass across the halves when it straddles the boundary), one half
//! is kept with a fair coin, and its probabilities are doubled back onto the
//! simplex. The recursion bottoms out at one or two candidates. The marginal
//! distribution of the returned index equals the input vector.
//!
//! ## Reinforcement
//!
//! The update is a linear reward/penalty scheme: signals are split into a
//! positive group (at or above the signal mean) and a negative group (below
//! it), each group is sum-normalized, and the probability vector is rewarded
//! at rate α for positive indices and penalized at rate β for negative ones,
//! in ascending order of normalized signal. The strongest signal is boosted
//! beforehand by a weight that grows linearly over the run. Both rules
//! preserve the simplex analytically.

use rand::Rng;
use rayon::prelude::*;

/// Probabilities within this distance of certainty short-circuit sampling.
const CERTAINTY_EPSILON: f64 = 1e-6;

/// Boost-weight endpoints for the strongest signal.
const BOOST_HIGH: f64 = 0.9;
const BOOST_LOW: f64 = 0.4;

/// Index of the first maximum of `xs`.
#[inline]
pub(crate) fn argmax(xs: &[f64]) -> usize {
    let mut best = 0;
    for (i, &x) in xs.iter().enumerate().skip(1) {
        if x > xs[best] {
            best = i;
        }
    }
    best
}

/// Contiguous storage for all automata: one probability row and one signal
/// row per vertex.
pub struct AutomatonSlab {
    actions: usize,
    probability: Vec<f64>,
    signal: Vec<f64>,
}

impl AutomatonSlab {
    /// Zeroed storage for `vertices` automata over `actions` candidates.
    /// Rows must be seeded before use.
    pub fn new(vertices: usize, actions: usize) -> Self {
        Self {
            actions,
            probability: vec![0.0; vertices * actions],
            signal: vec![0.0; vertices * actions],
        }
    }

    /// Number of candidate actions per automaton.
    pub fn actions(&self) -> usize {
        self.actions
    }

    /// Reset the automaton at `row` to the uniform distribution with zero
    /// accumulated signal.
    pub fn seed_uniform(&mut self, row: usize) {
        let uniform = 1.0 / self.actions as f64;
        for p in self.probability_mut(row) {
            *p = uniform;
        }
        for s in self.signal_mut(row) {
            *s = 0.0;
        }
    }

    pub fn probability(&self, row: usize) -> &[f64] {
        let start = row * self.actions;
        &self.probability[start..start + self.actions]
    }

    pub fn probability_mut(&mut self, row: usize) -> &mut [f64] {
        let start = row * self.actions;
        &mut self.probability[start..start + self.actions]
    }

    pub fn signal(&self, row: usize) -> &[f64] {
        let start = row * self.actions;
        &self.signal[start..start + self.actions]
    }

    pub fn signal_mut(&mut self, row: usize) -> &mut [f64] {
        let start = row * self.actions;
        &mut self.signal[start..start + self.actions]
    }

    /// Parallel iterator over `(row, probability, signal)` triples.
    pub fn par_rows_mut(
        &mut self,
    ) -> impl IndexedParallelIterator<Item = (usize, &mut [f64], &mut [f64])> + '_ {
        let actions = self.actions;
        self.probability
            .par_chunks_mut(actions)
            .zip(self.signal.par_chunks_mut(actions))
            .enumerate()
            .map(|(row, (p, s))| (row, p, s))
    }
}

/// Sample an action index with marginal distribution `probability`.
pub fn select_action<R: Rng>(probability: &[f64], rng: &mut R) -> usize {
    debug_assert!(!probability.is_empty());
    let mut probs = probability.to_vec();
    let mut offset = 0usize;
    let separator = 0.5;
    loop {
        let best = argmax(&probs);
        if 1.0 - probs[best] < CERTAINTY_EPSILON {
            return offset + best;
        }
        match probs.len() {
            1 => return offset,
            2 => {
                return if rng.gen::<f64>() < probs[0] {
                    offset
                } else {
                    offset + 1
                };
            }
            _ => {}
        }
        // locate where the prefix sum crosses the separator
        let mut acc = 0.0;
        let mut cut = 0;
        while cut < probs.len() {
            acc += probs[cut];
            cut += 1;
            if (acc - separator).abs() <= CERTAINTY_EPSILON || acc >= separator {
                break;
            }
        }
        let exact = (acc - separator).abs() <= CERTAINTY_EPSILON;
        let overshoot = acc - separator;
        if rng.gen::<f64>() < separator {
            probs.truncate(cut);
            if !exact {
                probs[cut - 1] -= overshoot;
            }
        } else {
            let start = if exact { cut } else { cut - 1 };
            if !exact {
                // the crossing element keeps only its right-hand share
                probs[start] = overshoot;
            }
            probs.drain(..start);
            offset += start;
        }
        for p in &mut probs {
            *p *= 2.0;
        }
    }
}

/// Parameters of one reinforcement update.
#[derive(Debug, Clone, Copy)]
pub struct Reinforce {
    pub superstep: u32,
    pub max_iterations: u32,
    pub alpha: f64,
    pub beta: f64,
}

/// Apply one reward/penalty update to `probability` from the accumulated
/// `signal`, then clear the accumulator.
pub fn reinforce(probability: &mut [f64], signal: &mut [f64], params: &Reinforce) {
    let k = probability.len();
    debug_assert_eq!(signal.len(), k);
    debug_assert!(params.max_iterations > 0);

    // boost the strongest signal by a weight growing over the run
    let boost = argmax(signal);
    let w = (BOOST_HIGH - BOOST_LOW) * params.superstep as f64 * (k as f64).sqrt()
        / params.max_iterations as f64;
    signal[boost] *= 1.0 + w;

    let mean = signal.iter().sum::<f64>() / k as f64;
    let mut positive: Vec<(f64, usize)> = Vec::new();
    let mut negative: Vec<(f64, usize)> = Vec::new();
    for (i, &s) in signal.iter().enumerate() {
        if s >= mean {
            positive.push((s, i));
        } else {
            negative.push((s, i));
        }
    }

    let negative_sum: f64 = negative.iter().map(|e| e.0).sum();
    if negative_sum > 0.0 {
        for e in &mut negative {
            e.0 /= negative_sum;
        }
        negative.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
    } else if !negative.is_empty() {
        let uniform = 1.0 / negative.len() as f64;
        for e in &mut negative {
            e.0 = uniform;
        }
    }

    // inaction-style penalty at rate β, weakest signals first
    for &(s, index) in &negative {
        let step = s * params.beta;
        probability[index] *= 1.0 - step;
        let spread = step / (k as f64 - 1.0);
        for (j, p) in probability.iter_mut().enumerate() {
            if j != index {
                *p = spread + (1.0 - step) * *p;
            }
        }
    }

    let positive_sum: f64 = positive.iter().map(|e| e.0).sum();
    if positive_sum > 0.0 {
        for e in &mut positive {
            e.0 /= positive_sum;
        }
        positive.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        // reward at rate α
        for &(s, index) in &positive {
            let step = s * params.alpha;
            probability[index] += step * (1.0 - probability[index]);
            for (j, p) in probability.iter_mut().enumerate() {
                if j != index {
                    *p *= 1.0 - step;
                }
            }
        }
    }

    for s in signal.iter_mut() {
        *s = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn params() -> Reinforce {
        Reinforce {
            superstep: 4,
            max_iterations: 290,
            alpha: 0.98,
            beta: 0.02,
        }
    }

    #[test]
    fn slab_rows_are_disjoint() {
        let mut slab = AutomatonSlab::new(3, 4);
        slab.seed_uniform(0);
        slab.seed_uniform(1);
        slab.probability_mut(1)[2] = 0.9;
        assert_eq!(slab.probability(0), &[0.25; 4]);
        assert_eq!(slab.probability(1)[2], 0.9);
        assert_eq!(slab.probability(2), &[0.0; 4]);
    }

    #[test]
    fn near_certain_vector_returns_argmax() {
        let mut rng = SmallRng::seed_from_u64(0);
        let p = [0.0, 1.0 - 1e-9, 1e-9, 0.0];
        for _ in 0..100 {
            assert_eq!(select_action(&p, &mut rng), 1);
        }
    }

    #[test]
    fn two_element_vector_samples_directly() {
        let mut rng = SmallRng::seed_from_u64(1);
        let p = [0.25, 0.75];
        let mut counts = [0u32; 2];
        for _ in 0..10_000 {
            counts[select_action(&p, &mut rng)] += 1;
        }
        let f0 = counts[0] as f64 / 10_000.0;
        assert!((f0 - 0.25).abs() < 0.02, "f0 = {f0}");
    }

    #[test]
    fn sampler_matches_distribution_chi_squared() {
        // chi-squared goodness of fit, df = 3, 0.999 quantile = 16.266
        let p = [0.5, 0.2, 0.2, 0.1];
        let n = 100_000u32;
        let mut rng = SmallRng::seed_from_u64(7);
        let mut counts = [0u64; 4];
        for _ in 0..n {
            counts[select_action(&p, &mut rng)] += 1;
        }
        let mut chi2 = 0.0;
        for i in 0..4 {
            let expected = p[i] * n as f64;
            let diff = counts[i] as f64 - expected;
            chi2 += diff * diff / expected;
            assert!(
                (counts[i] as f64 / n as f64 - p[i]).abs() < 0.01,
                "marginal {i} drifted: {counts:?}"
            );
        }
        assert!(chi2 < 16.266, "chi2 = {chi2}, counts = {counts:?}");
    }

    #[test]
    fn mass_in_tail_terminates() {
        let mut rng = SmallRng::seed_from_u64(3);
        let p = [0.0, 0.0, 0.3, 0.7];
        for _ in 0..1000 {
            let a = select_action(&p, &mut rng);
            assert!(a == 2 || a == 3);
        }
    }

    #[test]
    fn reward_concentrates_probability() {
        let mut p = vec![0.25; 4];
        let mut s = vec![0.0, 3.0, 0.0, 0.0];
        reinforce(&mut p, &mut s, &params());
        assert!(p[1] > 0.9, "p = {p:?}");
        assert!(s.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn zero_signals_leave_probability_unchanged() {
        let mut p = vec![0.25; 4];
        let before = p.clone();
        let mut s = vec![0.0; 4];
        reinforce(&mut p, &mut s, &params());
        assert_eq!(p, before);
    }

    #[test]
    fn single_action_automaton_is_stable() {
        let mut p = vec![1.0];
        let mut s = vec![2.0];
        reinforce(&mut p, &mut s, &params());
        assert!((p[0] - 1.0).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn reinforce_preserves_simplex(
            raw in proptest::collection::vec(0.01f64..1.0, 2..12),
            sig in proptest::collection::vec(0.0f64..5.0, 2..12),
            superstep in 4u32..290,
        ) {
            let k = raw.len().min(sig.len());
            let total: f64 = raw[..k].iter().sum();
            let mut p: Vec<f64> = raw[..k].iter().map(|x| x / total).collect();
            let mut s = sig[..k].to_vec();
            let params = Reinforce { superstep, max_iterations: 290, alpha: 0.98, beta: 0.02 };
            reinforce(&mut p, &mut s, &params);
            let sum: f64 = p.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-9, "sum = {}", sum);
            prop_assert!(p.iter().all(|&x| x >= 0.0), "p = {:?}", p);
        }

        #[test]
        fn sampler_stays_in_range(
            raw in proptest::collection::vec(0.001f64..1.0, 1..16),
            seed in 0u64..1000,
        ) {
            let total: f64 = raw.iter().sum();
            let p: Vec<f64> = raw.iter().map(|x| x / total).collect();
            let mut rng = SmallRng::seed_from_u64(seed);
            let a = select_action(&p, &mut rng);
            prop_assert!(a < p.len());
        }
    }
}
