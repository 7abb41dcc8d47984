//! Per-partition scoring for the propose stage.
//!
//! Each candidate partition `i` is scored as the mean of two terms:
//!
//! - the label-propagation term `lpa[i]`, the weighted fraction of neighbors
//!   currently labeled `i`;
//! - the penalty term `pf[i] = λ − W(i)`, where `W(i)` is the partition's
//!   load over the per-partition capacity, rounded up to three decimals.
//!
//! When any penalty goes negative the vector is min-max normalized to [0, 1];
//! it is then sum-normalized so both terms live on comparable scales.
//!
//! Loads used here come from a [`SpeculativeLoads`] snapshot: vertices
//! processed earlier in the same propose sweep shift their tentative demand
//! onto it, so later vertices see the pressure already building. This
//! deliberately trades exact barrier semantics for faster spreading of
//! demand; the authoritative loads are still the aggregated ones.

/// Local copy of the per-partition loads, mutated as proposals accumulate
/// within a single propose sweep.
#[derive(Debug, Clone)]
pub struct SpeculativeLoads {
    loads: Vec<i64>,
}

impl SpeculativeLoads {
    /// Snapshot the aggregated loads at the start of a sweep.
    pub fn snapshot(loads: &[i64]) -> Self {
        Self {
            loads: loads.to_vec(),
        }
    }

    #[inline]
    pub fn get(&self, partition: usize) -> i64 {
        self.loads[partition]
    }

    /// Tentatively move `edges` of load from `from` to `to`.
    #[inline]
    pub fn shift(&mut self, from: usize, to: usize, edges: i64) {
        self.loads[to] += edges;
        self.loads[from] -= edges;
    }
}

/// Per-partition capacity: `round(directed_edges * (1 + ε) / K)`.
pub fn total_capacity(directed_edges: u64, additional_capacity: f64, total_partitions: usize) -> i64 {
    (directed_edges as f64 * (1.0 + additional_capacity) / total_partitions as f64).round() as i64
}

/// Round up to three decimals.
#[inline]
fn ceil_to_millis(x: f64) -> f64 {
    (x * 1000.0).ceil() / 1000.0
}

/// Reusable scoring buffers, one slot per candidate partition.
#[derive(Debug)]
pub struct ScoreBuffers {
    pub lpa: Vec<f64>,
    pub penalty: Vec<f64>,
    pub score: Vec<f64>,
}

impl ScoreBuffers {
    pub fn new(total_partitions: usize) -> Self {
        Self {
            lpa: vec![0.0; total_partitions],
            penalty: vec![0.0; total_partitions],
            score: vec![0.0; total_partitions],
        }
    }

    /// Score every candidate partition and return the argmax (first maximum
    /// on ties).
    ///
    /// `frequency[i]` is the weighted count of neighbors labeled `i` and
    /// `total_labels` its grand sum; a vertex whose neighborhood carries no
    /// labels scores a zero LPA term everywhere.
    pub fn compute(
        &mut self,
        frequency: &[i64],
        total_labels: i64,
        loads: &SpeculativeLoads,
        capacity: i64,
        lambda: f64,
    ) -> usize {
        let k = self.score.len();
        debug_assert_eq!(frequency.len(), k);
        for i in 0..k {
            self.lpa[i] = if total_labels == 0 {
                0.0
            } else {
                frequency[i] as f64 / total_labels as f64
            };
            let w = if capacity == 0 {
                0.0
            } else {
                ceil_to_millis(loads.get(i) as f64 / capacity as f64)
            };
            self.penalty[i] = lambda - w;
        }

        if self.penalty.iter().any(|&p| p < 0.0) {
            let min = self.penalty.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = self
                .penalty
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);
            let range = max - min;
            if range > 0.0 {
                for p in &mut self.penalty {
                    *p = (*p - min) / range;
                }
            }
        }

        let sum: f64 = self.penalty.iter().sum();
        if sum > 0.0 {
            for p in &mut self.penalty {
                *p /= sum;
            }
        } else {
            let uniform = 1.0 / k as f64;
            for p in &mut self.penalty {
                *p = uniform;
            }
        }

        for i in 0..k {
            self.score[i] = (self.penalty[i] + self.lpa[i]) / 2.0;
        }
        crate::automaton::argmax(&self.score)
    }
}
