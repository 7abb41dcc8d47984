//! Runtime configuration for the partitioner.

use crate::error::PartitionerError;

/// Which partition a vertex announces to its neighbors as the reinforcement
/// target during score-and-propose.
///
/// The two choices reflect the two candidates produced by the propose stage:
/// the argmax of the per-partition score, and the action sampled from the
/// vertex's automaton. Announcing the argmax is the historical behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reinforcement {
    /// Broadcast the partition with the highest score (default).
    #[default]
    ArgmaxScore,
    /// Broadcast the partition sampled from the automaton.
    LaSample,
}

/// Configuration parameters controlling the partitioning run.
///
/// `partitions` is the target partition count k; `repartition` is the rescale
/// delta Δ, so the label space has `k + Δ` actions. Fresh runs use Δ = 0;
/// adapting a prior partitioning to a grown (Δ > 0) or shrunk (Δ < 0) target
/// runs the rescaler instead of the initializer.
#[derive(Debug, Clone)]
pub struct PartitionerConfig {
    /// Target number of partitions (k).
    pub partitions: u16,
    /// Rescale delta (Δ); 0 for a fresh partitioning.
    pub repartition: i16,
    /// Capacity headroom ε: per-partition capacity is
    /// `round(directed_edges * (1 + ε) / (k + Δ))`.
    pub additional_capacity: f64,
    /// Penalty weight λ in the per-partition score.
    pub lambda: f64,
    /// Automaton reward rate α.
    pub alpha: f64,
    /// Automaton penalty rate β.
    pub beta: f64,
    /// Superstep bound; the coordinator halts at this superstep regardless of
    /// convergence.
    pub max_iterations: u32,
    /// Relative score-plateau threshold for the convergence detector.
    pub convergence_threshold: f64,
    /// Number of score samples the convergence detector keeps.
    pub window_size: usize,
    /// Weight assigned to edges created by reconciliation.
    pub edge_weight: u8,
    /// Global seed; each vertex derives its own stream from this and its id.
    pub rng_seed: u64,
    /// Whether the convergence detector may halt the run. When `false`
    /// (default) the detector still records score history but the run always
    /// continues to `max_iterations`.
    pub halt_on_convergence: bool,
    /// Which candidate partition vertices announce as reinforcement.
    pub reinforcement: Reinforcement,
}

impl Default for PartitionerConfig {
    fn default() -> Self {
        Self {
            partitions: 32,
            repartition: 0,
            additional_capacity: 0.05,
            lambda: 1.0,
            alpha: 0.98,
            beta: 0.02,
            max_iterations: 290,
            convergence_threshold: 0.001,
            window_size: 5,
            edge_weight: 1,
            rng_seed: 42,
            halt_on_convergence: false,
            reinforcement: Reinforcement::default(),
        }
    }
}

impl PartitionerConfig {
    /// Size of the label space, `k + Δ`.
    pub fn total_partitions(&self) -> usize {
        (self.partitions as i32 + self.repartition as i32) as usize
    }

    /// Reject configurations that would abort the job before superstep 0.
    pub fn validate(&self) -> Result<(), PartitionerError> {
        if self.partitions == 0 {
            return Err(PartitionerError::InvalidPartitionCount(0));
        }
        if self.repartition as i32 <= -(self.partitions as i32) {
            return Err(PartitionerError::InvalidRepartition {
                partitions: self.partitions,
                delta: self.repartition,
            });
        }
        for (name, value) in [("alpha", self.alpha), ("beta", self.beta)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PartitionerError::RateOutOfRange { name, value });
            }
        }
        if self.window_size == 0 {
            return Err(PartitionerError::InvalidWindowSize);
        }
        Ok(())
    }
}
