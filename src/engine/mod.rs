//! The superstep-driven partitioning engine.
//!
//! Vertices execute in lock-step supersteps: within a superstep each vertex
//! sees only the messages sent to it in the previous superstep and the
//! aggregates reduced at the previous barrier. The coordinator maps the
//! superstep index onto a [`Stage`] and decides halting.
//!
//! | superstep | stage |
//! |---|---|
//! | 0 | neighbor propagation (implicit in memory: the adjacency already lists sources) |
//! | 1 | edge-direction reconciliation |
//! | 2 | initialization (or rescaling when Δ ≠ 0) |
//! | odd ≥ 3 | score-and-propose |
//! | even ≥ 4 | admission and migration |

mod init;
mod migrate;
mod propose;

use crate::aggregate::AggregateSet;
use crate::automaton::AutomatonSlab;
use crate::config::PartitionerConfig;
use crate::convergence::ConvergenceDetector;
use crate::error::PartitionerError;
use crate::graph::Graph;
use crate::metrics::{
    locality_fraction, max_min_ratio, max_normalized_load, PartitionReport, RunStats,
};
use crate::rng::VertexStreams;
use crate::score::ScoreBuffers;

/// The computation executed by every vertex in a given superstep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Propagate,
    ReconcileEdges,
    Initialize,
    Rescale,
    ProposeLabels,
    AdmitMigrations,
}

impl Stage {
    /// Static dispatch table keyed by superstep index and parity.
    pub fn for_superstep(superstep: u32, repartition: i16) -> Stage {
        match superstep {
            0 => Stage::Propagate,
            1 => Stage::ReconcileEdges,
            2 if repartition != 0 => Stage::Rescale,
            2 => Stage::Initialize,
            s if s % 2 == 1 => Stage::ProposeLabels,
            _ => Stage::AdmitMigrations,
        }
    }
}

/// An in-flight label announcement, addressed by dense row.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Message {
    pub source: u32,
    pub partition: i16,
    pub signal: f64,
}

/// Double-buffered per-vertex inboxes: deliveries go to the write side and
/// become readable after the barrier.
pub(crate) struct Mailboxes {
    inbox: Vec<Vec<Message>>,
    outbox: Vec<Vec<Message>>,
}

impl Mailboxes {
    fn new(vertices: usize) -> Self {
        Self {
            inbox: vec![Vec::new(); vertices],
            outbox: vec![Vec::new(); vertices],
        }
    }

    #[inline]
    pub fn deliver(&mut self, to: u32, message: Message) {
        self.outbox[to as usize].push(message);
    }

    /// Drain the readable messages of one vertex.
    pub fn take(&mut self, row: usize) -> Vec<Message> {
        std::mem::take(&mut self.inbox[row])
    }

    /// Drain every readable inbox at once.
    pub fn take_all(&mut self) -> Vec<Vec<Message>> {
        let empty = vec![Vec::new(); self.inbox.len()];
        std::mem::replace(&mut self.inbox, empty)
    }

    /// Make this superstep's deliveries readable in the next.
    fn flip(&mut self) {
        for slot in &mut self.inbox {
            slot.clear();
        }
        std::mem::swap(&mut self.inbox, &mut self.outbox);
    }
}

/// The partition-refinement engine.
///
/// Construct one from a [`Graph`] and a [`PartitionerConfig`], then either
/// [`run`](Partitioner::run) it to completion or drive it superstep by
/// superstep with [`step`](Partitioner::step) to observe barrier states.
pub struct Partitioner {
    cfg: PartitionerConfig,
    graph: Graph,
    /// Committed label per row; −1 before initialization.
    current: Vec<i16>,
    /// Pending proposal per row; equals `current` outside a propose/admit
    /// round trip.
    proposed: Vec<i16>,
    automata: AutomatonSlab,
    rngs: VertexStreams,
    mailboxes: Mailboxes,
    /// Aggregates reduced at the previous barrier (read side).
    agg: AggregateSet,
    /// Aggregates accumulating during the running superstep (write side).
    pending: AggregateSet,
    convergence: ConvergenceDetector,
    stats: RunStats,
    scores: ScoreBuffers,
    frequency: Vec<i64>,
    superstep: u32,
    halted: bool,
}

impl Partitioner {
    pub fn new(graph: Graph, cfg: PartitionerConfig) -> Result<Self, PartitionerError> {
        cfg.validate()?;
        graph.check_priors(cfg.partitions)?;
        let n = graph.len();
        let k_total = cfg.total_partitions();
        let current: Vec<i16> = (0..n).map(|row| graph.prior(row)).collect();
        let rngs = VertexStreams::new(cfg.rng_seed, graph.ids());
        let convergence = ConvergenceDetector::new(
            cfg.window_size,
            cfg.convergence_threshold,
            cfg.halt_on_convergence,
        );
        Ok(Self {
            proposed: current.clone(),
            current,
            automata: AutomatonSlab::new(n, k_total),
            rngs,
            mailboxes: Mailboxes::new(n),
            agg: AggregateSet::new(k_total),
            pending: AggregateSet::new(k_total),
            convergence,
            stats: RunStats::default(),
            scores: ScoreBuffers::new(k_total),
            frequency: vec![0; k_total],
            superstep: 0,
            halted: false,
            graph,
            cfg,
        })
    }

    /// Drive supersteps until the coordinator halts, then report.
    pub fn run(&mut self) -> Result<PartitionReport, PartitionerError> {
        while !self.step()? {}
        Ok(self.report())
    }

    /// Execute one superstep. Returns `true` once the coordinator has halted;
    /// aggregates and vertex state are then frozen at the last barrier.
    pub fn step(&mut self) -> Result<bool, PartitionerError> {
        if self.halted {
            return Ok(true);
        }
        if self.coordinator_halts() {
            self.halted = true;
            log::info!("halting at superstep {}", self.superstep);
            for (name, value) in self.report().counters() {
                log::info!("{name}: {value}");
            }
            return Ok(true);
        }
        match Stage::for_superstep(self.superstep, self.cfg.repartition) {
            Stage::Propagate => {} // targets are implicit in the adjacency
            Stage::ReconcileEdges => self.reconcile_edges(),
            Stage::Initialize => self.initialize(),
            Stage::Rescale => self.rescale()?,
            Stage::ProposeLabels => self.propose(),
            Stage::AdmitMigrations => self.admit_migrations(),
        }
        self.agg.absorb(&mut self.pending);
        self.mailboxes.flip();
        self.superstep += 1;
        Ok(false)
    }

    /// Sequencing decisions taken before each superstep: update the running
    /// statistics from the previous barrier, test convergence after admit
    /// supersteps, and stop at the superstep bound.
    fn coordinator_halts(&mut self) -> bool {
        let s = self.superstep;
        self.log_superstep_stats(s);
        self.stats.total_migrations += self.agg.migrations;
        self.stats.max_min_ratio = max_min_ratio(&self.agg.load);
        self.stats.max_normalized_load =
            max_normalized_load(&self.agg.load, self.agg.directed_edges);
        self.stats.score = self.agg.state;
        let mut converged = false;
        if s > 3 && s % 2 == 0 {
            converged = self.convergence.observe(s, self.agg.state);
        }
        converged || s >= self.cfg.max_iterations
    }

    fn log_superstep_stats(&self, superstep: u32) {
        if superstep <= 2 || !log::log_enabled!(log::Level::Debug) {
            return;
        }
        if superstep % 2 == 0 {
            log::debug!(
                "superstep {}: locality {:.4}, {} cut edges, max/min {:.3}, max normalized {:.3}",
                superstep,
                locality_fraction(self.agg.local_edges, self.agg.directed_edges),
                self.agg.cut_edges,
                max_min_ratio(&self.agg.load),
                max_normalized_load(&self.agg.load, self.agg.directed_edges),
            );
        } else {
            log::debug!("superstep {}: {} migrations", superstep, self.agg.migrations);
        }
    }

    /// The final counters and assignment, valid at any barrier.
    pub fn report(&self) -> PartitionReport {
        let assignment = (0..self.graph.len())
            .map(|row| (self.graph.id(row), self.current[row]))
            .collect();
        PartitionReport {
            iterations: self.superstep,
            migrations: self.stats.total_migrations,
            local_edge_fraction: locality_fraction(self.agg.local_edges, self.agg.directed_edges),
            max_min_ratio: self.stats.max_min_ratio,
            max_normalized_load: self.stats.max_normalized_load,
            score: self.stats.score,
            cut_edges: self.agg.cut_edges,
            directed_edges: self.agg.directed_edges,
            assignment,
        }
    }

    // -- inspection ---------------------------------------------------------

    pub fn superstep(&self) -> u32 {
        self.superstep
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn vertex_count(&self) -> usize {
        self.graph.len()
    }

    /// Per-partition loads as of the previous barrier.
    pub fn loads(&self) -> &[i64] {
        &self.agg.load
    }

    /// Total input-present edges as of the previous barrier.
    pub fn directed_edge_count(&self) -> u64 {
        self.agg.directed_edges
    }

    /// Migrations committed in the previous superstep.
    pub fn last_migrations(&self) -> u64 {
        self.agg.migrations
    }

    /// Summed per-vertex score from the previous propose superstep.
    pub fn last_state(&self) -> f64 {
        self.agg.state
    }

    /// Committed label of a vertex.
    pub fn partition_of(&self, id: i64) -> Option<i16> {
        self.graph.row(id).map(|row| self.current[row as usize])
    }

    /// Automaton probability vector of a vertex.
    pub fn probability_of(&self, id: i64) -> Option<&[f64]> {
        self.graph
            .row(id)
            .map(|row| self.automata.probability(row as usize))
    }

    pub fn config(&self) -> &PartitionerConfig {
        &self.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_dispatch_follows_the_schedule() {
        assert_eq!(Stage::for_superstep(0, 0), Stage::Propagate);
        assert_eq!(Stage::for_superstep(1, 0), Stage::ReconcileEdges);
        assert_eq!(Stage::for_superstep(2, 0), Stage::Initialize);
        assert_eq!(Stage::for_superstep(2, -1), Stage::Rescale);
        assert_eq!(Stage::for_superstep(3, 0), Stage::ProposeLabels);
        assert_eq!(Stage::for_superstep(4, 0), Stage::AdmitMigrations);
        assert_eq!(Stage::for_superstep(289, 0), Stage::ProposeLabels);
        assert_eq!(Stage::for_superstep(290, 0), Stage::AdmitMigrations);
    }

    #[test]
    fn mailboxes_become_readable_after_flip() {
        let mut boxes = Mailboxes::new(2);
        boxes.deliver(
            1,
            Message {
                source: 0,
                partition: 3,
                signal: 0.0,
            },
        );
        assert!(boxes.take(1).is_empty());
        boxes.flip();
        let msgs = boxes.take(1);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].partition, 3);
        boxes.flip();
        assert!(boxes.take(1).is_empty());
    }
}
