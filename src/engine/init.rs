//! Reconciliation, initialization, and rescaling stages.

use rand::Rng;

use super::{Message, Partitioner};
use crate::error::PartitionerError;

impl Partitioner {
    /// Superstep 1: symmetrize the adjacency, flag input-present directions,
    /// and publish the directed-edge total.
    pub(super) fn reconcile_edges(&mut self) {
        let directed = self.graph.reconcile(self.cfg.edge_weight);
        self.pending.directed_edges += directed;
    }

    /// Superstep 2 (fresh run): keep prior labels where present, draw a
    /// uniform label otherwise, seed every automaton, publish initial loads,
    /// and announce labels to neighbors.
    pub(super) fn initialize(&mut self) {
        let k = self.cfg.partitions as i16;
        for row in 0..self.graph.len() {
            let mut partition = self.current[row];
            if partition < 0 {
                partition = self.rngs.for_row(row).gen_range(0..k);
            }
            self.place(row, partition);
        }
    }

    /// Superstep 2 (Δ ≠ 0): adapt a prior labeling to the new partition
    /// count. Shrinking reassigns vertices of removed partitions uniformly
    /// among survivors; growing moves each vertex into one of the new
    /// partitions with probability Δ/(k+Δ).
    pub(super) fn rescale(&mut self) -> Result<(), PartitionerError> {
        let delta = self.cfg.repartition;
        if delta == 0 {
            return Err(PartitionerError::InvalidRepartition {
                partitions: self.cfg.partitions,
                delta,
            });
        }
        let k = self.cfg.partitions as i16;
        let k_total = self.cfg.total_partitions() as i16;
        let grow_probability = delta.max(0) as f64 / k_total as f64;
        for row in 0..self.graph.len() {
            let prior = self.current[row];
            let rng = self.rngs.for_row(row);
            let partition = if prior < 0 {
                // vertices added since the prior run start fresh
                rng.gen_range(0..k_total)
            } else if delta < 0 {
                if prior >= k_total {
                    rng.gen_range(0..k_total)
                } else {
                    prior
                }
            } else if rng.gen::<f64>() < grow_probability {
                k + rng.gen_range(0..delta)
            } else {
                prior
            };
            self.place(row, partition);
        }
        Ok(())
    }

    /// Commit an initial label: seed the automaton, account the load, and
    /// announce to all neighbors.
    fn place(&mut self, row: usize, partition: i16) {
        self.automata.seed_uniform(row);
        self.current[row] = partition;
        self.proposed[row] = partition;
        self.pending.load[partition as usize] += self.graph.directed_degree(row) as i64;
        for slot in self.graph.neighbors(row) {
            self.mailboxes.deliver(
                slot.nbr,
                Message {
                    source: row as u32,
                    partition,
                    signal: 0.0,
                },
            );
        }
    }
}
