//! The admission and migration stage (even supersteps).

use rand::Rng;
use rayon::prelude::*;

use super::{Message, Partitioner};
use crate::automaton::{reinforce, Reinforce};
use crate::score::total_capacity;

impl Partitioner {
    /// Fold neighbor reinforcement into each automaton and update it, then
    /// commit proposed moves with probability proportional to the remaining
    /// capacity of the destination over its aggregate demand.
    ///
    /// The automaton sweep touches only row-local state and runs in
    /// parallel; admission draws and load accounting run sequentially in row
    /// order so the per-vertex streams stay reproducible.
    pub(super) fn admit_migrations(&mut self) {
        let k_total = self.cfg.total_partitions();
        let capacity = total_capacity(
            self.agg.directed_edges,
            self.cfg.additional_capacity,
            k_total,
        );
        let admission: Vec<f64> = (0..k_total)
            .map(|i| {
                let remaining = capacity - self.agg.load[i];
                let demand = self.agg.demand[i];
                if demand == 0 || remaining <= 0 {
                    0.0
                } else {
                    (remaining as f64 / demand as f64).min(1.0)
                }
            })
            .collect();

        let inbox = self.mailboxes.take_all();
        let ctx = Reinforce {
            superstep: self.superstep,
            max_iterations: self.cfg.max_iterations,
            alpha: self.cfg.alpha,
            beta: self.cfg.beta,
        };
        let proposed = &self.proposed;
        let admission_ref = &admission;
        self.automata
            .par_rows_mut()
            .for_each(|(row, probability, signal)| {
                for m in &inbox[row] {
                    let target = m.partition as usize;
                    // credit announcements we share or that are admissible
                    if m.partition == proposed[row] || admission_ref[target] > 0.0 {
                        signal[target] += m.signal;
                    }
                }
                reinforce(probability, signal, &ctx);
            });

        for row in 0..self.graph.len() {
            let current = self.current[row];
            let proposal = self.proposed[row];
            if proposal == current {
                continue;
            }
            let draw: f64 = self.rngs.for_row(row).gen();
            if draw < admission[proposal as usize] {
                self.current[row] = proposal;
                let edges = self.graph.directed_degree(row) as i64;
                self.pending.load[current as usize] -= edges;
                self.pending.load[proposal as usize] += edges;
                self.pending.migrations += 1;
                for slot in self.graph.neighbors(row) {
                    self.mailboxes.deliver(
                        slot.nbr,
                        Message {
                            source: row as u32,
                            partition: proposal,
                            signal: 0.0,
                        },
                    );
                }
            } else {
                self.proposed[row] = current;
            }
        }
    }
}
