//! The score-and-propose stage (odd supersteps).

use super::{Message, Partitioner};
use crate::automaton::select_action;
use crate::config::Reinforcement;
use crate::score::{total_capacity, SpeculativeLoads};

impl Partitioner {
    /// Absorb neighbor announcements, score every candidate partition, pick
    /// a proposal through the automaton, announce the reinforcement target,
    /// and register demand for proposed moves.
    ///
    /// Vertices are swept in row order over a shared [`SpeculativeLoads`]
    /// snapshot, so each proposal immediately shifts the load later vertices
    /// are scored against.
    pub(super) fn propose(&mut self) {
        let k_total = self.cfg.total_partitions();
        let capacity = total_capacity(
            self.agg.directed_edges,
            self.cfg.additional_capacity,
            k_total,
        );
        let mut loads = SpeculativeLoads::snapshot(&self.agg.load);

        for row in 0..self.graph.len() {
            let messages = self.mailboxes.take(row);
            let active = !messages.is_empty();
            for m in &messages {
                debug_assert_eq!(m.signal, 0.0, "reinforcement message in a propose superstep");
                self.graph.notify(row, m.source, m.partition);
            }
            if self.graph.degree(row) == 0 {
                // nothing to score and nowhere to go
                continue;
            }
            let current = self.current[row];
            debug_assert!(current >= 0, "vertex scored before initialization");

            self.frequency.fill(0);
            let mut total_labels = 0i64;
            for slot in self.graph.neighbors(row) {
                debug_assert!(slot.partition >= 0);
                self.frequency[slot.partition as usize] += slot.weight as i64;
                total_labels += slot.weight as i64;
                if slot.directed {
                    if slot.partition == current {
                        self.pending.local_edges += 1;
                    } else {
                        self.pending.cut_edges += 1;
                    }
                }
            }

            let max_partition = self.scores.compute(
                &self.frequency,
                total_labels,
                &loads,
                capacity,
                self.cfg.lambda,
            );
            let proposal =
                select_action(self.automata.probability(row), self.rngs.for_row(row)) as i16;
            let announced = match self.cfg.reinforcement {
                Reinforcement::ArgmaxScore => max_partition as i16,
                Reinforcement::LaSample => proposal,
            };
            for slot in self.graph.neighbors(row) {
                self.mailboxes.deliver(
                    slot.nbr,
                    Message {
                        source: row as u32,
                        partition: announced,
                        signal: 1.0,
                    },
                );
            }
            self.automata.signal_mut(row)[announced as usize] += 1.0;

            if proposal != current && active {
                let edges = self.graph.directed_degree(row) as i64;
                self.proposed[row] = proposal;
                self.pending.demand[proposal as usize] += edges;
                loads.shift(current as usize, proposal as usize, edges);
            }
            self.pending.state += self.scores.score[current as usize];
        }
    }
}
