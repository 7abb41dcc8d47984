//! Windowed convergence detection over the global score.
//!
//! The coordinator feeds the detector the summed per-vertex score after each
//! propose superstep. Once the run is past the warm-up (`3 + window_size`
//! supersteps), the relative step `|1 − state / best-in-window|` is compared
//! against the threshold. Detection is recorded unconditionally but only
//! halts the run when `halt_on_convergence` is set; the historical behavior
//! is to keep refining until the superstep bound.

use std::collections::VecDeque;

#[derive(Debug)]
pub struct ConvergenceDetector {
    window_size: usize,
    threshold: f64,
    halt_on_convergence: bool,
    history: VecDeque<f64>,
}

impl ConvergenceDetector {
    pub fn new(window_size: usize, threshold: f64, halt_on_convergence: bool) -> Self {
        Self {
            window_size,
            threshold,
            halt_on_convergence,
            history: VecDeque::with_capacity(window_size + 1),
        }
    }

    /// Record a new score observation; returns whether the run should halt.
    pub fn observe(&mut self, superstep: u32, state: f64) -> bool {
        let mut converged = false;
        if superstep as usize > 3 + self.window_size {
            let best = self
                .history
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);
            let step = (1.0 - state / best).abs();
            log::debug!("best state {best}, new state {state}, step {step}");
            converged = step < self.threshold;
            self.history.pop_front();
        }
        self.history.push_back(state);
        converged && self.halt_on_convergence
    }
}
