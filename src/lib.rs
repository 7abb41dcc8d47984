//! # lapwing
//!
//! lapwing is a Rust library for edge-balanced k-way partitioning of large
//! directed graphs. It refines a labeling by iterative label propagation
//! steered by per-vertex learning automata: every vertex scores the candidate
//! partitions from its neighborhood labels and the global load picture,
//! samples a proposal from its automaton, and migrates subject to
//! capacity-proportional admission. The same machinery adapts an existing
//! partitioning to graph mutations or to a changed partition count.
//!
//! ## Model
//!
//! Execution is bulk-synchronous: vertices run in lock-step supersteps,
//! observing only the previous superstep's messages and the aggregates
//! reduced at the previous barrier. The engine keeps the number of edges
//! adjacent to each partition within a configurable tolerance of the
//! balanced share while maximizing the fraction of edges whose endpoints
//! share a label.
//!
//! ## Usage
//!
//! ```
//! use lapwing::prelude::*;
//!
//! let mut builder = GraphBuilder::new();
//! builder.edge(0, 1, 1);
//! builder.edge(1, 2, 1);
//! builder.edge(2, 0, 1);
//!
//! let cfg = PartitionerConfig {
//!     partitions: 2,
//!     max_iterations: 40,
//!     ..Default::default()
//! };
//! let mut partitioner = Partitioner::new(builder.build(), cfg)?;
//! let report = partitioner.run()?;
//! assert_eq!(report.assignment.len(), 3);
//! # Ok::<(), lapwing::PartitionerError>(())
//! ```
//!
//! Determinism: every vertex draws from its own stream seeded from
//! `rng_seed` and the vertex id, so runs with identical inputs and seeds
//! reproduce the full migration sequence.

pub mod aggregate;
pub mod automaton;
pub mod config;
pub mod convergence;
pub mod engine;
pub mod error;
pub mod graph;
pub mod io;
pub mod metrics;
pub mod rng;
pub mod score;
pub mod wire;

pub use crate::config::{PartitionerConfig, Reinforcement};
pub use crate::engine::{Partitioner, Stage};
pub use crate::error::PartitionerError;
pub use crate::graph::{Graph, GraphBuilder};
pub use crate::metrics::PartitionReport;

/// The most-used types in one import.
pub mod prelude {
    pub use crate::config::{PartitionerConfig, Reinforcement};
    pub use crate::engine::{Partitioner, Stage};
    pub use crate::error::PartitionerError;
    pub use crate::graph::{Graph, GraphBuilder};
    pub use crate::io::{graph_from_readers, write_assignment};
    pub use crate::metrics::PartitionReport;
}
