//! Unified error type for the partitioner public APIs.

use thiserror::Error;

/// Errors raised by configuration validation, input parsing, and the
/// partitioning engine.
#[derive(Debug, Error)]
pub enum PartitionerError {
    /// The target partition count must be at least 1.
    #[error("number of partitions must be positive (got {0})")]
    InvalidPartitionCount(i32),
    /// The rescale delta must leave at least one surviving partition.
    #[error("repartition delta {delta} must satisfy -k < delta (k = {partitions})")]
    InvalidRepartition { partitions: u16, delta: i16 },
    /// A learning rate was outside the unit interval.
    #[error("{name} must lie in [0, 1] (got {value})")]
    RateOutOfRange { name: &'static str, value: f64 },
    /// The convergence window must hold at least one sample.
    #[error("window size must be positive")]
    InvalidWindowSize,
    /// A vertex carried a prior label outside the configured partition range.
    #[error("prior partition {partition} of vertex {vertex} exceeds partition count {partitions}")]
    PriorOutOfRange {
        vertex: i64,
        partition: i16,
        partitions: u16,
    },
    /// A text input line could not be parsed.
    #[error("malformed input at line {line}: {reason}")]
    MalformedInput { line: usize, reason: String },
    /// Underlying I/O failure while reading input or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
