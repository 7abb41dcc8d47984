//! Balance and locality statistics, and the final run report.

/// Running statistics maintained by the coordinator across supersteps.
#[derive(Debug, Default, Clone)]
pub struct RunStats {
    pub total_migrations: u64,
    pub max_min_ratio: f64,
    pub max_normalized_load: f64,
    pub score: f64,
}

/// Ratio of the heaviest to the lightest partition load. Infinite when some
/// partition is empty.
pub fn max_min_ratio(loads: &[i64]) -> f64 {
    let max = loads.iter().copied().max().unwrap_or(0);
    let min = loads.iter().copied().min().unwrap_or(0);
    if min == 0 {
        return f64::INFINITY;
    }
    max as f64 / min as f64
}

/// Heaviest partition load over the expected (perfectly balanced) load.
pub fn max_normalized_load(loads: &[i64], directed_edges: u64) -> f64 {
    if directed_edges == 0 {
        return 0.0;
    }
    let max = loads.iter().copied().max().unwrap_or(0);
    let expected = directed_edges as f64 / loads.len() as f64;
    max as f64 / expected
}

/// Fraction of input-present edges whose endpoints share a label.
pub fn locality_fraction(local_edges: u64, directed_edges: u64) -> f64 {
    if directed_edges == 0 {
        return 0.0;
    }
    local_edges as f64 / directed_edges as f64
}

/// Final outcome of a partitioning run.
#[derive(Debug, Clone)]
pub struct PartitionReport {
    /// Superstep index at which the coordinator halted.
    pub iterations: u32,
    /// Total successful migrations over the run.
    pub migrations: u64,
    /// Locality over input-present edges at the last propose superstep.
    pub local_edge_fraction: f64,
    /// Heaviest over lightest partition load at halt.
    pub max_min_ratio: f64,
    /// Heaviest load over the balanced expectation at halt.
    pub max_normalized_load: f64,
    /// Summed per-vertex score at the last propose superstep.
    pub score: f64,
    /// Cut input-present edges at the last propose superstep.
    pub cut_edges: u64,
    /// Total input-present edges.
    pub directed_edges: u64,
    /// `(vertex id, final partition)` in declaration order.
    pub assignment: Vec<(i64, i16)>,
}

impl PartitionReport {
    /// The report as integral job counters: percentages and scaled ratios,
    /// in emission order.
    pub fn counters(&self) -> Vec<(&'static str, i64)> {
        vec![
            ("migrations", self.migrations as i64),
            ("iterations", self.iterations as i64),
            (
                "local edges (%)",
                (100.0 * self.local_edge_fraction) as i64,
            ),
            (
                "maxmin unbalance (x1000)",
                (1000.0 * self.max_min_ratio) as i64,
            ),
            (
                "max normalized unbalance (x1000)",
                (1000.0 * self.max_normalized_load) as i64,
            ),
            ("score (x1000)", (1000.0 * self.score) as i64),
            ("cut edges", self.cut_edges as i64),
            ("directed edges", self.directed_edges as i64),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_of_balanced_loads_is_one() {
        assert_eq!(max_min_ratio(&[5, 5, 5]), 1.0);
    }

    #[test]
    fn empty_partition_reports_infinity() {
        assert!(max_min_ratio(&[5, 0, 3]).is_infinite());
    }

    #[test]
    fn normalized_load_against_expectation() {
        // 12 edges over 3 partitions, heaviest holds 6
        assert!((max_normalized_load(&[6, 3, 3], 12) - 1.5).abs() < 1e-12);
        assert_eq!(max_normalized_load(&[0, 0], 0), 0.0);
    }

    #[test]
    fn locality_handles_edgeless_graphs() {
        assert_eq!(locality_fraction(0, 0), 0.0);
        assert!((locality_fraction(3, 4) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn counters_scale_and_saturate() {
        let report = PartitionReport {
            iterations: 10,
            migrations: 4,
            local_edge_fraction: 0.875,
            max_min_ratio: f64::INFINITY,
            max_normalized_load: 1.05,
            score: 3.2,
            cut_edges: 1,
            directed_edges: 8,
            assignment: vec![],
        };
        let counters = report.counters();
        assert_eq!(counters[2], ("local edges (%)", 87));
        assert_eq!(counters[3].1, i64::MAX); // infinite ratio saturates
        assert_eq!(counters[4], ("max normalized unbalance (x1000)", 1050));
    }
}
