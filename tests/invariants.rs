//! Barrier-level invariants checked while single-stepping the engine.

use lapwing::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Deterministic sparse random graph: two dense blocks with a few bridges.
fn test_graph(seed: u64) -> Graph {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut builder = GraphBuilder::new();
    for id in 0..20 {
        builder.vertex(id, -1);
    }
    for block in 0..2i64 {
        let base = block * 10;
        for u in 0..10 {
            for v in (u + 1)..10 {
                if rng.gen::<f64>() < 0.4 {
                    builder.edge(base + u, base + v, 1);
                }
            }
        }
    }
    builder.edge(0, 10, 1);
    builder.edge(5, 15, 1);
    builder.build()
}

// Every vertex of the test graph sources at most 10 input edges (9 block
// neighbors plus a bridge), which bounds the load a single admission round
// can overshoot by.
const MAX_DIRECTED_DEGREE: i64 = 10;

#[test]
fn barrier_invariants_hold_throughout_the_run() {
    let cfg = PartitionerConfig {
        partitions: 3,
        max_iterations: 40,
        rng_seed: 9,
        ..Default::default()
    };
    let mut partitioner = Partitioner::new(test_graph(13), cfg).unwrap();
    let n = partitioner.vertex_count();
    let mut total_migrations = 0u64;

    loop {
        if partitioner.step().unwrap() {
            break;
        }
        let superstep = partitioner.superstep();
        if superstep >= 3 {
            let loads = partitioner.loads();
            let directed = partitioner.directed_edge_count() as i64;

            // load conservation
            assert_eq!(
                loads.iter().sum::<i64>(),
                directed,
                "load leak at superstep {superstep}"
            );
            assert!(loads.iter().all(|&l| l >= 0), "negative load: {loads:?}");

            // bounded imbalance: loads may overshoot the capacity only by the
            // stochastic slack of a single admission round
            let capacity = (directed as f64 * 1.05 / 3.0).round() as i64;
            let bound = capacity + 2 * MAX_DIRECTED_DEGREE;
            for (i, &load) in loads.iter().enumerate() {
                assert!(
                    load <= bound,
                    "partition {i} exceeds capacity at superstep {superstep}: {load} > {bound}"
                );
            }

            // assignment validity and simplex preservation
            for id in 0..n as i64 {
                let label = partitioner.partition_of(id).unwrap();
                assert!((0..3).contains(&label), "vertex {id} has label {label}");
                let p = partitioner.probability_of(id).unwrap();
                let sum: f64 = p.iter().sum();
                assert!(
                    (sum - 1.0).abs() < 1e-9,
                    "vertex {id} off the simplex at superstep {superstep}: {sum}"
                );
                assert!(p.iter().all(|&x| x >= 0.0));
            }

            // migrations are bounded per superstep and in total
            let migrations = partitioner.last_migrations();
            assert!(migrations <= n as u64);
            total_migrations += migrations;
        }
    }
    assert!(total_migrations <= 40 * n as u64);
}

#[test]
fn halted_engine_is_stable() {
    let cfg = PartitionerConfig {
        partitions: 2,
        max_iterations: 20,
        ..Default::default()
    };
    let mut partitioner = Partitioner::new(test_graph(4), cfg).unwrap();
    let report = partitioner.run().unwrap();
    assert!(partitioner.is_halted());
    assert_eq!(report.iterations, 20);
    // stepping a halted engine is a no-op
    assert!(partitioner.step().unwrap());
    assert_eq!(partitioner.superstep(), 20);
}
