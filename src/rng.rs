//! Deterministic per-vertex random number streams.
//!
//! Every vertex draws from its own [`SmallRng`], seeded from the run's global
//! seed mixed with the vertex id through SplitMix64. Two runs with the same
//! seed and the same graph therefore produce the same sequence of proposals
//! and admission draws, independent of how vertices were enumerated.

use rand::rngs::SmallRng;
use rand::SeedableRng;

/// Steele/Vigna SplitMix64 mixer used for deterministic seeding.
#[inline]
pub fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[inline]
fn mix_seed(global_seed: u64, vertex_id: u64) -> u64 {
    let x = global_seed
        ^ 0xD6E8_FEB8_6659_FD93u64
        ^ vertex_id.wrapping_mul(0x9E37_79B1_85EB_CA87);
    splitmix64(x)
}

/// One seeded [`SmallRng`] per vertex row.
pub struct VertexStreams {
    streams: Vec<SmallRng>,
}

impl VertexStreams {
    /// Seed one stream per vertex from `global_seed` and the vertex ids, in
    /// row order.
    pub fn new(global_seed: u64, ids: &[i64]) -> Self {
        let streams = ids
            .iter()
            .map(|&id| SmallRng::seed_from_u64(mix_seed(global_seed, id as u64)))
            .collect();
        Self { streams }
    }

    /// The stream owned by the vertex at `row`.
    #[inline]
    pub fn for_row(&mut self, row: usize) -> &mut SmallRng {
        &mut self.streams[row]
    }
}
