//! Degree and block-index sampling driven by the deterministic generator.
//!
//! Both functions are protocol constants: the receiver replays them from the
//! packet seed alone, so any change here is a wire-format change.

use crate::randgen::advance;

/// Map one generator draw to the number of source blocks to combine.
///
/// Policy: uniform over `[1, block_count]`. A soliton-shaped distribution
/// converges faster for large block counts, but uniform keeps the sender and
/// receiver trivially in lockstep and matches the small files this tool
/// targets.
pub fn degree(draw: u16, block_count: u16) -> u16 {
    debug_assert!(block_count >= 1);
    (draw % block_count) + 1
}

/// Draw `degree` distinct block indices in `[0, block_count)` by rejection
/// sampling, threading the generator state through and returning it for the
/// caller to chain.
///
/// Terminates for every `degree <= block_count`: the LCG has full period mod
/// 2^64, so the draw stream cannot get stuck repeating already-chosen indices.
pub fn select_indices(seed: u64, degree: u16, block_count: u16) -> (u64, Vec<u16>) {
    debug_assert!(degree >= 1 && degree <= block_count);

    let mut seed = seed;
    let mut indices = Vec::with_capacity(degree as usize);
    while indices.len() < degree as usize {
        let d = advance(seed);
        seed = d.next_seed;
        let index = d.value % block_count;
        if !indices.contains(&index) {
            indices.push(index);
        }
    }
    (seed, indices)
}
