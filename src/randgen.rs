//! Deterministic linear congruential generator shared by encoder and decoder.
//!
//! The sender and the receiver must compute bit-identical draw sequences from
//! the seed carried in each packet, so the generator is a pure function of its
//! input seed with no hidden state. The constants are the classic glibc-style
//! LCG (multiplier 1103515245, increment 12345) evaluated with wrapping u64
//! arithmetic; the draw takes bits 16..31 of the new state.

/// Largest value a draw can take.
pub const RAND_MAX: u16 = 32767;

const MULTIPLIER: u64 = 1103515245;
const INCREMENT: u64 = 12345;

/// One step of the generator: the state to thread into the next call plus the
/// 15-bit draw extracted from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub next_seed: u64,
    pub value: u16,
}

/// Advance the generator by one step.
///
/// Total function: every u64 seed maps to exactly one `Draw`, and overflow is
/// defined (wrapping) behavior rather than an error. Any change to the operand
/// widths or the truncation order here silently breaks decodability.
pub fn advance(seed: u64) -> Draw {
    let next_seed = seed.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
    Draw {
        next_seed,
        value: ((next_seed / 65536) % 32768) as u16,
    }
}
