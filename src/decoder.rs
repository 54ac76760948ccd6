//! Peeling decoder: the receiving half of the fountain code.
//!
//! Degree-1 packets resolve a source block directly; every known block is then
//! XORed out of the remaining packets, which lowers their effective degree and
//! releases further blocks. Duplicate, reordered and lost packets are all
//! harmless, which is the point of the code.

use thiserror::Error;

use crate::block::FileMetadata;
use crate::fountain::FountainPacket;

#[derive(Error, Debug)]
pub enum DecoderError {
    #[error("Payload size {got} does not match block size {want}")]
    PayloadSizeMismatch { got: usize, want: usize },
}

/// One received packet reduced against the blocks decoded so far.
struct Equation {
    indices: Vec<u16>,
    payload: Vec<u8>,
}

pub struct Decoder {
    block_size: u16,
    block_count: u16,
    file_size: u32,
    decoded: Vec<Option<Vec<u8>>>,
    pending: Vec<Equation>,
}

impl Decoder {
    pub fn new(metadata: &FileMetadata) -> Self {
        Self {
            block_size: metadata.block_size,
            block_count: metadata.block_count,
            file_size: metadata.file_size,
            decoded: vec![None; metadata.block_count as usize],
            pending: Vec::new(),
        }
    }

    pub fn blocks_decoded(&self) -> usize {
        self.decoded.iter().filter(|b| b.is_some()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.decoded.iter().all(|b| b.is_some())
    }

    /// Absorb one packet, replaying its block selection from the carried seed,
    /// then peel as far as possible.
    pub fn absorb(&mut self, packet: &FountainPacket) -> Result<(), DecoderError> {
        if packet.payload().len() != self.block_size as usize {
            return Err(DecoderError::PayloadSizeMismatch {
                got: packet.payload().len(),
                want: self.block_size as usize,
            });
        }

        let mut equation = Equation {
            indices: packet.selection(self.block_count),
            payload: packet.payload().to_vec(),
        };
        self.reduce(&mut equation);

        match equation.indices.len() {
            0 => {} // Fully redundant with what we already know.
            1 => self.resolve(equation.indices[0], equation.payload),
            _ => self.pending.push(equation),
        }
        Ok(())
    }

    /// XOR already-decoded blocks out of an equation.
    fn reduce(&self, equation: &mut Equation) {
        let mut unresolved = Vec::with_capacity(equation.indices.len());
        for &index in &equation.indices {
            match &self.decoded[index as usize] {
                Some(block) => {
                    for (out, &byte) in equation.payload.iter_mut().zip(block) {
                        *out ^= byte;
                    }
                }
                None => unresolved.push(index),
            }
        }
        equation.indices = unresolved;
    }

    /// Record a newly decoded block and re-peel the pending set until no more
    /// equations collapse.
    fn resolve(&mut self, index: u16, block: Vec<u8>) {
        if self.decoded[index as usize].is_some() {
            return;
        }
        self.decoded[index as usize] = Some(block);

        loop {
            let mut progressed = false;
            for mut equation in std::mem::take(&mut self.pending) {
                self.reduce(&mut equation);
                match equation.indices.len() {
                    0 => {}
                    1 => {
                        let released = equation.indices[0] as usize;
                        if self.decoded[released].is_none() {
                            self.decoded[released] = Some(equation.payload);
                            progressed = true;
                        }
                    }
                    _ => self.pending.push(equation),
                }
            }
            if !progressed {
                break;
            }
        }
    }

    /// Reassembled file contents, truncated to the original size, once every
    /// block is recovered.
    pub fn data(&self) -> Option<Vec<u8>> {
        if !self.is_complete() {
            return None;
        }
        let mut out = Vec::with_capacity(self.block_count as usize * self.block_size as usize);
        for block in &self.decoded {
            out.extend_from_slice(block.as_ref().unwrap());
        }
        out.truncate(self.file_size as usize);
        Some(out)
    }
}
