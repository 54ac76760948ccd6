//! Fountaincast: one-way, loss-tolerant file distribution over UDP.
//!
//! A server splits a file into fixed-size blocks and streams rateless
//! fountain-coded packets; a receiver that collects enough of them rebuilds
//! the file with no per-packet retransmission. Encoder and decoder stay in
//! lockstep through a shared deterministic generator seeded per packet.

pub mod block;
pub mod cli;
pub mod decoder;
pub mod distribution;
pub mod fountain;
pub mod randgen;
pub mod server;
pub mod transport;
pub mod wire;

pub use crate::block::{BlockStore, FileMetadata};
pub use crate::cli::Cli;
pub use crate::decoder::Decoder;
pub use crate::fountain::{Encoder, FountainPacket};
pub use crate::server::Server;
pub use crate::transport::UdpTransport;
