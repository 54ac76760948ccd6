//! Session dispatcher: classifies inbound datagrams and answers with either a
//! metadata record or a burst of fountain packets.
//!
//! No per-client state survives a request. Failures while serving one request
//! are logged and contained; the loop goes straight back to receiving.

use std::io;
use std::sync::Arc;

use log::{debug, error, info};
use thiserror::Error;

use crate::block::BlockStore;
use crate::fountain::{Encoder, FountainError};
use crate::transport::Transport;
use crate::wire::{self, Request};

/// Packets sent in response to one burst request.
pub const BURST_SIZE: usize = 1000;

/// Receive buffer size; requests are tiny, this is headroom.
const BUF_LEN: usize = 512;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Receive failed: {0}")]
    Recv(#[source] io::Error),
}

#[derive(Error, Debug)]
enum RequestError {
    #[error("Encoding failed: {0}")]
    Encode(#[from] FountainError),
    #[error("Send failed: {0}")]
    Send(#[source] io::Error),
}

pub struct Server<T> {
    transport: T,
    store: Arc<BlockStore>,
}

impl<T: Transport> Server<T> {
    pub fn new(transport: T, store: Arc<BlockStore>) -> Self {
        Self { transport, store }
    }

    /// Serve requests until the transport fails to receive. One datagram is
    /// handled to completion before the next is read; a burst occupies the
    /// server for its full length.
    pub async fn run(&mut self) -> Result<(), ServerError> {
        let mut buf = vec![0u8; BUF_LEN];
        loop {
            let (len, peer) = self
                .transport
                .recv_from(&mut buf)
                .await
                .map_err(ServerError::Recv)?;

            match Request::classify(&buf[..len]) {
                Request::Info => {
                    debug!("metadata request from {peer}");
                    if let Err(e) = self.send_info(peer).await {
                        error!("metadata reply to {peer} failed: {e}");
                    }
                }
                Request::Burst => {
                    debug!("burst request from {peer}");
                    if let Err(e) = self.send_burst(peer).await {
                        error!("burst to {peer} aborted: {e}");
                    }
                }
                Request::Unknown(magic) => match magic {
                    Some(magic) => info!("ignoring unknown magic {magic:#010x} from {peer}"),
                    None => info!("ignoring short datagram ({len} bytes) from {peer}"),
                },
            }
        }
    }

    async fn send_info(&self, peer: std::net::SocketAddr) -> Result<(), RequestError> {
        let record = wire::encode_metadata(self.store.metadata());
        self.transport
            .send_to(&record, peer)
            .await
            .map_err(RequestError::Send)?;
        Ok(())
    }

    /// Emit exactly `BURST_SIZE` packets from a freshly seeded chain. A send
    /// or encode failure abandons the rest of the burst; the fountain's own
    /// redundancy stands in for retransmission.
    async fn send_burst(&self, peer: std::net::SocketAddr) -> Result<(), RequestError> {
        let mut encoder = Encoder::new(Arc::clone(&self.store), rand::random());
        for _ in 0..BURST_SIZE {
            let packet = encoder.next_packet()?;
            self.transport
                .send_to(&wire::encode_packet(&packet), peer)
                .await
                .map_err(RequestError::Send)?;
        }
        info!("sent burst of {BURST_SIZE} packets to {peer}");
        Ok(())
    }
}
