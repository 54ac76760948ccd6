//! Datagram transport abstraction.
//!
//! The dispatcher owns a transport value instead of a process-wide socket,
//! which lets tests substitute an in-memory implementation for the UDP one.

use std::io;
use std::net::SocketAddr;

use tokio::net::UdpSocket;

/// One-datagram-at-a-time send/receive surface the dispatcher drives.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send_to(&self, datagram: &[u8], target: SocketAddr) -> io::Result<usize>;
    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;
}

/// The production transport: a bound UDP socket.
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind the listening socket. A bind failure is fatal to startup.
    pub async fn bind(addr: &str) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl Transport for UdpTransport {
    async fn send_to(&self, datagram: &[u8], target: SocketAddr) -> io::Result<usize> {
        self.socket.send_to(datagram, target).await
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bind_and_echo_datagram() {
        let server = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        let client = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        let server_addr = server.local_addr().unwrap();

        client.send_to(b"ping", server_addr).await.unwrap();

        let mut buf = [0u8; 16];
        let (len, peer) = server.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..len], b"ping");
        assert_eq!(peer, client.local_addr().unwrap());
    }

    #[tokio::test]
    async fn bind_to_invalid_address_fails() {
        assert!(UdpTransport::bind("256.0.0.1:2534").await.is_err());
    }
}
