//! Datagram transport adapters.
//!
//! The link layer only needs two capabilities from the network: hand a
//! datagram to the peer, and wait for the next datagram from it. Both are
//! expressed as async traits so the same [`Sender`](crate::link::Sender) and
//! [`Receiver`](crate::link::Receiver) drive a real UDP socket or an
//! in-process channel. Delivery is unreliable in either case; loss, reordering
//! and duplication are handled above this layer.

mod error;
pub mod memory;
pub mod udp;

use async_trait::async_trait;
use bytes::Bytes;

pub use self::{
    error::TransportError,
    memory::{MemorySink, MemorySource, channel},
    udp::{ReplySink, UdpTransport},
};

/// Outbound half of a datagram transport.
///
/// Each call transmits exactly one datagram. Implementations must not split or
/// coalesce datagrams.
#[async_trait]
pub trait DatagramSink: Send {
    /// Transmit `datagram` as a single unit.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the datagram could not be handed to the
    /// network or the peer has gone away.
    async fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError>;
}

/// Inbound half of a datagram transport.
#[async_trait]
pub trait DatagramSource: Send {
    /// Wait for the next datagram.
    ///
    /// Implementations may truncate datagrams larger than their receive
    /// buffer.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] once no further datagrams can arrive,
    /// or [`TransportError::Io`] on socket failure.
    async fn recv(&mut self) -> Result<Bytes, TransportError>;
}

#[async_trait]
impl<T: DatagramSink + ?Sized> DatagramSink for Box<T> {
    async fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError> {
        (**self).send(datagram).await
    }
}

#[async_trait]
impl<T: DatagramSource + ?Sized> DatagramSource for Box<T> {
    async fn recv(&mut self) -> Result<Bytes, TransportError> { (**self).recv().await }
}
