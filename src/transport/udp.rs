//! UDP transport built on [`tokio::net::UdpSocket`].

use std::{io, net::SocketAddr, num::NonZeroUsize, sync::Arc};

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::net::{ToSocketAddrs, UdpSocket};
use tracing::trace;

use super::{DatagramSink, DatagramSource, TransportError};

/// A UDP socket exchanging datagrams of at most `mtu` bytes.
///
/// Receives land in a buffer of exactly `mtu` bytes, so longer datagrams are
/// truncated by the operating system. The address of the most recent sender is
/// remembered so replies can be routed back with [`UdpTransport::reply_sink`].
///
/// Sending through the [`DatagramSink`] impl requires a default peer set with
/// [`UdpTransport::connect`].
#[derive(Debug)]
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    mtu: NonZeroUsize,
    buf: BytesMut,
    last_peer: Option<SocketAddr>,
}

impl UdpTransport {
    /// Bind a socket to `addr`.
    ///
    /// # Errors
    ///
    /// Returns any I/O error reported while binding.
    pub async fn bind(addr: impl ToSocketAddrs, mtu: NonZeroUsize) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self::from_socket(socket, mtu))
    }

    /// Wrap an already bound socket.
    #[must_use]
    pub fn from_socket(socket: UdpSocket, mtu: NonZeroUsize) -> Self {
        Self {
            socket: Arc::new(socket),
            mtu,
            buf: BytesMut::with_capacity(mtu.get()),
            last_peer: None,
        }
    }

    /// Set the default destination for [`DatagramSink::send`] and filter
    /// inbound datagrams to that peer.
    ///
    /// # Errors
    ///
    /// Returns any I/O error reported while resolving or connecting.
    pub async fn connect(&self, addr: impl ToSocketAddrs) -> io::Result<()> {
        self.socket.connect(addr).await
    }

    /// Local address the socket is bound to.
    ///
    /// # Errors
    ///
    /// Returns any I/O error reported by the socket.
    pub fn local_addr(&self) -> io::Result<SocketAddr> { self.socket.local_addr() }

    /// Receive buffer size.
    #[must_use]
    pub const fn mtu(&self) -> NonZeroUsize { self.mtu }

    /// Address of the peer that sent the most recent datagram.
    #[must_use]
    pub const fn last_peer(&self) -> Option<SocketAddr> { self.last_peer }

    /// Receive one datagram along with its sender address.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Io`] if the socket fails.
    pub async fn recv_from(&mut self) -> Result<(Bytes, SocketAddr), TransportError> {
        self.buf.resize(self.mtu.get(), 0);
        let (len, peer) = self.socket.recv_from(&mut self.buf).await?;
        self.buf.truncate(len);
        self.last_peer = Some(peer);
        trace!(%peer, len, "udp datagram received");
        Ok((self.buf.split().freeze(), peer))
    }

    /// Sink addressed to the sender of the most recent datagram, if any has
    /// been received.
    #[must_use]
    pub fn reply_sink(&self) -> Option<ReplySink> { self.last_peer.map(|peer| self.sink_to(peer)) }

    /// Sink sharing this socket and addressed to `peer`.
    #[must_use]
    pub fn sink_to(&self, peer: SocketAddr) -> ReplySink {
        ReplySink {
            socket: Arc::clone(&self.socket),
            peer,
        }
    }
}

#[async_trait]
impl DatagramSink for UdpTransport {
    async fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError> {
        self.socket.send(datagram).await?;
        Ok(())
    }
}

#[async_trait]
impl DatagramSource for UdpTransport {
    async fn recv(&mut self) -> Result<Bytes, TransportError> {
        let (datagram, _) = self.recv_from().await?;
        Ok(datagram)
    }
}

/// Outbound handle sending to a fixed peer over a shared socket.
#[derive(Clone, Debug)]
pub struct ReplySink {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

impl ReplySink {
    /// Destination of every datagram sent through this sink.
    #[must_use]
    pub const fn peer(&self) -> SocketAddr { self.peer }
}

#[async_trait]
impl DatagramSink for ReplySink {
    async fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError> {
        self.socket.send_to(datagram, self.peer).await?;
        Ok(())
    }
}
