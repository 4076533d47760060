use std::io;

use thiserror::Error;

/// Failures raised by a datagram transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The socket reported an I/O failure.
    #[error("transport i/o error: {0}")]
    Io(#[from] io::Error),
    /// The peer or channel has gone away; no more datagrams will flow.
    #[error("transport closed")]
    Closed,
}
