//! Canonical error and result types for the crate.
//!
//! Transport failures, protocol violations surfaced to callers, and
//! configuration mistakes are kept in separate enums so each layer only
//! reports what it can actually produce. [`LinkError`] joins the first two for
//! the [`Receiver`](crate::link::Receiver) surface.

use std::num::NonZeroUsize;

use thiserror::Error;

pub use crate::transport::TransportError;

/// Protocol-level failures visible to callers.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// A read requested more bytes than the buffer or message holds.
    #[error("read past available data: requested {requested} bytes, {available} available")]
    ReadPastAvailable {
        /// Number of bytes the caller asked for.
        requested: usize,
        /// Number of unread bytes that were available.
        available: usize,
    },
    /// A datagram was too short to carry a fragment header.
    #[error("datagram of {len} bytes is shorter than the fragment header")]
    TruncatedHeader {
        /// Length of the offending datagram.
        len: usize,
    },
}

/// Errors raised while validating link configuration.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The MTU leaves no room for payload after the fragment header.
    #[error("mtu {mtu} must exceed the {header} byte fragment header")]
    MtuTooSmall {
        /// Configured MTU.
        mtu: NonZeroUsize,
        /// Fixed header size.
        header: usize,
    },
}

/// Top-level error type for link operations.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The underlying transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// A protocol rule was violated.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl LinkError {
    /// Returns true if the transport has been torn down.
    ///
    /// Callers treat this as a shutdown signal rather than a transient fault.
    #[must_use]
    pub fn is_closed(&self) -> bool { matches!(self, Self::Transport(TransportError::Closed)) }
}

/// Canonical result alias used by `fraglink` link APIs.
pub type Result<T> = std::result::Result<T, LinkError>;
