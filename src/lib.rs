#![doc(html_root_url = "https://docs.rs/fraglink/latest")]
//! Public API for the `fraglink` library.
//!
//! This crate carries logical messages larger than one datagram over an
//! unreliable datagram transport. The sender splits each message into
//! fragments tagged with a four-byte header; the receiver rebuilds messages
//! from fragments that may arrive out of order, duplicated, or not at all,
//! holding at most a fixed number of fragments while it waits.

pub mod buffer;
pub mod byte_order;
pub mod config;
pub mod error;
pub mod fragment;
pub mod link;
pub mod metrics;
pub mod transport;

pub use buffer::{ByteSink, ByteSource, FrameBuffer};
pub use byte_order::ByteOrder;
pub use config::LinkConfig;
pub use error::{ConfigError, LinkError, ProtocolError, Result, TransportError};
pub use fragment::{
    FragmentFrame,
    FragmentHeader,
    FragmentKind,
    FragmentSequence,
    Fragmenter,
    HEADER_LEN,
    MessageId,
    ReassembledMessage,
    Reassembler,
};
pub use link::{Receiver, Sender};
pub use metrics::{DUPLICATES_TOTAL, Direction, EVICTIONS_TOTAL, FRAGMENTS_TOTAL, MESSAGES_TOTAL, POOL_RECORDS};
pub use transport::{DatagramSink, DatagramSource, UdpTransport};
