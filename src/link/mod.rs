//! Transport-facing ends of a fragmenting link.
//!
//! [`Sender`] drives a [`Fragmenter`](crate::fragment::Fragmenter) over a
//! [`DatagramSink`](crate::transport::DatagramSink); [`Receiver`] feeds a
//! [`Reassembler`](crate::fragment::Reassembler) from a
//! [`DatagramSource`](crate::transport::DatagramSource).

mod receiver;
mod sender;

pub use receiver::Receiver;
pub use sender::Sender;
