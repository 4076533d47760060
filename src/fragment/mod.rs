//! Fragment primitives for splitting and re-joining logical messages.
//!
//! This module collects the wire types and the two sans-IO engines of the
//! split-packet protocol: [`Fragmenter`] on the sending side and
//! [`Reassembler`] on the receiving side. Each sub-module focuses on a single
//! concept; the transport-facing wrappers live in [`crate::link`].

pub mod fragmenter;
pub mod header;
pub mod id;
pub mod message;
pub mod reassembler;
pub mod sequence;

pub use fragmenter::{FragmentFrame, Fragmenter, Fragments};
pub use header::{FragmentHeader, FragmentKind, HEADER_LEN};
pub use id::MessageId;
pub use message::ReassembledMessage;
pub use reassembler::Reassembler;
pub use sequence::FragmentSequence;
