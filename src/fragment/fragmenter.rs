//! Outbound helper that splits logical messages into transport fragments.
//!
//! [`Fragmenter`] owns the sender-side state: the stream's [`MessageId`], the
//! MTU, and the wrapping [`FragmentSequence`] cursor. Planning a split does not
//! touch that state; the cursor only moves when the caller reports a fragment
//! as emitted via [`Fragmenter::advance`]. A transport failure halfway through
//! a message therefore leaves the cursor pointing at the first fragment that
//! was never sent.

use std::num::NonZeroUsize;

use bytes::Bytes;

use super::{FragmentHeader, FragmentKind, FragmentSequence, HEADER_LEN, MessageId};
use crate::{
    buffer::{ByteSink, FrameBuffer},
    byte_order::ByteOrder,
    error::ConfigError,
};

/// Splits logical messages into MTU-sized fragments.
#[derive(Clone, Debug)]
pub struct Fragmenter {
    message_id: MessageId,
    mtu: NonZeroUsize,
    payload_cap: NonZeroUsize,
    byte_order: ByteOrder,
    sequence: FragmentSequence,
}

impl Fragmenter {
    /// Create a fragmenter for `message_id` emitting fragments of at most
    /// `mtu` bytes including the header.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MtuTooSmall`] when `mtu` cannot hold the header
    /// plus at least one payload byte.
    pub fn new(message_id: MessageId, mtu: NonZeroUsize) -> Result<Self, ConfigError> {
        let payload_cap = payload_capacity(mtu)?;
        Ok(Self {
            message_id,
            mtu,
            payload_cap,
            byte_order: ByteOrder::default(),
            sequence: FragmentSequence::zero(),
        })
    }

    /// Use `order` when encoding headers.
    #[must_use]
    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    /// Start the fragment stream at `sequence` instead of zero.
    #[must_use]
    pub fn with_starting_sequence(mut self, sequence: FragmentSequence) -> Self {
        self.sequence = sequence;
        self
    }

    /// Identifier stamped on every fragment.
    #[must_use]
    pub const fn message_id(&self) -> MessageId { self.message_id }

    /// Maximum encoded fragment size.
    #[must_use]
    pub const fn mtu(&self) -> NonZeroUsize { self.mtu }

    /// Maximum payload bytes per fragment.
    #[must_use]
    pub const fn payload_cap(&self) -> NonZeroUsize { self.payload_cap }

    /// Header byte order.
    #[must_use]
    pub const fn byte_order(&self) -> ByteOrder { self.byte_order }

    /// Sequence number the next emitted fragment will carry.
    #[must_use]
    pub const fn sequence(&self) -> FragmentSequence { self.sequence }

    /// Number of fragments `payload_len` bytes will be split into.
    #[must_use]
    pub fn fragment_count(&self, payload_len: usize) -> usize {
        if payload_len + HEADER_LEN <= self.mtu.get() {
            1
        } else {
            payload_len.div_ceil(self.payload_cap.get())
        }
    }

    /// Plan the fragments for `payload` starting at the current cursor.
    ///
    /// The returned iterator borrows only `payload`, so the caller may call
    /// [`advance`](Self::advance) between items.
    #[must_use]
    pub fn plan<'a>(&self, payload: &'a [u8]) -> Fragments<'a> {
        Fragments {
            message_id: self.message_id,
            byte_order: self.byte_order,
            sequence: self.sequence,
            payload,
            cap: self.payload_cap.get(),
            total: self.fragment_count(payload.len()),
            emitted: 0,
        }
    }

    /// Record that one fragment has been emitted.
    pub fn advance(&mut self) { self.sequence = self.sequence.next(); }

    /// Split `payload` and advance the cursor past every fragment.
    ///
    /// Suited to callers that hand fragments to an infallible sink; transports
    /// that can fail mid-message should drive [`plan`](Self::plan) and
    /// [`advance`](Self::advance) themselves.
    pub fn fragment<'a>(&mut self, payload: &'a [u8]) -> Vec<FragmentFrame<'a>> {
        let frames: Vec<_> = self.plan(payload).collect();
        self.sequence = self.sequence.advance(frames.len());
        frames
    }
}

/// Payload bytes a datagram of `mtu` bytes can carry after the header.
///
/// # Errors
///
/// Returns [`ConfigError::MtuTooSmall`] when nothing is left for payload.
pub(crate) fn payload_capacity(mtu: NonZeroUsize) -> Result<NonZeroUsize, ConfigError> {
    mtu.get()
        .checked_sub(HEADER_LEN)
        .and_then(NonZeroUsize::new)
        .ok_or(ConfigError::MtuTooSmall {
            mtu,
            header: HEADER_LEN,
        })
}

/// Iterator over the planned fragments of one message.
#[derive(Clone, Debug)]
pub struct Fragments<'a> {
    message_id: MessageId,
    byte_order: ByteOrder,
    sequence: FragmentSequence,
    payload: &'a [u8],
    cap: usize,
    total: usize,
    emitted: usize,
}

impl<'a> Iterator for Fragments<'a> {
    type Item = FragmentFrame<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted == self.total {
            return None;
        }
        let kind = match (self.total, self.emitted) {
            (1, _) => FragmentKind::Full,
            (_, 0) => FragmentKind::Start,
            (total, index) if index + 1 == total => FragmentKind::End,
            _ => FragmentKind::Middle,
        };
        let take = if kind == FragmentKind::Full {
            self.payload.len()
        } else {
            self.cap.min(self.payload.len())
        };
        let (chunk, rest) = self.payload.split_at(take);
        self.payload = rest;

        let header = FragmentHeader::new(self.message_id, kind, self.sequence);
        self.sequence = self.sequence.next();
        self.emitted += 1;
        Some(FragmentFrame {
            header,
            byte_order: self.byte_order,
            payload: chunk,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.emitted;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Fragments<'_> {}

/// Header and payload slice for a single outbound fragment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FragmentFrame<'a> {
    header: FragmentHeader,
    byte_order: ByteOrder,
    payload: &'a [u8],
}

impl<'a> FragmentFrame<'a> {
    /// Return the fragment header.
    #[must_use]
    pub const fn header(&self) -> &FragmentHeader { &self.header }

    /// Return the fragment payload bytes.
    #[must_use]
    pub const fn payload(&self) -> &'a [u8] { self.payload }

    /// Size of the encoded fragment on the wire.
    #[must_use]
    pub const fn encoded_len(&self) -> usize { HEADER_LEN + self.payload.len() }

    /// Append the encoded fragment to `sink`.
    pub fn encode_into(&self, sink: &mut impl ByteSink) {
        sink.write_bytes(&self.header.encode(self.byte_order));
        sink.write_bytes(self.payload);
    }

    /// Encode the fragment into a standalone datagram.
    #[must_use]
    pub fn to_datagram(&self) -> Bytes {
        let mut buf = FrameBuffer::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf.freeze()
    }
}
