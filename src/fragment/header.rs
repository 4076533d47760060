//! Four-byte fragment header codec.
//!
//! ```text
//! offset 0: u16 message id
//! offset 2: u16 kind (bits 15-14) | sequence (bits 13-0)
//! offset 4..: payload
//! ```
//!
//! The header carries no checksum. Corrupted bits decode to whatever they
//! happen to say, which keeps the format wire-compatible with existing peers.

use super::{FragmentSequence, MessageId};
use crate::{byte_order::ByteOrder, error::ProtocolError};

/// Encoded size of a [`FragmentHeader`].
pub const HEADER_LEN: usize = 4;

const KIND_SHIFT: u16 = 14;

/// Role of a fragment within its logical message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    /// The whole message in a single fragment.
    Full,
    /// First fragment of a split message.
    Start,
    /// Interior fragment of a split message.
    Middle,
    /// Last fragment of a split message.
    End,
}

impl FragmentKind {
    /// Two-bit wire code: `00` full, `01` start, `11` middle, `10` end.
    #[must_use]
    pub const fn bits(self) -> u16 {
        match self {
            Self::Full => 0b00,
            Self::Start => 0b01,
            Self::Middle => 0b11,
            Self::End => 0b10,
        }
    }

    /// Decode the two-bit wire code. Only the low two bits are inspected.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0b00 => Self::Full,
            0b01 => Self::Start,
            0b11 => Self::Middle,
            _ => Self::End,
        }
    }
}

/// Header describing a single fragment.
///
/// # Examples
///
/// ```
/// use fraglink::{
///     byte_order::ByteOrder,
///     fragment::{FragmentHeader, FragmentKind, FragmentSequence, MessageId},
/// };
/// let header = FragmentHeader::new(MessageId::new(7), FragmentKind::Middle, FragmentSequence::new(1));
/// let bytes = header.encode(ByteOrder::Big);
/// assert_eq!(bytes, [0x00, 0x07, 0xC0, 0x01]);
/// assert_eq!(FragmentHeader::decode(bytes, ByteOrder::Big), header);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FragmentHeader {
    message_id: MessageId,
    kind: FragmentKind,
    sequence: FragmentSequence,
}

impl FragmentHeader {
    /// Create a new fragment header.
    #[must_use]
    pub const fn new(message_id: MessageId, kind: FragmentKind, sequence: FragmentSequence) -> Self {
        Self {
            message_id,
            kind,
            sequence,
        }
    }

    /// Return the logical stream identifier.
    #[must_use]
    pub const fn message_id(&self) -> MessageId { self.message_id }

    /// Return the fragment's role in its message.
    #[must_use]
    pub const fn kind(&self) -> FragmentKind { self.kind }

    /// Return the fragment's stream position.
    #[must_use]
    pub const fn sequence(&self) -> FragmentSequence { self.sequence }

    /// Pack kind and sequence into the second header word.
    #[must_use]
    pub const fn type_and_sequence(&self) -> u16 {
        (self.kind.bits() << KIND_SHIFT) | self.sequence.get()
    }

    /// Encode the header into its four wire bytes.
    #[must_use]
    pub const fn encode(&self, order: ByteOrder) -> [u8; HEADER_LEN] {
        let id = order.write_u16(self.message_id.get());
        let word = order.write_u16(self.type_and_sequence());
        [id[0], id[1], word[0], word[1]]
    }

    /// Decode a header from its four wire bytes.
    #[must_use]
    pub const fn decode(bytes: [u8; HEADER_LEN], order: ByteOrder) -> Self {
        let id = order.read_u16([bytes[0], bytes[1]]);
        let word = order.read_u16([bytes[2], bytes[3]]);
        Self {
            message_id: MessageId::new(id),
            kind: FragmentKind::from_bits(word >> KIND_SHIFT),
            sequence: FragmentSequence::new(word),
        }
    }

    /// Split a raw datagram into its header and payload.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::TruncatedHeader`] when the datagram is shorter
    /// than [`HEADER_LEN`].
    pub fn split_datagram(datagram: &[u8], order: ByteOrder) -> Result<(Self, &[u8]), ProtocolError> {
        let Some((head, payload)) = datagram.split_first_chunk::<HEADER_LEN>() else {
            return Err(ProtocolError::TruncatedHeader {
                len: datagram.len(),
            });
        };
        Ok((Self::decode(*head, order), payload))
    }
}
