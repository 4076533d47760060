use bytes::{Bytes, BytesMut};

use super::MessageId;
use crate::{
    buffer::{ByteSource, FrameBuffer},
    error::ProtocolError,
};

/// A fully re-assembled logical message.
///
/// The payload can be borrowed whole or consumed field by field through
/// [`ByteSource`]; reads beyond the delivered bytes fail with
/// [`ProtocolError::ReadPastAvailable`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReassembledMessage {
    message_id: MessageId,
    fragments: usize,
    body: FrameBuffer,
}

impl ReassembledMessage {
    pub(crate) fn new(message_id: MessageId, fragments: usize, payload: BytesMut) -> Self {
        Self {
            message_id,
            fragments,
            body: FrameBuffer::from(payload),
        }
    }

    /// Identifier shared by the fragments that formed this message.
    #[must_use]
    pub const fn message_id(&self) -> MessageId { self.message_id }

    /// Number of fragments the message was rebuilt from.
    #[must_use]
    pub const fn fragment_count(&self) -> usize { self.fragments }

    /// Borrow the complete payload, independent of any reads.
    #[must_use]
    pub fn payload(&self) -> &[u8] { self.body.written() }

    /// Consume the message, returning the owned payload bytes.
    #[must_use]
    pub fn into_payload(self) -> Bytes { self.body.freeze() }
}

impl ByteSource for ReassembledMessage {
    fn remaining(&self) -> usize { self.body.remaining() }

    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), ProtocolError> { self.body.read_into(dst) }
}
