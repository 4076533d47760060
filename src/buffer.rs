//! Growable byte buffer with independent read and write cursors.
//!
//! [`FrameBuffer`] is the staging area for outbound messages and the backing
//! store of reassembled inbound ones. Reading and writing are expressed as the
//! [`ByteSource`] and [`ByteSink`] capabilities so callers can encode and
//! decode fields without caring which concrete buffer sits underneath.

use bytes::{Bytes, BytesMut};

use crate::{byte_order::ByteOrder, error::ProtocolError};

/// Capability to read bytes sequentially.
pub trait ByteSource {
    /// Number of unread bytes.
    fn remaining(&self) -> usize;

    /// Fill `dst` from the read cursor, advancing it.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ReadPastAvailable`] if fewer than `dst.len()`
    /// bytes remain. The cursor does not move on failure.
    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), ProtocolError>;

    /// Read a single byte.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ReadPastAvailable`] when the source is exhausted.
    fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        let mut byte = [0_u8; 1];
        self.read_into(&mut byte)?;
        Ok(byte[0])
    }

    /// Read a `u16` in the given byte order.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ReadPastAvailable`] when fewer than two bytes remain.
    fn read_u16(&mut self, order: ByteOrder) -> Result<u16, ProtocolError> {
        let mut bytes = [0_u8; 2];
        self.read_into(&mut bytes)?;
        Ok(order.read_u16(bytes))
    }

    /// Read a `u32` in the given byte order.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ReadPastAvailable`] when fewer than four bytes remain.
    fn read_u32(&mut self, order: ByteOrder) -> Result<u32, ProtocolError> {
        let mut bytes = [0_u8; 4];
        self.read_into(&mut bytes)?;
        Ok(order.read_u32(bytes))
    }

    /// Read exactly `len` bytes into a fresh vector.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::ReadPastAvailable`] when fewer than `len` bytes remain.
    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>, ProtocolError> {
        let mut out = vec![0_u8; len];
        self.read_into(&mut out)?;
        Ok(out)
    }
}

/// Capability to append bytes.
pub trait ByteSink {
    /// Append `src` at the write cursor.
    fn write_bytes(&mut self, src: &[u8]);

    /// Append a single byte.
    fn write_u8(&mut self, value: u8) { self.write_bytes(&[value]); }

    /// Append a `u16` in the given byte order.
    fn write_u16(&mut self, order: ByteOrder, value: u16) { self.write_bytes(&order.write_u16(value)); }

    /// Append a `u32` in the given byte order.
    fn write_u32(&mut self, order: ByteOrder, value: u32) { self.write_bytes(&order.write_u32(value)); }
}

/// Growable buffer tracking how much has been written and how much read.
///
/// # Examples
///
/// ```
/// use fraglink::{
///     buffer::{ByteSink, ByteSource, FrameBuffer},
///     byte_order::ByteOrder,
/// };
///
/// let mut buf = FrameBuffer::new();
/// buf.write_u16(ByteOrder::Big, 0xBEEF);
/// buf.write_bytes(b"hi");
/// assert_eq!(buf.read_u16(ByteOrder::Big), Ok(0xBEEF));
/// assert_eq!(buf.remaining(), 2);
/// assert!(buf.read_u32(ByteOrder::Big).is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameBuffer {
    buf: BytesMut,
    read: usize,
}

impl FrameBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Create an empty buffer with room for `capacity` bytes before growing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            read: 0,
        }
    }

    /// Total bytes written.
    #[must_use]
    pub fn len(&self) -> usize { self.buf.len() }

    /// Whether nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.buf.is_empty() }

    /// Everything written so far, regardless of the read cursor.
    #[must_use]
    pub fn written(&self) -> &[u8] { &self.buf }

    /// Bytes between the read cursor and the write cursor.
    #[must_use]
    pub fn unread(&self) -> &[u8] { &self.buf[self.read..] }

    /// Move the read cursor back to the first byte.
    pub fn rewind(&mut self) { self.read = 0; }

    /// Discard all content and reset both cursors, keeping the allocation.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.read = 0;
    }

    /// Take the written bytes, leaving the buffer empty.
    pub fn take(&mut self) -> Bytes {
        self.read = 0;
        self.buf.split().freeze()
    }

    /// Consume the buffer, returning the written bytes.
    #[must_use]
    pub fn freeze(self) -> Bytes { self.buf.freeze() }
}

impl From<BytesMut> for FrameBuffer {
    fn from(buf: BytesMut) -> Self { Self { buf, read: 0 } }
}

impl From<&[u8]> for FrameBuffer {
    fn from(bytes: &[u8]) -> Self { Self::from(BytesMut::from(bytes)) }
}

impl ByteSource for FrameBuffer {
    fn remaining(&self) -> usize { self.buf.len() - self.read }

    fn read_into(&mut self, dst: &mut [u8]) -> Result<(), ProtocolError> {
        let available = self.remaining();
        if dst.len() > available {
            return Err(ProtocolError::ReadPastAvailable {
                requested: dst.len(),
                available,
            });
        }
        let end = self.read + dst.len();
        dst.copy_from_slice(&self.buf[self.read..end]);
        self.read = end;
        Ok(())
    }
}

impl ByteSink for FrameBuffer {
    fn write_bytes(&mut self, src: &[u8]) { self.buf.extend_from_slice(src); }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_follow_writes() {
        let mut buf = FrameBuffer::new();
        buf.write_bytes(&[1, 2, 3]);
        buf.write_u8(4);

        let mut head = [0_u8; 2];
        buf.read_into(&mut head).expect("two bytes available");
        assert_eq!(head, [1, 2]);
        assert_eq!(buf.unread(), &[3, 4]);
        assert_eq!(buf.written(), &[1, 2, 3, 4]);
    }

    #[test]
    fn read_past_end_reports_shortfall_and_keeps_cursor() {
        let mut buf = FrameBuffer::from(&[9_u8, 8][..]);
        let err = buf.read_vec(3).expect_err("only two bytes available");
        assert_eq!(
            err,
            ProtocolError::ReadPastAvailable {
                requested: 3,
                available: 2,
            }
        );
        assert_eq!(buf.read_vec(2).expect("cursor unchanged"), vec![9, 8]);
    }

    #[test]
    fn rewind_and_clear_reset_cursors() {
        let mut buf = FrameBuffer::with_capacity(8);
        buf.write_u32(ByteOrder::Little, 7);
        assert_eq!(buf.read_u32(ByteOrder::Little), Ok(7));
        assert_eq!(buf.remaining(), 0);

        buf.rewind();
        assert_eq!(buf.remaining(), 4);

        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn take_leaves_buffer_reusable() {
        let mut buf = FrameBuffer::new();
        buf.write_bytes(b"abc");
        let taken = buf.take();
        assert_eq!(&taken[..], b"abc");
        assert!(buf.is_empty());
        buf.write_bytes(b"d");
        assert_eq!(buf.written(), b"d");
    }
}
