use std::num::NonZeroUsize;

use tracing::debug;

use crate::{
    buffer::{ByteSink, FrameBuffer},
    error::ConfigError,
    fragment::{FragmentSequence, Fragmenter, MessageId},
    metrics,
    transport::{DatagramSink, TransportError},
};

/// Splits logical messages into fragments and transmits them.
///
/// Messages can be sent directly with [`send`](Self::send) or assembled field
/// by field through the [`ByteSink`] impl and transmitted with
/// [`flush`](Self::flush).
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use fraglink::{fragment::MessageId, link::Sender, transport};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (sink, mut source) = transport::channel(8);
/// let mut sender = Sender::new(MessageId::new(1), NonZeroUsize::new(8).expect("non-zero"), sink)?;
///
/// let sent = sender.send(b"hello world").await?;
/// assert_eq!(sent, 3);
/// assert_eq!(source.drain().len(), 3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Sender<S> {
    sink: S,
    fragmenter: Fragmenter,
    staged: FrameBuffer,
    datagram: FrameBuffer,
}

impl<S: DatagramSink> Sender<S> {
    /// Create a sender stamping fragments with `message_id` and keeping every
    /// datagram within `mtu` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MtuTooSmall`] when `mtu` leaves no room for
    /// payload.
    pub fn new(message_id: MessageId, mtu: NonZeroUsize, sink: S) -> Result<Self, ConfigError> {
        Ok(Self::from_fragmenter(Fragmenter::new(message_id, mtu)?, sink))
    }

    /// Create a sender around a preconfigured fragmenter.
    #[must_use]
    pub fn from_fragmenter(fragmenter: Fragmenter, sink: S) -> Self {
        let datagram = FrameBuffer::with_capacity(fragmenter.mtu().get());
        Self {
            sink,
            fragmenter,
            staged: FrameBuffer::new(),
            datagram,
        }
    }

    /// Fragment `payload` and transmit every piece in order.
    ///
    /// Returns the number of datagrams sent. The sequence counter moves past
    /// each fragment only once it has been handed to the transport, so a
    /// failure part-way leaves the counter after the last fragment sent.
    ///
    /// # Errors
    ///
    /// Returns the first [`TransportError`] raised by the sink.
    pub async fn send(&mut self, payload: &[u8]) -> Result<usize, TransportError> {
        transmit(
            &mut self.sink,
            &mut self.fragmenter,
            &mut self.datagram,
            payload,
        )
        .await
    }

    /// Transmit everything written through the [`ByteSink`] impl as one
    /// message.
    ///
    /// Nothing is sent when no bytes are staged. On failure the staged bytes
    /// are kept so the caller can retry.
    ///
    /// # Errors
    ///
    /// Returns the first [`TransportError`] raised by the sink.
    pub async fn flush(&mut self) -> Result<usize, TransportError> {
        if self.staged.is_empty() {
            return Ok(0);
        }
        let sent = transmit(
            &mut self.sink,
            &mut self.fragmenter,
            &mut self.datagram,
            self.staged.written(),
        )
        .await?;
        self.staged.clear();
        Ok(sent)
    }
}

impl<S> Sender<S> {
    /// Bytes written but not yet flushed.
    #[must_use]
    pub fn staged(&self) -> &[u8] { self.staged.written() }

    /// Identifier stamped on every fragment.
    #[must_use]
    pub const fn message_id(&self) -> MessageId { self.fragmenter.message_id() }

    /// Sequence number the next fragment will carry.
    #[must_use]
    pub const fn next_sequence(&self) -> FragmentSequence { self.fragmenter.sequence() }

    /// The underlying fragmenter.
    #[must_use]
    pub const fn fragmenter(&self) -> &Fragmenter { &self.fragmenter }

    /// Borrow the transport.
    #[must_use]
    pub const fn sink(&self) -> &S { &self.sink }

    /// Consume the sender, returning the transport.
    #[must_use]
    pub fn into_sink(self) -> S { self.sink }
}

impl<S> ByteSink for Sender<S> {
    fn write_bytes(&mut self, src: &[u8]) { self.staged.write_bytes(src); }
}

async fn transmit<S: DatagramSink>(
    sink: &mut S,
    fragmenter: &mut Fragmenter,
    datagram: &mut FrameBuffer,
    payload: &[u8],
) -> Result<usize, TransportError> {
    let plan = fragmenter.plan(payload);
    let total = plan.len();
    for frame in plan {
        datagram.clear();
        frame.encode_into(datagram);
        sink.send(datagram.written()).await?;
        fragmenter.advance();
        metrics::inc_fragments(metrics::Direction::Outbound);
    }
    metrics::inc_messages(metrics::Direction::Outbound);
    debug!(
        message_id = %fragmenter.message_id(),
        len = payload.len(),
        fragments = total,
        "message sent"
    );
    Ok(total)
}
