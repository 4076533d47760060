use std::num::NonZeroUsize;

use futures::{Stream, stream};
use tracing::{trace, warn};

use crate::{
    error::{ConfigError, LinkError},
    fragment::{ReassembledMessage, Reassembler, fragmenter::payload_capacity},
    transport::DatagramSource,
};

/// Pulls datagrams from a transport and yields complete messages.
///
/// Fragments may arrive in any order, more than once, or not at all. Messages
/// whose fragments never all arrive are eventually evicted from the bounded
/// pool without surfacing an error.
#[derive(Debug)]
pub struct Receiver<S> {
    source: S,
    reassembler: Reassembler,
    mtu: NonZeroUsize,
}

impl<S: DatagramSource> Receiver<S> {
    /// Create a receiver pooling at most `capacity` fragments and accepting
    /// datagrams of up to `mtu` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MtuTooSmall`] when `mtu` leaves no room for
    /// payload after the header.
    pub fn new(capacity: NonZeroUsize, mtu: NonZeroUsize, source: S) -> Result<Self, ConfigError> {
        Self::from_reassembler(Reassembler::new(capacity), mtu, source)
    }

    /// Create a receiver around a preconfigured reassembly engine.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MtuTooSmall`] when `mtu` leaves no room for
    /// payload after the header.
    pub fn from_reassembler(
        reassembler: Reassembler,
        mtu: NonZeroUsize,
        source: S,
    ) -> Result<Self, ConfigError> {
        payload_capacity(mtu)?;
        Ok(Self {
            source,
            reassembler,
            mtu,
        })
    }

    /// Wait until the next message completes.
    ///
    /// Datagrams longer than the MTU are cut to the MTU; datagrams too short
    /// to carry a header are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Transport`] when the source fails or closes.
    pub async fn receive_next(&mut self) -> Result<ReassembledMessage, LinkError> {
        loop {
            let datagram = self.source.recv().await?;
            let len = datagram.len().min(self.mtu.get());
            if len < datagram.len() {
                trace!(received = datagram.len(), kept = len, "datagram truncated to mtu");
            }
            match self.reassembler.push_datagram(&datagram[..len]) {
                Ok(Some(message)) => return Ok(message),
                Ok(None) => {}
                Err(err) => warn!(error = %err, "dropping malformed datagram"),
            }
        }
    }

    /// Turn the receiver into a stream of messages.
    ///
    /// The stream ends once the transport reports it is closed; other
    /// transport failures are yielded as items and the stream carries on.
    pub fn into_stream(self) -> impl Stream<Item = Result<ReassembledMessage, LinkError>> {
        stream::unfold(self, |mut receiver| async move {
            match receiver.receive_next().await {
                Err(err) if err.is_closed() => None,
                result => Some((result, receiver)),
            }
        })
    }
}

impl<S> Receiver<S> {
    /// The underlying reassembly engine.
    #[must_use]
    pub const fn reassembler(&self) -> &Reassembler { &self.reassembler }

    /// Borrow the transport.
    #[must_use]
    pub const fn source(&self) -> &S { &self.source }

    /// Consume the receiver, returning the transport.
    #[must_use]
    pub fn into_source(self) -> S { self.source }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use rstest::rstest;
    use tracing_test::traced_test;

    use super::*;
    use crate::{
        buffer::ByteSource,
        byte_order::ByteOrder,
        fragment::{FragmentHeader, FragmentKind, FragmentSequence, MessageId},
        transport::{self, DatagramSink},
    };

    fn nz(value: usize) -> NonZeroUsize { NonZeroUsize::new(value).expect("non-zero") }

    fn datagram(kind: FragmentKind, sequence: u16, payload: &[u8]) -> Vec<u8> {
        let header = FragmentHeader::new(MessageId::new(1), kind, FragmentSequence::new(sequence));
        let mut out = header.encode(ByteOrder::Big).to_vec();
        out.extend_from_slice(payload);
        out
    }

    #[tokio::test]
    #[traced_test]
    async fn skips_short_datagrams() {
        let (mut sink, source) = transport::channel(4);
        sink.send(&[0, 1]).await.expect("send runt");
        sink.send(&datagram(FragmentKind::Full, 0, b"ok")).await.expect("send full");
        drop(sink);

        let mut receiver = Receiver::new(nz(8), nz(64), source).expect("valid mtu");
        let message = receiver.receive_next().await.expect("message");
        assert_eq!(message.payload(), b"ok");
        assert!(logs_contain("dropping malformed datagram"));
    }

    #[tokio::test]
    async fn oversized_datagrams_are_cut_to_mtu() {
        let (mut sink, source) = transport::channel(4);
        sink.send(&datagram(FragmentKind::Full, 0, b"abcdefgh")).await.expect("send");

        let mut receiver = Receiver::new(nz(8), nz(8), source).expect("valid mtu");
        let mut message = receiver.receive_next().await.expect("message");
        assert_eq!(message.payload(), b"abcd");
        assert!(message.read_vec(5).is_err());
    }

    #[tokio::test]
    async fn reassembles_out_of_order_fragments() {
        let (mut sink, source) = transport::channel(4);
        sink.send(&datagram(FragmentKind::End, 2, b"c")).await.expect("end");
        sink.send(&datagram(FragmentKind::Start, 0, b"a")).await.expect("start");
        sink.send(&datagram(FragmentKind::Middle, 1, b"b")).await.expect("middle");

        let mut receiver = Receiver::new(nz(8), nz(64), source).expect("valid mtu");
        let message = receiver.receive_next().await.expect("message");
        assert_eq!(message.payload(), b"abc");
        assert_eq!(message.fragment_count(), 3);
        assert!(receiver.reassembler().len() <= 3);
    }

    #[tokio::test]
    async fn stream_ends_when_transport_closes() {
        let (mut sink, source) = transport::channel(4);
        sink.send(&datagram(FragmentKind::Full, 0, b"one")).await.expect("one");
        sink.send(&datagram(FragmentKind::Full, 1, b"two")).await.expect("two");
        drop(sink);

        let payloads: Vec<_> = Receiver::new(nz(8), nz(64), source)
            .expect("valid mtu")
            .into_stream()
            .map(|item| item.expect("message").into_payload())
            .collect()
            .await;
        assert_eq!(payloads, vec![&b"one"[..], &b"two"[..]]);
    }

    #[rstest]
    #[case(1, false)]
    #[case(3, false)]
    #[case(4, false)]
    #[case(5, true)]
    fn mtu_must_leave_room_for_payload(#[case] mtu: usize, #[case] ok: bool) {
        let (_sink, source) = transport::channel(1);
        let result = Receiver::new(nz(8), nz(mtu), source);
        match result {
            Ok(_) => assert!(ok, "mtu {mtu} should be rejected"),
            Err(err) => {
                assert!(!ok, "mtu {mtu} should be accepted");
                assert_eq!(
                    err,
                    ConfigError::MtuTooSmall {
                        mtu: nz(mtu),
                        header: 4,
                    }
                );
            }
        }
    }

    #[tokio::test]
    async fn smallest_mtu_still_delivers_payload() {
        let (mut sink, source) = transport::channel(4);
        sink.send(&datagram(FragmentKind::Start, 0, b"h")).await.expect("start");
        sink.send(&datagram(FragmentKind::End, 1, b"i")).await.expect("end");

        let mut receiver = Receiver::new(nz(8), nz(5), source).expect("valid mtu");
        let message = receiver.receive_next().await.expect("message");
        assert_eq!(message.payload(), b"hi");
    }

    #[tokio::test]
    async fn closed_transport_is_reported() {
        let (sink, source) = transport::channel(1);
        drop(sink);
        let mut receiver = Receiver::new(nz(8), nz(64), source).expect("valid mtu");
        let err = receiver.receive_next().await.expect_err("closed");
        assert!(err.is_closed());
    }
}
