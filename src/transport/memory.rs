//! In-process datagram channel.
//!
//! Useful for exercising the link layer without sockets. The source side can
//! also be drained synchronously so tests can drop, reorder or duplicate
//! datagrams before replaying them.

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use super::{DatagramSink, DatagramSource, TransportError};

/// Create a connected sink/source pair buffering up to `capacity` datagrams.
///
/// # Panics
///
/// Panics if `capacity` is zero.
#[must_use]
pub fn channel(capacity: usize) -> (MemorySink, MemorySource) {
    let (tx, rx) = mpsc::channel(capacity);
    (MemorySink { tx }, MemorySource { rx })
}

/// Sending half of an in-memory channel.
#[derive(Clone, Debug)]
pub struct MemorySink {
    tx: mpsc::Sender<Bytes>,
}

#[async_trait]
impl DatagramSink for MemorySink {
    async fn send(&mut self, datagram: &[u8]) -> Result<(), TransportError> {
        self.tx
            .send(Bytes::copy_from_slice(datagram))
            .await
            .map_err(|_| TransportError::Closed)
    }
}

/// Receiving half of an in-memory channel.
#[derive(Debug)]
pub struct MemorySource {
    rx: mpsc::Receiver<Bytes>,
}

impl MemorySource {
    /// Take every datagram currently buffered without waiting.
    pub fn drain(&mut self) -> Vec<Bytes> {
        let mut out = Vec::new();
        while let Ok(datagram) = self.rx.try_recv() {
            out.push(datagram);
        }
        out
    }
}

#[async_trait]
impl DatagramSource for MemorySource {
    async fn recv(&mut self) -> Result<Bytes, TransportError> {
        self.rx.recv().await.ok_or(TransportError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn datagrams_keep_their_boundaries() {
        let (mut sink, mut source) = channel(4);
        sink.send(b"one").await.expect("send one");
        sink.send(b"two").await.expect("send two");

        assert_eq!(&source.recv().await.expect("first")[..], b"one");
        assert_eq!(source.drain(), vec![Bytes::from_static(b"two")]);
    }

    #[tokio::test]
    async fn closed_once_sinks_drop() {
        let (sink, mut source) = channel(1);
        drop(sink);
        assert!(matches!(source.recv().await, Err(TransportError::Closed)));
    }

    #[tokio::test]
    async fn send_fails_once_source_drops() {
        let (mut sink, source) = channel(1);
        drop(source);
        assert!(matches!(sink.send(b"x").await, Err(TransportError::Closed)));
    }
}
