//! Link configuration.
//!
//! [`LinkConfig`] collects the values both ends of a link must agree on (MTU
//! and header byte order) alongside the local reassembly pool size and the
//! outbound message identifier. It builds ready-to-use senders and receivers.

use std::num::NonZeroUsize;

use crate::{
    byte_order::ByteOrder,
    error::ConfigError,
    fragment::{Fragmenter, HEADER_LEN, MessageId, Reassembler},
    link::{Receiver, Sender},
    transport::{DatagramSink, DatagramSource},
};

const fn non_zero(value: usize) -> NonZeroUsize {
    match NonZeroUsize::new(value) {
        Some(value) => value,
        None => panic!("value must be non-zero"),
    }
}

/// Settings for one end of a fragmenting link.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use fraglink::{ByteOrder, LinkConfig};
///
/// let config = LinkConfig::default()
///     .with_mtu(NonZeroUsize::new(512).expect("non-zero"))
///     .with_byte_order(ByteOrder::Little);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.pool_capacity().get(), 1000);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkConfig {
    mtu: NonZeroUsize,
    pool_capacity: NonZeroUsize,
    byte_order: ByteOrder,
    message_id: MessageId,
}

impl LinkConfig {
    /// Default largest datagram, header included.
    pub const DEFAULT_MTU: NonZeroUsize = non_zero(2047);
    /// Default number of fragments the reassembly pool may hold.
    pub const DEFAULT_POOL_CAPACITY: NonZeroUsize = non_zero(1000);

    /// Replace the MTU.
    #[must_use]
    pub const fn with_mtu(mut self, mtu: NonZeroUsize) -> Self {
        self.mtu = mtu;
        self
    }

    /// Replace the reassembly pool capacity.
    #[must_use]
    pub const fn with_pool_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.pool_capacity = capacity;
        self
    }

    /// Replace the header byte order.
    #[must_use]
    pub const fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    /// Replace the identifier stamped on outbound fragments.
    #[must_use]
    pub const fn with_message_id(mut self, message_id: MessageId) -> Self {
        self.message_id = message_id;
        self
    }

    /// Largest datagram, header included.
    #[must_use]
    pub const fn mtu(&self) -> NonZeroUsize { self.mtu }

    /// Maximum pooled fragments on the receive side.
    #[must_use]
    pub const fn pool_capacity(&self) -> NonZeroUsize { self.pool_capacity }

    /// Header byte order.
    #[must_use]
    pub const fn byte_order(&self) -> ByteOrder { self.byte_order }

    /// Identifier stamped on outbound fragments.
    #[must_use]
    pub const fn message_id(&self) -> MessageId { self.message_id }

    /// Check that the settings describe a usable link.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MtuTooSmall`] when the MTU cannot carry any
    /// payload after the header.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.mtu.get() <= HEADER_LEN {
            return Err(ConfigError::MtuTooSmall {
                mtu: self.mtu,
                header: HEADER_LEN,
            });
        }
        Ok(())
    }

    /// Build a fragmenter from these settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MtuTooSmall`] when the MTU is unusable.
    pub fn fragmenter(&self) -> Result<Fragmenter, ConfigError> {
        Ok(Fragmenter::new(self.message_id, self.mtu)?.with_byte_order(self.byte_order))
    }

    /// Build a reassembly engine from these settings.
    #[must_use]
    pub fn reassembler(&self) -> Reassembler {
        Reassembler::new(self.pool_capacity).with_byte_order(self.byte_order)
    }

    /// Build a sender writing to `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MtuTooSmall`] when the MTU is unusable.
    pub fn sender<S: DatagramSink>(&self, sink: S) -> Result<Sender<S>, ConfigError> {
        Ok(Sender::from_fragmenter(self.fragmenter()?, sink))
    }

    /// Build a receiver reading from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MtuTooSmall`] when the MTU is unusable.
    pub fn receiver<S: DatagramSource>(&self, source: S) -> Result<Receiver<S>, ConfigError> {
        Receiver::from_reassembler(self.reassembler(), self.mtu, source)
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            mtu: Self::DEFAULT_MTU,
            pool_capacity: Self::DEFAULT_POOL_CAPACITY,
            byte_order: ByteOrder::default(),
            message_id: MessageId::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = LinkConfig::default();
        assert_eq!(config.mtu().get(), 2047);
        assert_eq!(config.pool_capacity().get(), 1000);
        assert_eq!(config.byte_order(), ByteOrder::Big);
        assert_eq!(config.message_id(), MessageId::new(0));
    }

    #[rstest]
    #[case(1, false)]
    #[case(3, false)]
    #[case(4, false)]
    #[case(5, true)]
    #[case(2047, true)]
    fn validate_requires_room_for_payload(#[case] mtu: usize, #[case] ok: bool) {
        let config = LinkConfig::default().with_mtu(non_zero(mtu));
        assert_eq!(config.validate().is_ok(), ok);
        assert_eq!(config.fragmenter().is_ok(), ok);
        let (_sink, source) = crate::transport::channel(1);
        assert_eq!(config.receiver(source).is_ok(), ok);
    }

    #[test]
    fn builders_carry_settings() {
        let config = LinkConfig::default()
            .with_mtu(non_zero(64))
            .with_pool_capacity(non_zero(3))
            .with_byte_order(ByteOrder::Little)
            .with_message_id(MessageId::new(9));

        let fragmenter = config.fragmenter().expect("valid mtu");
        assert_eq!(fragmenter.mtu().get(), 64);
        assert_eq!(fragmenter.byte_order(), ByteOrder::Little);
        assert_eq!(fragmenter.message_id(), MessageId::new(9));
        assert_eq!(config.reassembler().capacity().get(), 3);
    }
}
