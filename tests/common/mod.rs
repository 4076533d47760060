//! Shared utilities for integration tests.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::num::NonZeroUsize;

use bytes::Bytes;
use fraglink::{FragmentHeader, FragmentSequence, Fragmenter, MessageId};

/// Build a `NonZeroUsize` from a literal known to be positive.
pub fn nz(value: usize) -> NonZeroUsize { NonZeroUsize::new(value).expect("non-zero value") }

/// Deterministic payload whose bytes differ from their neighbours.
pub fn ramp(len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| u8::try_from(i % 251).expect("below u8::MAX"))
        .collect()
}

/// Split `payload` into owned fragments starting at `start`.
pub fn split(id: u16, mtu: usize, start: u16, payload: &[u8]) -> Vec<(FragmentHeader, Bytes)> {
    let mut fragmenter = Fragmenter::new(MessageId::new(id), nz(mtu))
        .expect("valid mtu")
        .with_starting_sequence(FragmentSequence::new(start));
    fragmenter
        .fragment(payload)
        .into_iter()
        .map(|frame| (*frame.header(), Bytes::copy_from_slice(frame.payload())))
        .collect()
}
