//! Metric helpers for `fraglink`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. With the `metrics` feature
//! disabled every helper compiles to a no-op.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the counter tracking fragments sent and received.
pub const FRAGMENTS_TOTAL: &str = "fraglink_fragments_total";
/// Name of the counter tracking logical messages sent and reassembled.
pub const MESSAGES_TOTAL: &str = "fraglink_messages_total";
/// Name of the counter tracking duplicate fragments replaced in the pool.
pub const DUPLICATES_TOTAL: &str = "fraglink_duplicates_total";
/// Name of the counter tracking incomplete chains evicted from the pool.
pub const EVICTIONS_TOTAL: &str = "fraglink_evictions_total";
/// Name of the gauge tracking pooled fragment records.
pub const POOL_RECORDS: &str = "fraglink_pool_records";

/// Direction of fragment processing.
#[derive(Clone, Copy, Debug)]
pub enum Direction {
    /// Fragments arriving from the transport.
    Inbound,
    /// Fragments handed to the transport.
    Outbound,
}

impl Direction {
    #[cfg_attr(not(feature = "metrics"), expect(dead_code, reason = "only read by metric labels"))]
    fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Record a fragment for the given direction.
pub fn inc_fragments(direction: Direction) {
    #[cfg(feature = "metrics")]
    counter!(FRAGMENTS_TOTAL, "direction" => direction.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = direction;
}

/// Record a complete logical message for the given direction.
pub fn inc_messages(direction: Direction) {
    #[cfg(feature = "metrics")]
    counter!(MESSAGES_TOTAL, "direction" => direction.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = direction;
}

/// Record a duplicate fragment replacing a pooled one.
pub fn inc_duplicates() {
    #[cfg(feature = "metrics")]
    counter!(DUPLICATES_TOTAL).increment(1);
}

/// Record an incomplete chain evicted to make room.
pub fn inc_evictions() {
    #[cfg(feature = "metrics")]
    counter!(EVICTIONS_TOTAL).increment(1);
}

/// Publish the current pool size.
pub fn set_pool_records(records: usize) {
    #[cfg(feature = "metrics")]
    {
        #[expect(
            clippy::cast_precision_loss,
            reason = "pool sizes are far below f64 precision limits"
        )]
        let value = records as f64;
        gauge!(POOL_RECORDS).set(value);
    }
    #[cfg(not(feature = "metrics"))]
    let _ = records;
}
