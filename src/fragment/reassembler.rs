//! Inbound engine that stitches unordered fragments back into messages.
//!
//! [`Reassembler`] keeps a bounded pool of fragment records in an arena keyed
//! by monotonically increasing [`RecordId`]s. Records are linked to their
//! stream neighbours (`sequence ± 1` under the same [`MessageId`]) as evidence
//! arrives, and every record learns whether it can reach a START fragment
//! backwards and an END fragment forwards. A message is complete as soon as
//! one record knows both.
//!
//! Memory is bounded by the pool capacity, not by time. When the pool is full
//! the chain containing the oldest record is dropped; the chain delivered by
//! the previous call is always released first.
//!
//! The engine is transport-agnostic: feed it headers and payloads (or raw
//! datagrams) and it hands back [`ReassembledMessage`]s.

use std::{
    collections::{BTreeMap, HashMap},
    num::NonZeroUsize,
};

use bytes::{Bytes, BytesMut};
use tracing::{debug, trace};

use super::{FragmentHeader, FragmentKind, FragmentSequence, MessageId, ReassembledMessage};
use crate::{byte_order::ByteOrder, error::ProtocolError, metrics};

/// Stable handle of a record in the pool.
///
/// Handles are never reused, so a stale handle simply fails to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct RecordId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct FragmentKey {
    message_id: MessageId,
    sequence: FragmentSequence,
}

impl FragmentKey {
    fn of(header: &FragmentHeader) -> Self {
        Self {
            message_id: header.message_id(),
            sequence: header.sequence(),
        }
    }

    fn successor(self) -> Self {
        Self {
            sequence: self.sequence.next(),
            ..self
        }
    }

    fn predecessor(self) -> Self {
        Self {
            sequence: self.sequence.previous(),
            ..self
        }
    }
}

#[derive(Debug)]
struct Record {
    header: FragmentHeader,
    payload: Bytes,
    next: Option<RecordId>,
    previous: Option<RecordId>,
    /// START record this one is known to be reachable from.
    start: Option<RecordId>,
    /// Whether an END record is known to be reachable forwards.
    has_end: bool,
}

impl Record {
    fn new(header: FragmentHeader, payload: Bytes) -> Self {
        Self {
            header,
            payload,
            next: None,
            previous: None,
            start: None,
            has_end: false,
        }
    }

    fn kind(&self) -> FragmentKind { self.header.kind() }
}

/// Stateful fragment re-assembler with a bounded record pool.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
///
/// use fraglink::fragment::{FragmentHeader, FragmentKind, FragmentSequence, MessageId, Reassembler};
///
/// let mut reassembler = Reassembler::new(NonZeroUsize::new(16).expect("non-zero"));
/// let id = MessageId::new(7);
/// let start = FragmentHeader::new(id, FragmentKind::Start, FragmentSequence::new(0));
/// let end = FragmentHeader::new(id, FragmentKind::End, FragmentSequence::new(1));
///
/// assert!(reassembler.push(end, &b"world"[..]).is_none());
/// let message = reassembler.push(start, &b"hello "[..]).expect("chain complete");
/// assert_eq!(message.payload(), b"hello world");
/// ```
#[derive(Debug)]
pub struct Reassembler {
    capacity: NonZeroUsize,
    byte_order: ByteOrder,
    records: BTreeMap<RecordId, Record>,
    index: HashMap<FragmentKey, RecordId>,
    next_id: u64,
    delivered: Option<RecordId>,
}

impl Reassembler {
    /// Create a re-assembler holding at most `capacity` fragment records.
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            byte_order: ByteOrder::default(),
            records: BTreeMap::new(),
            index: HashMap::new(),
            next_id: 0,
            delivered: None,
        }
    }

    /// Decode datagram headers using `order`.
    #[must_use]
    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    /// Maximum number of records held at once.
    #[must_use]
    pub const fn capacity(&self) -> NonZeroUsize { self.capacity }

    /// Number of records currently pooled.
    #[must_use]
    pub fn len(&self) -> usize { self.records.len() }

    /// Whether the pool holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Whether a record for `(message_id, sequence)` is pooled.
    #[must_use]
    pub fn contains(&self, message_id: MessageId, sequence: FragmentSequence) -> bool {
        self.index.contains_key(&FragmentKey {
            message_id,
            sequence,
        })
    }

    /// Decode a raw datagram and process it as a fragment.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::TruncatedHeader`] when the datagram cannot hold
    /// a header. The pool is left untouched in that case.
    pub fn push_datagram(
        &mut self,
        datagram: &[u8],
    ) -> Result<Option<ReassembledMessage>, ProtocolError> {
        let (header, payload) = FragmentHeader::split_datagram(datagram, self.byte_order)?;
        Ok(self.push(header, Bytes::copy_from_slice(payload)))
    }

    /// Process one fragment.
    ///
    /// Returns `Some(_)` when the fragment completes a message and `None`
    /// while the fragment's chain is still missing pieces.
    pub fn push(
        &mut self,
        header: FragmentHeader,
        payload: impl Into<Bytes>,
    ) -> Option<ReassembledMessage> {
        metrics::inc_fragments(metrics::Direction::Inbound);
        self.make_room();

        let id = self.insert(header, payload.into());
        self.replace_duplicate(id);

        let message = if header.kind() == FragmentKind::Full {
            self.deliver(id)
        } else {
            self.link(id);
            self.complete_from(id)
        };
        metrics::set_pool_records(self.records.len());
        message
    }

    fn make_room(&mut self) {
        if let Some(anchor) = self.delivered.take() {
            if self.records.contains_key(&anchor) {
                let released = self.remove_chain(anchor);
                trace!(released, "released delivered chain");
                return;
            }
        }
        if self.records.len() < self.capacity.get() {
            return;
        }
        let Some(&oldest) = self.records.keys().next() else {
            return;
        };
        let evicted = self.remove_chain(oldest);
        metrics::inc_evictions();
        debug!(evicted, pooled = self.records.len(), "evicted oldest chain");
    }

    fn insert(&mut self, header: FragmentHeader, payload: Bytes) -> RecordId {
        let id = RecordId(self.next_id);
        self.next_id += 1;
        self.records.insert(id, Record::new(header, payload));
        id
    }

    /// Swap out an older record with the same key, inheriting its links.
    fn replace_duplicate(&mut self, id: RecordId) {
        let Some(header) = self.records.get(&id).map(|record| record.header) else {
            return;
        };
        let Some(old_id) = self.index.insert(FragmentKey::of(&header), id) else {
            return;
        };
        let Some(old) = self.records.remove(&old_id) else {
            return;
        };

        if let Some(next) = old.next.and_then(|next| self.records.get_mut(&next)) {
            next.previous = Some(id);
        }
        if let Some(previous) = old.previous.and_then(|prev| self.records.get_mut(&prev)) {
            previous.next = Some(id);
        }
        for record in self.records.values_mut() {
            if record.start == Some(old_id) {
                record.start = Some(id);
            }
        }
        let start = old.start.map(|start| if start == old_id { id } else { start });
        if let Some(record) = self.records.get_mut(&id) {
            record.next = old.next;
            record.previous = old.previous;
            record.has_end = old.has_end;
            record.start = start;
        }

        metrics::inc_duplicates();
        debug!(
            message_id = %header.message_id(),
            sequence = %header.sequence(),
            "replaced duplicate fragment"
        );
    }

    fn link(&mut self, id: RecordId) {
        let Some(header) = self.records.get(&id).map(|record| record.header) else {
            return;
        };
        let key = FragmentKey::of(&header);
        let mut linked = false;

        if header.kind() == FragmentKind::End {
            self.set_has_end(id);
        } else if let Some(next) = self.index.get(&key.successor()).copied() {
            linked = true;
            let next_has_end = self.records.get_mut(&next).is_some_and(|record| {
                record.previous = Some(id);
                record.has_end
            });
            if let Some(record) = self.records.get_mut(&id) {
                record.next = Some(next);
                record.has_end |= next_has_end;
            }
        }

        if header.kind() == FragmentKind::Start {
            if let Some(record) = self.records.get_mut(&id) {
                record.start = Some(id);
            }
        } else if let Some(previous) = self.index.get(&key.predecessor()).copied() {
            linked = true;
            let inherited = self.records.get_mut(&previous).and_then(|record| {
                record.next = Some(id);
                match (record.start, record.kind()) {
                    (Some(start), _) => Some(start),
                    (None, FragmentKind::Start) => Some(previous),
                    (None, _) => None,
                }
            });
            if let Some(record) = self.records.get_mut(&id) {
                record.previous = Some(previous);
                if inherited.is_some() {
                    record.start = inherited;
                }
            }
        }

        if !linked {
            trace!(
                message_id = %header.message_id(),
                sequence = %header.sequence(),
                kind = ?header.kind(),
                "fragment pending without neighbours"
            );
        }
    }

    fn set_has_end(&mut self, id: RecordId) {
        if let Some(record) = self.records.get_mut(&id) {
            record.has_end = true;
        }
    }

    /// Test for completion and push start/end knowledge along the chain.
    fn complete_from(&mut self, id: RecordId) -> Option<ReassembledMessage> {
        let (start, has_end) = self
            .records
            .get(&id)
            .map(|record| (record.start, record.has_end))?;

        if let (Some(start), true) = (start, has_end) {
            return self.deliver(start);
        }

        // A chain can close into a cycle only through sequence wraparound, so
        // no walk needs more steps than there are records.
        let limit = self.records.len();

        if let Some(start) = start {
            let mut cursor = id;
            for _ in 0..limit {
                let Some(next) = self.records.get(&cursor).and_then(|record| record.next) else {
                    break;
                };
                let record = self.records.get_mut(&next)?;
                if record.has_end {
                    return self.deliver(start);
                }
                record.start = Some(start);
                cursor = next;
            }
        }

        if has_end {
            let mut cursor = id;
            for _ in 0..limit {
                let Some(previous) = self
                    .records
                    .get(&cursor)
                    .and_then(|record| record.previous)
                else {
                    break;
                };
                let record = self.records.get_mut(&previous)?;
                if let Some(start) = record.start {
                    return self.deliver(start);
                }
                record.has_end = true;
                cursor = previous;
            }
        }

        None
    }

    /// Concatenate the chain beginning at `start` and mark it for release.
    fn deliver(&mut self, start: RecordId) -> Option<ReassembledMessage> {
        let message_id = self.records.get(&start)?.header.message_id();
        let mut payload = BytesMut::new();
        let mut fragments = 0;
        let mut cursor = Some(start);

        while let Some(id) = cursor {
            let Some(record) = self.records.get(&id) else {
                break;
            };
            payload.extend_from_slice(&record.payload);
            fragments += 1;
            if matches!(record.kind(), FragmentKind::End | FragmentKind::Full)
                || fragments >= self.records.len()
            {
                break;
            }
            cursor = record.next;
        }

        self.delivered = Some(start);
        metrics::inc_messages(metrics::Direction::Inbound);
        debug!(
            %message_id,
            fragments,
            bytes = payload.len(),
            "reassembled message"
        );
        Some(ReassembledMessage::new(message_id, fragments, payload))
    }

    /// Remove `anchor` and every record reachable from it by `next` or
    /// `previous` links. Returns the number of records removed.
    fn remove_chain(&mut self, anchor: RecordId) -> usize {
        let Some(root) = self.remove(anchor) else {
            return 0;
        };
        let mut removed = 1;

        let mut cursor = root.next;
        while let Some(record) = cursor.and_then(|id| self.remove(id)) {
            removed += 1;
            cursor = record.next;
        }

        let mut cursor = root.previous;
        while let Some(record) = cursor.and_then(|id| self.remove(id)) {
            removed += 1;
            cursor = record.previous;
        }

        removed
    }

    fn remove(&mut self, id: RecordId) -> Option<Record> {
        let record = self.records.remove(&id)?;
        let key = FragmentKey::of(&record.header);
        if self.index.get(&key) == Some(&id) {
            self.index.remove(&key);
        }
        Some(record)
    }
}
