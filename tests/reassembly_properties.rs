//! Property tests for the reassembly engine under reordering, duplication,
//! interleaving, and hostile input.

use bytes::Bytes;
use fraglink::{FragmentHeader, FragmentKind, FragmentSequence, MessageId, Reassembler};
use proptest::prelude::*;

mod common;

use common::{nz, split};

type Fragment = (FragmentHeader, Bytes);

prop_compose! {
    fn shuffled_message()
        (payload in prop::collection::vec(any::<u8>(), 0..300),
         mtu in 5_usize..48,
         start in 0_u16..=0x3FFF)
        (order in Just((0..split(1, mtu, start, &payload).len()).collect::<Vec<_>>()).prop_shuffle(),
         payload in Just(payload),
         mtu in Just(mtu),
         start in Just(start))
        -> (Vec<u8>, Vec<Fragment>)
    {
        let fragments = split(1, mtu, start, &payload);
        let shuffled = order.into_iter().map(|i| fragments[i].clone()).collect();
        (payload, shuffled)
    }
}

fn push_all(reassembler: &mut Reassembler, fragments: &[Fragment]) -> Vec<Bytes> {
    fragments
        .iter()
        .filter_map(|(header, payload)| reassembler.push(*header, payload.clone()))
        .map(fraglink::ReassembledMessage::into_payload)
        .collect()
}

fn kind_strategy() -> impl Strategy<Value = FragmentKind> {
    prop_oneof![
        Just(FragmentKind::Full),
        Just(FragmentKind::Start),
        Just(FragmentKind::Middle),
        Just(FragmentKind::End),
    ]
}

proptest! {
    #[test]
    fn any_arrival_order_rebuilds_the_message_once((payload, fragments) in shuffled_message()) {
        let mut reassembler = Reassembler::new(nz(1000));
        let delivered = push_all(&mut reassembler, &fragments);
        prop_assert_eq!(delivered, vec![Bytes::from(payload)]);
    }

    #[test]
    fn duplicates_never_corrupt_deliveries(
        (payload, fragments) in shuffled_message(),
        repeats in prop::collection::vec(any::<prop::sample::Index>(), 0..20),
    ) {
        let mut noisy = fragments.clone();
        for index in repeats {
            let fragment = index.get(&fragments).clone();
            let at = index.index(noisy.len() + 1);
            noisy.insert(at, fragment);
        }
        let mut reassembler = Reassembler::new(nz(1000));
        let delivered = push_all(&mut reassembler, &noisy);
        prop_assert!(!delivered.is_empty());
        for message in delivered {
            prop_assert_eq!(&message[..], &payload[..]);
        }
    }

    #[test]
    fn interleaved_streams_stay_separate(
        first in prop::collection::vec(any::<u8>(), 1..200),
        second in prop::collection::vec(any::<u8>(), 1..200),
        picks in prop::collection::vec(any::<bool>(), 0..40),
    ) {
        let mut a = split(1, 16, 0, &first).into_iter();
        let mut b = split(2, 16, 0, &second).into_iter();
        let mut merged = Vec::new();
        for pick in picks {
            let next = if pick { a.next() } else { b.next() };
            merged.extend(next);
        }
        merged.extend(a);
        merged.extend(b);

        let mut reassembler = Reassembler::new(nz(1000));
        let mut delivered = push_all(&mut reassembler, &merged);
        let mut expected = vec![Bytes::from(first), Bytes::from(second)];
        delivered.sort();
        expected.sort();
        prop_assert_eq!(delivered, expected);
    }

    #[test]
    fn pool_never_exceeds_capacity(
        capacity in 1_usize..16,
        input in prop::collection::vec(
            (0_u16..3, kind_strategy(), 0_u16..24, prop::collection::vec(any::<u8>(), 0..4)),
            0..200,
        ),
    ) {
        let mut reassembler = Reassembler::new(nz(capacity));
        for (id, kind, sequence, payload) in input {
            let header = FragmentHeader::new(MessageId::new(id), kind, FragmentSequence::new(sequence));
            let _ = reassembler.push(header, payload);
            prop_assert!(reassembler.len() <= capacity);
        }
    }
}
