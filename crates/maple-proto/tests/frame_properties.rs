//! Integration-level invariants spanning frame construction and parsing.

use maple_proto::{decode_header, encode_request, word_swap, ADDRESS_CONTROLLER, ADDRESS_HOST};
use proptest::prelude::*;

#[test]
fn encoded_header_round_trips_through_decode_header() {
    let frame = encode_request(0x09, ADDRESS_CONTROLLER, &[]).expect("aligned and in range");
    let header = decode_header(&frame).expect("4-byte prefix present");
    assert_eq!(header.cmd, 0x09);
    assert_eq!(header.recipient, ADDRESS_CONTROLLER);
    assert_eq!(header.sender, ADDRESS_HOST);
    assert_eq!(header.word_count, 0);
}

proptest! {
    #[test]
    fn header_fields_survive_encode_then_decode(
        cmd in any::<u8>(),
        recipient in any::<u8>(),
        word_count in 0u8..64,
    ) {
        let payload = vec![0u8; (word_count as usize) * 4];
        let frame = encode_request(cmd, recipient, &payload).expect("aligned and in range");
        let header = decode_header(&frame).expect("at least 4 bytes");
        prop_assert_eq!(header.cmd, cmd);
        prop_assert_eq!(header.recipient, recipient);
        prop_assert_eq!(header.word_count, word_count);
    }

    #[test]
    fn word_swap_never_changes_length(bytes in prop::collection::vec(any::<u8>(), 0..128).prop_map(|mut v| {
        v.truncate(v.len() - (v.len() % 4));
        v
    })) {
        let swapped = word_swap(&bytes).expect("aligned by construction");
        prop_assert_eq!(swapped.len(), bytes.len());
    }
}
