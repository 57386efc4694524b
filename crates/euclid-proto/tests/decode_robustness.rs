//! Arbitrary bytes never panic the decoder, and every valid message
//! survives framing.

#![allow(clippy::unwrap_used)]

use euclid_proto::{FrameDecoder, PeerMessage, encode_frame};
use proptest::prelude::*;

fn message_strategy() -> impl Strategy<Value = PeerMessage> {
    let numbers = prop::collection::vec(1u32..=100, 0..20);
    prop_oneof![
        "[a-z]{0,12}".prop_map(|player_nick| PeerMessage::PlayerReady { player_nick }),
        (prop::collection::vec(1u32..=100, 2), 1u8..=2).prop_map(|(active_numbers, current)| {
            PeerMessage::GameStart {
                active_numbers,
                current_player: current,
                host_player: 1,
                guest_player: 2,
            }
        }),
        (1u8..=2, 1u32..=100, 1u32..=100, numbers.clone()).prop_map(
            |(player, num1, num2, active_numbers)| PeerMessage::Move {
                player,
                num1,
                num2,
                diff: num1.abs_diff(num2),
                active_numbers,
            }
        ),
        (1u8..=2, numbers).prop_map(|(winner, final_state)| PeerMessage::GameOver {
            winner,
            final_state
        }),
    ]
}

proptest! {
    #[test]
    fn decode_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = PeerMessage::decode(&bytes);
        let mut decoder = FrameDecoder::new();
        decoder.extend(&bytes);
        let _ = decoder.next_message();
    }

    #[test]
    fn framed_stream_preserves_order(messages in prop::collection::vec(message_strategy(), 1..8)) {
        let mut decoder = FrameDecoder::new();
        for msg in &messages {
            decoder.extend(&encode_frame(msg).unwrap());
        }
        let mut out = Vec::new();
        while let Some(msg) = decoder.next_message().unwrap() {
            out.push(msg);
        }
        prop_assert_eq!(out, messages);
    }
}
