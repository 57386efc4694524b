//! Fuzz target for peer message decoding
//!
//! # Strategy
//!
//! - Raw bytes straight into `PeerMessage::decode`
//! - The same bytes split at an arbitrary point and fed to a `FrameDecoder`
//!
//! # Invariants
//!
//! - NEVER panic on malformed CBOR or truncated frames
//! - Anything that decodes re-encodes and decodes to the same message
//! - Feeding a frame in two pieces yields the same result as feeding it whole

#![no_main]

use euclid_proto::{FrameDecoder, PeerMessage};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (usize, Vec<u8>)| {
    let (split, bytes) = input;

    if let Ok(message) = PeerMessage::decode(&bytes) {
        let encoded = message.encode().expect("decoded message must re-encode");
        assert_eq!(PeerMessage::decode(&encoded).ok(), Some(message));
    }

    let split = split % (bytes.len() + 1);
    let mut whole = FrameDecoder::new();
    whole.extend(&bytes);
    let expected = whole.next_message().ok().flatten();

    let mut pieces = FrameDecoder::new();
    pieces.extend(&bytes[..split]);
    let got = match pieces.next_message() {
        Ok(Some(message)) => Some(message),
        Ok(None) => {
            pieces.extend(&bytes[split..]);
            pieces.next_message().ok().flatten()
        },
        Err(_) => return,
    };
    assert_eq!(got, expected);
});
