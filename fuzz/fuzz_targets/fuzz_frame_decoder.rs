//! Fuzz target: `FrameDecoder::feed`
//!
//! The first input byte picks a chunk size; the rest is fed to the
//! decoder in chunks of that size.  Every delivered payload must fit the
//! frame limit, and re-feeding after a reset must yield the same frames.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use rpi_led::bus::codec::{FrameDecoder, MAX_FRAME_SIZE};

fuzz_target!(|data: &[u8]| {
    let Some((&chunk, data)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(chunk.max(1));

    let mut decoder = FrameDecoder::new();
    let mut chunked = Vec::new();
    for piece in data.chunks(chunk) {
        decoder.feed(piece, |p| {
            assert!(p.len() <= MAX_FRAME_SIZE, "payload exceeds MAX_FRAME_SIZE");
            chunked.push(p.to_vec());
        });
    }

    decoder.reset();
    let mut whole = Vec::new();
    decoder.feed(data, |p| whole.push(p.to_vec()));
    assert_eq!(chunked, whole, "chunking changed the decoded frames");
});
