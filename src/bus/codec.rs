//! Length-prefix frame codec.
//!
//! Wire format, both directions:
//! ```text
//! ┌────────────┬──────────────────────────┐
//! │ Length (4B)│ Payload (N B)            │
//! │ LE u32     │ command record / TLM pkt │
//! └────────────┴──────────────────────────┘
//! ```
//!
//! The decoder accumulates bytes and hands out every complete payload.
//! A single read may carry part of a header, part of a payload, or
//! several frames back to back.  Oversized frames are skipped byte for
//! byte so the stream stays in sync.

use log::warn;

/// Largest accepted payload.
pub const MAX_FRAME_SIZE: usize = 256;

/// Frame header size (4-byte little-endian length).
pub const HEADER_SIZE: usize = 4;

enum DecoderState {
    ReadingHeader { collected: usize },
    ReadingPayload { expected: usize, collected: usize },
    Discarding { remaining: usize },
}

/// Streaming frame decoder.
pub struct FrameDecoder {
    state: DecoderState,
    header_buf: [u8; HEADER_SIZE],
    payload_buf: [u8; MAX_FRAME_SIZE],
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::ReadingHeader { collected: 0 },
            header_buf: [0; HEADER_SIZE],
            payload_buf: [0; MAX_FRAME_SIZE],
        }
    }

    /// Feed bytes into the decoder, calling `on_frame` once per complete
    /// payload.  Returns the number of frames delivered.
    pub fn feed(&mut self, data: &[u8], mut on_frame: impl FnMut(&[u8])) -> usize {
        let mut offset = 0;
        let mut frames = 0;

        while offset < data.len() {
            let available = data.len() - offset;
            match &mut self.state {
                DecoderState::ReadingHeader { collected } => {
                    let to_copy = (HEADER_SIZE - *collected).min(available);
                    self.header_buf[*collected..*collected + to_copy]
                        .copy_from_slice(&data[offset..offset + to_copy]);
                    *collected += to_copy;
                    offset += to_copy;

                    if *collected == HEADER_SIZE {
                        let expected = u32::from_le_bytes(self.header_buf) as usize;
                        if expected > MAX_FRAME_SIZE {
                            warn!("codec: skipping {} byte frame (max {})", expected, MAX_FRAME_SIZE);
                            self.state = DecoderState::Discarding {
                                remaining: expected,
                            };
                        } else if expected == 0 {
                            self.state = DecoderState::ReadingHeader { collected: 0 };
                            on_frame(&[]);
                            frames += 1;
                        } else {
                            self.state = DecoderState::ReadingPayload {
                                expected,
                                collected: 0,
                            };
                        }
                    }
                }

                DecoderState::ReadingPayload { expected, collected } => {
                    let to_copy = (*expected - *collected).min(available);
                    self.payload_buf[*collected..*collected + to_copy]
                        .copy_from_slice(&data[offset..offset + to_copy]);
                    *collected += to_copy;
                    offset += to_copy;

                    if *collected == *expected {
                        let len = *expected;
                        self.state = DecoderState::ReadingHeader { collected: 0 };
                        on_frame(&self.payload_buf[..len]);
                        frames += 1;
                    }
                }

                DecoderState::Discarding { remaining } => {
                    let skip = (*remaining).min(available);
                    *remaining -= skip;
                    offset += skip;
                    if *remaining == 0 {
                        self.state = DecoderState::ReadingHeader { collected: 0 };
                    }
                }
            }
        }

        frames
    }

    /// Drop any partial frame (e.g. after a client reconnects).
    pub fn reset(&mut self) {
        self.state = DecoderState::ReadingHeader { collected: 0 };
    }
}

/// Write `[LE-u32 length][payload]` into `out_buf`.
///
/// Returns the total number of bytes written, or `None` if the payload is
/// too large or `out_buf` too small.
pub fn encode_frame(payload: &[u8], out_buf: &mut [u8]) -> Option<usize> {
    let total = HEADER_SIZE + payload.len();
    if total > out_buf.len() || payload.len() > MAX_FRAME_SIZE {
        return None;
    }

    let len_bytes = (payload.len() as u32).to_le_bytes();
    out_buf[..HEADER_SIZE].copy_from_slice(&len_bytes);
    out_buf[HEADER_SIZE..total].copy_from_slice(payload);

    Some(total)
}
