//! Status telemetry packet and publisher.
//!
//! Each packet is a postcard-encoded [`StatusTlm`] inside a bus frame.
//! `seq` counts published packets (wrapping) so a client can spot drops.

use heapless::Vec;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::adapters::time::MonotonicClock;
use crate::app::events::StatusSnapshot;

use super::channels::{MAX_OUT_FRAME, OutFrame, RespChannel};
use super::codec::{HEADER_SIZE, encode_frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTlm {
    pub seq: u32,
    pub uptime_ms: u64,
    pub status: StatusSnapshot,
}

/// Encode `tlm` as a complete bus frame.
pub fn encode_status_frame(tlm: &StatusTlm) -> Option<Vec<u8, MAX_OUT_FRAME>> {
    let mut payload = [0u8; MAX_OUT_FRAME - HEADER_SIZE];
    let used = postcard::to_slice(tlm, &mut payload).ok()?;

    let mut frame = [0u8; MAX_OUT_FRAME];
    let n = encode_frame(used, &mut frame)?;
    Vec::from_slice(&frame[..n]).ok()
}

/// Decode a telemetry payload (frame header already stripped).
pub fn decode_status(payload: &[u8]) -> Result<StatusTlm, postcard::Error> {
    postcard::from_bytes(payload)
}

/// Stamps snapshots and queues them for every bus client.
pub struct StatusPublisher {
    seq: u32,
    clock: MonotonicClock,
}

impl StatusPublisher {
    pub fn new(clock: MonotonicClock) -> Self {
        Self { seq: 0, clock }
    }

    /// Stamp and queue one packet.  Returns `false` if it was dropped.
    pub fn publish(&mut self, status: StatusSnapshot, resp: &RespChannel) -> bool {
        let tlm = StatusTlm {
            seq: self.seq,
            uptime_ms: self.clock.uptime_ms(),
            status,
        };
        self.seq = self.seq.wrapping_add(1);

        let Some(data) = encode_status_frame(&tlm) else {
            warn!("TLM: packet {} does not fit a frame", tlm.seq);
            return false;
        };
        if resp.try_send(OutFrame { data }).is_err() {
            warn!("TLM: outbound queue full, dropping packet {}", tlm.seq);
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::events::BlinkTiming;
    use crate::bus::codec::FrameDecoder;

    fn worst_case() -> StatusSnapshot {
        StatusSnapshot {
            valid_cmd_count: u16::MAX,
            invalid_cmd_count: u16::MAX,
            is_mapped: true,
            out_pin: u32::MAX,
            led_on: true,
            timing: Some(BlinkTiming {
                on_time_ms: u32::MAX,
                off_time_ms: u32::MAX,
            }),
        }
    }

    #[test]
    fn largest_packet_fits_a_frame() {
        let tlm = StatusTlm { seq: u32::MAX, uptime_ms: u64::MAX, status: worst_case() };
        let frame = encode_status_frame(&tlm).unwrap();

        let mut got = None;
        FrameDecoder::new().feed(&frame, |p| got = Some(decode_status(p).unwrap()));
        assert_eq!(got, Some(tlm));
    }

    #[test]
    fn publisher_numbers_packets() {
        let resp = RespChannel::new();
        let mut publisher = StatusPublisher::new(MonotonicClock::new());
        assert!(publisher.publish(worst_case(), &resp));
        assert!(publisher.publish(worst_case(), &resp));

        let mut seqs = Vec::<u32, 2>::new();
        while let Ok(out) = resp.try_receive() {
            FrameDecoder::new().feed(&out.data, |p| {
                let _ = seqs.push(decode_status(p).unwrap().seq);
            });
        }
        assert_eq!(seqs.as_slice(), &[0, 1]);
    }
}
