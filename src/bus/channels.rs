//! Inter-thread channels.
//!
//! Bounded `embassy-sync` channels bridge the async bus I/O task, the
//! scheduler thread, and the synchronous command pipe consumer.  The
//! process-wide instances are statics; tests build their own.
//!
//! ```text
//! ┌────────────┐  PipeMsg::Command  ┌──────────────┐
//! │  I/O task  │───────────────────▶│              │
//! │  (async)   │◀───────────────────│  main thread │
//! └────────────┘     OutFrame       │  (pipe loop) │
//! ┌────────────┐ PipeMsg::SendStatus│              │
//! │ scheduler  │───────────────────▶│              │
//! └────────────┘                    └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;
use log::warn;

use super::codec::{HEADER_SIZE, MAX_FRAME_SIZE};
use super::transport::ClientId;

/// Command pipe depth.
pub const PIPE_DEPTH: usize = 8;

/// Outbound frame queue depth.
pub const RESP_DEPTH: usize = 16;

/// Largest encoded outbound frame (header included).
pub const MAX_OUT_FRAME: usize = HEADER_SIZE + 64;

/// Messages consumed by the main thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipeMsg {
    /// A command record received from a bus client.
    Command {
        client_id: ClientId,
        record: Vec<u8, MAX_FRAME_SIZE>,
    },
    /// Time to publish status telemetry.
    SendStatus,
}

/// A framed packet for every connected client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutFrame {
    pub data: Vec<u8, MAX_OUT_FRAME>,
}

pub type PipeChannel = Channel<CriticalSectionRawMutex, PipeMsg, PIPE_DEPTH>;
pub type RespChannel = Channel<CriticalSectionRawMutex, OutFrame, RESP_DEPTH>;

/// Command pipe: bus I/O task and scheduler → main thread.
pub static PIPE: PipeChannel = Channel::new();

/// Outbound frames: main thread → bus I/O task.
pub static RESP: RespChannel = Channel::new();

/// Post to the pipe without blocking.  A full pipe drops the message.
pub fn post(pipe: &PipeChannel, msg: PipeMsg) -> bool {
    if pipe.try_send(msg).is_err() {
        warn!("Pipe full, dropping message");
        return false;
    }
    true
}
