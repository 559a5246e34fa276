//! Transport abstraction for the command/telemetry bus.
//!
//! A bus transport is a non-blocking, multi-client byte channel.  The
//! I/O task is generic over [`BusTransport`], so a serial line or a Unix
//! socket could replace TCP without touching the task.

use crate::error::BusError;

/// Slot index of a connected client.
pub type ClientId = u8;

/// Maximum simultaneously connected clients.
pub const MAX_CLIENTS: usize = 4;

pub trait BusTransport {
    /// Accept one pending client, if any.  Never blocks.
    fn try_accept(&mut self) -> Option<ClientId>;

    fn is_connected(&self, cid: ClientId) -> bool;

    /// Read available bytes.  `Ok(0)` means nothing to read right now.
    /// A closed peer reports [`BusError::NotConnected`] and frees the slot.
    fn read_client(&mut self, cid: ClientId, buf: &mut [u8]) -> Result<usize, BusError>;

    /// Write the whole of `data` to one client.
    fn write_client(&mut self, cid: ClientId, data: &[u8]) -> Result<(), BusError>;

    fn flush_client(&mut self, cid: ClientId) -> Result<(), BusError>;

    fn disconnect(&mut self, cid: ClientId);
}
