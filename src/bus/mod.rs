//! Command/telemetry bus: framing, transport seam, channels, the async
//! I/O task, telemetry packets, and the pipe consumer.

pub mod channels;
pub mod codec;
pub mod io_task;
pub mod router;
pub mod telemetry;
pub mod transport;
