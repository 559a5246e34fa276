//! Command pipe consumer.
//!
//! The main thread blocks on the pipe (pend forever) and routes each
//! message: command records to the service, status triggers to the
//! telemetry publisher.

use futures_lite::future::block_on;
use log::debug;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, GpioPort};
use crate::app::service::AppService;

use super::channels::{PipeChannel, PipeMsg, RespChannel};
use super::telemetry::StatusPublisher;

/// Handle one pipe message.
pub fn route<G: GpioPort>(
    msg: PipeMsg,
    service: &mut AppService<G>,
    sink: &mut impl EventSink,
    publisher: &mut StatusPublisher,
    resp: &RespChannel,
) {
    match msg {
        PipeMsg::Command { client_id, record } => {
            debug!("Pipe: {} byte record from client {}", record.len(), client_id);
            // Rejections are already counted and reported by the service.
            let _ = service.handle_record(&record, sink);
        }
        PipeMsg::SendStatus => {
            let status = service.build_status();
            sink.emit(&AppEvent::Telemetry(status));
            publisher.publish(status, resp);
        }
    }
}

/// Consume the pipe forever.
pub fn run_pipe<G: GpioPort>(
    pipe: &PipeChannel,
    service: &mut AppService<G>,
    sink: &mut impl EventSink,
    publisher: &mut StatusPublisher,
    resp: &RespChannel,
) -> ! {
    loop {
        let msg = block_on(pipe.receive());
        route(msg, service, sink, publisher, resp);
    }
}
