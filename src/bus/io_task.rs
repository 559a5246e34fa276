//! Async bus I/O task: reactor-driven multi-client transport bridge.
//!
//! Runs in a dedicated thread using `edge-executor` for cooperative
//! multi-task scheduling and `async-io-mini` for reactor-driven timers.
//! Three concurrent futures:
//!
//! 1. **Accept**: polls `try_accept()` every 50ms
//! 2. **Read**: polls every connected client every 1ms and feeds the
//!    per-client frame decoder; complete frames go into the command pipe
//! 3. **Write**: wakes on `resp.receive().await` and broadcasts each
//!    outbound frame to all connected clients
//!
//! ```text
//!  ┌────────────────────────────────────────────────────────┐
//!  │  bus-io thread                                         │
//!  │  futures_lite::block_on                                │
//!  │   └─ edge_executor::LocalExecutor                      │
//!  │       ┌─────────┐  ┌──────────┐  ┌──────────────────┐  │
//!  │       │ Accept  │  │ Read all │  │ Write (broadcast)│  │
//!  │       │ 50ms    │  │ 1ms      │  │ wake-on-send     │  │
//!  │       └─────────┘  └──────────┘  └──────────────────┘  │
//!  └────────────────────────────────────────────────────────┘
//! ```

use core::cell::RefCell;
use core::time::Duration;
use std::io;
use std::rc::Rc;
use std::thread::JoinHandle;

use heapless::Vec;
use log::{info, warn};

use crate::drivers::task;
use crate::error::BusError;

use super::channels::{PipeChannel, PipeMsg, RespChannel, post};
use super::codec::FrameDecoder;
use super::transport::{BusTransport, ClientId, MAX_CLIENTS};

const READ_BUF_SIZE: usize = 512;
const ACCEPT_PERIOD: Duration = Duration::from_millis(50);
const READ_PERIOD: Duration = Duration::from_millis(1);

/// Channels the task talks to.
#[derive(Clone, Copy)]
pub struct BusLinks {
    pub pipe: &'static PipeChannel,
    pub resp: &'static RespChannel,
}

// ── Per-client decoder state ─────────────────────────────────

type Slots = [FrameDecoder; MAX_CLIENTS];

/// Decode `data` from `client_id` and post every complete frame.
/// Returns the number of frames posted.
pub fn feed_client_bytes(
    decoder: &mut FrameDecoder,
    client_id: ClientId,
    data: &[u8],
    pipe: &PipeChannel,
) -> usize {
    let mut posted = 0;
    decoder.feed(data, |frame| {
        // Frames never exceed the record buffer; the codec enforces it.
        let Ok(record) = Vec::from_slice(frame) else {
            warn!("IO[{}]: frame too large for the pipe", client_id);
            return;
        };
        if post(pipe, PipeMsg::Command { client_id, record }) {
            posted += 1;
        }
    });
    posted
}

// ── Async loops ──────────────────────────────────────────────

type Shared<T> = Rc<RefCell<T>>;

async fn accept_loop<T: BusTransport>(transport: Shared<T>, slots: Shared<Slots>) {
    loop {
        if let Some(cid) = transport.borrow_mut().try_accept() {
            slots.borrow_mut()[cid as usize].reset();
        }
        async_io_mini::Timer::after(ACCEPT_PERIOD).await;
    }
}

async fn read_loop<T: BusTransport>(transport: Shared<T>, slots: Shared<Slots>, links: BusLinks) {
    let mut buf = [0u8; READ_BUF_SIZE];
    loop {
        {
            let mut t = transport.borrow_mut();
            let mut s = slots.borrow_mut();
            for idx in 0..MAX_CLIENTS {
                let cid = idx as ClientId;
                if !t.is_connected(cid) {
                    continue;
                }
                match t.read_client(cid, &mut buf) {
                    Ok(0) => {}
                    Ok(n) => {
                        feed_client_bytes(&mut s[idx], cid, &buf[..n], links.pipe);
                    }
                    Err(BusError::NotConnected) => s[idx].reset(),
                    Err(e) => {
                        warn!("IO: client {} {}, disconnecting", cid, e);
                        t.disconnect(cid);
                        s[idx].reset();
                    }
                }
            }
        }
        async_io_mini::Timer::after(READ_PERIOD).await;
    }
}

async fn write_loop<T: BusTransport>(transport: Shared<T>, slots: Shared<Slots>, links: BusLinks) {
    loop {
        let out = links.resp.receive().await;
        let mut t = transport.borrow_mut();
        broadcast(&mut *t, &out.data, |cid| slots.borrow_mut()[cid as usize].reset());
    }
}

/// Write `frame` to every connected client, dropping any that fail.
/// Returns the number of clients reached.
pub fn broadcast<T: BusTransport + ?Sized>(
    t: &mut T,
    frame: &[u8],
    mut on_drop: impl FnMut(ClientId),
) -> usize {
    let mut reached = 0;
    for idx in 0..MAX_CLIENTS {
        let cid = idx as ClientId;
        if !t.is_connected(cid) {
            continue;
        }
        match t.write_client(cid, frame).and_then(|()| t.flush_client(cid)) {
            Ok(()) => reached += 1,
            Err(e) => {
                warn!("IO: client {} {}, disconnecting", cid, e);
                t.disconnect(cid);
                on_drop(cid);
            }
        }
    }
    reached
}

/// Thread body: set up the executor and drive the three tasks forever.
pub fn run_io_loop<T: BusTransport + 'static>(transport: T, links: BusLinks) {
    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();

    let transport = Rc::new(RefCell::new(transport));
    let slots: Shared<Slots> = Rc::new(RefCell::new(core::array::from_fn(|_| FrameDecoder::new())));

    executor
        .spawn(accept_loop(transport.clone(), slots.clone()))
        .detach();
    executor
        .spawn(read_loop(transport.clone(), slots.clone(), links))
        .detach();
    executor
        .spawn(write_loop(transport, slots, links))
        .detach();

    info!("IO task started ({} max clients)", MAX_CLIENTS);
    futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
}

/// Spawn the I/O task on its own thread.  Takes ownership of the transport.
pub fn spawn<T: BusTransport + Send + 'static>(
    transport: T,
    links: BusLinks,
) -> io::Result<JoinHandle<()>> {
    task::spawn_named("bus-io", 32, move || run_io_loop(transport, links))
}
