//! TCP bus transport.
//!
//! Implements [`BusTransport`] as a non-blocking TCP server with up to
//! [`MAX_CLIENTS`] plaintext connections.  Connections beyond that are
//! accepted and immediately closed so they do not sit in the backlog.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::bus::transport::{BusTransport, ClientId, MAX_CLIENTS};
use crate::error::BusError;

/// Bound on how long a write may spin on a full socket buffer.
const WRITE_RETRIES: u32 = 50;
const WRITE_RETRY_DELAY: Duration = Duration::from_millis(1);

pub struct TcpBus {
    listener: TcpListener,
    clients: [Option<TcpStream>; MAX_CLIENTS],
}

impl TcpBus {
    /// Bind a non-blocking listener on `addr` (`host:port`; port 0 picks
    /// a free one).
    pub fn bind(addr: &str) -> Result<Self, BusError> {
        let listener = TcpListener::bind(addr).map_err(|e| {
            warn!("TCP: bind {} failed: {}", addr, e);
            BusError::BindFailed
        })?;
        listener
            .set_nonblocking(true)
            .map_err(|_| BusError::BindFailed)?;

        if let Ok(local) = listener.local_addr() {
            info!("TCP: bus listening on {}", local);
        }

        Ok(Self {
            listener,
            clients: Default::default(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, BusError> {
        self.listener.local_addr().map_err(|_| BusError::BindFailed)
    }

    pub fn connected_count(&self) -> usize {
        self.clients.iter().filter(|c| c.is_some()).count()
    }

    fn stream(&mut self, cid: ClientId) -> Result<&mut TcpStream, BusError> {
        self.clients
            .get_mut(cid as usize)
            .and_then(Option::as_mut)
            .ok_or(BusError::NotConnected)
    }
}

impl BusTransport for TcpBus {
    fn try_accept(&mut self) -> Option<ClientId> {
        let (stream, addr) = match self.listener.accept() {
            Ok(pair) => pair,
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => return None,
            Err(e) => {
                warn!("TCP: accept error: {}", e);
                return None;
            }
        };

        let Some(slot) = self.clients.iter().position(Option::is_none) else {
            warn!("TCP: rejecting {} (all {} slots busy)", addr, MAX_CLIENTS);
            return None;
        };
        if stream.set_nonblocking(true).is_err() {
            warn!("TCP: failed to set non-blocking on {}", addr);
            return None;
        }
        if let Err(e) = stream.set_nodelay(true) {
            debug!("TCP: set_nodelay on {} failed: {}", addr, e);
        }

        info!("TCP: client {} connected from {}", slot, addr);
        self.clients[slot] = Some(stream);
        Some(slot as ClientId)
    }

    fn is_connected(&self, cid: ClientId) -> bool {
        self.clients
            .get(cid as usize)
            .is_some_and(Option::is_some)
    }

    fn read_client(&mut self, cid: ClientId, buf: &mut [u8]) -> Result<usize, BusError> {
        let stream = self.stream(cid)?;
        match stream.read(buf) {
            Ok(0) => {
                info!("TCP: client {} closed", cid);
                self.disconnect(cid);
                Err(BusError::NotConnected)
            }
            Ok(n) => Ok(n),
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(ref e) if e.kind() == ErrorKind::Interrupted => Ok(0),
            Err(_) => Err(BusError::ReadFailed),
        }
    }

    fn write_client(&mut self, cid: ClientId, mut data: &[u8]) -> Result<(), BusError> {
        let stream = self.stream(cid)?;
        let mut stalls = 0;
        while !data.is_empty() {
            match stream.write(data) {
                Ok(0) => return Err(BusError::WriteFailed),
                Ok(n) => data = &data[n..],
                Err(ref e) if e.kind() == ErrorKind::WouldBlock && stalls < WRITE_RETRIES => {
                    stalls += 1;
                    thread::sleep(WRITE_RETRY_DELAY);
                }
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(_) => return Err(BusError::WriteFailed),
            }
        }
        Ok(())
    }

    fn flush_client(&mut self, cid: ClientId) -> Result<(), BusError> {
        self.stream(cid)?.flush().map_err(|_| BusError::WriteFailed)
    }

    fn disconnect(&mut self, cid: ClientId) {
        if let Some(slot) = self.clients.get_mut(cid as usize) {
            if slot.take().is_some() {
                info!("TCP: client {} disconnected", cid);
            }
        }
    }
}
