//! # Remote Link
//!
//! TCP connection to the multiworld server. A dedicated reader thread splits
//! the byte stream into lines and pushes them onto a shared FIFO; the update
//! tick drains it with [`Link::poll_inbound`]. Nothing inbound is processed
//! on the reader thread.
//!
//! A closed socket only flips [`LinkStatus`] to `Closed`. There is no
//! automatic reconnect; a new link is a fresh [`RemoteLink::connect`].

pub mod framer;

use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, info, trace, warn};
use thiserror::Error;

use crate::logutil::frame_preview;
use crate::metrics;
use crate::protocol::{self, ClientPacket, ProtocolError};

use framer::LineFramer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    Connecting,
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub slot: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTuning {
    pub connect_attempts: u32,
    pub retry_delay: Duration,
    pub read_timeout: Duration,
    pub max_line_bytes: usize,
}

impl Default for LinkTuning {
    fn default() -> Self {
        Self {
            connect_attempts: 5,
            retry_delay: Duration::from_millis(500),
            read_timeout: Duration::from_millis(250),
            max_line_bytes: framer::DEFAULT_MAX_LINE,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("could not reach {addr} after {attempts} attempts: {source}")]
    RetriesExhausted {
        addr: String,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },
    #[error("socket setup failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("link is closed")]
    Closed,
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Encode(#[from] ProtocolError),
}

/// The coordinator's view of a connection.
pub trait Link {
    fn send(&mut self, packet: &ClientPacket) -> Result<(), LinkError>;
    /// Every line received since the last call, in arrival order. Never blocks.
    fn poll_inbound(&mut self) -> Vec<String>;
    fn status(&self) -> LinkStatus;
    /// Stop the reader and drop anything still queued.
    fn disconnect(&mut self);
    fn credentials(&self) -> &Credentials;
}

type Inbox = Arc<Mutex<VecDeque<String>>>;

pub struct RemoteLink {
    addr: String,
    credentials: Credentials,
    writer: TcpStream,
    inbox: Inbox,
    status: Arc<Mutex<LinkStatus>>,
    shutdown: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl RemoteLink {
    /// Connect with bounded retries and start the reader thread.
    pub fn connect(
        address: &str,
        port: u16,
        credentials: Credentials,
        tuning: &LinkTuning,
    ) -> Result<Self, ConnectError> {
        let addr = format!("{}:{}", address, port);
        let attempts = tuning.connect_attempts.max(1);
        let mut attempt = 0;
        let stream = loop {
            attempt += 1;
            match TcpStream::connect(addr.as_str()) {
                Ok(s) => break s,
                Err(e) if attempt >= attempts => {
                    return Err(ConnectError::RetriesExhausted {
                        addr,
                        attempts,
                        source: e,
                    })
                }
                Err(e) => {
                    warn!("connect {} attempt {}/{} failed: {}", addr, attempt, attempts, e);
                    std::thread::sleep(tuning.retry_delay);
                }
            }
        };
        stream.set_nodelay(true)?;
        stream.set_read_timeout(Some(tuning.read_timeout))?;
        let reader_stream = stream.try_clone()?;

        let inbox: Inbox = Arc::new(Mutex::new(VecDeque::new()));
        let status = Arc::new(Mutex::new(LinkStatus::Open));
        let shutdown = Arc::new(AtomicBool::new(false));
        let reader = {
            let inbox = inbox.clone();
            let status = status.clone();
            let shutdown = shutdown.clone();
            let framer = LineFramer::new(tuning.max_line_bytes);
            let addr = addr.clone();
            std::thread::Builder::new()
                .name("goosebridge-link".to_string())
                .spawn(move || read_loop(reader_stream, framer, inbox, status, shutdown, addr))?
        };
        info!("connected to {} as {}", addr, credentials.slot);

        Ok(Self {
            addr,
            credentials,
            writer: stream,
            inbox,
            status,
            shutdown,
            reader: Some(reader),
        })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    fn set_status(&self, status: LinkStatus) {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner) = status;
    }
}

impl Link for RemoteLink {
    fn send(&mut self, packet: &ClientPacket) -> Result<(), LinkError> {
        if self.status() != LinkStatus::Open {
            return Err(LinkError::Closed);
        }
        let mut frame = protocol::encode(packet)?;
        trace!("-> {}", frame_preview(&frame));
        frame.push('\n');
        if let Err(e) = self
            .writer
            .write_all(frame.as_bytes())
            .and_then(|_| self.writer.flush())
        {
            warn!("send {} to {} failed: {}", packet.name(), self.addr, e);
            self.set_status(LinkStatus::Closed);
            return Err(e.into());
        }
        debug!("sent {}", packet.name());
        Ok(())
    }

    fn poll_inbound(&mut self) -> Vec<String> {
        let mut inbox = self.inbox.lock().unwrap_or_else(PoisonError::into_inner);
        inbox.drain(..).collect()
    }

    fn status(&self) -> LinkStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn disconnect(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        let _ = self.writer.shutdown(Shutdown::Both);
        if let Some(handle) = self.reader.take() {
            if handle.join().is_err() {
                warn!("link reader thread panicked");
            }
        }
        self.inbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.set_status(LinkStatus::Closed);
        info!("disconnected from {}", self.addr);
    }

    fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

impl Drop for RemoteLink {
    fn drop(&mut self) {
        if self.reader.is_some() {
            self.disconnect();
        }
    }
}

fn read_loop(
    mut stream: TcpStream,
    mut framer: LineFramer,
    inbox: Inbox,
    status: Arc<Mutex<LinkStatus>>,
    shutdown: Arc<AtomicBool>,
    addr: String,
) {
    let mut buf = [0u8; 8192];
    while !shutdown.load(Ordering::SeqCst) {
        match stream.read(&mut buf) {
            Ok(0) => {
                info!("{} closed the connection", addr);
                break;
            }
            Ok(n) => {
                framer.push(&buf[..n]);
                while let Some(frame) = framer.next_frame() {
                    match frame {
                        Ok(line) => {
                            metrics::inc_frames_received();
                            trace!("<- {}", frame_preview(&line));
                            inbox
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner)
                                .push_back(line);
                        }
                        Err(e) => {
                            metrics::inc_frames_dropped();
                            warn!("dropping frame from {}: {}", addr, e);
                        }
                    }
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                if !shutdown.load(Ordering::SeqCst) {
                    warn!("read from {} failed: {}", addr, e);
                }
                break;
            }
        }
    }
    *status.lock().unwrap_or_else(PoisonError::into_inner) = LinkStatus::Closed;
    debug!("reader for {} stopped", addr);
}
