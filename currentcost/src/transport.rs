// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Byte transport from the display unit.
//!
//! The monitor consumes any `Stream<Item = TransportEvent>`. [`SerialTransport`] is the
//! production source; tests drive the monitor through a channel instead.

use crate::config::MonitorConfig;
use currentcost_error::{Result, ResultExt};
use std::io::ErrorKind;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;

/// Longest line accepted before the partial line is discarded.
pub const MAX_LINE_LENGTH: usize = 16_384;

const READ_TIMEOUT: Duration = Duration::from_millis(500);
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What the transport observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    /// Raw bytes, not aligned to line boundaries
    Data(Vec<u8>),
    Disconnected { reason: String },
}

/// Splits a byte stream into `\n`-terminated lines.
///
/// A trailing `\r` is stripped from each line. A line that grows past the maximum
/// length is dropped in full: bytes are discarded until the next delimiter.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    buffer: Vec<u8>,
    max_length: usize,
    discarding: bool,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::with_max_length(MAX_LINE_LENGTH)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_length,
            discarding: false,
        }
    }

    /// Append a chunk and return every line it completes, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        let mut segments = chunk.split(|byte| *byte == b'\n').peekable();

        while let Some(segment) = segments.next() {
            self.extend(segment);
            if segments.peek().is_some() {
                if let Some(line) = self.take_line() {
                    lines.push(line);
                }
            }
        }
        lines
    }

    /// Drop any partial line, e.g. after the connection is lost.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }

    /// Bytes held for the current partial line.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn extend(&mut self, segment: &[u8]) {
        if self.discarding {
            return;
        }
        if self.buffer.len() + segment.len() > self.max_length {
            tracing::warn!(
                max_length = self.max_length,
                "line length exceeded, discarding partial line"
            );
            self.buffer.clear();
            self.discarding = true;
            return;
        }
        self.buffer.extend_from_slice(segment);
    }

    fn take_line(&mut self) -> Option<Vec<u8>> {
        if self.discarding {
            self.discarding = false;
            return None;
        }
        let mut line = core::mem::take(&mut self.buffer);
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }
}

/// Serial port reader with automatic reconnection.
///
/// The port is read on a dedicated OS thread that only forwards raw chunks; when the
/// device disappears the thread reports [`TransportEvent::Disconnected`] and retries
/// after the reconnect delay until cancelled.
#[derive(Debug, Clone)]
pub struct SerialTransport {
    port: String,
    baud_rate: u32,
    reconnect_delay: Duration,
}

impl SerialTransport {
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            reconnect_delay: Duration::from_secs(5),
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Self {
        Self::new(config.port.as_str(), config.baud_rate)
            .with_reconnect_delay(config.reconnect_delay())
    }

    #[must_use]
    pub fn with_reconnect_delay(mut self, reconnect_delay: Duration) -> Self {
        self.reconnect_delay = reconnect_delay;
        self
    }

    /// Start the reader thread.
    ///
    /// The returned stream ends once `cancel` fires and the thread has exited.
    ///
    /// # Errors
    /// Returns [`CurrentCostError::Transport`](currentcost_error::CurrentCostError::Transport) if the thread cannot be spawned.
    pub fn spawn(
        self,
        cancel: CancellationToken,
    ) -> Result<UnboundedReceiverStream<TransportEvent>> {
        let (tx, rx) = unbounded_channel();
        std::thread::Builder::new()
            .name("currentcost-serial".to_string())
            .spawn(move || self.run(&tx, &cancel))
            .transport("failed to spawn serial reader thread")?;
        Ok(UnboundedReceiverStream::new(rx))
    }

    fn run(&self, tx: &UnboundedSender<TransportEvent>, cancel: &CancellationToken) {
        while !cancel.is_cancelled() {
            match self.open() {
                Ok(mut port) => {
                    tracing::info!(port = %self.port, "serial port opened");
                    if tx.send(TransportEvent::Connected).is_err() {
                        return;
                    }
                    let Some(reason) = self.read_until_lost(port.as_mut(), tx, cancel) else {
                        return;
                    };
                    tracing::warn!(port = %self.port, %reason, "serial connection lost");
                    if tx.send(TransportEvent::Disconnected { reason }).is_err() {
                        return;
                    }
                }
                Err(error) => {
                    tracing::warn!(%error, "failed to open serial port");
                }
            }
            self.wait_before_reconnect(cancel);
        }
        tracing::debug!(port = %self.port, "serial reader stopped");
    }

    fn open(&self) -> Result<Box<dyn serialport::SerialPort>> {
        tracing::info!(
            port = %self.port,
            baud_rate = self.baud_rate,
            "attempting to open serial port"
        );
        serialport::new(self.port.as_str(), self.baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
            .transport(format!("open {}", self.port))
    }

    /// Forward reads until the port fails. Returns `None` when reading stopped because
    /// of cancellation or because nobody is listening any more.
    fn read_until_lost(
        &self,
        port: &mut dyn serialport::SerialPort,
        tx: &UnboundedSender<TransportEvent>,
        cancel: &CancellationToken,
    ) -> Option<String> {
        let mut chunk = [0u8; 1024];
        while !cancel.is_cancelled() {
            match port.read(&mut chunk) {
                Ok(0) => return Some("end of stream".to_string()),
                Ok(read) => {
                    if tx.send(TransportEvent::Data(chunk[..read].to_vec())).is_err() {
                        return None;
                    }
                }
                Err(error)
                    if matches!(error.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => {}
                Err(error) => return Some(error.to_string()),
            }
        }
        None
    }

    fn wait_before_reconnect(&self, cancel: &CancellationToken) {
        let mut waited = Duration::ZERO;
        while waited < self.reconnect_delay && !cancel.is_cancelled() {
            std::thread::sleep(CANCEL_POLL_INTERVAL);
            waited += CANCEL_POLL_INTERVAL;
        }
    }
}
