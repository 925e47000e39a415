// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::config::MonitorConfig;
use crate::transport::{LineBuffer, TransportEvent};
use currentcost_core::{
    classify, extract_periodic, Clock, DeviceInfo, HistoryAggregator, HistoryCycle, MessageKind,
    MonitorHandler,
};
use currentcost_error::{CurrentCostError, Result};
use currentcost_time::{Timer, TokioTimer};
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

/// Event loop tying a transport to a [`MonitorHandler`].
///
/// Lines are classified as they arrive. Periodic messages reach the handler at once;
/// history messages accumulate per sensor type until their quiet period elapses.
/// Everything runs on one task, so handler callbacks never overlap.
///
/// # Example
///
/// ```rust,no_run
/// use currentcost::{LoggingHandler, Monitor, MonitorConfig, SerialTransport};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> currentcost_error::Result<()> {
/// let config = MonitorConfig::from_file("monitor.toml")?;
/// let cancel = CancellationToken::new();
/// let transport = SerialTransport::from_config(&config).spawn(cancel.clone())?;
///
/// let monitor = Monitor::new(&config, LoggingHandler::default());
/// monitor.run(transport, cancel).await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Monitor<H, TM: Timer = TokioTimer> {
    handler: H,
    port: String,
    clock: Clock,
    clamp_count: u8,
    history: HistoryAggregator<TM>,
    device: DeviceInfo,
    lines: LineBuffer,
}

impl<H: MonitorHandler> Monitor<H, TokioTimer> {
    pub fn new(config: &MonitorConfig, handler: H) -> Self {
        Self::with_timer(config, handler, TokioTimer)
    }
}

impl<H: MonitorHandler, TM: Timer> Monitor<H, TM> {
    pub fn with_timer(config: &MonitorConfig, handler: H, timer: TM) -> Self {
        Self {
            handler,
            port: config.port.clone(),
            clock: Clock::new(config.use_utc_timestamps),
            clamp_count: config.clamp_count,
            history: HistoryAggregator::new(config.history_timeout(), timer),
            device: DeviceInfo::default(),
            lines: LineBuffer::new(),
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Metadata from the most recent messages.
    pub fn device_info(&self) -> &DeviceInfo {
        &self.device
    }

    pub fn history(&self) -> &HistoryAggregator<TM> {
        &self.history
    }

    /// Process one complete line.
    ///
    /// Blank lines are ignored. A periodic message is delivered to the handler before
    /// this returns; a history message is merged and its cycle timer armed.
    ///
    /// # Errors
    /// Returns the reason the line was dropped. No handler call is made and no history
    /// state changes in that case.
    pub fn handle_line(&mut self, line: &[u8]) -> Result<()> {
        if line.trim_ascii().is_empty() {
            return Ok(());
        }
        tracing::debug!(bytes = line.len(), "received a CurrentCost message");

        let message = classify(line)?;
        self.device.observe(&message.document);
        let timestamp = self.clock.now();

        match message.kind {
            MessageKind::Periodic => {
                let update = extract_periodic(&message.document, timestamp, self.clamp_count)?;
                self.handler.on_periodic_update(update);
            }
            MessageKind::History => {
                self.history.ingest(&message.document, timestamp)?;
            }
        }
        Ok(())
    }

    /// Feed a transport event through line framing.
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => {
                tracing::info!(port = %self.port, "connection made");
            }
            TransportEvent::Data(bytes) => {
                for line in self.lines.push(&bytes) {
                    if let Err(error) = self.handle_line(&line) {
                        report(&error);
                    }
                }
            }
            TransportEvent::Disconnected { reason } => {
                tracing::info!(port = %self.port, %reason, "connection lost");
                self.lines.clear();
            }
        }
    }

    fn deliver_history(&mut self, cycle: HistoryCycle) {
        self.handler.on_history_update(cycle);
    }

    /// Run until `cancel` fires or the transport ends, then return the handler.
    ///
    /// Pending history cycles are discarded on exit; no callback runs after this
    /// returns.
    pub async fn run<S>(mut self, mut transport: S, cancel: CancellationToken) -> H
    where
        S: Stream<Item = TransportEvent> + Unpin,
    {
        tracing::info!(
            port = %self.port,
            timeout = ?self.history.timeout(),
            "CurrentCostMonitor starting"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                Some(cycle) = self.history.next_completed() => self.deliver_history(cycle),
                event = transport.next() => match event {
                    Some(event) => self.handle_transport_event(event),
                    None => {
                        tracing::info!(port = %self.port, "transport closed");
                        break;
                    }
                },
            }
        }

        let discarded = self.history.shutdown();
        tracing::info!(discarded, "CurrentCostMonitor stopping");
        self.handler
    }
}

fn report(error: &CurrentCostError) {
    match error {
        CurrentCostError::Parse { line, .. } => {
            tracing::error!(%error, %line, "error parsing msg xml");
        }
        error if error.is_sensor_type() => {
            tracing::warn!(%error, "dropping message");
        }
        error => {
            tracing::error!(%error, "problem processing message");
        }
    }
}
