// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use currentcost::{
    CurrentCostError, LoggingHandler, Monitor, MonitorConfig, SensorData, SensorInstance,
    SensorType, TransportEvent,
};
use currentcost_test_utils::fixtures::{
    electricity_line, periodic_line, HistoryLine, PERIODIC_OPTISMART, PERIODIC_WHOLE_HOUSE,
};
use currentcost_test_utils::{
    assert_no_event_emitted, line_event, next_event, settle, transport_channel, RecordingHandler,
};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::{advance, pause};
use tokio_util::sync::CancellationToken;

fn config() -> MonitorConfig {
    MonitorConfig::new("/dev/null")
}

#[tokio::test]
async fn test_periodic_line_reaches_handler() -> anyhow::Result<()> {
    pause();

    // Arrange
    let (handler, mut events) = RecordingHandler::channel();
    let (tx, transport) = transport_channel();
    let cancel = CancellationToken::new();
    let run = tokio::spawn(Monitor::new(&config(), handler).run(transport, cancel.clone()));

    // Act
    tx.send(TransportEvent::Connected)?;
    tx.send(line_event(PERIODIC_WHOLE_HOUSE))?;

    // Assert
    let update = next_event(&mut events).await.into_periodic();
    assert_eq!(update.sensor_type, SensorType::Electricity);
    assert!(matches!(update.sensor_data, SensorData::Electricity(ref channels) if channels.len() == 3));

    cancel.cancel();
    run.await?;
    Ok(())
}

#[tokio::test]
async fn test_history_burst_is_delivered_after_quiet_period() -> anyhow::Result<()> {
    pause();

    // Arrange
    let (handler, mut events) = RecordingHandler::channel();
    let (tx, transport) = transport_channel();
    let cancel = CancellationToken::new();
    let run = tokio::spawn(Monitor::new(&config(), handler).run(transport, cancel.clone()));

    // Act
    tx.send(line_event(&HistoryLine::new("1").data(1, &[("h01", "012")]).build()))?;
    settle().await;
    advance(Duration::from_secs(10)).await;
    tx.send(line_event(&HistoryLine::new("1").data(1, &[("h02", "000")]).data(2, &[("h01", "0")]).build()))?;
    settle().await;

    // Assert
    advance(Duration::from_secs(19)).await;
    settle().await;
    assert_no_event_emitted(&mut events, 0).await;

    advance(Duration::from_secs(1)).await;
    let cycle = next_event(&mut events).await.into_history();
    assert_eq!(cycle.sensor_type, SensorType::Electricity);
    assert_eq!(cycle.records.keys().copied().collect::<Vec<_>>(), vec![SensorInstance::new(1)?]);
    let record = &cycle.records[&SensorInstance::new(1)?];
    assert_eq!(record.hour_data().count(), 2);

    cancel.cancel();
    run.await?;
    Ok(())
}

#[tokio::test]
async fn test_bad_lines_are_dropped_without_stopping_the_monitor() -> anyhow::Result<()> {
    pause();

    // Arrange
    let (handler, mut events) = RecordingHandler::channel();
    let (tx, transport) = transport_channel();
    let cancel = CancellationToken::new();
    let run = tokio::spawn(Monitor::new(&config(), handler).run(transport, cancel.clone()));

    // Act
    tx.send(line_event("<msg><src>broken"))?;
    tx.send(line_event(&periodic_line("5", 0, "")))?;
    tx.send(line_event(&periodic_line("0", 0, "")))?;
    tx.send(line_event(&HistoryLine::new("1").data(1, &[("h01", "oops")]).build()))?;
    tx.send(line_event(""))?;
    tx.send(line_event(PERIODIC_OPTISMART))?;

    // Assert
    let update = next_event(&mut events).await.into_periodic();
    assert_eq!(update.sensor_type, SensorType::OptiSmart);

    advance(Duration::from_secs(60)).await;
    settle().await;
    assert_no_event_emitted(&mut events, 0).await;

    cancel.cancel();
    run.await?;
    Ok(())
}

#[tokio::test]
async fn test_disconnect_discards_partial_line() -> anyhow::Result<()> {
    pause();

    // Arrange
    let (handler, mut events) = RecordingHandler::channel();
    let (tx, transport) = transport_channel();
    let cancel = CancellationToken::new();
    let run = tokio::spawn(Monitor::new(&config(), handler).run(transport, cancel.clone()));

    // Act
    tx.send(TransportEvent::Data(b"<msg><src>CC128-v0.11</src><dsb>00".to_vec()))?;
    tx.send(TransportEvent::Disconnected {
        reason: "device unplugged".to_string(),
    })?;
    tx.send(TransportEvent::Connected)?;
    tx.send(line_event(&electricity_line(3, &[(1, "00120")])))?;

    // Assert
    let update = next_event(&mut events).await.into_periodic();
    assert_eq!(update.sensor_instance, SensorInstance::new(3)?);

    cancel.cancel();
    run.await?;
    Ok(())
}

#[tokio::test]
async fn test_cancel_discards_pending_history() -> anyhow::Result<()> {
    pause();

    // Arrange
    let (handler, mut events) = RecordingHandler::channel();
    let (tx, transport) = transport_channel();
    let cancel = CancellationToken::new();
    let run = tokio::spawn(Monitor::new(&config(), handler).run(transport, cancel.clone()));
    tx.send(line_event(&HistoryLine::new("1").data(0, &[("h01", "4")]).build()))?;
    settle().await;

    // Act
    cancel.cancel();
    let handler = run.await?;
    drop(handler);
    advance(Duration::from_secs(60)).await;

    // Assert
    assert!(events.next().await.is_none());
    Ok(())
}

#[tokio::test]
async fn test_transport_end_stops_the_monitor() -> anyhow::Result<()> {
    // Arrange
    let (tx, transport) = transport_channel();
    let run = tokio::spawn(
        Monitor::new(&config(), LoggingHandler::default()).run(transport, CancellationToken::new()),
    );
    tx.send(line_event(PERIODIC_WHOLE_HOUSE))?;

    // Act
    drop(tx);
    let handler = run.await?;

    // Assert
    assert_eq!(handler.periodic_updates(), 1);
    assert_eq!(handler.history_updates(), 0);
    Ok(())
}

#[tokio::test]
async fn test_handle_line_reports_errors_and_tracks_device() -> anyhow::Result<()> {
    pause();

    // Arrange
    let mut monitor = Monitor::new(&config(), LoggingHandler::default());

    // Act
    let parse = monitor.handle_line(b"<msg>");
    let blank = monitor.handle_line(b"  \r");
    monitor.handle_line(HistoryLine::new("1").dsw("00051").data(0, &[("h01", "1")]).build().as_bytes())?;
    monitor.handle_line(PERIODIC_WHOLE_HOUSE.as_bytes())?;

    // Assert
    assert!(matches!(parse, Err(CurrentCostError::Parse { .. })));
    assert!(blank.is_ok());
    assert_eq!(monitor.handler().periodic_updates(), 1);
    assert!(monitor.history().is_accumulating(SensorType::Electricity));

    let device = monitor.device_info();
    assert_eq!(device.source.as_deref(), Some("CC128-v0.11"));
    assert_eq!(device.days_since_birth.as_deref(), Some("00089"));
    assert_eq!(device.days_since_wiped.as_deref(), Some("00051"));
    Ok(())
}
