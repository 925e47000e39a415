// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use currentcost_core::{
    classify, HistoryAggregator, HistoryCycle, SensorInstance, SensorType,
    DEFAULT_HISTORY_TIMEOUT,
};
use currentcost_error::CurrentCostError;
use currentcost_test_utils::fixtures::{timestamp, HistoryLine, HISTORY_ELECTRICITY};
use currentcost_time::{Timer, TokioTimer};
use futures::FutureExt;
use std::time::Duration;
use tokio::task::yield_now;
use tokio::time::{advance, pause};

fn ingest(aggregator: &mut HistoryAggregator, line: &str) -> currentcost_error::Result<SensorType> {
    let message = classify(line.as_bytes())?;
    aggregator.ingest(&message.document, timestamp(13, 10, 0))
}

async fn completed(aggregator: &mut HistoryAggregator) -> Option<HistoryCycle> {
    for _ in 0..10 {
        if let Some(cycle) = aggregator.next_completed().now_or_never() {
            return cycle;
        }
        yield_now().await;
    }
    None
}

async fn assert_not_completed(aggregator: &mut HistoryAggregator) {
    yield_now().await;
    if let Some(cycle) = aggregator.next_completed().now_or_never() {
        panic!("unexpected completed cycle: {cycle:?}");
    }
}

fn instance(id: u8) -> SensorInstance {
    SensorInstance::new(id).expect("valid instance")
}

#[tokio::test]
async fn test_messages_within_window_merge_into_one_record() -> anyhow::Result<()> {
    pause();

    // Arrange
    let mut aggregator = HistoryAggregator::default();

    // Act
    ingest(&mut aggregator, &HistoryLine::new("1").data(1, &[("h01", "012")]).build())?;
    advance(Duration::from_secs(5)).await;
    ingest(&mut aggregator, &HistoryLine::new("1").data(1, &[("h02", "000")]).build())?;
    advance(DEFAULT_HISTORY_TIMEOUT).await;

    // Assert
    let cycle = completed(&mut aggregator).await.expect("cycle completes");
    assert_eq!(cycle.sensor_type, SensorType::Electricity);
    assert_eq!(cycle.len(), 1);
    let record = cycle.get(instance(1)).expect("record for instance 1");
    assert!(record.has_data());
    let hours: Vec<_> = record
        .hour_data()
        .map(|(tag, value)| (tag.to_string(), value.to_string()))
        .collect();
    assert_eq!(
        hours,
        vec![
            ("h01".to_string(), "012".to_string()),
            ("h02".to_string(), "000".to_string()),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_all_zero_record_is_excluded() -> anyhow::Result<()> {
    pause();

    // Arrange
    let mut aggregator = HistoryAggregator::default();

    // Act
    ingest(&mut aggregator, HISTORY_ELECTRICITY)?;
    advance(DEFAULT_HISTORY_TIMEOUT).await;

    // Assert
    let cycle = completed(&mut aggregator).await.expect("cycle completes");
    assert_eq!(cycle.records.keys().copied().collect::<Vec<_>>(), vec![instance(0)]);
    let all = aggregator
        .records(SensorType::Electricity)
        .expect("records accumulated");
    assert_eq!(all.len(), 2);
    assert!(!all[&instance(1)].has_data());
    Ok(())
}

#[tokio::test]
async fn test_each_message_restarts_the_full_timeout() -> anyhow::Result<()> {
    pause();

    // Arrange
    let timer = TokioTimer;
    let mut aggregator = HistoryAggregator::new(DEFAULT_HISTORY_TIMEOUT, timer);
    let line = HistoryLine::new("1").data(0, &[("h01", "1")]).build();

    // Act
    ingest(&mut aggregator, &line)?;
    advance(Duration::from_secs(5)).await;
    ingest(&mut aggregator, &line)?;
    advance(Duration::from_secs(5)).await;
    ingest(&mut aggregator, &line)?;
    let third_at = timer.now();

    // Assert
    assert_eq!(
        aggregator.deadline(SensorType::Electricity),
        Some(third_at + DEFAULT_HISTORY_TIMEOUT)
    );

    advance(Duration::from_secs(10)).await;
    assert_not_completed(&mut aggregator).await;
    advance(Duration::from_secs(9)).await;
    assert_not_completed(&mut aggregator).await;
    assert!(aggregator.is_accumulating(SensorType::Electricity));

    advance(Duration::from_secs(1)).await;
    let cycle = completed(&mut aggregator).await.expect("cycle completes");
    assert_eq!(cycle.sensor_type, SensorType::Electricity);
    assert!(!aggregator.is_accumulating(SensorType::Electricity));
    Ok(())
}

#[tokio::test]
async fn test_sensor_types_complete_independently() -> anyhow::Result<()> {
    pause();

    // Arrange
    let mut aggregator = HistoryAggregator::default();

    // Act
    ingest(&mut aggregator, &HistoryLine::new("1").data(0, &[("h01", "1")]).build())?;
    advance(Duration::from_secs(15)).await;
    ingest(
        &mut aggregator,
        &HistoryLine::new("2").units("ipu").data(2, &[("d01", "4")]).build(),
    )?;
    advance(Duration::from_secs(5)).await;

    // Assert
    let first = completed(&mut aggregator).await.expect("electricity completes");
    assert_eq!(first.sensor_type, SensorType::Electricity);
    assert!(aggregator.is_accumulating(SensorType::OptiSmart));
    assert_not_completed(&mut aggregator).await;

    advance(Duration::from_secs(15)).await;
    let second = completed(&mut aggregator).await.expect("optismart completes");
    assert_eq!(second.sensor_type, SensorType::OptiSmart);
    assert_eq!(second.get(instance(2)).map(|r| r.units()), Some("ipu"));
    Ok(())
}

#[tokio::test]
async fn test_invalid_message_leaves_state_untouched() -> anyhow::Result<()> {
    pause();

    // Arrange
    let mut aggregator = HistoryAggregator::default();
    let line = HistoryLine::new("1")
        .data(1, &[("h01", "5")])
        .data(2, &[("h01", "not a number")])
        .build();

    // Act
    let err = ingest(&mut aggregator, &line).unwrap_err();

    // Assert
    assert!(err.is_extraction());
    assert!(aggregator.records(SensorType::Electricity).is_none());
    assert!(!aggregator.is_accumulating(SensorType::Electricity));
    advance(DEFAULT_HISTORY_TIMEOUT * 2).await;
    assert_not_completed(&mut aggregator).await;
    Ok(())
}

#[tokio::test]
async fn test_bad_lines_leave_pending_cycle_untouched() -> anyhow::Result<()> {
    pause();

    // Arrange
    let mut aggregator = HistoryAggregator::default();
    ingest(&mut aggregator, &HistoryLine::new("1").data(1, &[("h01", "7")]).build())?;
    let deadline = aggregator.deadline(SensorType::Electricity);
    advance(Duration::from_secs(5)).await;

    // Act
    let broken = ingest(&mut aggregator, "<msg><hist>");
    let invalid = ingest(
        &mut aggregator,
        &HistoryLine::new("1").data(1, &[("h01", "bad")]).build(),
    );

    // Assert
    assert!(matches!(broken, Err(CurrentCostError::Parse { .. })));
    assert!(invalid.is_err());
    assert!(deadline.is_some());
    assert_eq!(aggregator.deadline(SensorType::Electricity), deadline);

    advance(Duration::from_secs(14)).await;
    assert_not_completed(&mut aggregator).await;

    advance(Duration::from_secs(1)).await;
    let cycle = completed(&mut aggregator).await.expect("cycle completes on schedule");
    let hours: Vec<_> = cycle
        .get(instance(1))
        .expect("record for instance 1")
        .hour_data()
        .map(|(tag, value)| (tag.to_string(), value.to_string()))
        .collect();
    assert_eq!(hours, vec![("h01".to_string(), "7".to_string())]);
    Ok(())
}

#[tokio::test]
async fn test_unknown_tag_does_not_reject_message() -> anyhow::Result<()> {
    pause();

    // Arrange
    let mut aggregator = HistoryAggregator::default();
    let line = HistoryLine::new("1")
        .data(0, &[("h01", "5")])
        .data(1, &[("h01", "3"), ("x01", "n/a")])
        .build();

    // Act
    ingest(&mut aggregator, &line)?;
    advance(DEFAULT_HISTORY_TIMEOUT).await;

    // Assert
    let cycle = completed(&mut aggregator).await.expect("cycle completes");
    assert_eq!(cycle.len(), 2);
    let second = cycle.get(instance(1)).expect("record for instance 1");
    assert_eq!(second.len(), 1);
    assert_eq!(second.hour_data().map(|(_, value)| value).collect::<Vec<_>>(), vec!["3"]);
    Ok(())
}

#[tokio::test]
async fn test_unknown_history_type_is_rejected() -> anyhow::Result<()> {
    pause();

    // Arrange
    let mut aggregator = HistoryAggregator::default();

    // Act
    let err = ingest(&mut aggregator, &HistoryLine::new("9").data(0, &[("h01", "1")]).build())
        .unwrap_err();

    // Assert
    assert_eq!(err, CurrentCostError::unknown_sensor_type("9"));
    assert!(aggregator.records(SensorType::Electricity).is_none());
    Ok(())
}

#[tokio::test]
async fn test_out_of_range_instance_is_rejected() -> anyhow::Result<()> {
    pause();

    // Arrange
    let mut aggregator = HistoryAggregator::default();
    let line = HistoryLine::new("1").raw_data("10", &[("h01", "1")]).build();

    // Act
    let err = ingest(&mut aggregator, &line).unwrap_err();

    // Assert
    assert_eq!(err, CurrentCostError::invalid_field("hist/data/sensor", "10"));
    assert!(!aggregator.is_accumulating(SensorType::Electricity));
    Ok(())
}

#[tokio::test]
async fn test_cycle_without_data_is_still_delivered() -> anyhow::Result<()> {
    pause();

    // Arrange
    let mut aggregator = HistoryAggregator::default();

    // Act
    ingest(&mut aggregator, &HistoryLine::new("1").data(3, &[("h01", "0")]).build())?;
    advance(DEFAULT_HISTORY_TIMEOUT).await;

    // Assert
    let cycle = completed(&mut aggregator).await.expect("cycle completes");
    assert!(cycle.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_records_persist_into_next_cycle() -> anyhow::Result<()> {
    pause();

    // Arrange
    let mut aggregator = HistoryAggregator::default();
    ingest(&mut aggregator, &HistoryLine::new("1").data(1, &[("h01", "3")]).build())?;
    advance(DEFAULT_HISTORY_TIMEOUT).await;
    completed(&mut aggregator).await.expect("first cycle completes");

    // Act
    ingest(&mut aggregator, &HistoryLine::new("1").data(2, &[("h01", "7")]).build())?;
    advance(DEFAULT_HISTORY_TIMEOUT).await;

    // Assert
    let second = completed(&mut aggregator).await.expect("second cycle completes");
    assert_eq!(
        second.records.keys().copied().collect::<Vec<_>>(),
        vec![instance(1), instance(2)]
    );
    Ok(())
}

#[tokio::test]
async fn test_missing_units_fall_back_to_sensor_units() -> anyhow::Result<()> {
    pause();

    // Arrange
    let mut aggregator = HistoryAggregator::default();
    let line = HistoryLine::new("1").without_units().data(0, &[("h01", "1")]).build();

    // Act
    ingest(&mut aggregator, &line)?;
    let cycle = aggregator.complete(SensorType::Electricity);

    // Assert
    assert_eq!(cycle.get(instance(0)).map(|r| r.units()), Some("Watts"));
    assert!(!aggregator.is_accumulating(SensorType::Electricity));
    Ok(())
}

#[tokio::test]
async fn test_shutdown_discards_pending_cycles() -> anyhow::Result<()> {
    pause();

    // Arrange
    let mut aggregator = HistoryAggregator::default();
    ingest(&mut aggregator, &HistoryLine::new("1").data(0, &[("h01", "1")]).build())?;
    ingest(&mut aggregator, &HistoryLine::new("2").data(0, &[("h01", "1")]).build())?;

    // Act
    let discarded = aggregator.shutdown();

    // Assert
    assert_eq!(discarded, 2);
    advance(DEFAULT_HISTORY_TIMEOUT * 2).await;
    assert_not_completed(&mut aggregator).await;
    Ok(())
}
