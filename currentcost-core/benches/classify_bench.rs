// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use currentcost_core::{classify, extract_periodic, HistoryMessage};
use currentcost_test_utils::fixtures::{timestamp, HistoryLine, PERIODIC_WHOLE_HOUSE};
use std::hint::black_box;

fn history_line(points: usize) -> String {
    let tags: Vec<(String, String)> = (1..=points)
        .map(|index| (format!("h{index:03}"), format!("{:05.1}", index as f64 / 10.0)))
        .collect();
    let datapoints: Vec<(&str, &str)> = tags
        .iter()
        .map(|(tag, value)| (tag.as_str(), value.as_str()))
        .collect();
    HistoryLine::new("1").data(0, &datapoints).build()
}

fn bench_periodic(c: &mut Criterion) {
    let mut group = c.benchmark_group("periodic");
    group.throughput(Throughput::Bytes(PERIODIC_WHOLE_HOUSE.len() as u64));
    let now = timestamp(13, 2, 39);

    group.bench_function("classify_and_extract", |b| {
        b.iter(|| {
            let message = classify(black_box(PERIODIC_WHOLE_HOUSE.as_bytes())).unwrap();
            black_box(extract_periodic(&message.document, now, 3).unwrap())
        })
    });
    group.finish();
}

fn bench_history(c: &mut Criterion) {
    let mut group = c.benchmark_group("history");

    for points in [4usize, 26, 64] {
        let line = history_line(points);
        group.throughput(Throughput::Bytes(line.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(points), &line, |b, line| {
            b.iter(|| {
                let message = classify(black_box(line.as_bytes())).unwrap();
                black_box(HistoryMessage::from_document(&message.document).unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_periodic, bench_history);
criterion_main!(benches);
