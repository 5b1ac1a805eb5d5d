use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use dyngrid_engine::{
    build_content_matrix, discover_headers, DynamicGrid, GridDefinition, KeyComparer,
};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Reading {
    sensor: u32,
    minute: u32,
    value: f64,
}

type ReadingDefinition = GridDefinition<Reading, u32, u32, f64>;

fn definition() -> ReadingDefinition {
    GridDefinition::builder()
        .row_selector(|r: &Reading| r.sensor)
        .column_selector(|r: &Reading| r.minute)
        .aggregator(|rs: &[&Reading]| rs.iter().map(|r| r.value).sum::<f64>() / rs.len() as f64)
        .row_comparer(KeyComparer::natural())
        .column_comparer(KeyComparer::natural())
        .build()
        .unwrap()
}

/// `count` readings over a `sensors x minutes` key space; about one in
/// eight cells receives a second reading.
fn readings(count: usize, sensors: u32, minutes: u32) -> Vec<Reading> {
    let mut state = 0x2545_f491_u64;
    (0..count)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let cell = (i as u64 % (sensors as u64 * minutes as u64 * 7 / 8).max(1)) as u32;
            Reading {
                sensor: cell / minutes,
                minute: cell % minutes,
                value: (state % 1000) as f64,
            }
        })
        .collect()
}

fn bench_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("discover_headers");
    let def = definition();

    for &count in &[10_000usize, 100_000, 1_000_000] {
        let records = readings(count, 1_000, 500);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &records, |b, records| {
            b.iter(|| discover_headers(black_box(records), &def))
        });
    }
    group.finish();
}

fn bench_matrix_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_content_matrix");
    group.sample_size(20);
    let def = definition();

    for &count in &[10_000usize, 100_000, 1_000_000] {
        let records = readings(count, 1_000, 500);
        let headers = discover_headers(&records, &def);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &records, |b, records| {
            b.iter(|| build_content_matrix(black_box(records), &headers, &def).unwrap())
        });
    }
    group.finish();
}

fn bench_scroll(c: &mut Criterion) {
    let mut grid = DynamicGrid::with_records(definition(), readings(200_000, 1_000, 500));
    grid.set_viewport_size(1920.0, 1080.0);
    grid.wait_idle().unwrap();

    // Each step lands after the scroll interval and the tick closes the idle
    // window, so every scroll call recomputes.
    let mut now = Instant::now();
    let mut offset = 0.0;
    c.bench_function("scroll_recycle", |b| {
        b.iter(|| {
            now += Duration::from_millis(200);
            grid.tick(now).unwrap();
            offset = (offset + 35.0) % 15_000.0;
            black_box(grid.set_scroll_offset(offset, offset, now))
        })
    });
}

criterion_group!(benches, bench_discovery, bench_matrix_build, bench_scroll);
criterion_main!(benches);
