use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use p3data::align::{align_traces, AlignConfig, Interpolation};
use p3data::calibration::{CalibrationEntry, CalibrationTable};
use p3data::pipeline::{build_pipeline, presets, StageSpec};
use p3data::shot::ChannelTrace;
use std::sync::Arc;

/// Channels alternating between a slow and a fast digitizer clock
fn mixed_rate_traces(channels: usize, points: usize) -> Vec<Arc<ChannelTrace>> {
    (0..channels)
        .map(|c| {
            let (dt, n) = if c % 2 == 0 {
                (2e-5, points)
            } else {
                (1e-5, points * 2)
            };
            let values = (0..n).map(|i| ((i + c) as f64 * 0.01).sin()).collect();
            Arc::new(ChannelTrace::uniform(format!("CH{:03}", c), "V", 0.0, dt, values).unwrap())
        })
        .collect()
}

fn bench_align(c: &mut Criterion) {
    let mut group = c.benchmark_group("align_traces");

    for &points in &[1_000usize, 10_000, 50_000] {
        let traces = mixed_rate_traces(16, points);
        let total: usize = traces.iter().map(|t| t.len()).sum();
        group.throughput(Throughput::Elements(total as u64));

        for method in [Interpolation::Nearest, Interpolation::Linear] {
            let config = AlignConfig::default().with_method(method);
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}", method), points),
                &traces,
                |b, traces| {
                    b.iter(|| {
                        align_traces(1, Utc::now(), black_box(traces), &config).unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_flux_loop_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("flux_loop_chain");

    let traces = mixed_rate_traces(58, 4_000);
    let mut table = CalibrationTable::new();
    for trace in &traces {
        table
            .insert(CalibrationEntry::linear(trace.name(), 1e-3, "Wb"))
            .unwrap();
    }
    let table = Arc::new(table);
    let dataset = align_traces(1, Utc::now(), &traces, &AlignConfig::default()).unwrap();

    let mut stages: Vec<StageSpec> = presets::flux_loop_stages();
    group.bench_function("preset", |b| {
        let pipeline = build_pipeline(&stages, &table);
        b.iter(|| pipeline.run(black_box(&dataset)).unwrap());
    });

    stages.push(StageSpec::Smooth { window: 11 });
    group.bench_function("preset_smoothed", |b| {
        let pipeline = build_pipeline(&stages, &table);
        b.iter(|| pipeline.run(black_box(&dataset)).unwrap());
    });

    group.finish();
}

criterion_group!(benches, bench_align, bench_flux_loop_chain);
criterion_main!(benches);
