use std::hint::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use lfpseg::{rem_epochs, segment, SegmenterConfig};

/// One-hour synthetic recording at 1 kHz: alternating NREM/REM buckets with
/// a stimulus every 100 s.
fn synthetic() -> (Vec<f32>, Vec<f32>, Vec<usize>) {
    let n = 3_600_000;
    let data: Vec<f32> = (0..n).map(|i| (i as f32 * 0.013).sin() * 80.0).collect();
    let scores: Vec<f32> = (0..n / 5000)
        .map(|b| if b % 2 == 0 { 3.0 } else { 4.0 })
        .collect();
    let onsets: Vec<usize> = (0..36).map(|k| k * 100_000).collect();
    (data, scores, onsets)
}

fn bench_segment(c: &mut Criterion) {
    let (data, scores, onsets) = synthetic();
    let cfg = SegmenterConfig::default();
    c.bench_function("segment 1 h @ 1 kHz", |b| {
        b.iter(|| {
            let groups = segment(black_box(&data), &scores, &onsets, &cfg);
            black_box(groups.rem.count())
        })
    });
}

fn bench_rem_epochs(c: &mut Criterion) {
    let (data, scores, onsets) = synthetic();
    let cfg = SegmenterConfig {
        epoch_len: 60_000,
        ..SegmenterConfig::default()
    };
    c.bench_function("rem_epochs 1 h @ 1 kHz", |b| {
        b.iter(|| {
            let epochs = rem_epochs(black_box(&data), &scores, &onsets, &cfg);
            black_box(epochs.len())
        })
    });
}

criterion_group!(benches, bench_segment, bench_rem_epochs);
criterion_main!(benches);
