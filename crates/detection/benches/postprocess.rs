use criterion::{Criterion, black_box, criterion_group, criterion_main};
use detection::{AnchorGrid, AnchorGridConfig, BOX_ROW_WIDTH, decode, suppress};
use ndarray::{Array1, Array2};

fn anchor_generation(c: &mut Criterion) {
    let config = AnchorGridConfig::default();

    c.bench_function("anchor generation", |b| {
        b.iter(|| AnchorGrid::generate(black_box(&config)).unwrap());
    });
}

fn decode_and_suppress(c: &mut Criterion) {
    let grid = AnchorGrid::generate(&AnchorGridConfig::default()).unwrap();

    // every fourth anchor fires, with slowly decreasing confidence
    let scores = Array1::from_shape_fn(grid.len(), |i| {
        if i % 4 == 0 { 4.0 - i as f32 / 256.0 } else { -4.0 }
    });
    let boxes = Array2::from_shape_fn((grid.len(), BOX_ROW_WIDTH), |(i, j)| match j {
        0 | 1 => (i % 8) as f32 - 4.0,
        2 | 3 => 24.0,
        _ => (j as f32 - 10.0) * 2.0,
    });

    c.bench_function("decode 896 rows", |b| {
        b.iter(|| decode(black_box(scores.view()), black_box(boxes.view()), &grid, 0.7).unwrap());
    });

    let candidates = decode(scores.view(), boxes.view(), &grid, 0.7).unwrap();
    c.bench_function("suppress decoded candidates", |b| {
        b.iter(|| suppress(black_box(&candidates), 0.3, 8));
    });
}

criterion_group!(benches, anchor_generation, decode_and_suppress);
criterion_main!(benches);
