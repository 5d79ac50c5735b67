//! Benchmarks for path flattening and fill/stroke expansion.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use glam::Vec2;
use quill_geometry::{
    Context, ContextDescriptor, LineCap, LineJoin, PathCache, PathCommand, RecordingBackend,
    Shape, Tolerances,
};

fn star(points: usize, center: Vec2, outer: f32, inner: f32) -> Vec<PathCommand> {
    let vertices: Vec<Vec2> = (0..points * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = i as f32 / (points * 2) as f32 * std::f32::consts::TAU;
            center + Vec2::from_angle(angle) * radius
        })
        .collect();
    Shape::polygon(vertices).to_commands()
}

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");
    let tolerances = Tolerances::default();

    for count in [1, 10, 100] {
        let commands: Vec<PathCommand> = (0..count)
            .flat_map(|i| Shape::circle(Vec2::new(i as f32 * 10.0, 50.0), 40.0).to_commands())
            .collect();
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(BenchmarkId::new("circles", count), &commands, |b, commands| {
            let mut cache = PathCache::new();
            b.iter(|| {
                cache.clear();
                cache.flatten(black_box(commands), &tolerances);
                cache.points().len()
            });
        });
    }

    group.finish();
}

fn bench_expand(c: &mut Criterion) {
    let mut group = c.benchmark_group("expand");
    let tolerances = Tolerances::default();

    for points in [5, 50, 500] {
        let commands = star(points, Vec2::splat(200.0), 150.0, 60.0);
        let mut cache = PathCache::new();
        cache.flatten(&commands, &tolerances);

        group.bench_with_input(BenchmarkId::new("fill", points), &points, |b, _| {
            b.iter(|| {
                cache.expand_fill(black_box(1.0), LineJoin::Miter, 2.4);
                cache.vertices().len()
            });
        });

        for join in [LineJoin::Miter, LineJoin::Round, LineJoin::Bevel] {
            group.bench_with_input(BenchmarkId::new(format!("stroke_{join:?}"), points), &points, |b, _| {
                b.iter(|| {
                    cache.expand_stroke(black_box(4.0), 1.0, LineCap::Round, join, 10.0, tolerances.tess_tol);
                    cache.vertices().len()
                });
            });
        }
    }

    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut ctx = Context::new(RecordingBackend::new(true), ContextDescriptor::default())
        .expect("default descriptor is valid");

    c.bench_function("frame_100_shapes", |b| {
        b.iter(|| {
            ctx.begin_frame(1280.0, 720.0, 1.0);
            for i in 0..100 {
                let x = (i % 10) as f32 * 120.0;
                let y = (i / 10) as f32 * 70.0;
                ctx.begin_path();
                ctx.rounded_rect(x, y, 100.0, 50.0, 6.0);
                ctx.fill();
                ctx.stroke();
            }
            let stats = ctx.end_frame();
            ctx.backend_mut().clear();
            stats
        });
    });
}

criterion_group!(benches, bench_flatten, bench_expand, bench_frame);
criterion_main!(benches);
