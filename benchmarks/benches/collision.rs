//! Collision benchmarks (criterion - wall-clock time).
//!
//! Run all:    cargo bench --manifest-path benchmarks/Cargo.toml --bench collision
//! Filter:     cargo bench --manifest-path benchmarks/Cargo.toml --bench collision -- sweep

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use glam::DVec2;
use ledge::collision::{
    raycast_all_platform_objects_non_alloc, rect_overlap_all_actors_non_alloc, MovingActor,
    QueryFilter, ShapeFrame, StationaryActor, SweepOptions,
};
use ledge::{Actor, HitTarget, PlatformObject, RaycastHit, Rect};
use ledge_bench::*;

// ---------------------------------------------------------------------------
// Shape sweeps
// ---------------------------------------------------------------------------

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep/tile_layer");
    for &columns in &[32, 256, 2048] {
        let object = PlatformObject::tile_layer(level_layer(columns, 12).expect("level layer"));
        let mut world = hecs::World::new();
        let actor_entity = world.spawn(());
        let frame = ShapeFrame::fixed(world.spawn(()), world.spawn(()), DVec2::ZERO);
        let actor = Actor::from_size(10.0, 14.0);
        let start = StationaryActor::new(actor_entity, DVec2::new(3.5 * TILE, 9.0 * TILE), &actor);
        // Long diagonal that crosses many columns before landing on the floor.
        let travel = DVec2::new(columns as f64 * 0.4 * TILE, 2.0 * TILE);
        let moving = MovingActor::new(&start, start.position + travel);

        group.bench_with_input(BenchmarkId::from_parameter(columns), &columns, |b, _| {
            b.iter(|| object.collide_moving_actor(&frame, &moving, SweepOptions::default()));
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Handler update
// ---------------------------------------------------------------------------

fn bench_handler(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("handler/tile_level");
        group.sample_size(20);
        for &n in &[10, 100, 500] {
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
                b.iter_batched(
                    || setup_tile_scene(n).expect("tile scene setup"),
                    |(mut world, mut handler)| run_frames(&mut world, &mut handler, 60),
                    criterion::BatchSize::LargeInput,
                );
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("handler/lifts");
        group.sample_size(20);
        for &n in &[10, 100] {
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
                b.iter_batched(
                    || setup_lift_scene(n).expect("lift scene setup"),
                    |(mut world, mut handler)| run_frames(&mut world, &mut handler, 60),
                    criterion::BatchSize::LargeInput,
                );
            });
        }
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// World queries
// ---------------------------------------------------------------------------

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    for &n in &[100, 1000] {
        let (world, _) = setup_tile_scene(n).expect("tile scene setup");
        let width = (n * 2).max(16) as f64 * TILE;

        let placeholder = RaycastHit {
            target: HitTarget::Actor(hecs::Entity::DANGLING),
            point: DVec2::ZERO,
            t: 0.0,
            normal: DVec2::ZERO,
        };
        group.bench_with_input(BenchmarkId::new("raycast_platform_objects", n), &n, |b, _| {
            let mut out = [placeholder; 16];
            b.iter(|| {
                raycast_all_platform_objects_non_alloc(
                    &world,
                    DVec2::new(0.5 * TILE, 10.5 * TILE),
                    DVec2::new(width, 0.0),
                    &QueryFilter::all(),
                    &mut out,
                )
            });
        });

        group.bench_with_input(BenchmarkId::new("rect_overlap_actors", n), &n, |b, _| {
            let mut out = [hecs::Entity::DANGLING; 64];
            let rect = Rect::new(DVec2::ZERO, DVec2::new(width * 0.5, 12.0 * TILE));
            let filter = QueryFilter::all();
            b.iter(|| rect_overlap_all_actors_non_alloc(&world, &rect, &filter, &mut out));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sweep, bench_handler, bench_queries);
criterion_main!(benches);
