//! Scene builders shared by the collision benchmarks.

use anyhow::Result;
use glam::DVec2;
use ledge::{
    add_platform_object, spawn_actor, spawn_platform, AabbShape, Actor, Handler, HandlerConfig,
    Platform, PlatformObject, TileLayer,
};

/// Side length of one tile in the benchmark levels.
pub const TILE: f64 = 16.0;

/// A `columns` x `rows` tile grid with a solid floor row and a solid wall every eighth column.
pub fn level_layer(columns: usize, rows: usize) -> Result<TileLayer> {
    let mut layer = TileLayer::empty(DVec2::ZERO, DVec2::splat(TILE), columns, rows)?;
    for column in 0..columns {
        layer.set_tile(column, rows - 1, 1);
        if column % 8 == 0 {
            for row in rows.saturating_sub(3)..rows {
                layer.set_tile(column, row, 1);
            }
        }
    }
    Ok(layer)
}

/// A tile level with `n` falling actors spread across it and a handler with gravity.
pub fn setup_tile_scene(n: usize) -> Result<(hecs::World, Handler)> {
    let mut world = hecs::World::new();
    let columns = (n * 2).max(16);
    let rows = 12;

    let level = spawn_platform(&mut world, DVec2::ZERO, Platform::fixed());
    let tiles = PlatformObject::tile_layer(level_layer(columns, rows)?);
    add_platform_object(&mut world, level, tiles)?;

    for i in 0..n {
        let x = (i as f64 * 2.0 + 1.5) * TILE;
        spawn_actor(
            &mut world,
            DVec2::new(x, TILE * 2.0),
            Actor::from_size(10.0, 14.0).with_velocity(DVec2::new(60.0, 0.0)),
        );
    }

    let handler = Handler::new(HandlerConfig {
        gravity: DVec2::new(0.0, 900.0),
        ..HandlerConfig::default()
    });
    Ok((world, handler))
}

/// `n` lifts bobbing under `n` riders, plus a fixed floor.
pub fn setup_lift_scene(n: usize) -> Result<(hecs::World, Handler)> {
    let mut world = hecs::World::new();

    let ground = spawn_platform(&mut world, DVec2::new(0.0, 400.0), Platform::fixed());
    add_platform_object(
        &mut world,
        ground,
        PlatformObject::aabb(AabbShape::new(DVec2::ZERO, DVec2::new(n as f64 * 40.0 + 40.0, 8.0))),
    )?;

    for i in 0..n {
        let x = i as f64 * 40.0;
        let speed = if i % 2 == 0 { -30.0 } else { 30.0 };
        let lift = spawn_platform(
            &mut world,
            DVec2::new(x, 200.0),
            Platform::moving(DVec2::new(0.0, speed)),
        );
        add_platform_object(
            &mut world,
            lift,
            PlatformObject::aabb(AabbShape::new(DVec2::ZERO, DVec2::new(16.0, 4.0))).into_moving(),
        )?;
        spawn_actor(&mut world, DVec2::new(x, 187.0), Actor::from_size(12.0, 18.0));
    }

    let handler = Handler::new(HandlerConfig {
        gravity: DVec2::new(0.0, 900.0),
        ..HandlerConfig::default()
    });
    Ok((world, handler))
}

/// Step `handler` for `frames` frames of 60 Hz.
pub fn run_frames(world: &mut hecs::World, handler: &mut Handler, frames: usize) {
    for _ in 0..frames {
        handler.update(world, 1.0 / 60.0, &mut ());
    }
}
