//! Ledge 2D Collision
//!
//! Continuous collision resolution for platformer-style games: actors sweep through a
//! world of static and moving platforms without tunnelling, slide along surfaces, ride
//! moving platforms and report contact events.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **ecs** - hecs components (actors, platforms, platform objects) and spawn helpers
//! 2. **collision** - Swept queries, the per-frame handler, events and world queries
//!
//! # Example
//!
//! ```
//! use ledge::glam::DVec2;
//! use ledge::{
//!     add_platform_object, spawn_actor, spawn_platform, AabbShape, Actor, Handler,
//!     HandlerConfig, Platform, PlatformObject, Transform,
//! };
//!
//! let mut world = ledge::hecs::World::new();
//! let mut handler = Handler::new(HandlerConfig {
//!     gravity: DVec2::new(0.0, 980.0),
//!     ..HandlerConfig::default()
//! });
//!
//! let ground = spawn_platform(&mut world, DVec2::new(0.0, 100.0), Platform::fixed());
//! add_platform_object(
//!     &mut world,
//!     ground,
//!     PlatformObject::aabb(AabbShape::new(DVec2::ZERO, DVec2::new(200.0, 10.0))),
//! )?;
//! let player = spawn_actor(&mut world, DVec2::ZERO, Actor::from_size(16.0, 32.0));
//!
//! for _ in 0..120 {
//!     handler.update(&mut world, 1.0 / 60.0, &mut ());
//! }
//! let y = world.get::<&Transform>(player)?.position.y;
//! assert!(y + 16.0 <= 90.0);
//! # Ok::<(), ledge::CollisionError>(())
//! ```

pub mod collision;
pub mod ecs;
pub mod error;

// Re-export commonly used types
pub use collision::{
    CollisionEvent, CollisionListener, Crush, Handler, HandlerConfig, HitTarget, NormalDirection,
    QueryFilter, RaycastHit, Rect, Response, ResponseKind,
};

pub use ecs::prelude::*;

pub use error::{CollisionError, Result};

// Re-export glam and hecs for convenience
pub use glam;
pub use hecs;
