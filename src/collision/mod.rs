//! Swept AABB collision between actors and platform objects.
//!
//! # Model
//!
//! - **Actors** are boxes that move by their velocity and are resolved against the world.
//! - **Platforms** own one or more **platform objects** (boxes or tile grids) and move
//!   them by the platform's velocity. Platforms never collide with each other.
//! - **Moving platform objects** additionally push actors standing in their way and carry
//!   the actors riding them.
//!
//! Coordinates are 2D with y growing downward, so a floor has an upward `(0, -1)` normal.
//! [`Handler::update`] drives one frame; the queries in [`query`] can be used at any time.

pub mod aabb;
pub mod actor;
pub mod events;
pub mod geometry;
pub mod handler;
pub mod moving;
pub mod platform_object;
pub mod query;
pub mod raycast;
pub mod response;
pub mod tile_layer;

pub use actor::{MovingActor, StationaryActor};
pub use events::{CollisionEvent, CollisionListener};
pub use geometry::{
    normal_direction, NormalDirection, Rect, CONTACT_SKIN, EPSILON, REPOSITION_GAP,
};
pub use handler::{Handler, HandlerConfig, MAX_RESOLVE_PASSES};
pub use moving::{attach_actor, detach_actor, detach_all};
pub use platform_object::{AxisHit, ShapeFrame, ShapeQueries, SweepOptions};
pub use query::{
    raycast_all_actors_non_alloc, raycast_all_platform_objects_non_alloc,
    rect_overlap_all_actors_non_alloc, rect_overlap_all_platform_objects_non_alloc, QueryFilter,
};
pub use raycast::{HitTarget, RaycastHit};
pub use response::{Crush, FrameResponses, Response, ResponseKind};
