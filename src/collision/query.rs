//! World-wide raycast and rectangle overlap queries.
//!
//! Results go into caller-provided buffers so queries never allocate. Raycast results are
//! sorted by distance along the ray; when the buffer is full, the farthest hits are dropped.

use glam::DVec2;

use crate::ecs::components::collision::{Actor, Platform, PlatformObject};
use crate::ecs::components::transform::Transform;

use super::geometry::Rect;
use super::raycast::{insert_sorted, RaycastHit};

/// Which entities a query considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryFilter {
    /// Matched against actor teams or platform object layers.
    pub mask: u32,
    /// Entity to skip, typically the one issuing the query.
    pub exclude: Option<hecs::Entity>,
}

impl QueryFilter {
    pub fn new(mask: u32) -> Self {
        Self { mask, exclude: None }
    }

    /// Match everything.
    pub fn all() -> Self {
        Self::new(u32::MAX)
    }

    pub fn excluding(mut self, entity: hecs::Entity) -> Self {
        self.exclude = Some(entity);
        self
    }

    #[inline]
    fn skips(&self, entity: hecs::Entity) -> bool {
        self.exclude == Some(entity)
    }
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self::all()
    }
}

/// Enabled actors whose team matches the filter, with their positions.
fn matching_actors(
    world: &hecs::World,
    filter: &QueryFilter,
    mut visit: impl FnMut(hecs::Entity, DVec2, &Actor) -> bool,
) {
    for (entity, (transform, actor)) in world.query::<(&Transform, &Actor)>().iter() {
        if !actor.enabled || actor.team & filter.mask == 0 || filter.skips(entity) {
            continue;
        }
        if !visit(entity, transform.position, actor) {
            break;
        }
    }
}

/// Enabled platform objects on enabled platforms, with their platform positions.
fn matching_objects(
    world: &hecs::World,
    filter: &QueryFilter,
    mut visit: impl FnMut(hecs::Entity, DVec2, &PlatformObject) -> bool,
) {
    for (entity, object) in world.query::<&PlatformObject>().iter() {
        if !object.collides_with(filter.mask) || filter.skips(entity) {
            continue;
        }
        let (Ok(platform), Ok(transform)) = (
            world.get::<&Platform>(object.platform),
            world.get::<&Transform>(object.platform),
        ) else {
            continue;
        };
        if !platform.is_enabled() {
            continue;
        }
        if !visit(entity, transform.position, object) {
            break;
        }
    }
}

/// Cast the segment `origin -> origin + direction` against every matching actor.
///
/// Fills `out` with the nearest hits in order and returns how many were written.
pub fn raycast_all_actors_non_alloc(
    world: &hecs::World,
    origin: DVec2,
    direction: DVec2,
    filter: &QueryFilter,
    out: &mut [RaycastHit],
) -> usize {
    let mut len = 0;
    matching_actors(world, filter, |entity, position, actor| {
        if let Some(hit) = actor.raycast(entity, position, origin, direction) {
            len = insert_sorted(out, len, hit);
        }
        true
    });
    len
}

/// Cast the segment `origin -> origin + direction` against every matching platform object.
///
/// Fills `out` with the nearest hits in order and returns how many were written.
pub fn raycast_all_platform_objects_non_alloc(
    world: &hecs::World,
    origin: DVec2,
    direction: DVec2,
    filter: &QueryFilter,
    out: &mut [RaycastHit],
) -> usize {
    let mut len = 0;
    matching_objects(world, filter, |entity, platform_position, object| {
        let hit = object.raycast(entity, platform_position, origin, direction, filter.mask);
        if let Some(hit) = hit {
            len = insert_sorted(out, len, hit);
        }
        true
    });
    len
}

/// Collect actors whose box strictly overlaps `rect`, up to `out.len()`.
pub fn rect_overlap_all_actors_non_alloc(
    world: &hecs::World,
    rect: &Rect,
    filter: &QueryFilter,
    out: &mut [hecs::Entity],
) -> usize {
    let mut len = 0;
    matching_actors(world, filter, |entity, position, actor| {
        if len == out.len() {
            return false;
        }
        if actor.overlaps_rect(position, rect) {
            out[len] = entity;
            len += 1;
        }
        true
    });
    len
}

/// Collect platform objects with solid area strictly overlapping `rect`, up to `out.len()`.
pub fn rect_overlap_all_platform_objects_non_alloc(
    world: &hecs::World,
    rect: &Rect,
    filter: &QueryFilter,
    out: &mut [hecs::Entity],
) -> usize {
    let mut len = 0;
    matching_objects(world, filter, |entity, platform_position, object| {
        if len == out.len() {
            return false;
        }
        if object.overlaps_rect(platform_position, rect, filter.mask) {
            out[len] = entity;
            len += 1;
        }
        true
    });
    len
}
