//! Per-frame actor snapshots and actor-side queries.

use glam::DVec2;

use crate::ecs::components::collision::Actor;

use super::geometry::Rect;
use super::raycast::{HitTarget, RaycastHit};

/// An actor's pre-physics state for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationaryActor {
    pub actor: hecs::Entity,
    pub position: DVec2,
    pub offset: DVec2,
    pub half_extents: DVec2,
    pub collision_mask: u32,
}

impl StationaryActor {
    pub fn new(entity: hecs::Entity, position: DVec2, actor: &Actor) -> Self {
        Self {
            actor: entity,
            position,
            offset: actor.offset,
            half_extents: actor.half_extents,
            collision_mask: actor.collision_mask,
        }
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        self.position + self.offset
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.center(), self.half_extents)
    }
}

/// An actor's swept motion for one frame, from `pos0` to `pos1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovingActor {
    pub actor: hecs::Entity,
    pub pos0: DVec2,
    pub pos1: DVec2,
    pub offset: DVec2,
    pub half_extents: DVec2,
    pub collision_mask: u32,
}

impl MovingActor {
    pub fn new(start: &StationaryActor, pos1: DVec2) -> Self {
        Self {
            actor: start.actor,
            pos0: start.position,
            pos1,
            offset: start.offset,
            half_extents: start.half_extents,
            collision_mask: start.collision_mask,
        }
    }

    #[inline]
    pub fn displacement(&self) -> DVec2 {
        self.pos1 - self.pos0
    }

    /// Box centre at the start of the sweep.
    #[inline]
    pub fn center0(&self) -> DVec2 {
        self.pos0 + self.offset
    }

    #[inline]
    pub fn bounds0(&self) -> Rect {
        Rect::from_center(self.center0(), self.half_extents)
    }

    /// Nothing left to sweep.
    #[inline]
    pub fn is_at_rest(&self) -> bool {
        self.pos0 == self.pos1
    }
}

impl Actor {
    /// Cast the segment `origin -> origin + direction` against this actor's box.
    pub fn raycast(
        &self,
        entity: hecs::Entity,
        position: DVec2,
        origin: DVec2,
        direction: DVec2,
    ) -> Option<RaycastHit> {
        let (t, normal) = self.bounds(position).raycast(origin, direction)?;
        Some(RaycastHit::along(
            HitTarget::Actor(entity),
            origin,
            direction,
            t,
            normal,
        ))
    }

    /// Whether this actor's box strictly overlaps `rect`.
    #[inline]
    pub fn overlaps_rect(&self, position: DVec2, rect: &Rect) -> bool {
        self.bounds(position).overlaps(rect)
    }
}
