//! Swept box vs axis-aligned box.

use glam::DVec2;

use crate::ecs::components::collision::AabbShape;

use super::geometry::{closing_span, Rect, CONTACT_SKIN, EPSILON};
use super::platform_object::{earliest, penetration_hit, AxisHit, ShapeQueries};

impl AabbShape {
    /// World-space box when the platform sits at `origin`.
    #[inline]
    pub fn bounds(&self, origin: DVec2) -> Rect {
        Rect::from_center(origin + self.offset, self.half_extents)
    }
}

/// Earliest face of `solid` crossed along `axis`, if the box still overlaps it on the
/// other axis at that moment.
fn sweep_axis(
    solid: &Rect,
    axis: usize,
    center: DVec2,
    half_extents: DVec2,
    motion: DVec2,
    resting_contacts: bool,
) -> Option<AxisHit> {
    let m = motion[axis];
    let (t, edge, sign) = if m > 0.0 {
        let edge = solid.min[axis];
        ((edge - (center[axis] + half_extents[axis])) / m, edge, -1.0)
    } else if m < 0.0 {
        let edge = solid.max[axis];
        ((edge - (center[axis] - half_extents[axis])) / m, edge, 1.0)
    } else if resting_contacts {
        return resting_axis(solid, axis, center, half_extents);
    } else {
        return None;
    };

    if t <= -EPSILON || t > 1.0 {
        return None;
    }

    let other = 1 - axis;
    let c = center[other] + motion[other] * t;
    let (lo, hi) = closing_span(
        c - half_extents[other],
        c + half_extents[other],
        motion[other],
    );
    (lo < solid.max[other] && hi > solid.min[other]).then_some(AxisHit {
        axis,
        t,
        edge,
        sign,
    })
}

/// A face the box already rests against on `axis` with no motion toward or away from it.
fn resting_axis(solid: &Rect, axis: usize, center: DVec2, half_extents: DVec2) -> Option<AxisHit> {
    let other = 1 - axis;
    if center[other] - half_extents[other] >= solid.max[other]
        || center[other] + half_extents[other] <= solid.min[other]
    {
        return None;
    }

    let gap = solid.min[axis] - (center[axis] + half_extents[axis]);
    if gap > -EPSILON && gap <= CONTACT_SKIN {
        return Some(AxisHit {
            axis,
            t: 0.0,
            edge: solid.min[axis],
            sign: -1.0,
        });
    }
    let gap = (center[axis] - half_extents[axis]) - solid.max[axis];
    if gap > -EPSILON && gap <= CONTACT_SKIN {
        return Some(AxisHit {
            axis,
            t: 0.0,
            edge: solid.max[axis],
            sign: 1.0,
        });
    }
    None
}

impl ShapeQueries for AabbShape {
    fn sweep(
        &self,
        origin: DVec2,
        center: DVec2,
        half_extents: DVec2,
        motion: DVec2,
        mask: u32,
        resting_contacts: bool,
    ) -> Option<AxisHit> {
        if mask == 0 {
            return None;
        }
        let solid = self.bounds(origin);
        earliest(
            sweep_axis(&solid, 0, center, half_extents, motion, resting_contacts),
            sweep_axis(&solid, 1, center, half_extents, motion, resting_contacts),
        )
    }

    fn penetration(&self, origin: DVec2, bounds: &Rect, mask: u32) -> Option<AxisHit> {
        if mask == 0 {
            return None;
        }
        penetration_hit(bounds, &self.bounds(origin))
    }

    fn raycast(
        &self,
        origin: DVec2,
        ray_origin: DVec2,
        direction: DVec2,
        mask: u32,
    ) -> Option<(f64, DVec2)> {
        if mask == 0 {
            return None;
        }
        self.bounds(origin).raycast(ray_origin, direction)
    }

    fn overlaps_rect(&self, origin: DVec2, rect: &Rect, mask: u32) -> bool {
        mask != 0 && self.bounds(origin).overlaps(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::actor::{MovingActor, StationaryActor};
    use crate::collision::geometry::REPOSITION_GAP;
    use crate::collision::platform_object::{ShapeFrame, SweepOptions};
    use crate::collision::response::ResponseKind;
    use crate::ecs::components::collision::Actor;

    const ALL: u32 = u32::MAX;

    fn entities() -> (hecs::Entity, hecs::Entity, hecs::Entity) {
        let mut world = hecs::World::new();
        (world.spawn(()), world.spawn(()), world.spawn(()))
    }

    /// 16x16 box centred at (0, 16): top face at y = 8.
    fn floor() -> AabbShape {
        AabbShape::new(DVec2::new(0.0, 16.0), DVec2::splat(8.0))
    }

    #[test]
    fn test_falling_onto_box() {
        let (object, platform, entity) = entities();
        let actor = Actor::from_size(16.0, 16.0);
        let start = StationaryActor::new(entity, DVec2::ZERO, &actor);
        let sweep = MovingActor::new(&start, DVec2::new(0.0, 100.0));
        let frame = ShapeFrame::fixed(object, platform, DVec2::ZERO);

        let r = floor()
            .collide_moving_actor(&frame, &sweep, ALL, SweepOptions::default())
            .unwrap();
        assert_eq!(r.time, 0.0);
        assert_eq!(r.kind, ResponseKind::Bullet);
        assert_eq!(r.normal, DVec2::new(0.0, -1.0));
        assert!((r.reposition.y - (0.0 - REPOSITION_GAP)).abs() < 1e-9);
        assert_eq!(r.reposition.x, 0.0);
        assert_eq!(r.point.y, 8.0);
    }

    #[test]
    fn test_projection_slides_along_floor() {
        let (object, platform, entity) = entities();
        let actor = Actor::from_size(16.0, 16.0);
        let start = StationaryActor::new(entity, DVec2::new(0.0, -10.0), &actor);
        let sweep = MovingActor::new(&start, DVec2::new(10.0, 10.0));
        let frame = ShapeFrame::fixed(object, platform, DVec2::ZERO);

        let r = floor()
            .collide_moving_actor(&frame, &sweep, ALL, SweepOptions::default())
            .unwrap();
        assert_eq!(r.kind, ResponseKind::Project);
        assert!((r.time - 0.5).abs() < 1e-12);
        assert!((r.reposition.x - 5.0).abs() < 1e-12);
        assert_eq!(r.reposition_project.x, 10.0);
        assert_eq!(r.reposition_project.y, r.reposition.y);

        let no_project = SweepOptions {
            project: false,
            ..SweepOptions::default()
        };
        let r = floor()
            .collide_moving_actor(&frame, &sweep, ALL, no_project)
            .unwrap();
        assert_eq!(r.kind, ResponseKind::Bullet);
    }

    #[test]
    fn test_fast_actor_does_not_tunnel() {
        let (object, platform, entity) = entities();
        let wall = AabbShape::from_min_max(DVec2::new(100.0, -50.0), DVec2::new(101.0, 50.0));
        let actor = Actor::from_size(2.0, 2.0);
        let start = StationaryActor::new(entity, DVec2::ZERO, &actor);
        let sweep = MovingActor::new(&start, DVec2::new(10_000.0, 0.0));
        let frame = ShapeFrame::fixed(object, platform, DVec2::ZERO);

        let r = wall
            .collide_moving_actor(&frame, &sweep, ALL, SweepOptions::default())
            .unwrap();
        assert_eq!(r.normal, DVec2::new(-1.0, 0.0));
        assert!(r.reposition.x < 99.0);
        assert!((r.reposition.x - (99.0 - REPOSITION_GAP)).abs() < 1e-9);
    }

    #[test]
    fn test_exact_corner_counts_as_hit() {
        let (object, platform, entity) = entities();
        let block = AabbShape::from_min_max(DVec2::ZERO, DVec2::splat(32.0));
        let actor = Actor::from_size(8.0, 8.0);
        let start = StationaryActor::new(entity, DVec2::new(-10.0, -10.0), &actor);
        let sweep = MovingActor::new(&start, DVec2::ZERO);
        let frame = ShapeFrame::fixed(object, platform, DVec2::ZERO);

        let r = block
            .collide_moving_actor(&frame, &sweep, ALL, SweepOptions::default())
            .unwrap();
        // Horizontal wins the tie.
        assert_eq!(r.normal, DVec2::new(-1.0, 0.0));
        assert!((r.time - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_grazing_past_does_not_hit() {
        let (object, platform, entity) = entities();
        let actor = Actor::from_size(16.0, 16.0);
        // Moving right directly above the floor with a clear gap.
        let start = StationaryActor::new(entity, DVec2::new(-40.0, -1.0), &actor);
        let sweep = MovingActor::new(&start, DVec2::new(40.0, -1.0));
        let frame = ShapeFrame::fixed(object, platform, DVec2::ZERO);
        assert!(floor()
            .collide_moving_actor(&frame, &sweep, ALL, SweepOptions::default())
            .is_none());
    }

    #[test]
    fn test_resting_contact() {
        let (object, platform, entity) = entities();
        let actor = Actor::from_size(16.0, 16.0);
        let rest = 8.0 - (8.0 + REPOSITION_GAP);
        let start = StationaryActor::new(entity, DVec2::new(0.0, rest), &actor);
        let sweep = MovingActor::new(&start, start.position);
        let frame = ShapeFrame::fixed(object, platform, DVec2::ZERO);

        let r = floor()
            .collide_moving_actor(&frame, &sweep, ALL, SweepOptions::default())
            .unwrap();
        assert_eq!(r.time, 0.0);
        assert_eq!(r.reposition, start.position);
        assert_eq!(r.normal, DVec2::new(0.0, -1.0));

        let later_pass = SweepOptions {
            project: false,
            resting_contacts: false,
        };
        assert!(floor()
            .collide_moving_actor(&frame, &sweep, ALL, later_pass)
            .is_none());
    }

    #[test]
    fn test_intersect_pushes_out_shallow_axis() {
        let (object, platform, entity) = entities();
        let actor = Actor::from_size(16.0, 16.0);
        // Sunk 2 units into the top of the floor.
        let start = StationaryActor::new(entity, DVec2::new(0.0, 2.0), &actor);
        let sweep = MovingActor::new(&start, DVec2::new(3.0, 2.0));
        let frame = ShapeFrame::fixed(object, platform, DVec2::ZERO);

        let r = floor()
            .collide_moving_actor(&frame, &sweep, ALL, SweepOptions::default())
            .unwrap();
        assert_eq!(r.kind, ResponseKind::Intersect);
        assert_eq!(r.normal, DVec2::new(0.0, -1.0));
        assert!((r.reposition.y - (0.0 - REPOSITION_GAP)).abs() < 1e-9);
        assert_eq!(r.reposition_project - r.reposition, DVec2::new(3.0, 0.0));
    }

    #[test]
    fn test_rider_on_rising_lift_lands_on_end_position() {
        let (object, platform, entity) = entities();
        let lift = AabbShape::new(DVec2::ZERO, DVec2::new(32.0, 4.0));
        let actor = Actor::from_size(8.0, 8.0);
        // Standing on the lift top (y = -4) at the start of the frame.
        let start = StationaryActor::new(entity, DVec2::new(0.0, -8.0 - REPOSITION_GAP), &actor);
        let lift_motion = DVec2::new(0.0, -3.0);
        // Carried by the lift plus a little gravity.
        let sweep = MovingActor::new(&start, start.position + lift_motion + DVec2::new(0.0, 0.5));
        let frame = ShapeFrame::new(object, platform, DVec2::ZERO, lift_motion);

        let r = lift
            .collide_moving_actor(&frame, &sweep, ALL, SweepOptions::default())
            .unwrap();
        assert_eq!(r.normal, DVec2::new(0.0, -1.0));
        assert!((r.reposition.y - (-7.0 - 4.0 - REPOSITION_GAP)).abs() < 1e-9);
    }

    #[test]
    fn test_push_stationary_actor() {
        let (object, platform, entity) = entities();
        let pusher = AabbShape::new(DVec2::ZERO, DVec2::splat(4.0));
        let actor = Actor::from_size(4.0, 4.0);
        let still = StationaryActor::new(entity, DVec2::new(8.0, 0.0), &actor);
        let frame = ShapeFrame::new(object, platform, DVec2::ZERO, DVec2::new(5.0, 0.0));

        let r = pusher.collide_stationary_actor(&frame, &still, ALL).unwrap();
        assert_eq!(r.kind, ResponseKind::MovingPlatform);
        assert_eq!(r.normal, DVec2::new(1.0, 0.0));
        assert!((r.time - 0.4).abs() < 1e-12);
        assert!((r.reposition.x - (9.0 + 2.0 + REPOSITION_GAP)).abs() < 1e-9);
        assert_eq!(r.reposition.y, 0.0);

        // Moving away never pushes.
        let away = ShapeFrame::new(object, platform, DVec2::ZERO, DVec2::new(-5.0, 0.0));
        assert!(pusher.collide_stationary_actor(&away, &still, ALL).is_none());
        // Nor does standing still.
        let fixed = ShapeFrame::fixed(object, platform, DVec2::ZERO);
        assert!(pusher.collide_stationary_actor(&fixed, &still, ALL).is_none());
    }

    #[test]
    fn test_zero_mask_never_hits() {
        let (object, platform, entity) = entities();
        let actor = Actor::from_size(16.0, 16.0);
        let start = StationaryActor::new(entity, DVec2::ZERO, &actor);
        let sweep = MovingActor::new(&start, DVec2::new(0.0, 100.0));
        let frame = ShapeFrame::fixed(object, platform, DVec2::ZERO);
        assert!(floor()
            .collide_moving_actor(&frame, &sweep, 0, SweepOptions::default())
            .is_none());
        assert!(floor().raycast(DVec2::ZERO, DVec2::ZERO, DVec2::new(0.0, 20.0), 0).is_none());
        assert!(!floor().overlaps_rect(DVec2::ZERO, &floor().bounds(DVec2::ZERO), 0));
    }
}
