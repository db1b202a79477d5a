//! Shape-level collision queries and the responses they produce.
//!
//! Every sweep runs in the platform's frame of reference: the actor moves by its own
//! displacement minus the platform's, against the platform's start-of-frame shape.
//! Repositions are then placed against the surface at its end-of-frame location.

use glam::DVec2;

use crate::ecs::components::collision::{PlatformObject, PlatformShape};

use super::actor::{MovingActor, StationaryActor};
use super::geometry::{Rect, EPSILON, REPOSITION_GAP};
use super::raycast::{HitTarget, RaycastHit};
use super::response::{Response, ResponseKind};

/// Where a platform object is this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeFrame {
    pub object: hecs::Entity,
    pub platform: hecs::Entity,
    /// Platform position at the start of the frame.
    pub origin: DVec2,
    /// How far the platform moves this frame.
    pub displacement: DVec2,
}

impl ShapeFrame {
    pub fn new(
        object: hecs::Entity,
        platform: hecs::Entity,
        origin: DVec2,
        displacement: DVec2,
    ) -> Self {
        Self {
            object,
            platform,
            origin,
            displacement,
        }
    }

    /// A frame for a platform that does not move.
    pub fn fixed(object: hecs::Entity, platform: hecs::Entity, origin: DVec2) -> Self {
        Self::new(object, platform, origin, DVec2::ZERO)
    }
}

/// Per-pass switches for [`ShapeQueries::collide_moving_actor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOptions {
    /// Produce `Project` responses when the actor also moves along the other axis.
    pub project: bool,
    /// Report surfaces the actor already rests against when it has no relative motion
    /// toward them.
    pub resting_contacts: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            project: true,
            resting_contacts: true,
        }
    }
}

/// The earliest surface an actor's box reaches along one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisHit {
    /// 0 for x, 1 for y.
    pub axis: usize,
    /// Fraction of the relative motion before contact.
    pub t: f64,
    /// World coordinate of the surface on `axis` at the start of the frame.
    pub edge: f64,
    /// Direction of the surface normal on `axis`, `-1.0` or `1.0`.
    pub sign: f64,
}

impl AxisHit {
    #[inline]
    pub fn normal(&self) -> DVec2 {
        let mut normal = DVec2::ZERO;
        normal[self.axis] = self.sign;
        normal
    }
}

/// Pick the earlier of two axis hits. Exact ties go to the horizontal one.
#[inline]
pub fn earliest(x: Option<AxisHit>, y: Option<AxisHit>) -> Option<AxisHit> {
    match (x, y) {
        (Some(x), Some(y)) => Some(if y.t < x.t { y } else { x }),
        (x, None) => x,
        (None, y) => y,
    }
}

/// Queries every platform shape answers.
///
/// `origin` is always the owning platform's position at the start of the frame and
/// `mask` the layers that may collide; a zero mask never hits.
pub trait ShapeQueries {
    /// Sweep a box centred at `center` by `motion` against the shape.
    fn sweep(
        &self,
        origin: DVec2,
        center: DVec2,
        half_extents: DVec2,
        motion: DVec2,
        mask: u32,
        resting_contacts: bool,
    ) -> Option<AxisHit>;

    /// Minimum-penetration exit for a box already overlapping the shape.
    fn penetration(&self, origin: DVec2, bounds: &Rect, mask: u32) -> Option<AxisHit>;

    /// Cast the segment `ray_origin -> ray_origin + direction`, returning `(t, normal)`.
    fn raycast(
        &self,
        origin: DVec2,
        ray_origin: DVec2,
        direction: DVec2,
        mask: u32,
    ) -> Option<(f64, DVec2)>;

    fn overlaps_rect(&self, origin: DVec2, rect: &Rect, mask: u32) -> bool;

    /// Resolve a moving actor against this shape.
    fn collide_moving_actor(
        &self,
        frame: &ShapeFrame,
        actor: &MovingActor,
        mask: u32,
        options: SweepOptions,
    ) -> Option<Response> {
        let motion = actor.displacement() - frame.displacement;
        let swept = self.sweep(
            frame.origin,
            actor.center0(),
            actor.half_extents,
            motion,
            mask,
            options.resting_contacts,
        );
        if let Some(hit) = swept {
            return Some(moving_response(frame, actor, &hit, options.project));
        }
        let hit = self.penetration(frame.origin, &actor.bounds0(), mask)?;
        Some(intersect_response(frame, actor, &hit))
    }

    /// Whether this shape, moving by `frame.displacement`, runs into a stationary actor.
    ///
    /// An actor already overlapping the shape at the start of the frame is pushed out of
    /// it along the shallow axis.
    fn collide_stationary_actor(
        &self,
        frame: &ShapeFrame,
        actor: &StationaryActor,
        mask: u32,
    ) -> Option<Response> {
        if frame.displacement == DVec2::ZERO {
            return None;
        }
        let swept = self.sweep(
            frame.origin,
            actor.center(),
            actor.half_extents,
            -frame.displacement,
            mask,
            false,
        );
        let hit = match swept {
            Some(hit) => hit,
            None => self.penetration(frame.origin, &actor.bounds(), mask)?,
        };
        Some(push_response(frame, actor, &hit))
    }
}

/// Actor position along `axis` that puts its box `REPOSITION_GAP` off a surface at `surface`.
#[inline]
fn clear_of(surface: f64, sign: f64, axis: usize, offset: DVec2, half_extents: DVec2) -> f64 {
    surface + sign * (half_extents[axis] + REPOSITION_GAP) - offset[axis]
}

fn contact_point(reposition: DVec2, offset: DVec2, axis: usize, surface: f64) -> DVec2 {
    let mut point = reposition + offset;
    point[axis] = surface;
    point
}

pub(crate) fn moving_response(
    frame: &ShapeFrame,
    actor: &MovingActor,
    hit: &AxisHit,
    project: bool,
) -> Response {
    let axis = hit.axis;
    let other = 1 - axis;
    let t = hit.t.clamp(0.0, 1.0);
    let displacement = actor.displacement();
    let surface = hit.edge + frame.displacement[axis];

    let mut reposition = actor.pos0 + displacement * t;
    reposition[axis] = clear_of(surface, hit.sign, axis, actor.offset, actor.half_extents);
    let mut reposition_project = reposition;
    reposition_project[other] = actor.pos1[other];

    let kind = if project && displacement[other] != 0.0 {
        ResponseKind::Project
    } else {
        ResponseKind::Bullet
    };

    Response {
        actor: actor.actor,
        platform_object: frame.object,
        platform: frame.platform,
        time: t,
        reposition,
        reposition_project,
        point: contact_point(reposition, actor.offset, axis, surface),
        normal: hit.normal(),
        kind,
    }
}

pub(crate) fn intersect_response(
    frame: &ShapeFrame,
    actor: &MovingActor,
    hit: &AxisHit,
) -> Response {
    let axis = hit.axis;
    let surface = hit.edge + frame.displacement[axis];
    let mut reposition = actor.pos0;
    reposition[axis] = clear_of(surface, hit.sign, axis, actor.offset, actor.half_extents);

    Response {
        actor: actor.actor,
        platform_object: frame.object,
        platform: frame.platform,
        time: 0.0,
        reposition,
        reposition_project: reposition + actor.displacement(),
        point: contact_point(reposition, actor.offset, axis, surface),
        normal: hit.normal(),
        kind: ResponseKind::Intersect,
    }
}

pub(crate) fn push_response(
    frame: &ShapeFrame,
    actor: &StationaryActor,
    hit: &AxisHit,
) -> Response {
    let axis = hit.axis;
    let surface = hit.edge + frame.displacement[axis];
    let mut reposition = actor.position;
    reposition[axis] = clear_of(surface, hit.sign, axis, actor.offset, actor.half_extents);

    Response {
        actor: actor.actor,
        platform_object: frame.object,
        platform: frame.platform,
        time: hit.t.clamp(0.0, 1.0),
        reposition,
        reposition_project: reposition,
        point: contact_point(reposition, actor.offset, axis, surface),
        normal: hit.normal(),
        kind: ResponseKind::MovingPlatform,
    }
}

/// Exit for `bounds` overlapping `solid` by more than [`EPSILON`] on both axes.
///
/// Leaves along the axis of least penetration, away from the solid's centre. Horizontal
/// wins exact ties.
pub(crate) fn penetration_hit(bounds: &Rect, solid: &Rect) -> Option<AxisHit> {
    let depth = bounds.penetration(solid);
    if depth.x <= EPSILON || depth.y <= EPSILON {
        return None;
    }
    let axis = if depth.x <= depth.y { 0 } else { 1 };
    let (edge, sign) = if bounds.center()[axis] < solid.center()[axis] {
        (solid.min[axis], -1.0)
    } else {
        (solid.max[axis], 1.0)
    };
    Some(AxisHit {
        axis,
        t: 0.0,
        edge,
        sign,
    })
}

impl ShapeQueries for PlatformShape {
    fn sweep(
        &self,
        origin: DVec2,
        center: DVec2,
        half_extents: DVec2,
        motion: DVec2,
        mask: u32,
        resting_contacts: bool,
    ) -> Option<AxisHit> {
        match self {
            PlatformShape::Aabb(aabb) => {
                aabb.sweep(origin, center, half_extents, motion, mask, resting_contacts)
            }
            PlatformShape::TileLayer(layer) => {
                layer.sweep(origin, center, half_extents, motion, mask, resting_contacts)
            }
        }
    }

    fn penetration(&self, origin: DVec2, bounds: &Rect, mask: u32) -> Option<AxisHit> {
        match self {
            PlatformShape::Aabb(aabb) => aabb.penetration(origin, bounds, mask),
            PlatformShape::TileLayer(layer) => layer.penetration(origin, bounds, mask),
        }
    }

    fn raycast(
        &self,
        origin: DVec2,
        ray_origin: DVec2,
        direction: DVec2,
        mask: u32,
    ) -> Option<(f64, DVec2)> {
        match self {
            PlatformShape::Aabb(aabb) => aabb.raycast(origin, ray_origin, direction, mask),
            PlatformShape::TileLayer(layer) => layer.raycast(origin, ray_origin, direction, mask),
        }
    }

    fn overlaps_rect(&self, origin: DVec2, rect: &Rect, mask: u32) -> bool {
        match self {
            PlatformShape::Aabb(aabb) => aabb.overlaps_rect(origin, rect, mask),
            PlatformShape::TileLayer(layer) => layer.overlaps_rect(origin, rect, mask),
        }
    }
}

impl PlatformObject {
    /// Layers shared between this object and `mask`, or `None` if they never collide.
    #[inline]
    fn shared_layers(&self, mask: u32) -> Option<u32> {
        self.collides_with(mask).then_some(self.collision_layers & mask)
    }

    /// Resolve a moving actor against this object.
    pub fn collide_moving_actor(
        &self,
        frame: &ShapeFrame,
        actor: &MovingActor,
        options: SweepOptions,
    ) -> Option<Response> {
        let mask = self.shared_layers(actor.collision_mask)?;
        self.shape.collide_moving_actor(frame, actor, mask, options)
    }

    /// Push query: does this object, moving by `frame.displacement`, run into `actor`?
    pub fn collide_stationary_actor(
        &self,
        frame: &ShapeFrame,
        actor: &StationaryActor,
    ) -> Option<Response> {
        let mask = self.shared_layers(actor.collision_mask)?;
        self.shape.collide_stationary_actor(frame, actor, mask)
    }

    /// Cast a ray against this object while its platform sits at `origin`.
    pub fn raycast(
        &self,
        entity: hecs::Entity,
        origin: DVec2,
        ray_origin: DVec2,
        direction: DVec2,
        mask: u32,
    ) -> Option<RaycastHit> {
        let mask = self.shared_layers(mask)?;
        let (t, normal) = self.shape.raycast(origin, ray_origin, direction, mask)?;
        Some(RaycastHit::along(
            HitTarget::PlatformObject(entity),
            ray_origin,
            direction,
            t,
            normal,
        ))
    }

    pub fn overlaps_rect(&self, origin: DVec2, rect: &Rect, mask: u32) -> bool {
        self.shared_layers(mask)
            .is_some_and(|mask| self.shape.overlaps_rect(origin, rect, mask))
    }
}
