//! Collision responses, crush pairs and frame-scoped response storage.

use glam::DVec2;
use tracing::debug;

use super::geometry::{angle_between_degrees, normal_direction, NormalDirection};

/// How a response repositions its actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// Stop dead at the impact point.
    Bullet,
    /// Stop at the impact point on the blocked axis, keep sliding on the other.
    Project,
    /// Started inside the shape; relocate and keep the remaining displacement.
    Intersect,
    /// A moving platform pushed a stationary actor.
    MovingPlatform,
}

/// Outcome of one actor vs platform object test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Response {
    pub actor: hecs::Entity,
    pub platform_object: hecs::Entity,
    /// Platform owning `platform_object`.
    pub platform: hecs::Entity,
    /// Fraction of the frame's motion before impact, in `[0, 1]`.
    pub time: f64,
    /// Actor position exactly touching the surface.
    pub reposition: DVec2,
    /// Actor position after sliding along the surface. Only meaningful for `Project`.
    pub reposition_project: DVec2,
    /// Global contact point.
    pub point: DVec2,
    /// Unit normal pointing from the surface to the actor.
    pub normal: DVec2,
    pub kind: ResponseKind,
}

impl Response {
    /// The (actor, platform object) pair used for enter/stay/exit bookkeeping.
    #[inline]
    pub fn pair(&self) -> (hecs::Entity, hecs::Entity) {
        (self.actor, self.platform_object)
    }

    #[inline]
    pub fn normal_direction(&self) -> NormalDirection {
        normal_direction(self.normal)
    }
}

/// An actor caught between two surfaces whose normals diverge past its threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crush {
    pub actor: hecs::Entity,
    pub first: Response,
    pub second: Response,
    /// Angle between the two normals in degrees.
    pub angle: f64,
}

impl Crush {
    /// Pair two responses of the same actor if they qualify as a crush.
    ///
    /// At least one response must come from a moving platform, the two must come from
    /// different platform objects and their normals must diverge by more than
    /// `threshold` degrees.
    pub fn between(first: &Response, second: &Response, threshold: f64) -> Option<Crush> {
        if first.actor != second.actor || first.platform_object == second.platform_object {
            return None;
        }
        let moving = ResponseKind::MovingPlatform;
        if first.kind != moving && second.kind != moving {
            return None;
        }
        let angle = angle_between_degrees(first.normal, second.normal);
        (angle > threshold).then_some(Crush {
            actor: first.actor,
            first: *first,
            second: *second,
            angle,
        })
    }
}

/// Responses of the current and the previous frame.
///
/// Both buffers keep their capacity across frames, so steady-state frames do not allocate.
#[derive(Debug, Default)]
pub struct FrameResponses {
    current: Vec<Response>,
    previous: Vec<Response>,
    previous_recycled: bool,
}

impl FrameResponses {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn push(&mut self, response: Response) {
        self.current.push(response);
    }

    pub fn current(&self) -> &[Response] {
        &self.current
    }

    pub fn previous(&self) -> &[Response] {
        &self.previous
    }

    /// Drop the previous frame's responses. Recycling the same frame twice is a no-op.
    pub fn recycle_previous(&mut self) {
        if self.previous_recycled {
            debug!("Previous frame responses already recycled");
            return;
        }
        self.previous.clear();
        self.previous_recycled = true;
    }

    /// Make the current frame the previous one and start an empty current frame.
    pub fn advance(&mut self) {
        if !self.previous_recycled {
            self.previous.clear();
        }
        std::mem::swap(&mut self.current, &mut self.previous);
        self.previous_recycled = false;
    }
}
