//! Axis-aligned geometry primitives shared by every collision query.

use glam::DVec2;

/// Tolerance for accepting a time of impact slightly before the start of the frame.
pub const EPSILON: f64 = 1e-4;
/// Distance kept between a repositioned actor and the surface it hit.
pub const REPOSITION_GAP: f64 = 2e-4;
/// Distance within which a body with no relative motion counts as resting on a surface.
pub const CONTACT_SKIN: f64 = 2.0 * REPOSITION_GAP;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: DVec2,
    pub max: DVec2,
}

impl Rect {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn from_center(center: DVec2, half_extents: DVec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> DVec2 {
        (self.max - self.min) * 0.5
    }

    #[inline]
    pub fn translate(&self, delta: DVec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Strict overlap: rectangles that only share an edge do not overlap.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Inclusive point containment.
    #[inline]
    pub fn contains(&self, point: DVec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Depth of the overlap on each axis; non-positive components mean no overlap.
    #[inline]
    pub fn penetration(&self, other: &Rect) -> DVec2 {
        self.max.min(other.max) - self.min.max(other.min)
    }

    /// Intersect the segment `origin -> origin + direction` with this rectangle.
    ///
    /// Returns the entry parameter `t` in `[0, 1]` and the unit normal of the face that was
    /// entered. A segment starting inside the rectangle hits at `t = 0` with the normal
    /// facing back along the dominant axis of travel. A zero direction never hits.
    pub fn raycast(&self, origin: DVec2, direction: DVec2) -> Option<(f64, DVec2)> {
        if direction == DVec2::ZERO {
            return None;
        }

        let mut t_enter = f64::NEG_INFINITY;
        let mut t_exit = f64::INFINITY;
        let mut normal = DVec2::ZERO;

        for axis in 0..2 {
            let o = origin[axis];
            let d = direction[axis];
            if d == 0.0 {
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (self.min[axis] - o) * inv;
            let mut t1 = (self.max[axis] - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_enter {
                t_enter = t0;
                normal = DVec2::ZERO;
                normal[axis] = -d.signum();
            }
            t_exit = t_exit.min(t1);
        }

        if t_enter > t_exit || t_exit < 0.0 || t_enter > 1.0 {
            return None;
        }
        if t_enter < 0.0 {
            return Some((0.0, facing_normal(direction)));
        }
        Some((t_enter, normal))
    }
}

/// Widen the span `[lo, hi]` by [`EPSILON`] on the side it is moving toward.
///
/// A box whose edge exactly meets a surface edge while moving into it still counts as
/// overlapping, so a diagonal sweep cannot slip between two axis tests at a corner.
#[inline]
pub fn closing_span(lo: f64, hi: f64, motion: f64) -> (f64, f64) {
    if motion > 0.0 {
        (lo, hi + EPSILON)
    } else if motion < 0.0 {
        (lo - EPSILON, hi)
    } else {
        (lo, hi)
    }
}

/// Unit normal opposing the dominant axis of `direction`; horizontal wins ties.
#[inline]
pub fn facing_normal(direction: DVec2) -> DVec2 {
    if direction.x.abs() >= direction.y.abs() {
        DVec2::new(-direction.x.signum(), 0.0)
    } else {
        DVec2::new(0.0, -direction.y.signum())
    }
}

/// Which way a contact normal points, bucketed to the four axis directions.
///
/// With y growing downward, a floor under an actor has an [`Up`](Self::Up) normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NormalDirection {
    Up,
    Down,
    Left,
    Right,
    None,
}

/// Bucket `normal` by its dominant axis. Vertical wins exact diagonals.
pub fn normal_direction(normal: DVec2) -> NormalDirection {
    if normal == DVec2::ZERO || !normal.is_finite() {
        return NormalDirection::None;
    }
    if normal.y.abs() >= normal.x.abs() {
        if normal.y < 0.0 {
            NormalDirection::Up
        } else {
            NormalDirection::Down
        }
    } else if normal.x < 0.0 {
        NormalDirection::Left
    } else {
        NormalDirection::Right
    }
}

/// Angle between two vectors in degrees, in `[0, 180]`.
pub fn angle_between_degrees(a: DVec2, b: DVec2) -> f64 {
    let la = a.length();
    let lb = b.length();
    if la == 0.0 || lb == 0.0 {
        return 0.0;
    }
    (a.dot(b) / (la * lb)).clamp(-1.0, 1.0).acos().to_degrees()
}
