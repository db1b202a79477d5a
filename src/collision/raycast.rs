//! Raycast results.

use glam::DVec2;

/// Owner of the surface a ray struck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitTarget {
    Actor(hecs::Entity),
    PlatformObject(hecs::Entity),
}

impl HitTarget {
    pub fn entity(&self) -> hecs::Entity {
        match *self {
            HitTarget::Actor(e) | HitTarget::PlatformObject(e) => e,
        }
    }
}

/// A single raycast hit. Misses are `None` at the query site.
///
/// Rays are segments: `point = origin + direction * t` with `t` in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub target: HitTarget,
    /// Global hit coordinate.
    pub point: DVec2,
    pub t: f64,
    /// Unit normal from the surface toward the ray origin side.
    pub normal: DVec2,
}

impl RaycastHit {
    pub(crate) fn along(
        target: HitTarget,
        origin: DVec2,
        direction: DVec2,
        t: f64,
        normal: DVec2,
    ) -> Self {
        Self {
            target,
            point: origin + direction * t,
            t,
            normal,
        }
    }
}

/// Insert `hit` into the first `len` slots of `out`, which are kept sorted by `t`.
///
/// Ties keep the lower entity id first. When the buffer is full the latest hit is dropped.
/// Returns the new number of used slots.
pub(crate) fn insert_sorted(out: &mut [RaycastHit], len: usize, hit: RaycastHit) -> usize {
    let key = |h: &RaycastHit| (h.t, h.target.entity().id());
    let mut at = len;
    while at > 0 && key(&hit) < key(&out[at - 1]) {
        at -= 1;
    }
    if at >= out.len() {
        return len;
    }
    let new_len = (len + 1).min(out.len());
    for i in (at + 1..new_len).rev() {
        out[i] = out[i - 1];
    }
    out[at] = hit;
    new_len
}
