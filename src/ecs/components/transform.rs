//! Transform component for actors and platforms.

use glam::DVec2;

/// Global position of an actor or platform.
///
/// Collision geometry is axis-aligned, so there is no rotation or scale. The y axis grows
/// downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: DVec2,
}

impl Transform {
    /// Create a transform at the origin.
    pub fn identity() -> Self {
        Self {
            position: DVec2::ZERO,
        }
    }

    /// Create a transform from a position.
    pub fn from_position(position: DVec2) -> Self {
        Self { position }
    }

    /// Create a transform from x/y coordinates.
    pub fn from_xy(x: f64, y: f64) -> Self {
        Self::from_position(DVec2::new(x, y))
    }

    /// Move by `delta`.
    pub fn translate(&mut self, delta: DVec2) {
        self.position += delta;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let t = Transform::identity();
        assert_eq!(t.position, DVec2::ZERO);
        assert_eq!(Transform::default(), t);
    }

    #[test]
    fn test_translate() {
        let mut t = Transform::from_xy(1.0, 2.0);
        t.translate(DVec2::new(0.5, -4.0));
        assert_eq!(t.position, DVec2::new(1.5, -2.0));
    }
}
