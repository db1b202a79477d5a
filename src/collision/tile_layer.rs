//! Swept box vs tile grid.
//!
//! Sweeps march the grid lines the leading edge crosses, one axis at a time, and test the
//! tiles the box spans on the other axis at the moment of crossing. Raycasts walk the grid
//! cell by cell.

use glam::DVec2;

use crate::ecs::components::collision::TileLayer;

use super::geometry::{closing_span, Rect, CONTACT_SKIN, EPSILON};
use super::platform_object::{earliest, penetration_hit, AxisHit, ShapeQueries};

impl TileLayer {
    #[inline]
    fn count(&self, axis: usize) -> i64 {
        if axis == 0 {
            self.columns() as i64
        } else {
            self.rows() as i64
        }
    }

    /// Top-left corner of the grid in world space.
    #[inline]
    fn corner(&self, origin: DVec2) -> DVec2 {
        origin + self.offset
    }

    /// Cells on `axis` covered by the open local span `(lo, hi)`, clamped to the grid.
    fn cell_span(&self, axis: usize, lo: f64, hi: f64) -> Option<(i64, i64)> {
        let size = self.tile_size()[axis];
        let first = ((lo / size).floor() as i64).max(0);
        let last = ((hi / size).ceil() as i64 - 1).min(self.count(axis) - 1);
        (first <= last).then_some((first, last))
    }

    /// Tile layers at `along` on `axis` and `across` on the other axis.
    #[inline]
    fn tile_on(&self, axis: usize, along: i64, across: i64) -> u32 {
        if axis == 0 {
            self.tile(along, across)
        } else {
            self.tile(across, along)
        }
    }

    /// Whether line `along` on `axis` shows a solid face across the local span to a box
    /// coming from line `behind`. Faces between two solid tiles do not count.
    fn line_blocked(
        &self,
        axis: usize,
        along: i64,
        behind: i64,
        span: (f64, f64),
        mask: u32,
    ) -> bool {
        let Some((first, last)) = self.cell_span(1 - axis, span.0, span.1) else {
            return false;
        };
        (first..=last).any(|across| {
            self.tile_on(axis, along, across) & mask != 0
                && self.tile_on(axis, behind, across) & mask == 0
        })
    }

    /// World-space rectangle of one tile.
    fn tile_rect(&self, origin: DVec2, column: i64, row: i64) -> Rect {
        let size = self.tile_size();
        let min = self.corner(origin) + DVec2::new(column as f64 * size.x, row as f64 * size.y);
        Rect::new(min, min + size)
    }

    /// March the grid lines crossed along `axis`. Works in local coordinates and returns
    /// `(t, local line coordinate, normal sign)`.
    fn march_axis(
        &self,
        axis: usize,
        center: DVec2,
        half_extents: DVec2,
        motion: DVec2,
        mask: u32,
    ) -> Option<(f64, f64, f64)> {
        let size = self.tile_size()[axis];
        let count = self.count(axis);
        let other = 1 - axis;
        let m = motion[axis];

        let span_at = |t: f64| {
            let c = center[other] + motion[other] * t;
            closing_span(c - half_extents[other], c + half_extents[other], motion[other])
        };

        if m > 0.0 {
            let lead = center[axis] + half_extents[axis];
            let mut line = (((lead - EPSILON * m) / size).floor() as i64 + 1).max(0);
            while line < count {
                let t = (line as f64 * size - lead) / m;
                if t > 1.0 {
                    break;
                }
                if self.line_blocked(axis, line, line - 1, span_at(t), mask) {
                    return Some((t, line as f64 * size, -1.0));
                }
                line += 1;
            }
        } else if m < 0.0 {
            let lead = center[axis] - half_extents[axis];
            let mut line = (((lead - EPSILON * m) / size).ceil() as i64 - 1).min(count);
            while line > 0 {
                let t = (line as f64 * size - lead) / m;
                if t > 1.0 {
                    break;
                }
                if self.line_blocked(axis, line - 1, line, span_at(t), mask) {
                    return Some((t, line as f64 * size, 1.0));
                }
                line -= 1;
            }
        }
        None
    }

    /// A solid tile face the box rests against on `axis`, in local coordinates.
    fn resting_axis(
        &self,
        axis: usize,
        center: DVec2,
        half_extents: DVec2,
        mask: u32,
    ) -> Option<(f64, f64, f64)> {
        let size = self.tile_size()[axis];
        let count = self.count(axis);
        let other = 1 - axis;
        let span = (
            center[other] - half_extents[other],
            center[other] + half_extents[other],
        );

        let lead = center[axis] + half_extents[axis];
        let line = (lead / size).round() as i64;
        let gap = line as f64 * size - lead;
        if gap > -EPSILON
            && gap <= CONTACT_SKIN
            && (0..count).contains(&line)
            && self.line_blocked(axis, line, line - 1, span, mask)
        {
            return Some((0.0, line as f64 * size, -1.0));
        }

        let lead = center[axis] - half_extents[axis];
        let line = (lead / size).round() as i64;
        let gap = lead - line as f64 * size;
        if gap > -EPSILON
            && gap <= CONTACT_SKIN
            && (1..=count).contains(&line)
            && self.line_blocked(axis, line - 1, line, span, mask)
        {
            return Some((0.0, line as f64 * size, 1.0));
        }
        None
    }
}

impl ShapeQueries for TileLayer {
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
        let corner = self.corner(origin);
        let local = center - corner;
        let axis_hit = |axis: usize| {
            let found = if motion[axis] == 0.0 {
                if !resting_contacts {
                    return None;
                }
                self.resting_axis(axis, local, half_extents, mask)
            } else {
                self.march_axis(axis, local, half_extents, motion, mask)
            };
            found.map(|(t, line, sign)| AxisHit {
                axis,
                t,
                edge: line + corner[axis],
                sign,
            })
        };
        earliest(axis_hit(0), axis_hit(1))
    }

    fn penetration(&self, origin: DVec2, bounds: &Rect, mask: u32) -> Option<AxisHit> {
        if mask == 0 {
            return None;
        }
        let local = bounds.translate(-self.corner(origin));
        let (first_col, last_col) = self.cell_span(0, local.min.x, local.max.x)?;
        let (first_row, last_row) = self.cell_span(1, local.min.y, local.max.y)?;
        for row in first_row..=last_row {
            for column in first_col..=last_col {
                if self.tile(column, row) & mask == 0 {
                    continue;
                }
                if let Some(hit) = penetration_hit(bounds, &self.tile_rect(origin, column, row)) {
                    return Some(hit);
                }
            }
        }
        None
    }

    fn raycast(
        &self,
        origin: DVec2,
        ray_origin: DVec2,
        direction: DVec2,
        mask: u32,
    ) -> Option<(f64, DVec2)> {
        if mask == 0 || self.columns() == 0 || self.rows() == 0 {
            return None;
        }
        let start = ray_origin - self.corner(origin);
        let grid = Rect::new(DVec2::ZERO, self.size());
        let (mut t, mut normal) = grid.raycast(start, direction)?;

        let size = self.tile_size();
        let entry = start + direction * t;
        let mut cell = [0i64; 2];
        let mut step = [0i64; 2];
        let mut t_max = [f64::INFINITY; 2];
        let mut t_delta = [f64::INFINITY; 2];
        for axis in 0..2 {
            cell[axis] = ((entry[axis] / size[axis]).floor() as i64).clamp(0, self.count(axis) - 1);
            let d = direction[axis];
            if d > 0.0 {
                step[axis] = 1;
                t_max[axis] = ((cell[axis] + 1) as f64 * size[axis] - start[axis]) / d;
                t_delta[axis] = size[axis] / d;
            } else if d < 0.0 {
                step[axis] = -1;
                t_max[axis] = (cell[axis] as f64 * size[axis] - start[axis]) / d;
                t_delta[axis] = -size[axis] / d;
            }
        }

        loop {
            if self.tile(cell[0], cell[1]) & mask != 0 {
                return Some((t, normal));
            }
            let axis = if t_max[0] <= t_max[1] { 0 } else { 1 };
            t = t_max[axis];
            if t > 1.0 {
                return None;
            }
            cell[axis] += step[axis];
            if cell[axis] < 0 || cell[axis] >= self.count(axis) {
                return None;
            }
            t_max[axis] += t_delta[axis];
            normal = DVec2::ZERO;
            normal[axis] = -(step[axis] as f64);
        }
    }

    fn overlaps_rect(&self, origin: DVec2, rect: &Rect, mask: u32) -> bool {
        if mask == 0 {
            return false;
        }
        let local = rect.translate(-self.corner(origin));
        let (Some((first_col, last_col)), Some((first_row, last_row))) = (
            self.cell_span(0, local.min.x, local.max.x),
            self.cell_span(1, local.min.y, local.max.y),
        ) else {
            return false;
        };
        (first_row..=last_row)
            .any(|row| (first_col..=last_col).any(|column| self.tile(column, row) & mask != 0))
    }
}
