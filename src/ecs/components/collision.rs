//! Collision components for actors, platforms and platform objects.

use glam::DVec2;

use crate::collision::geometry::Rect;
use crate::error::{CollisionError, Result};

/// Actor mask that collides with every layer.
pub const DEFAULT_COLLISION_MASK: u32 = 0x7FFF_FFFF;
/// Team an actor belongs to unless told otherwise.
pub const DEFAULT_TEAM: u32 = 0x1;
/// Layer a platform object occupies unless told otherwise.
pub const DEFAULT_COLLISION_LAYERS: u32 = 0x1;
/// Angle in degrees between two contact normals above which an actor counts as crushed.
pub const DEFAULT_CRUSH_ANGLE_THRESHOLD: f64 = 91.0;

/// A dynamic body moved and resolved by the [`Handler`](crate::collision::Handler).
///
/// The box is centred at `position + offset` (position comes from the entity's
/// [`Transform`](super::Transform)) and spans `half_extents` on each side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actor {
    /// Disabled actors are skipped by the handler and by queries.
    pub enabled: bool,
    /// Velocity in units per second.
    pub velocity: DVec2,
    /// Local offset of the box centre from the entity position.
    pub offset: DVec2,
    pub half_extents: DVec2,
    /// Layers this actor collides with.
    pub collision_mask: u32,
    /// Team bits used to filter actor queries (hitboxes, sensors).
    pub team: u32,
    /// Multiplier applied to the handler gravity (default: 1.0).
    pub gravity_scale: f64,
    /// Constant velocity offset added during integration but never accumulated.
    pub wind: DVec2,
    /// Slide along surfaces instead of stopping dead (default: true).
    pub project_collision: bool,
    /// Zero the velocity pointing into a surface while in contact (default: true).
    pub zero_velocity_on_collision: bool,
    /// Normal divergence in degrees that reports a crush (default: 91).
    pub crush_angle_threshold: f64,
    pub(crate) attached_to: Option<hecs::Entity>,
}

impl Actor {
    /// Create an actor with the given box half-extents and default settings.
    pub fn new(half_extents: DVec2) -> Self {
        Self {
            enabled: true,
            velocity: DVec2::ZERO,
            offset: DVec2::ZERO,
            half_extents,
            collision_mask: DEFAULT_COLLISION_MASK,
            team: DEFAULT_TEAM,
            gravity_scale: 1.0,
            wind: DVec2::ZERO,
            project_collision: true,
            zero_velocity_on_collision: true,
            crush_angle_threshold: DEFAULT_CRUSH_ANGLE_THRESHOLD,
            attached_to: None,
        }
    }

    /// Create an actor from a full width and height.
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(DVec2::new(width * 0.5, height * 0.5))
    }

    pub fn with_velocity(mut self, velocity: DVec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_offset(mut self, offset: DVec2) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_collision_mask(mut self, mask: u32) -> Self {
        self.collision_mask = mask;
        self
    }

    pub fn with_team(mut self, team: u32) -> Self {
        self.team = team;
        self
    }

    pub fn with_gravity_scale(mut self, gravity_scale: f64) -> Self {
        self.gravity_scale = gravity_scale;
        self
    }

    /// Constant drift added to the velocity during integration only.
    pub fn with_wind(mut self, wind: DVec2) -> Self {
        self.wind = wind;
        self
    }

    pub fn with_project_collision(mut self, project: bool) -> Self {
        self.project_collision = project;
        self
    }

    /// World-space box when the entity sits at `position`.
    #[inline]
    pub fn bounds(&self, position: DVec2) -> Rect {
        Rect::from_center(position + self.offset, self.half_extents)
    }

    /// The moving platform object this actor currently rides, if any.
    pub fn attached_platform_object(&self) -> Option<hecs::Entity> {
        self.attached_to
    }
}

/// Owner of one or more [`PlatformObject`] shapes.
///
/// Platforms are never collided against each other; the handler only advances them by
/// `velocity * dt` after all actors are resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    /// Velocity in units per second.
    pub velocity: DVec2,
    pub(crate) enabled: bool,
    pub(crate) objects: Vec<hecs::Entity>,
}

impl Platform {
    /// A platform that never moves.
    pub fn fixed() -> Self {
        Self::moving(DVec2::ZERO)
    }

    /// A platform travelling at `velocity`.
    pub fn moving(velocity: DVec2) -> Self {
        Self {
            velocity,
            enabled: true,
            objects: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Platform object entities owned by this platform, in the order they were added.
    pub fn objects(&self) -> &[hecs::Entity] {
        &self.objects
    }

    /// Distance travelled during a frame of `dt` seconds.
    #[inline]
    pub fn displacement(&self, dt: f64) -> DVec2 {
        if self.enabled {
            self.velocity * dt
        } else {
            DVec2::ZERO
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::fixed()
    }
}

/// Solid box relative to its platform's position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AabbShape {
    pub offset: DVec2,
    pub half_extents: DVec2,
}

impl AabbShape {
    pub fn new(offset: DVec2, half_extents: DVec2) -> Self {
        Self {
            offset,
            half_extents,
        }
    }

    /// Box spanning `[min, max]` relative to the platform position.
    pub fn from_min_max(min: DVec2, max: DVec2) -> Self {
        Self::new((min + max) * 0.5, (max - min) * 0.5)
    }
}

/// Grid of tiles relative to its platform's position.
///
/// Each tile stores the collision layers it occupies; `0` is empty. Tiles are stored row
/// by row starting at the top-left corner (`offset`).
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    pub offset: DVec2,
    tile_size: DVec2,
    columns: usize,
    rows: usize,
    tiles: Vec<u32>,
}

impl TileLayer {
    /// Create a layer from row-major tile layers.
    pub fn new(
        offset: DVec2,
        tile_size: DVec2,
        columns: usize,
        rows: usize,
        tiles: Vec<u32>,
    ) -> Result<Self> {
        if !(tile_size.x > 0.0 && tile_size.y > 0.0 && tile_size.is_finite()) {
            return Err(CollisionError::InvalidTileSize(tile_size));
        }
        let expected = columns * rows;
        if tiles.len() != expected {
            return Err(CollisionError::TileCount {
                columns,
                rows,
                expected,
                actual: tiles.len(),
            });
        }
        Ok(Self {
            offset,
            tile_size,
            columns,
            rows,
            tiles,
        })
    }

    /// Create an empty layer.
    pub fn empty(offset: DVec2, tile_size: DVec2, columns: usize, rows: usize) -> Result<Self> {
        Self::new(offset, tile_size, columns, rows, vec![0; columns * rows])
    }

    /// Create a layer from rows of tile layers. All rows must have the same length.
    pub fn from_rows<R: AsRef<[u32]>>(offset: DVec2, tile_size: DVec2, rows: &[R]) -> Result<Self> {
        let columns = rows.first().map_or(0, |r| r.as_ref().len());
        let mut tiles = Vec::with_capacity(columns * rows.len());
        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();
            if r.len() != columns {
                return Err(CollisionError::RaggedRows {
                    row,
                    expected: columns,
                    actual: r.len(),
                });
            }
            tiles.extend_from_slice(r);
        }
        Self::new(offset, tile_size, columns, rows.len(), tiles)
    }

    pub fn tile_size(&self) -> DVec2 {
        self.tile_size
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Layers of the tile at `(column, row)`; out-of-range tiles are empty.
    #[inline]
    pub fn tile(&self, column: i64, row: i64) -> u32 {
        if column < 0 || row < 0 {
            return 0;
        }
        let (column, row) = (column as usize, row as usize);
        if column >= self.columns || row >= self.rows {
            return 0;
        }
        self.tiles[row * self.columns + column]
    }

    /// Overwrite one tile. Returns false when `(column, row)` is outside the grid.
    pub fn set_tile(&mut self, column: usize, row: usize, layers: u32) -> bool {
        if column >= self.columns || row >= self.rows {
            return false;
        }
        self.tiles[row * self.columns + column] = layers;
        true
    }

    /// Local-space size of the whole grid.
    pub fn size(&self) -> DVec2 {
        DVec2::new(
            self.columns as f64 * self.tile_size.x,
            self.rows as f64 * self.tile_size.y,
        )
    }

    /// World-space bounds when the platform sits at `origin`.
    pub fn bounds(&self, origin: DVec2) -> Rect {
        let min = origin + self.offset;
        Rect::new(min, min + self.size())
    }
}

/// The collidable shape of a platform object.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformShape {
    Aabb(AabbShape),
    TileLayer(TileLayer),
}

/// Rider bookkeeping of a moving platform object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovingPlatformObject {
    pub(crate) attached: Vec<hecs::Entity>,
}

impl MovingPlatformObject {
    /// Actors currently riding this object.
    pub fn attached_actors(&self) -> &[hecs::Entity] {
        &self.attached
    }

    pub fn is_attached(&self, actor: hecs::Entity) -> bool {
        self.attached.contains(&actor)
    }
}

/// One collidable shape belonging to a [`Platform`].
///
/// Spawn it with [`add_platform_object`](crate::ecs::bridge::add_platform_object), which
/// wires the owning platform.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformObject {
    pub shape: PlatformShape,
    /// Layers this object occupies.
    pub collision_layers: u32,
    pub(crate) platform: hecs::Entity,
    pub(crate) enabled: bool,
    pub(crate) moving: Option<MovingPlatformObject>,
}

impl PlatformObject {
    pub fn new(shape: PlatformShape) -> Self {
        Self {
            shape,
            collision_layers: DEFAULT_COLLISION_LAYERS,
            platform: hecs::Entity::DANGLING,
            enabled: true,
            moving: None,
        }
    }

    pub fn aabb(shape: AabbShape) -> Self {
        Self::new(PlatformShape::Aabb(shape))
    }

    pub fn tile_layer(layer: TileLayer) -> Self {
        Self::new(PlatformShape::TileLayer(layer))
    }

    pub fn with_collision_layers(mut self, layers: u32) -> Self {
        self.collision_layers = layers;
        self
    }

    /// Track riders and push stationary actors.
    pub fn into_moving(mut self) -> Self {
        self.moving = Some(MovingPlatformObject::default());
        self
    }

    /// Owning platform entity.
    pub fn platform(&self) -> hecs::Entity {
        self.platform
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_moving(&self) -> bool {
        self.moving.is_some()
    }

    pub fn as_moving(&self) -> Option<&MovingPlatformObject> {
        self.moving.as_ref()
    }

    /// Whether an actor with `mask` can collide with this object at all.
    #[inline]
    pub fn collides_with(&self, mask: u32) -> bool {
        self.enabled && self.collision_layers & mask != 0
    }
}
