//! Error type for the structural (non per-frame) API.

use glam::DVec2;

/// Errors raised when spawning, wiring or reconfiguring collision entities.
///
/// The per-frame resolution path never fails; these only come from calls that look up
/// entities or validate shapes.
#[derive(Debug, thiserror::Error)]
pub enum CollisionError {
    #[error(transparent)]
    NoSuchEntity(#[from] hecs::NoSuchEntity),

    #[error(transparent)]
    Component(#[from] hecs::ComponentError),

    /// Attachment was requested on a platform object that does not track riders.
    #[error("platform object {0:?} is not a moving platform object")]
    NotMoving(hecs::Entity),

    #[error("tile layer of {columns}x{rows} needs {expected} tiles, got {actual}")]
    TileCount {
        columns: usize,
        rows: usize,
        expected: usize,
        actual: usize,
    },

    #[error("tile size must be positive and finite, got {0}")]
    InvalidTileSize(DVec2),

    #[error("tile rows have uneven lengths: row {row} has {actual} tiles, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, CollisionError>;
