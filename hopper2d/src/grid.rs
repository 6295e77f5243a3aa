//! Collision grid for tile-based levels.
//!
//! Levels arrive as a rectangular matrix of integer tile codes. A code's
//! value modulo 100 selects the visual/type id; the quotient is the
//! solidity class. Both are decoded exactly once here, so collision
//! sampling never re-derives them.

use serde::{Deserialize, Serialize};

use crate::level::LevelError;

/// Pixel dimensions of one tile. A per-level-set constant supplied
/// alongside the grid, not something baked into the collision math.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDims {
    pub tile_w: i32,
    pub tile_h: i32,
}

impl TileDims {
    pub fn square(side: i32) -> Self {
        Self {
            tile_w: side,
            tile_h: side,
        }
    }
}

impl Default for TileDims {
    fn default() -> Self {
        Self::square(30)
    }
}

/// One decoded grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tile {
    pub visual_id: u8,
    pub solid: bool,
}

impl Tile {
    /// Decode a raw level code. Visual id 0 is reserved for empty space
    /// and never collides, whatever its solidity class says.
    pub fn decode(code: i32) -> Self {
        let visual_id = (code % 100) as u8;
        let class = code / 100;
        Self {
            visual_id,
            solid: visual_id != 0 && class >= 1,
        }
    }
}

/// Immutable-per-level grid of decoded tiles.
///
/// Row-major storage: `cells[row * width + col]`. The grid itself only
/// answers in-range queries; above-grid, below-grid, and off-the-edge
/// handling belongs to the kinematics sweeps, which clamp or special-case
/// indices before sampling.
#[derive(Clone, Debug)]
pub struct TileGrid {
    width: usize,
    height: usize,
    dims: TileDims,
    cells: Vec<Tile>,
}

impl TileGrid {
    /// Decode a matrix of raw tile codes (outer slice = rows).
    ///
    /// Rejects empty and ragged input; everything downstream assumes a
    /// well-formed rectangular grid.
    pub fn from_rows(rows: &[Vec<i32>], dims: TileDims) -> Result<Self, LevelError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(LevelError::Empty);
        }

        let mut cells = Vec::with_capacity(width * height);
        for (row, codes) in rows.iter().enumerate() {
            if codes.len() != width {
                return Err(LevelError::Ragged {
                    row,
                    expected: width,
                    got: codes.len(),
                });
            }
            cells.extend(codes.iter().copied().map(Tile::decode));
        }

        Ok(Self {
            width,
            height,
            dims,
            cells,
        })
    }

    /// Grid width in tiles.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid height in tiles.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dims(&self) -> TileDims {
        self.dims
    }

    /// Total map width in pixels.
    pub fn pixel_width(&self) -> i32 {
        self.width as i32 * self.dims.tile_w
    }

    /// Total map height in pixels.
    pub fn pixel_height(&self) -> i32 {
        self.height as i32 * self.dims.tile_h
    }

    /// Get the decoded tile at a coordinate, `None` if out of bounds.
    pub fn tile(&self, col: i32, row: i32) -> Option<Tile> {
        if col < 0 || row < 0 || col >= self.width as i32 || row >= self.height as i32 {
            return None;
        }
        self.cells
            .get(row as usize * self.width + col as usize)
            .copied()
    }

    /// Whether the tile at `(col, row)` participates in collision.
    /// Out-of-range coordinates read as open; the sweeps in
    /// [`crate::kinematics`] apply the world-boundary rules before asking.
    pub fn solid_at(&self, col: i32, row: i32) -> bool {
        self.tile(col, row).map(|t| t.solid).unwrap_or(false)
    }
}
