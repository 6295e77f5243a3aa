//! Axis-separated sweep of a bounding box through the tile grid.
//!
//! Movement is resolved one axis at a time against the decoded grid:
//! horizontal first, then vertical. The vertical sweep is the single
//! place where movement writes the entity logic state (landing, starting
//! to fall, continuing a jump, dying below the map).
//!
//! World boundaries are asymmetric on purpose: the left edge is solid,
//! the right edge clamps position without sampling past the grid, the sky
//! above the grid is open, and the void below kills after a grace row.

use crate::grid::TileGrid;
use crate::math::Rect;
use crate::state::EntityState;

/// Rows an entity may fall past the bottom edge before it is marked
/// dead. The first off-the-bottom step is visible fall-out, the next one
/// kills; level layouts rely on that one-row reprieve.
pub const FALL_GRACE_ROWS: i32 = 1;

/// Outcome of a horizontal sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HorizontalMove {
    /// Pixels actually applied, after any clamp.
    pub dx: i32,
    pub collided: bool,
}

/// Move `bounds` horizontally by up to `dx` pixels, clamping against
/// solid tiles and the map edges. Returns the resolved displacement.
///
/// Solidity is sampled at both the top and bottom rows the box spans
/// (bottom row uses `h - 1` so a box flush on a tile boundary does not
/// read one row too far); a hit at either row clamps, which is what
/// prevents corner-clipping. While the box is wholly above or partially
/// below the grid, horizontal movement is free; the vertical sweep owns
/// those cases.
pub fn move_horizontal(grid: &TileGrid, bounds: &mut Rect, dx: i32) -> HorizontalMove {
    let dims = grid.dims();
    let width = grid.width() as i32;
    let height = grid.height() as i32;
    let start_x = bounds.x;

    let row_top = bounds.y / dims.tile_h;
    let row_bottom = (bounds.y + bounds.h - 1) / dims.tile_h;

    if dx < 0 {
        let col = (bounds.x + dx) / dims.tile_w;

        // The left edge of the world is solid.
        if col < 0 || bounds.x <= 0 {
            bounds.x = 0;
            return HorizontalMove {
                dx: bounds.x - start_x,
                collided: true,
            };
        }
        if row_top < 0 || row_bottom >= height {
            bounds.x += dx;
            return HorizontalMove {
                dx,
                collided: false,
            };
        }
        if grid.solid_at(col, row_top) || grid.solid_at(col, row_bottom) {
            // Up against the right face of the blocking tile.
            bounds.x = (col + 1) * dims.tile_w;
            return HorizontalMove {
                dx: bounds.x - start_x,
                collided: true,
            };
        }
    } else if dx > 0 {
        let col = (bounds.x + bounds.w + dx) / dims.tile_w;

        // The right edge clamps but nothing exists beyond it to sample.
        if col >= width {
            bounds.x = width * dims.tile_w - bounds.w;
            return HorizontalMove {
                dx: bounds.x - start_x,
                collided: true,
            };
        }
        if row_top < 0 || row_bottom >= height {
            bounds.x += dx;
            return HorizontalMove {
                dx,
                collided: false,
            };
        }
        if grid.solid_at(col, row_top) || grid.solid_at(col, row_bottom) {
            // Up against the left face of the blocking tile.
            bounds.x = col * dims.tile_w - bounds.w;
            return HorizontalMove {
                dx: bounds.x - start_x,
                collided: true,
            };
        }
    }

    bounds.x += dx;
    HorizontalMove {
        dx,
        collided: false,
    }
}

/// Move `bounds` vertically by up to `dy` pixels, resolving against the
/// grid and transitioning `state` as a side effect.
///
/// Upward: a blocked head snaps the top to the tile's underside and
/// starts a fall; free ascent keeps `Jumping`; the apex may rise above
/// the visible map without a state change.
///
/// Downward: landing requires the box's bottom to already be at or above
/// the candidate tile's top *before* `dy` is applied, so a box that
/// drifted a pixel into a tile cannot clip through it. A landing snaps
/// the bottom to the tile top and grounds the entity; otherwise it keeps
/// falling.
///
/// Past the bottom edge both directions apply the same debounce: the
/// destination row must exceed the grid height by [`FALL_GRACE_ROWS`]
/// before `Dead` is set; until then the box keeps moving off-screen.
pub fn move_vertical(grid: &TileGrid, bounds: &mut Rect, dy: i32, state: &mut EntityState) {
    if dy == 0 {
        return;
    }

    let dims = grid.dims();
    let width = grid.width() as i32;
    let height = grid.height() as i32;

    let col_left = bounds.x / dims.tile_w;
    let mut col_right = (bounds.x + bounds.w - 1) / dims.tile_w;
    if col_right >= width {
        // Nothing exists past the right edge of the map; reuse the left
        // sample instead of reading out of range.
        col_right = col_left;
    }

    if dy < 0 {
        let row = (bounds.y + dy) / dims.tile_h;
        if row < 0 {
            // Open sky: the jump apex may leave the visible map.
            bounds.y += dy;
            return;
        }
        if row >= height {
            if row >= height + FALL_GRACE_ROWS {
                *state = EntityState::Dead;
            } else {
                bounds.y += dy;
            }
            return;
        }
        if grid.solid_at(col_left, row) || grid.solid_at(col_right, row) {
            // Head bump: snap below the blocking tile and start falling.
            bounds.y = (row + 1) * dims.tile_h;
            *state = EntityState::Falling;
        } else {
            bounds.y += dy;
            *state = EntityState::Jumping;
        }
    } else {
        let row = (bounds.y + bounds.h + dy) / dims.tile_h;
        if row < 0 {
            bounds.y += dy;
            return;
        }
        if row >= height {
            if row >= height + FALL_GRACE_ROWS {
                *state = EntityState::Dead;
            } else {
                bounds.y += dy;
            }
            return;
        }
        let landed = bounds.y + bounds.h <= row * dims.tile_h
            && (grid.solid_at(col_left, row) || grid.solid_at(col_right, row));
        if landed {
            bounds.y = row * dims.tile_h - bounds.h;
            *state = EntityState::Normal;
        } else {
            bounds.y += dy;
            *state = EntityState::Falling;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileDims;

    /// 10x10 grid, 30px tiles, fully solid bottom row, plus a solid
    /// column at x=5 spanning rows 4..=8.
    fn test_grid() -> TileGrid {
        let mut rows = vec![vec![0i32; 10]; 10];
        for code in rows[9].iter_mut() {
            *code = 102;
        }
        for row in 4..9 {
            rows[row][5] = 103;
        }
        TileGrid::from_rows(&rows, TileDims::square(30)).unwrap()
    }

    #[test]
    fn lands_flush_on_tile_top() {
        let grid = test_grid();
        let mut bounds = Rect::new(0, 240, 20, 20);
        let mut state = EntityState::Falling;
        move_vertical(&grid, &mut bounds, 10, &mut state);
        assert_eq!(bounds.bottom(), 9 * 30);
        assert_eq!(bounds.y, 250);
        assert_eq!(state, EntityState::Normal);
    }

    #[test]
    fn left_world_edge_is_solid() {
        let grid = test_grid();
        let mut bounds = Rect::new(0, 0, 20, 20);
        let mv = move_horizontal(&grid, &mut bounds, -5);
        assert_eq!(bounds.x, 0);
        assert!(mv.collided);
        assert_eq!(mv.dx, 0);
    }

    #[test]
    fn right_world_edge_clamps() {
        let grid = test_grid();
        let mut bounds = Rect::new(290, 0, 20, 20);
        let mv = move_horizontal(&grid, &mut bounds, 25);
        assert_eq!(bounds.x, 10 * 30 - 20);
        assert!(mv.collided);
    }

    #[test]
    fn horizontal_sweep_stops_at_wall() {
        let grid = test_grid();
        // Walking right toward the column at col 5 (x = 150..180).
        let mut bounds = Rect::new(120, 220, 20, 20);
        let mv = move_horizontal(&grid, &mut bounds, 15);
        assert!(mv.collided);
        assert_eq!(bounds.x, 5 * 30 - 20);
        assert_eq!(mv.dx, 10);

        // Walking left into the same wall from the other side.
        let mut bounds = Rect::new(185, 220, 20, 20);
        let mv = move_horizontal(&grid, &mut bounds, -10);
        assert!(mv.collided);
        assert_eq!(bounds.x, 6 * 30);
    }

    #[test]
    fn wall_hit_on_either_spanned_row_clamps() {
        let grid = test_grid();
        // Box straddles rows 3 and 4; only row 4 meets the column, but
        // the two-row sample must still clamp (no corner clipping).
        let mut bounds = Rect::new(120, 3 * 30 + 15, 20, 20);
        let mv = move_horizontal(&grid, &mut bounds, 15);
        assert!(!grid.solid_at(5, 3));
        assert!(grid.solid_at(5, 4));
        assert!(mv.collided);
        assert_eq!(bounds.x, 5 * 30 - 20);
    }

    #[test]
    fn horizontal_movement_free_above_the_grid() {
        let grid = test_grid();
        let mut bounds = Rect::new(120, -40, 20, 20);
        let mv = move_horizontal(&grid, &mut bounds, 15);
        assert!(!mv.collided);
        assert_eq!(bounds.x, 135);
    }

    #[test]
    fn leading_edge_never_enters_solid_footprint() {
        let grid = test_grid();
        // Per-tick speeds are always far below one tile width.
        for start_x in 100..130 {
            for dx in 1..=10 {
                let mut bounds = Rect::new(start_x, 220, 20, 20);
                move_horizontal(&grid, &mut bounds, dx);
                assert!(bounds.right() <= 5 * 30, "tunneled from x={start_x} dx={dx}");
            }
        }
    }

    #[test]
    fn head_bump_snaps_below_tile_and_falls() {
        let grid = test_grid();
        // Rising into the underside of the column cell at row 8.
        let mut bounds = Rect::new(150, 275, 20, 20);
        let mut state = EntityState::Jumping;
        move_vertical(&grid, &mut bounds, -10, &mut state);
        // Destination row 8 is solid at col 5: snap to its underside.
        assert_eq!(bounds.y, 9 * 30);
        assert_eq!(state, EntityState::Falling);
    }

    #[test]
    fn free_ascent_keeps_jumping() {
        let grid = test_grid();
        let mut bounds = Rect::new(0, 120, 20, 20);
        let mut state = EntityState::Normal;
        move_vertical(&grid, &mut bounds, -5, &mut state);
        assert_eq!(bounds.y, 115);
        assert_eq!(state, EntityState::Jumping);
    }

    #[test]
    fn apex_above_the_map_is_open_sky() {
        let grid = test_grid();
        let mut bounds = Rect::new(0, -25, 20, 20);
        // Deliberately odd starting state: the above-grid branch must
        // move the box without touching the state at all.
        let mut state = EntityState::Falling;
        move_vertical(&grid, &mut bounds, -10, &mut state);
        assert_eq!(bounds.y, -35);
        assert_eq!(state, EntityState::Falling);
    }

    #[test]
    fn overlap_guard_blocks_landing_snap() {
        let grid = test_grid();
        // Bottom already one pixel inside row 9: the landing guard must
        // refuse the snap and keep the fall going.
        let mut bounds = Rect::new(60, 251, 20, 20);
        let mut state = EntityState::Falling;
        move_vertical(&grid, &mut bounds, 5, &mut state);
        assert_eq!(bounds.y, 256);
        assert_eq!(state, EntityState::Falling);
    }

    #[test]
    fn fall_past_bottom_uses_one_grace_row() {
        // No floor anywhere.
        let rows = vec![vec![0i32; 10]; 10];
        let grid = TileGrid::from_rows(&rows, TileDims::square(30)).unwrap();
        let mut bounds = Rect::new(0, 271, 20, 20);
        let mut state = EntityState::Falling;

        // Destination row == height: off-screen but alive.
        move_vertical(&grid, &mut bounds, 10, &mut state);
        assert_eq!(state, EntityState::Falling);
        assert_eq!(bounds.y, 281);

        // One more step pushes past the grace row: dead, box frozen.
        move_vertical(&grid, &mut bounds, 30, &mut state);
        assert_eq!(state, EntityState::Dead);
        assert_eq!(bounds.y, 281);
    }

    #[test]
    fn right_column_sample_reuses_left_at_map_edge() {
        let grid = test_grid();
        // Box hangs one pixel past the right edge of the map; the sweep
        // must not sample column 10.
        let mut bounds = Rect::new(281, 240, 20, 20);
        let mut state = EntityState::Falling;
        move_vertical(&grid, &mut bounds, 10, &mut state);
        assert_eq!(state, EntityState::Normal);
        assert_eq!(bounds.bottom(), 9 * 30);
    }

    #[test]
    fn zero_dy_is_a_no_op() {
        let grid = test_grid();
        let mut bounds = Rect::new(0, 100, 20, 20);
        let mut state = EntityState::Jumping;
        move_vertical(&grid, &mut bounds, 0, &mut state);
        assert_eq!(bounds.y, 100);
        assert_eq!(state, EntityState::Jumping);
    }
}
