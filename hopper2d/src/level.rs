//! Level assembly and per-tick orchestration.
//!
//! An external loader produces a rectangular matrix of tile codes plus
//! the tile dimensions for the level set; everything here turns that
//! into a running level: a decoded [`TileGrid`], a player, enemies,
//! trigger blocks, and backdrop ribbons. Sprite definitions live in a
//! [`SpriteCatalog`] owned by whoever builds levels and are passed in
//! explicitly; there is no process-wide registry.

use std::collections::HashMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::animation::{AnimationClip, GraphicsSet};
use crate::entities::{BlockKind, EntityTuning, Enemy, EventBlock, Player};
use crate::events::EventSink;
use crate::grid::{TileDims, TileGrid};
use crate::input::InputIntent;
use crate::math::Point;
use crate::ribbon::{Ribbon, RibbonSpec, ScrollDirection};
use crate::state::{Facing, GraphicsState};

/// What a level loader did wrong. The simulation core itself never sees
/// an invalid grid; construction is the boundary where bad data stops.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    #[error("level grid is empty")]
    Empty,
    #[error("level row {row} has {got} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("level has no player spawn cell")]
    MissingPlayerSpawn,
}

/// What a visual id stands for when it appears in the level matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpriteKind {
    /// Scenery; collision is fully described by the tile's solidity.
    Terrain,
    /// Marks where the player spawns. Later occurrences move the spawn.
    PlayerSpawn,
    /// A patrolling enemy. `None` direction means it stands still.
    Enemy {
        direction: Option<Facing>,
        special: bool,
    },
    /// A static trigger block.
    Trigger { kind: BlockKind },
}

/// Definition of one sprite class: behavior, pixel size, movement
/// tuning, and the clip table entities of this class animate with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteDef {
    pub kind: SpriteKind,
    pub width: i32,
    pub height: i32,
    pub tuning: EntityTuning,
    pub clips: GraphicsSet,
}

impl SpriteDef {
    pub fn terrain() -> Self {
        Self {
            kind: SpriteKind::Terrain,
            width: 0,
            height: 0,
            tuning: EntityTuning::default(),
            clips: GraphicsSet::default(),
        }
    }

    pub fn player(width: i32, height: i32, tuning: EntityTuning, clips: GraphicsSet) -> Self {
        Self {
            kind: SpriteKind::PlayerSpawn,
            width,
            height,
            tuning,
            clips,
        }
    }

    pub fn enemy(
        width: i32,
        height: i32,
        speed: i32,
        direction: Option<Facing>,
        special: bool,
        clips: GraphicsSet,
    ) -> Self {
        Self {
            kind: SpriteKind::Enemy { direction, special },
            width,
            height,
            tuning: EntityTuning::new(speed, 0),
            clips,
        }
    }

    pub fn trigger(kind: BlockKind, width: i32, height: i32, clip: AnimationClip) -> Self {
        Self {
            kind: SpriteKind::Trigger { kind },
            width,
            height,
            tuning: EntityTuning::default(),
            clips: GraphicsSet::uniform(clip),
        }
    }

    fn idle_clip(&self) -> AnimationClip {
        *self.clips.clip(GraphicsState::IdleRight)
    }
}

/// Arena of sprite definitions indexed by visual id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SpriteCatalog {
    defs: HashMap<u8, SpriteDef>,
}

impl SpriteCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u8, def: SpriteDef) {
        self.defs.insert(id, def);
    }

    #[must_use]
    pub fn with(mut self, id: u8, def: SpriteDef) -> Self {
        self.insert(id, def);
        self
    }

    pub fn get(&self, id: u8) -> Option<&SpriteDef> {
        self.defs.get(&id)
    }
}

/// Raw level payload as handed over by the external loader.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LevelData {
    pub dims: TileDims,
    pub rows: Vec<Vec<i32>>,
}

impl LevelData {
    pub fn new(dims: TileDims, rows: Vec<Vec<i32>>) -> Self {
        Self { dims, rows }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Result of one level tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// The player hit a level exit; the rest of the tick was skipped and
    /// the orchestrator should swap levels before the next tick.
    AdvanceLevel,
}

/// One running level: the decoded grid plus every entity it owns.
#[derive(Debug)]
pub struct Level {
    grid: TileGrid,
    player: Player,
    enemies: Vec<Enemy>,
    blocks: Vec<EventBlock>,
    ribbons: Vec<Ribbon>,
    sink: EventSink,
}

impl Level {
    /// Decode the matrix and spawn everything the catalog recognizes.
    ///
    /// Cells whose visual id has no catalog entry are logged and skipped,
    /// like any other decorative tile; shape errors and a missing player
    /// spawn are reported to the loader.
    pub fn build(
        data: &LevelData,
        catalog: &SpriteCatalog,
        sink: EventSink,
    ) -> Result<Self, LevelError> {
        let grid = TileGrid::from_rows(&data.rows, data.dims)?;
        let dims = grid.dims();

        let mut player: Option<Player> = None;
        let mut enemies = Vec::new();
        let mut blocks = Vec::new();

        // Column-major scan: spawn order runs down each column in turn.
        for col in 0..grid.width() as i32 {
            for row in 0..grid.height() as i32 {
                let Some(tile) = grid.tile(col, row) else {
                    continue;
                };
                if tile.visual_id == 0 {
                    continue;
                }
                let Some(def) = catalog.get(tile.visual_id) else {
                    log::warn!("no sprite definition for id {}", tile.visual_id);
                    continue;
                };
                let cell = Point::new(col * dims.tile_w, row * dims.tile_h);
                match def.kind {
                    SpriteKind::Terrain => {}
                    SpriteKind::PlayerSpawn => {
                        if let Some(existing) = player.as_mut() {
                            existing.set_spawn(cell);
                        } else {
                            player = Some(Player::new(
                                cell, def.width, def.height, def.tuning, def.clips,
                            ));
                        }
                    }
                    SpriteKind::Enemy { direction, special } => {
                        // Enemies stand on the floor of their spawn cell.
                        let spawn = Point::new(cell.x, cell.y + (dims.tile_h - def.height));
                        enemies.push(Enemy::new(
                            spawn,
                            def.width,
                            def.height,
                            def.tuning.speed,
                            direction,
                            special,
                            def.clips,
                        ));
                    }
                    SpriteKind::Trigger { kind } => {
                        blocks.push(EventBlock::new(
                            cell,
                            def.width,
                            def.height,
                            kind,
                            tile.visual_id,
                            def.idle_clip(),
                        ));
                    }
                }
            }
        }

        let player = player.ok_or(LevelError::MissingPlayerSpawn)?;
        Ok(Self {
            grid,
            player,
            enemies,
            blocks,
            ribbons: Vec::new(),
            sink,
        })
    }

    pub fn add_ribbon(&mut self, spec: RibbonSpec) {
        self.ribbons.push(Ribbon::new(spec));
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn blocks(&self) -> &[EventBlock] {
        &self.blocks
    }

    pub fn ribbons(&self) -> &[Ribbon] {
        &self.ribbons
    }

    /// Run one logic tick in the fixed order: player, enemies, trigger
    /// blocks, ribbons. The order matters: the player's tick may kill an
    /// enemy or leave the level before anything later runs.
    pub fn tick(&mut self, input: InputIntent, dt_ms: u64) -> TickOutcome {
        let step = self.player.update(
            &self.grid,
            &mut self.enemies,
            &mut self.blocks,
            input,
            dt_ms,
            &self.sink,
        );
        if step.advanced_level {
            return TickOutcome::AdvanceLevel;
        }
        if step.respawned {
            for enemy in &mut self.enemies {
                enemy.reset();
            }
            for ribbon in &mut self.ribbons {
                ribbon.reset();
            }
        }

        let mut arm_specials = false;
        for enemy in &mut self.enemies {
            arm_specials |= enemy.update(&self.grid, dt_ms, &self.sink);
        }
        if arm_specials {
            for block in &mut self.blocks {
                block.arm_special();
            }
        }

        for block in &mut self.blocks {
            block.update(dt_ms);
        }

        for ribbon in &mut self.ribbons {
            ribbon.set_scroll(if step.respawned {
                ScrollDirection::Still
            } else {
                step.scroll
            });
            ribbon.update();
        }

        TickOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventQueue;
    use crate::state::EntityState;

    fn catalog() -> SpriteCatalog {
        let clips = GraphicsSet::uniform(AnimationClip::still());
        SpriteCatalog::new()
            .with(1, SpriteDef::player(20, 20, EntityTuning::new(5, 14), clips))
            .with(2, SpriteDef::terrain())
            .with(
                32,
                SpriteDef::enemy(20, 16, 1, Some(Facing::Left), false, clips),
            )
            .with(
                33,
                SpriteDef::trigger(BlockKind::LevelExit, 30, 30, AnimationClip::still()),
            )
    }

    fn floor_rows() -> Vec<Vec<i32>> {
        let mut rows = vec![vec![0i32; 10]; 10];
        for code in rows[9].iter_mut() {
            *code = 102;
        }
        rows
    }

    #[test]
    fn build_requires_a_player_spawn() {
        let data = LevelData::new(TileDims::square(30), floor_rows());
        let queue = EventQueue::new();
        assert_eq!(
            Level::build(&data, &catalog(), queue.sink()).unwrap_err(),
            LevelError::MissingPlayerSpawn
        );
    }

    #[test]
    fn build_spawns_entities_from_the_catalog() {
        let mut rows = floor_rows();
        rows[8][1] = 1;
        rows[8][4] = 32;
        rows[8][7] = 33;
        let data = LevelData::new(TileDims::square(30), rows);
        let queue = EventQueue::new();
        let level = Level::build(&data, &catalog(), queue.sink()).unwrap();

        assert_eq!(level.player().bounds().position(), Point::new(30, 240));
        assert_eq!(level.enemies().len(), 1);
        // Bottom-aligned within its cell: 16px tall in a 30px tile.
        assert_eq!(level.enemies()[0].bounds().position(), Point::new(120, 254));
        assert_eq!(level.blocks().len(), 1);
        assert_eq!(level.blocks()[0].kind(), BlockKind::LevelExit);
    }

    #[test]
    fn unknown_ids_are_skipped() {
        let mut rows = floor_rows();
        rows[8][1] = 1;
        rows[8][5] = 77;
        let data = LevelData::new(TileDims::square(30), rows);
        let queue = EventQueue::new();
        let level = Level::build(&data, &catalog(), queue.sink()).unwrap();
        assert!(level.enemies().is_empty());
        assert!(level.blocks().is_empty());
    }

    #[test]
    fn later_spawn_cells_move_the_player_spawn() {
        let mut rows = floor_rows();
        rows[8][1] = 1;
        rows[3][6] = 1;
        let data = LevelData::new(TileDims::square(30), rows);
        let queue = EventQueue::new();
        let level = Level::build(&data, &catalog(), queue.sink()).unwrap();
        // Column-major scan: (col 6, row 3) is visited after (col 1, row 8).
        assert_eq!(level.player().bounds().position(), Point::new(180, 90));
    }

    #[test]
    fn idle_tick_keeps_the_player_grounded() {
        let mut rows = floor_rows();
        rows[8][1] = 1;
        let data = LevelData::new(TileDims::square(30), rows);
        let mut queue = EventQueue::new();
        let mut level = Level::build(&data, &catalog(), queue.sink()).unwrap();

        for _ in 0..5 {
            assert_eq!(level.tick(InputIntent::idle(), 16), TickOutcome::Continue);
        }
        assert_eq!(level.player().state(), EntityState::Normal);
        assert_eq!(level.player().bounds().bottom(), 9 * 30);
        assert!(queue.drain_events().is_empty());
    }

    #[test]
    fn level_data_round_trips_through_json() {
        let data = LevelData::new(TileDims::square(30), vec![vec![0, 102], vec![1, 33]]);
        let json = data.to_json().unwrap();
        let back = LevelData::from_json(&json).unwrap();
        assert_eq!(back.dims, data.dims);
        assert_eq!(back.rows, data.rows);
    }
}
