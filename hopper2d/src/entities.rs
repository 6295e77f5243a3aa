//! Concrete entity policies: the player, patrolling enemies, and static
//! trigger blocks.
//!
//! Player and Enemy both compose an [`EntityCore`] and drive it through
//! the shared sweeps in [`crate::kinematics`]; neither owns the other,
//! and the level hands each update the peer slices it may touch.

use serde::{Deserialize, Serialize};

use crate::animation::{AnimationClip, AnimationClock, GraphicsSet};
use crate::events::{EventSink, GameEvent};
use crate::grid::TileGrid;
use crate::input::InputIntent;
use crate::kinematics::{move_horizontal, move_vertical};
use crate::math::{Point, Rect};
use crate::ribbon::ScrollDirection;
use crate::state::{EntityCore, EntityState, Facing};

/// Pixels trimmed from an enemy's box before the combat overlap test.
pub const COMBAT_INSET: i32 = 6;
/// Pixels trimmed from a trigger block's box before the overlap test.
/// Wider than combat so brushing a trigger across a tile seam does not
/// fire it.
pub const TRIGGER_INSET: i32 = 10;

/// Movement tuning for one sprite class. Distinct classes carry their
/// own speeds and jump caps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityTuning {
    /// Pixels moved per logic tick, both axes.
    pub speed: i32,
    /// Ticks an entity may keep ascending before the jump is exhausted.
    pub max_jump_ticks: u32,
}

impl EntityTuning {
    pub fn new(speed: i32, max_jump_ticks: u32) -> Self {
        Self {
            speed,
            max_jump_ticks,
        }
    }
}

impl Default for EntityTuning {
    fn default() -> Self {
        Self {
            speed: 2,
            max_jump_ticks: 14,
        }
    }
}

/// Behavior of a non-kinematic trigger block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Inactive,
    LevelExit,
    Danger,
    Collectible,
    SpecialInactive,
    SpecialCollectible,
}

/// Static trigger tile: a bounding box, a kind, and a looping clip for
/// its idle animation.
#[derive(Clone, Debug)]
pub struct EventBlock {
    bounds: Rect,
    kind: BlockKind,
    visual_id: u8,
    clip: AnimationClip,
    clock: AnimationClock,
}

impl EventBlock {
    pub fn new(position: Point, width: i32, height: i32, kind: BlockKind, visual_id: u8, clip: AnimationClip) -> Self {
        Self {
            bounds: Rect::new(position.x, position.y, width, height),
            kind,
            visual_id,
            clip,
            clock: AnimationClock::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn visual_id(&self) -> u8 {
        self.visual_id
    }

    pub fn frame_index(&self) -> u32 {
        self.clock.frame_index(&self.clip)
    }

    /// Inactive blocks keep their slot but are never drawn.
    pub fn is_visible(&self) -> bool {
        !matches!(self.kind, BlockKind::Inactive | BlockKind::SpecialInactive)
    }

    pub fn update(&mut self, dt_ms: u64) {
        self.clock.advance(&self.clip, dt_ms);
    }

    /// Consume a collectible. Collectibles deactivate on their first
    /// qualifying overlap and never re-activate; other kinds are
    /// unaffected.
    pub fn activate(&mut self) {
        if matches!(
            self.kind,
            BlockKind::Collectible | BlockKind::SpecialCollectible
        ) {
            self.kind = BlockKind::Inactive;
        }
    }

    /// Turn a dormant special block into a live collectible. Fired when
    /// a special patrol dies.
    pub fn arm_special(&mut self) {
        if self.kind == BlockKind::SpecialInactive {
            self.kind = BlockKind::SpecialCollectible;
        }
    }
}

/// A patrolling enemy.
///
/// Walks in its patrol direction until a wall or map edge turns it
/// around, falls off ledges, and after death keeps animating until the
/// dying clip completes; only then does `active` drop and the slot goes
/// inert until [`Enemy::reset`].
#[derive(Clone, Debug)]
pub struct Enemy {
    core: EntityCore,
    direction: Option<Facing>,
    home_direction: Option<Facing>,
    special: bool,
    active: bool,
}

impl Enemy {
    pub fn new(
        spawn: Point,
        width: i32,
        height: i32,
        speed: i32,
        direction: Option<Facing>,
        special: bool,
        clips: GraphicsSet,
    ) -> Self {
        let mut core = EntityCore::new(spawn, width, height, speed, clips);
        if let Some(dir) = direction {
            core.facing = dir;
        }
        core.apply_graphics(direction.is_some() && speed != 0);
        Self {
            core,
            direction,
            home_direction: direction,
            special,
            active: true,
        }
    }

    pub fn core(&self) -> &EntityCore {
        &self.core
    }

    pub fn bounds(&self) -> Rect {
        self.core.bounds
    }

    pub fn state(&self) -> EntityState {
        self.core.state
    }

    /// False once the dying clip has completed; inactive enemies are
    /// skipped by updates and draw queries.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_special(&self) -> bool {
        self.special
    }

    /// Kill this enemy; it stays active while the dying clip plays.
    pub fn kill(&mut self) {
        self.core.state = EntityState::Dead;
        self.on_killed();
    }

    fn on_killed(&mut self) {
        self.core.waiting_for_animation = true;
        self.core.apply_graphics(false);
    }

    /// Re-arm at the spawn point, typically when the player respawns.
    pub fn reset(&mut self) {
        self.direction = self.home_direction;
        if let Some(dir) = self.home_direction {
            self.core.facing = dir;
        }
        self.active = true;
        self.core.respawn();
        self.core.clock.reset();
        self.core
            .apply_graphics(self.direction.is_some() && self.core.speed != 0);
    }

    /// Advance one tick. Returns `true` on the tick a special patrol
    /// finishes dying, so the level can arm its special collectibles.
    pub fn update(&mut self, grid: &TileGrid, dt_ms: u64, sink: &EventSink) -> bool {
        if !self.active {
            return false;
        }

        let completed = self.core.advance_animation(dt_ms);
        if self.core.state == EntityState::Dead {
            if completed {
                self.active = false;
                if self.special {
                    sink.emit(GameEvent::SpecialEnemyDefeated);
                    return true;
                }
            }
            return false;
        }

        let mut moving = false;
        if let Some(dir) = self.direction {
            moving = self.core.speed != 0;
            let dx = match dir {
                Facing::Left => -self.core.speed,
                Facing::Right => self.core.speed,
            };
            if move_horizontal(grid, &mut self.core.bounds, dx).collided {
                let flipped = dir.flipped();
                self.direction = Some(flipped);
                self.core.facing = flipped;
            } else {
                self.core.facing = dir;
            }
        }

        if matches!(
            self.core.state,
            EntityState::Normal | EntityState::Falling
        ) {
            let before = self.core.state;
            move_vertical(
                grid,
                &mut self.core.bounds,
                self.core.speed,
                &mut self.core.state,
            );
            if self.core.state == EntityState::Dead && before != EntityState::Dead {
                self.on_killed();
                return false;
            }
        }

        self.core.apply_graphics(moving);
        false
    }
}

/// Outcome of one player tick, consumed by the level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayerStep {
    /// The player reached a level exit; the rest of the tick's movement
    /// was skipped and the orchestrator should swap levels.
    pub advanced_level: bool,
    /// The death sequence finished this tick; peers should reset.
    pub respawned: bool,
    /// Backdrop scroll implied by this tick's uncollided movement.
    pub scroll: ScrollDirection,
}

/// The player-controlled entity.
#[derive(Clone, Debug)]
pub struct Player {
    core: EntityCore,
    tuning: EntityTuning,
    jump_ticks: u32,
    hop_on_death: bool,
}

impl Player {
    pub fn new(spawn: Point, width: i32, height: i32, tuning: EntityTuning, clips: GraphicsSet) -> Self {
        Self {
            core: EntityCore::new(spawn, width, height, tuning.speed, clips),
            tuning,
            jump_ticks: 0,
            hop_on_death: false,
        }
    }

    pub fn core(&self) -> &EntityCore {
        &self.core
    }

    pub fn bounds(&self) -> Rect {
        self.core.bounds
    }

    pub fn state(&self) -> EntityState {
        self.core.state
    }

    pub fn tuning(&self) -> EntityTuning {
        self.tuning
    }

    pub fn jump_ticks(&self) -> u32 {
        self.jump_ticks
    }

    /// Move the respawn point, snapping the player onto it.
    pub fn set_spawn(&mut self, spawn: Point) {
        self.core.set_spawn(spawn);
    }

    /// Run one logic tick: peer collisions, horizontal sweep, vertical
    /// state machine, then graphics derivation.
    pub fn update(
        &mut self,
        grid: &TileGrid,
        enemies: &mut [Enemy],
        blocks: &mut [EventBlock],
        input: InputIntent,
        dt_ms: u64,
        sink: &EventSink,
    ) -> PlayerStep {
        let mut step = PlayerStep::default();
        self.core.advance_animation(dt_ms);

        let mut moving = false;
        if self.core.state != EntityState::Dead {
            self.check_enemy_collisions(enemies, sink);
        }
        if self.core.state != EntityState::Dead {
            if self.check_event_blocks(blocks, sink) {
                // Level transition: the rest of this tick's movement is
                // skipped so the new grid is never sampled mid-tick.
                step.advanced_level = true;
                return step;
            }
        }
        if self.core.state != EntityState::Dead {
            if input.left {
                self.core.facing = Facing::Left;
                moving = true;
                if !move_horizontal(grid, &mut self.core.bounds, -self.core.speed).collided {
                    step.scroll = ScrollDirection::Right;
                }
            } else if input.right {
                self.core.facing = Facing::Right;
                moving = true;
                if !move_horizontal(grid, &mut self.core.bounds, self.core.speed).collided {
                    step.scroll = ScrollDirection::Left;
                }
            }
        }

        match self.core.state {
            EntityState::Normal => {
                // Probe for ground; standing on thin air starts a fall.
                self.vertical(grid, self.core.speed);
                if self.core.state == EntityState::Normal && input.jump {
                    self.ascend(grid);
                }
            }
            EntityState::Jumping => {
                if self.jump_ticks < self.tuning.max_jump_ticks {
                    self.ascend(grid);
                } else {
                    self.core.state = EntityState::Falling;
                }
            }
            EntityState::Falling => {
                self.jump_ticks = 0;
                self.vertical(grid, self.core.speed);
            }
            EntityState::Dead => {}
        }

        if self.core.state == EntityState::Dead {
            step.scroll = ScrollDirection::Still;
            self.death_tick(grid, sink, &mut step);
        } else {
            self.core.apply_graphics(moving);
        }
        step
    }

    /// Vertical sweep with death detection for falling out of the map.
    fn vertical(&mut self, grid: &TileGrid, dy: i32) {
        let before = self.core.state;
        move_vertical(grid, &mut self.core.bounds, dy, &mut self.core.state);
        if self.core.state == EntityState::Dead && before != EntityState::Dead {
            // Already below the map; no death hop.
            self.on_killed(false);
        }
    }

    /// One tick of upward movement, bounded by the jump cap.
    fn ascend(&mut self, grid: &TileGrid) {
        self.vertical(grid, -self.core.speed);
        self.jump_ticks += 1;
        if self.core.state == EntityState::Jumping && self.jump_ticks >= self.tuning.max_jump_ticks {
            self.core.state = EntityState::Falling;
        }
    }

    fn on_killed(&mut self, hop: bool) {
        self.core.state = EntityState::Dead;
        self.core.waiting_for_animation = true;
        self.hop_on_death = hop;
        self.jump_ticks = 0;
        self.core.apply_graphics(false);
    }

    fn check_enemy_collisions(&mut self, enemies: &mut [Enemy], sink: &EventSink) {
        for enemy in enemies.iter_mut() {
            if !enemy.is_active() || enemy.state() == EntityState::Dead {
                continue;
            }
            if !self
                .core
                .bounds
                .intersects(&enemy.bounds().inset(COMBAT_INSET))
            {
                continue;
            }
            self.jump_ticks = 0;
            if self.core.bounds.center_y() <= enemy.bounds().top() {
                // Stomp: the enemy dies and the player bounces.
                enemy.kill();
                self.core.state = EntityState::Jumping;
                sink.emit(GameEvent::EnemyDefeated);
            } else {
                self.on_killed(true);
                break;
            }
        }
    }

    /// Returns `true` when a level exit fired.
    fn check_event_blocks(&mut self, blocks: &mut [EventBlock], sink: &EventSink) -> bool {
        for block in blocks.iter_mut() {
            if !self
                .core
                .bounds
                .intersects(&block.bounds().inset(TRIGGER_INSET))
            {
                continue;
            }
            match block.kind() {
                BlockKind::LevelExit => {
                    self.core.state = EntityState::Normal;
                    sink.emit(GameEvent::LevelAdvance);
                    return true;
                }
                BlockKind::Danger => self.on_killed(true),
                BlockKind::Collectible => {
                    block.activate();
                    sink.emit(GameEvent::ItemCollected { special: false });
                }
                BlockKind::SpecialCollectible => {
                    block.activate();
                    sink.emit(GameEvent::ItemCollected { special: true });
                }
                BlockKind::Inactive | BlockKind::SpecialInactive => {}
            }
        }
        false
    }

    /// Death sequence: a half-height hop, a fall until fully below the
    /// map, and the dying clip reaching its terminal frame; then respawn.
    fn death_tick(&mut self, grid: &TileGrid, sink: &EventSink, step: &mut PlayerStep) {
        self.core.apply_graphics(false);
        if self.hop_on_death {
            if self.jump_ticks < self.tuning.max_jump_ticks / 2 {
                self.core.bounds.y -= self.core.speed;
                self.jump_ticks += 1;
            } else {
                self.core.bounds.y += self.core.speed;
                if self.core.bounds.y > grid.pixel_height() {
                    self.hop_on_death = false;
                }
            }
        }
        if !self.hop_on_death && !self.core.waiting_for_animation {
            self.core.respawn();
            self.jump_ticks = 0;
            self.core.apply_graphics(false);
            sink.emit(GameEvent::PlayerDied);
            step.respawned = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventQueue;
    use crate::grid::TileDims;

    fn floor_grid() -> TileGrid {
        let mut rows = vec![vec![0i32; 10]; 10];
        for code in rows[9].iter_mut() {
            *code = 102;
        }
        TileGrid::from_rows(&rows, TileDims::square(30)).unwrap()
    }

    fn patrol_clips() -> GraphicsSet {
        GraphicsSet::uniform(AnimationClip::new(2, 100, true))
            .with_dying(AnimationClip::new(2, 50, false))
    }

    #[test]
    fn collectible_deactivates_exactly_once() {
        let mut block = EventBlock::new(
            Point::new(0, 0),
            30,
            30,
            BlockKind::Collectible,
            35,
            AnimationClip::still(),
        );
        assert!(block.is_visible());
        block.activate();
        assert_eq!(block.kind(), BlockKind::Inactive);
        assert!(!block.is_visible());
        block.activate();
        assert_eq!(block.kind(), BlockKind::Inactive);
    }

    #[test]
    fn arming_only_touches_dormant_special_blocks() {
        let clip = AnimationClip::still();
        let mut dormant =
            EventBlock::new(Point::new(0, 0), 30, 30, BlockKind::SpecialInactive, 40, clip);
        let mut exit = EventBlock::new(Point::new(0, 0), 30, 30, BlockKind::LevelExit, 33, clip);
        dormant.arm_special();
        exit.arm_special();
        assert_eq!(dormant.kind(), BlockKind::SpecialCollectible);
        assert_eq!(exit.kind(), BlockKind::LevelExit);
    }

    #[test]
    fn enemy_reverses_at_the_map_edge() {
        let grid = floor_grid();
        let queue = EventQueue::new();
        let sink = queue.sink();
        let mut enemy = Enemy::new(
            Point::new(10, 250),
            20,
            20,
            2,
            Some(Facing::Left),
            false,
            patrol_clips(),
        );

        for _ in 0..10 {
            enemy.update(&grid, 16, &sink);
        }
        // Five ticks reach the solid left edge, then it walks back out.
        assert_eq!(enemy.core().facing, Facing::Right);
        assert!(enemy.bounds().x > 0);
    }

    #[test]
    fn stationary_enemy_stays_put() {
        let grid = floor_grid();
        let queue = EventQueue::new();
        let sink = queue.sink();
        let mut enemy = Enemy::new(Point::new(60, 250), 20, 20, 0, None, true, patrol_clips());
        for _ in 0..5 {
            enemy.update(&grid, 16, &sink);
        }
        assert_eq!(enemy.bounds().position(), Point::new(60, 250));
        assert_eq!(enemy.state(), EntityState::Normal);
    }

    #[test]
    fn dead_enemy_deactivates_after_dying_clip() {
        let grid = floor_grid();
        let queue = EventQueue::new();
        let sink = queue.sink();
        let mut enemy = Enemy::new(
            Point::new(60, 250),
            20,
            20,
            2,
            Some(Facing::Right),
            false,
            patrol_clips(),
        );

        enemy.kill();
        assert!(enemy.is_active());
        let mut ticks = 0;
        while enemy.is_active() {
            enemy.update(&grid, 50, &sink);
            ticks += 1;
            assert!(ticks < 10, "dying clip never completed");
        }
        // Inert once deactivated.
        let parked = enemy.bounds();
        enemy.update(&grid, 50, &sink);
        assert_eq!(enemy.bounds(), parked);
    }

    #[test]
    fn reset_rearms_a_defeated_enemy() {
        let grid = floor_grid();
        let queue = EventQueue::new();
        let sink = queue.sink();
        let mut enemy = Enemy::new(
            Point::new(90, 250),
            20,
            20,
            2,
            Some(Facing::Left),
            false,
            patrol_clips(),
        );
        for _ in 0..8 {
            enemy.update(&grid, 16, &sink);
        }
        enemy.kill();
        for _ in 0..5 {
            enemy.update(&grid, 50, &sink);
        }
        assert!(!enemy.is_active());

        enemy.reset();
        assert!(enemy.is_active());
        assert_eq!(enemy.bounds().position(), Point::new(90, 250));
        assert_eq!(enemy.state(), EntityState::Normal);
        assert_eq!(enemy.core().facing, Facing::Left);
    }
}
