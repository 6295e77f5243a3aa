//! Entity logic states and the derived graphics state.
//!
//! The logic state is authoritative and owned by movement (only
//! [`crate::kinematics::move_vertical`] and the entity behaviors write
//! it). The graphics state is a pure projection of logic state, facing,
//! and horizontal intent; it exists so that rendering can pick an
//! animation without re-deriving game rules.

use serde::{Deserialize, Serialize};

use crate::animation::{AnimationClock, GraphicsSet};
use crate::math::{Point, Rect};

/// Authoritative simulation state of a kinematic entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityState {
    #[default]
    Normal,
    Falling,
    Jumping,
    Dead,
}

/// Horizontal orientation, retained from the last movement intent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Animation selector derived from `(state, facing, is_moving)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphicsState {
    IdleLeft,
    IdleRight,
    MoveLeft,
    MoveRight,
    MidairLeft,
    MidairRight,
    DyingLeft,
    DyingRight,
}

impl GraphicsState {
    pub const COUNT: usize = 8;

    pub fn index(self) -> usize {
        self as usize
    }

    /// The one derivation rule: idle/move on the ground, midair while
    /// jumping or falling, dying while dead, each crossed with facing.
    pub fn derive(state: EntityState, facing: Facing, is_moving: bool) -> Self {
        let left = facing == Facing::Left;
        match state {
            EntityState::Normal if !is_moving => {
                if left {
                    GraphicsState::IdleLeft
                } else {
                    GraphicsState::IdleRight
                }
            }
            EntityState::Normal => {
                if left {
                    GraphicsState::MoveLeft
                } else {
                    GraphicsState::MoveRight
                }
            }
            EntityState::Falling | EntityState::Jumping => {
                if left {
                    GraphicsState::MidairLeft
                } else {
                    GraphicsState::MidairRight
                }
            }
            EntityState::Dead => {
                if left {
                    GraphicsState::DyingLeft
                } else {
                    GraphicsState::DyingRight
                }
            }
        }
    }
}

/// The per-entity bundle every concrete entity composes: bounds, spawn
/// point, logic state, facing, clip table, and the animation clock.
///
/// Composition replaces the deep `Entity` inheritance of classic
/// platformer codebases; `Player` and `Enemy` embed a core and call the
/// shared kinematics functions on it.
#[derive(Clone, Debug)]
pub struct EntityCore {
    pub bounds: Rect,
    pub spawn: Point,
    pub speed: i32,
    pub state: EntityState,
    pub facing: Facing,
    pub graphics: GraphicsState,
    pub clips: GraphicsSet,
    pub clock: AnimationClock,
    /// Set while the dying clip must reach its terminal frame before the
    /// state machine may leave `Dead`.
    pub waiting_for_animation: bool,
}

impl EntityCore {
    pub fn new(spawn: Point, width: i32, height: i32, speed: i32, clips: GraphicsSet) -> Self {
        let facing = Facing::default();
        Self {
            bounds: Rect::new(spawn.x, spawn.y, width, height),
            spawn,
            speed,
            state: EntityState::Normal,
            facing,
            graphics: GraphicsState::derive(EntityState::Normal, facing, false),
            clips,
            clock: AnimationClock::new(),
            waiting_for_animation: false,
        }
    }

    /// Switch to a new graphics state, restarting the clock only on an
    /// actual change so a running animation is never interrupted by
    /// re-selection of itself.
    pub fn set_graphics(&mut self, graphics: GraphicsState) -> bool {
        if self.graphics != graphics {
            self.graphics = graphics;
            self.clock.reset();
            true
        } else {
            false
        }
    }

    /// Re-derive and apply the graphics state for the current tick.
    pub fn apply_graphics(&mut self, is_moving: bool) -> bool {
        self.set_graphics(GraphicsState::derive(self.state, self.facing, is_moving))
    }

    /// Advance the active clip. Returns `true` once when a non-looping
    /// clip completes; clears `waiting_for_animation` on that edge.
    pub fn advance_animation(&mut self, dt_ms: u64) -> bool {
        let clip = *self.clips.clip(self.graphics);
        let completed = self.clock.advance(&clip, dt_ms);
        if completed {
            self.waiting_for_animation = false;
        }
        completed
    }

    /// Move the entity's spawn point and snap its bounds there.
    pub fn set_spawn(&mut self, spawn: Point) {
        self.spawn = spawn;
        self.bounds.set_position(spawn);
    }

    /// Snap back to the spawn point in `Normal` state.
    pub fn respawn(&mut self) {
        self.state = EntityState::Normal;
        self.bounds.set_position(self.spawn);
        self.waiting_for_animation = false;
    }
}
