//! Hopper2D - a fixed-timestep 2D tile-platformer runtime.
//!
//! The crate simulates axis-aligned bounding boxes moving through a grid
//! of fixed-size tiles: per-axis collision resolution, a small entity
//! state machine, animation timing, and per-tick event notifications.
//! Rendering, asset loading, and audio are deliberately outside; the
//! hosting application drives [`sim::Simulation`] with wall-clock time
//! and input intents, drains events, and draws from the level's queries.

pub mod animation;
pub mod entities;
pub mod events;
pub mod grid;
pub mod input;
pub mod kinematics;
pub mod level;
pub mod math;
pub mod ribbon;
pub mod sim;
pub mod state;

pub use crate::animation::{AnimationClip, AnimationClock, GraphicsSet};
pub use crate::entities::{BlockKind, EntityTuning, Enemy, EventBlock, Player};
pub use crate::events::{EventQueue, EventSink, GameEvent};
pub use crate::grid::{Tile, TileDims, TileGrid};
pub use crate::input::InputIntent;
pub use crate::kinematics::{move_horizontal, move_vertical, HorizontalMove, FALL_GRACE_ROWS};
pub use crate::level::{
    Level, LevelData, LevelError, SpriteCatalog, SpriteDef, SpriteKind, TickOutcome,
};
pub use crate::math::{Point, Rect};
pub use crate::ribbon::{Ribbon, RibbonSpec, ScrollDirection};
pub use crate::sim::{RunState, SimConfig, Simulation};
pub use crate::state::{EntityCore, EntityState, Facing, GraphicsState};
