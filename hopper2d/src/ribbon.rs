//! Background ribbon scroll bookkeeping.
//!
//! A ribbon is a horizontally wrapping backdrop whose scroll direction is
//! driven by the player's uncollided horizontal movement. Only the head
//! offset lives here; slicing the image around the wrap point is the
//! renderer's problem.

use serde::{Deserialize, Serialize};

/// Scroll direction for the current tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollDirection {
    #[default]
    Still,
    Left,
    Right,
}

/// Width and per-tick step of one ribbon layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RibbonSpec {
    pub width: i32,
    pub step: i32,
}

/// One scrolling backdrop layer.
#[derive(Clone, Copy, Debug)]
pub struct Ribbon {
    width: i32,
    step: i32,
    offset: i32,
    scroll: ScrollDirection,
}

impl Ribbon {
    pub fn new(spec: RibbonSpec) -> Self {
        Self {
            width: spec.width.max(1),
            step: spec.step,
            offset: 0,
            scroll: ScrollDirection::Still,
        }
    }

    pub fn set_scroll(&mut self, scroll: ScrollDirection) {
        self.scroll = scroll;
    }

    /// Head offset within `(-width, width)`; the sign tells the renderer
    /// which side of the seam leads.
    pub fn offset(&self) -> i32 {
        self.offset
    }

    /// Advance the head by one step in the current scroll direction,
    /// wrapping once the whole image has cycled through.
    pub fn update(&mut self) {
        match self.scroll {
            ScrollDirection::Left => self.offset = (self.offset - self.step) % self.width,
            ScrollDirection::Right => self.offset = (self.offset + self.step) % self.width,
            ScrollDirection::Still => {}
        }
    }

    /// Re-center the head, typically on player respawn.
    pub fn reset(&mut self) {
        self.offset = 0;
        self.scroll = ScrollDirection::Still;
    }
}
