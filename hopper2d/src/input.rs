//! Per-tick input intent.
//!
//! The runtime never reads a keyboard; whatever window layer hosts the
//! simulation translates device state into one `InputIntent` per logic
//! tick and hands it to [`crate::sim::Simulation::advance`].

use serde::{Deserialize, Serialize};

/// Player movement intent for a single logic tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputIntent {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl InputIntent {
    /// No keys held.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn left() -> Self {
        Self {
            left: true,
            ..Self::default()
        }
    }

    pub fn right() -> Self {
        Self {
            right: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_jump(mut self) -> Self {
        self.jump = true;
        self
    }
}
