//! Animation timing decoupled from image data.
//!
//! The runtime never touches pixels; a clip is just a frame count, a
//! per-frame duration, and a looping flag. Rendering resolves the frame
//! index to an image on its side of the boundary.

use serde::{Deserialize, Serialize};

use crate::state::GraphicsState;

/// Timing description of one animation sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationClip {
    pub frame_count: u32,
    pub frame_duration_ms: u64,
    pub looping: bool,
}

impl AnimationClip {
    /// Degenerate inputs are clamped: at least one frame, at least 1 ms
    /// per frame.
    pub fn new(frame_count: u32, frame_duration_ms: u64, looping: bool) -> Self {
        Self {
            frame_count: frame_count.max(1),
            frame_duration_ms: frame_duration_ms.max(1),
            looping,
        }
    }

    /// Build a clip from a total duration split evenly across frames.
    pub fn from_total(frame_count: u32, total_duration_ms: u64, looping: bool) -> Self {
        let frame_count = frame_count.max(1);
        Self::new(frame_count, total_duration_ms / frame_count as u64, looping)
    }

    /// A single held frame; completes on its first advance.
    pub fn still() -> Self {
        Self::new(1, 1000, false)
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.frame_count as u64 * self.frame_duration_ms
    }
}

impl Default for AnimationClip {
    fn default() -> Self {
        Self::still()
    }
}

/// Per-entity elapsed-time counter driving a lazy frame index.
///
/// The clock holds no reference to its clip; callers pass the active clip
/// on every query so that one clock can be restarted across the clips of
/// a graphics set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnimationClock {
    elapsed_ms: u64,
    completed: bool,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `dt_ms`. Returns `true` exactly once, on the tick a
    /// non-looping clip first holds its terminal frame; a held terminal
    /// frame never re-fires. Looping clips wrap and never complete.
    pub fn advance(&mut self, clip: &AnimationClip, dt_ms: u64) -> bool {
        if clip.looping {
            self.elapsed_ms = (self.elapsed_ms + dt_ms) % clip.total_duration_ms();
            return false;
        }
        if self.frame_index(clip) < clip.frame_count - 1 {
            self.elapsed_ms += dt_ms;
            false
        } else if !self.completed {
            self.completed = true;
            true
        } else {
            false
        }
    }

    /// Current frame, clamped to the clip's final frame.
    pub fn frame_index(&self, clip: &AnimationClip) -> u32 {
        let frame = self.elapsed_ms / clip.frame_duration_ms;
        (frame as u32).min(clip.frame_count - 1)
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Restart from zero elapsed time.
    pub fn reset(&mut self) {
        self.elapsed_ms = 0;
        self.completed = false;
    }
}

/// Clip table for one sprite class, keyed by derived graphics state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphicsSet {
    clips: [AnimationClip; GraphicsState::COUNT],
}

impl GraphicsSet {
    /// Every graphics state shares the same clip.
    pub fn uniform(clip: AnimationClip) -> Self {
        Self {
            clips: [clip; GraphicsState::COUNT],
        }
    }

    #[must_use]
    pub fn with(mut self, state: GraphicsState, clip: AnimationClip) -> Self {
        self.clips[state.index()] = clip;
        self
    }

    /// Assign a clip to both facings of the dying state.
    #[must_use]
    pub fn with_dying(self, clip: AnimationClip) -> Self {
        self.with(GraphicsState::DyingLeft, clip)
            .with(GraphicsState::DyingRight, clip)
    }

    pub fn clip(&self, state: GraphicsState) -> &AnimationClip {
        &self.clips[state.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looping_clip_wraps_and_never_completes() {
        let clip = AnimationClip::new(4, 100, true);
        let mut clock = AnimationClock::new();
        for _ in 0..10 {
            assert!(!clock.advance(&clip, 100));
        }
        // 10 * 100ms into a 400ms loop: frame 2 of the third cycle.
        assert_eq!(clock.frame_index(&clip), 2);
    }

    #[test]
    fn completion_fires_exactly_once() {
        let clip = AnimationClip::new(3, 100, false);
        let mut clock = AnimationClock::new();
        let mut completions = 0;
        for _ in 0..10 {
            if clock.advance(&clip, 100) {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert!(clock.is_completed());
        assert_eq!(clock.frame_index(&clip), 2);
    }

    #[test]
    fn reset_rearms_completion() {
        let clip = AnimationClip::new(2, 50, false);
        let mut clock = AnimationClock::new();
        while !clock.advance(&clip, 50) {}
        clock.reset();
        assert!(!clock.is_completed());
        assert_eq!(clock.frame_index(&clip), 0);
        let mut fired = false;
        for _ in 0..5 {
            fired |= clock.advance(&clip, 50);
        }
        assert!(fired);
    }

    #[test]
    fn still_clip_completes_on_first_advance() {
        let clip = AnimationClip::still();
        let mut clock = AnimationClock::new();
        assert!(clock.advance(&clip, 16));
        assert!(!clock.advance(&clip, 16));
    }

    #[test]
    fn graphics_set_overrides_per_state() {
        let idle = AnimationClip::still();
        let dying = AnimationClip::new(4, 125, false);
        let set = GraphicsSet::uniform(idle).with_dying(dying);
        assert_eq!(*set.clip(GraphicsState::DyingLeft), dying);
        assert_eq!(*set.clip(GraphicsState::IdleRight), idle);
    }
}
