//! Fixed-timestep simulation driver.
//!
//! One logic tick moves every entity by its fixed per-tick speed; the
//! enclosing presentation loop may render at whatever rate it likes and
//! feeds wall-clock time in here. Accrued time is spent in whole ticks;
//! ticks are never merged, scaled, or skipped, because the collision
//! math depends on discrete per-tick displacements.

use serde::{Deserialize, Serialize};

use crate::events::{EventQueue, GameEvent};
use crate::input::InputIntent;
use crate::level::{Level, LevelData, LevelError, SpriteCatalog, TickOutcome};
use crate::ribbon::RibbonSpec;

/// Runtime configuration for the simulation driver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimConfig {
    /// Duration of one logic tick in milliseconds.
    pub tick_ms: u64,
    /// Backdrop ribbons recreated for every level.
    pub ribbons: Vec<RibbonSpec>,
}

impl SimConfig {
    #[must_use]
    pub fn with_tick_ms(mut self, tick_ms: u64) -> Self {
        self.tick_ms = tick_ms.max(1);
        self
    }

    #[must_use]
    pub fn with_ribbon(mut self, spec: RibbonSpec) -> Self {
        self.ribbons.push(spec);
        self
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_ms: 16,
            ribbons: Vec::new(),
        }
    }
}

/// External control state of the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    /// The last level was cleared; no further ticks run.
    Finished,
}

/// Owns the level sequence and drives it tick by tick.
#[derive(Debug)]
pub struct Simulation {
    levels: Vec<LevelData>,
    catalog: SpriteCatalog,
    config: SimConfig,
    queue: EventQueue,
    level: Level,
    current: usize,
    accumulator_ms: u64,
    run_state: RunState,
}

impl Simulation {
    /// Validate and stage every level up front, then start on the first.
    /// All loader mistakes surface here; once a simulation exists, the
    /// kinematics core only ever sees well-formed grids.
    pub fn new(
        levels: Vec<LevelData>,
        catalog: SpriteCatalog,
        config: SimConfig,
    ) -> Result<Self, LevelError> {
        let queue = EventQueue::new();
        if levels.is_empty() {
            return Err(LevelError::Empty);
        }
        for data in &levels {
            Level::build(data, &catalog, queue.sink())?;
        }

        let mut level = Level::build(&levels[0], &catalog, queue.sink())?;
        for spec in &config.ribbons {
            level.add_ribbon(*spec);
        }
        Ok(Self {
            levels,
            catalog,
            config,
            queue,
            level,
            current: 0,
            accumulator_ms: 0,
            run_state: RunState::Running,
        })
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Index of the level currently running.
    pub fn current_level(&self) -> usize {
        self.current
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Pause at the next tick boundary. Ticks are synchronous, so there
    /// is never an in-flight tick to wait out.
    pub fn pause(&mut self) {
        if self.run_state == RunState::Running {
            self.run_state = RunState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.run_state == RunState::Paused {
            self.run_state = RunState::Running;
        }
    }

    /// Run exactly one logic tick.
    pub fn tick(&mut self, input: InputIntent) {
        if self.run_state != RunState::Running {
            return;
        }
        if self.level.tick(input, self.config.tick_ms) == TickOutcome::AdvanceLevel {
            self.advance_level();
        }
    }

    /// Feed wall-clock time and run as many whole ticks as have accrued,
    /// banking the remainder.
    pub fn advance(&mut self, elapsed_ms: u64, input: InputIntent) {
        if self.run_state != RunState::Running {
            return;
        }
        self.accumulator_ms += elapsed_ms;
        while self.accumulator_ms >= self.config.tick_ms {
            self.accumulator_ms -= self.config.tick_ms;
            self.tick(input);
            if self.run_state != RunState::Running {
                break;
            }
        }
    }

    /// Drain notifications emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.queue.drain_events()
    }

    fn advance_level(&mut self) {
        self.current += 1;
        let Some(data) = self.levels.get(self.current) else {
            log::debug!("final level cleared after {} levels", self.levels.len());
            self.run_state = RunState::Finished;
            return;
        };
        // Pre-validated in `new`, so this build can only repeat success.
        match Level::build(data, &self.catalog, self.queue.sink()) {
            Ok(mut level) => {
                for spec in &self.config.ribbons {
                    level.add_ribbon(*spec);
                }
                log::debug!("advanced to level {}", self.current);
                self.level = level;
            }
            Err(err) => {
                log::warn!("level {} failed to rebuild: {err}", self.current);
                self.run_state = RunState::Finished;
            }
        }
    }
}
