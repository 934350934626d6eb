//! # tessel Game Loop
//!
//! Fixed-step driver around a [`World`] and its [`PhysicsSystem`]:
//! ```text
//! Frame:
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │ 1. ACCUMULATE   add the variable frame time                         │
//! │ 2. STEP (0..N)  while a full timestep is banked:                    │
//! │    ├─ initialise entities created since the last step               │
//! │    ├─ run the caller's per-step logic                               │
//! │    └─ physics fixed update                                          │
//! │ 3. CLAMP        drop the backlog if the step limit was hit          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use tessel_core::{EntityId, World};

use crate::config::{ConfigResult, EngineConfig, GameLoopConfig};
use crate::physics::{PhysicsSystem, StepStats};

/// Longest frame time accepted in one call (seconds).
pub const MAX_FRAME_TIME: f32 = 0.25;

/// What one [`GameLoop::advance`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    /// Frame number.
    pub frame: u64,
    /// Fixed steps run this frame.
    pub steps: u32,
    /// Banked time discarded because the step limit was hit.
    pub dropped_time: f32,
    /// Counters of the last step run, if any.
    pub last_step: Option<StepStats>,
}

/// The fixed-step simulation driver.
///
/// Owns the world and the physics system; entity destruction goes through
/// [`GameLoop::destroy`] so contacts are torn down with the entity.
pub struct GameLoop {
    world: World,
    physics: PhysicsSystem,
    config: GameLoopConfig,
    /// Unsimulated time carried between frames.
    accumulator: f32,
    frame_count: u64,
    step_count: u64,
}

impl GameLoop {
    /// Creates a loop with an empty world sized from the configuration.
    ///
    /// # Panics
    ///
    /// Panics if [`EngineConfig::validate`] rejects the configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        if let Err(err) = config.validate() {
            panic!("{err}");
        }
        Self::build(config)
    }

    /// Fallible form of [`GameLoop::new`].
    ///
    /// # Errors
    ///
    /// [`crate::ConfigError::Invalid`] for out-of-range values.
    pub fn try_new(config: EngineConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let capacity = config.world.max_entities;
        Self {
            world: World::new(capacity),
            physics: PhysicsSystem::new(config.physics, capacity),
            config: config.game_loop,
            accumulator: 0.0,
            frame_count: 0,
            step_count: 0,
        }
    }

    /// The simulated world.
    #[inline]
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// The simulated world, mutably.
    #[inline]
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The physics system.
    #[inline]
    #[must_use]
    pub const fn physics(&self) -> &PhysicsSystem {
        &self.physics
    }

    /// The physics system, mutably (event draining, callbacks).
    #[inline]
    pub fn physics_mut(&mut self) -> &mut PhysicsSystem {
        &mut self.physics
    }

    /// Frames advanced so far.
    #[inline]
    #[must_use]
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Fixed steps run so far.
    #[inline]
    #[must_use]
    pub const fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Fraction of a step banked, for render interpolation.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        (self.accumulator / self.config.fixed_timestep).clamp(0.0, 1.0)
    }

    /// Destroys an entity, tearing down its contacts first.
    ///
    /// # Returns
    ///
    /// `true` if the handle was valid.
    pub fn destroy(&mut self, entity: EntityId) -> bool {
        self.world.destroy_with(entity, &mut self.physics)
    }

    /// Runs one fixed step now, ignoring the accumulator.
    pub fn step(&mut self) -> StepStats {
        self.step_with(&mut |_: &mut World, _: &mut PhysicsSystem, _: f32| {})
    }

    /// Advances by a variable frame time.
    pub fn advance(&mut self, frame_time: f32) -> FrameStats {
        self.advance_with(frame_time, |_, _, _| {})
    }

    /// Advances by a variable frame time, running `logic` before every
    /// physics step with the world, the physics system and the timestep.
    pub fn advance_with<F>(&mut self, frame_time: f32, mut logic: F) -> FrameStats
    where
        F: FnMut(&mut World, &mut PhysicsSystem, f32),
    {
        let frame_time = if frame_time.is_finite() {
            frame_time.clamp(0.0, MAX_FRAME_TIME)
        } else {
            0.0
        };
        self.accumulator += frame_time;

        let step = self.config.fixed_timestep;
        let mut stats = FrameStats {
            frame: self.frame_count,
            ..FrameStats::default()
        };

        while self.accumulator >= step && stats.steps < self.config.max_steps_per_frame {
            stats.last_step = Some(self.step_with(&mut logic));
            self.accumulator -= step;
            stats.steps += 1;
        }

        if self.accumulator >= step {
            stats.dropped_time = self.accumulator - self.accumulator % step;
            self.accumulator %= step;
            if self.config.warn_on_slow_frames {
                tracing::warn!(
                    frame = self.frame_count,
                    steps = stats.steps,
                    dropped_ms = stats.dropped_time * 1000.0,
                    "frame hit the step limit, backlog dropped"
                );
            }
        }

        self.frame_count += 1;
        stats
    }

    fn step_with<F>(&mut self, logic: &mut F) -> StepStats
    where
        F: FnMut(&mut World, &mut PhysicsSystem, f32),
    {
        let step = self.config.fixed_timestep;
        let fresh = self.world.drain_uninitialized();
        if !fresh.is_empty() {
            self.physics.initialize_entities(&mut self.world, &fresh);
        }

        logic(&mut self.world, &mut self.physics, step);
        let stats = self.physics.fixed_update(&mut self.world, step);
        self.step_count += 1;
        stats
    }
}
