//! Streak spawning
//!
//! The emitter accumulates scene time and, once the time since the last spawn
//! passes a threshold redrawn after every attempt, builds one streak and asks
//! the pool for a slot. Curve jitter comes from an ordinary (unseeded) RNG:
//! streaks are decorative and are deliberately not reproducible, unlike the
//! star field.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use rand::rngs::ThreadRng;
use serde::{Deserialize, Serialize};

use super::field::ColorClass;
use super::pool::{SlotHandle, StreakPool};
use super::streak::{CubicBezier, Streak, TubeShape};
use crate::consts::*;
use crate::{NEON_PALETTE, spherical_to_cartesian};

/// Emitter tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterConfig {
    /// [min, max] seconds between spawn attempts
    pub spawn_interval: [f32; 2],
    /// [min, max] streak lifetime in seconds
    pub duration: [f32; 2],
    /// Sphere the endpoints lie on
    pub radius: f32,
    /// Per-axis control point jitter amplitude
    pub jitter: f32,
    pub segments: u32,
    pub tube_radius: f32,
    pub radial_segments: u32,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            spawn_interval: STREAK_SPAWN_INTERVAL,
            duration: STREAK_DURATION,
            radius: SPHERE_RADIUS,
            jitter: 1.0,
            segments: STREAK_SEGMENTS,
            tube_radius: STREAK_TUBE_RADIUS,
            radial_segments: STREAK_RADIAL_SEGMENTS,
        }
    }
}

/// Result of one emitter update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// Threshold not reached yet
    Waiting,
    /// New streak placed in the slot
    Spawned(SlotHandle),
    /// Threshold reached but every slot was busy
    PoolFull,
}

/// Schedules and builds streaks
#[derive(Debug)]
pub struct CurveEmitter<R: Rng = ThreadRng> {
    pub config: EmitterConfig,
    rng: R,
    /// Accumulated time (seconds). f64 so long uptimes keep advancing.
    clock: f64,
    last_spawn: f64,
    threshold: f32,
}

impl CurveEmitter<ThreadRng> {
    /// Emitter backed by the thread-local RNG
    pub fn new(config: EmitterConfig) -> Self {
        Self::with_rng(config, rand::rng())
    }
}

impl<R: Rng> CurveEmitter<R> {
    /// Emitter with an explicit RNG (tests inject a seeded one)
    pub fn with_rng(config: EmitterConfig, mut rng: R) -> Self {
        let threshold = uniform(&mut rng, config.spawn_interval);
        Self {
            config,
            rng,
            clock: 0.0,
            last_spawn: 0.0,
            threshold,
        }
    }

    /// Accumulated emitter time
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Current wait before the next spawn attempt
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Advance the spawn clock and spawn at most one streak.
    ///
    /// The pool is owned by the caller; its capacity is a scene setting.
    pub fn update(&mut self, delta: f32, pool: &mut StreakPool) -> SpawnOutcome {
        self.clock += f64::from(delta.max(0.0));
        if self.clock - self.last_spawn <= f64::from(self.threshold) {
            return SpawnOutcome::Waiting;
        }

        self.last_spawn = self.clock;
        self.threshold = uniform(&mut self.rng, self.config.spawn_interval);

        if pool.is_full() {
            log::trace!("Streak pool full ({}), skipping spawn", pool.capacity());
            return SpawnOutcome::PoolFull;
        }

        let streak = self.build_streak(self.clock);
        match pool.acquire(streak) {
            Some(handle) => {
                log::trace!("Spawned streak in slot {}", handle.0);
                SpawnOutcome::Spawned(handle)
            }
            None => SpawnOutcome::PoolFull,
        }
    }

    /// Build a fresh streak born at `birth_time`
    pub fn build_streak(&mut self, birth_time: f64) -> Streak {
        let curve = self.random_curve();
        let lifetime = uniform(&mut self.rng, self.config.duration);
        let color = ColorClass::Neon(self.rng.random_range(0..NEON_PALETTE.len()) as u8);
        let tube = TubeShape {
            radius: self.config.tube_radius,
            radial_segments: self.config.radial_segments,
        };
        Streak::new(curve, color, birth_time, lifetime, self.config.segments, tube)
    }

    /// Two sphere points joined through jittered interior control points
    pub fn random_curve(&mut self) -> CubicBezier {
        let start = self.sphere_point();
        let end = self.sphere_point();
        let sum = start + end;
        let ctrl1 = sum * 0.2 + self.jitter();
        let ctrl2 = sum * 0.8 + self.jitter();
        CubicBezier::new(start, ctrl1, ctrl2, end)
    }

    fn sphere_point(&mut self) -> Vec3 {
        let azimuth = self.rng.random::<f32>() * TAU;
        let polar = (2.0 * self.rng.random::<f32>() - 1.0).acos();
        spherical_to_cartesian(self.config.radius, azimuth, polar)
    }

    fn jitter(&mut self) -> Vec3 {
        let amp = self.config.jitter;
        Vec3::new(
            (self.rng.random::<f32>() - 0.5) * amp,
            (self.rng.random::<f32>() - 0.5) * amp,
            (self.rng.random::<f32>() - 0.5) * amp,
        )
    }
}

/// Uniform in [min, max]; a collapsed range returns min
fn uniform<R: Rng>(rng: &mut R, [min, max]: [f32; 2]) -> f32 {
    min + rng.random::<f32>() * (max - min)
}
