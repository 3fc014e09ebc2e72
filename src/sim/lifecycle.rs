//! Streak aging, retirement and per-sample light intensity
//!
//! A light travels along each streak from start to end over its lifetime.
//! The brightness at curve position `s` is a Gaussian around the light's
//! position, stretched behind it into a tail and cut off in front of it.

use serde::{Deserialize, Serialize};

use super::pool::{SlotHandle, StreakPool};
use super::streak::{Streak, StreakPhase};
use crate::consts::{STREAK_SIGMA, STREAK_TRAIL_STRETCH};

/// Shape of the travelling light
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightProfile {
    /// Gaussian standard deviation (smaller = sharper)
    pub sigma: f32,
    /// Tail lengthening factor, > 1
    pub trail_stretch: f32,
}

impl Default for LightProfile {
    fn default() -> Self {
        Self {
            sigma: STREAK_SIGMA,
            trail_stretch: STREAK_TRAIL_STRETCH,
        }
    }
}

impl LightProfile {
    /// Intensity in [0, 1] at curve position `s` when the light is at `progress`
    #[inline]
    pub fn intensity(&self, progress: f32, s: f32) -> f32 {
        intensity(progress, s, self.sigma, self.trail_stretch)
    }
}

/// Directional Gaussian intensity.
///
/// `d = progress - s`; behind the light (`d > 0`) distance is multiplied by
/// `trail_stretch`; more than `sigma` ahead of the light is dark.
pub fn intensity(progress: f32, s: f32, sigma: f32, trail_stretch: f32) -> f32 {
    let d = progress - s;
    if d < -sigma {
        return 0.0;
    }
    let g = if d > 0.0 { d * trail_stretch } else { d };
    (-(g * g) / (2.0 * sigma * sigma)).exp().clamp(0.0, 1.0)
}

/// Advances live streaks and retires expired ones
#[derive(Debug, Clone, Default)]
pub struct LifecycleManager {
    pub profile: LightProfile,
}

impl LifecycleManager {
    pub fn new(profile: LightProfile) -> Self {
        Self { profile }
    }

    /// Age every live streak to scene time `now`.
    ///
    /// Streaks with `progress >= 1` are released from the pool and returned;
    /// the rest get fresh intensities for every sample.
    pub fn advance(&self, now: f64, pool: &mut StreakPool) -> Vec<Streak> {
        let mut expired: Vec<SlotHandle> = Vec::new();

        for streak in pool.iter_mut() {
            let progress = progress_at(streak, now);
            // Clock never runs backwards, but keep progress monotone regardless
            streak.progress = streak.progress.max(progress);
            if streak.progress >= 1.0 {
                expired.push(streak.handle);
                continue;
            }
            streak.phase = StreakPhase::Animating;
            self.update_intensities(streak);
        }

        expired
            .into_iter()
            .filter_map(|handle| pool.release(handle))
            .collect()
    }

    /// Recompute every sample intensity from the streak's current progress
    pub fn update_intensities(&self, streak: &mut Streak) {
        let progress = streak.progress;
        for i in 0..streak.intensities.len() {
            streak.intensities[i] = self.profile.intensity(progress, streak.sample_position(i));
        }
    }

    /// Retire every live streak regardless of age
    pub fn teardown(&self, pool: &mut StreakPool) -> Vec<Streak> {
        let released = pool.release_all();
        if !released.is_empty() {
            log::debug!("Teardown released {} streaks", released.len());
        }
        released
    }
}

fn progress_at(streak: &Streak, now: f64) -> f32 {
    if streak.lifetime <= 0.0 {
        return 1.0;
    }
    ((now - streak.birth_time) / f64::from(streak.lifetime)).max(0.0) as f32
}
