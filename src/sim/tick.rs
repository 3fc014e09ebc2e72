//! Per-frame scene tick
//!
//! One tick runs to completion before the next. Order within a tick:
//! input toggles, sphere rotation, streak spawn, streak aging, camera and
//! background drift.

use glam::Vec3;
use rand::Rng;
use rand::rngs::ThreadRng;
use serde::{Deserialize, Serialize};

use super::emitter::{CurveEmitter, SpawnOutcome};
use super::field::{FieldElement, generate_all};
use super::lifecycle::LifecycleManager;
use super::pool::{SlotHandle, StreakPool};
use super::rotation::{RotationDriver, RotationState};
use super::sequence::SeededSequence;
use super::sphere::WireSphere;
use crate::hsl_to_rgb;
use crate::settings::{Settings, SettingsError};

/// Camera wander speed
const CAMERA_SPEED: f64 = 0.15;
/// Background hue cycles per second
const BACKGROUND_HUE_RATE: f64 = 0.05;
const BACKGROUND_SATURATION: f32 = 0.8;
const BACKGROUND_LIGHTNESS: f32 = 0.05;

/// Diagnostic overlay panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatsMode {
    #[default]
    Off,
    Fps,
    FrameMs,
    MemoryMb,
}

impl StatsMode {
    /// Off -> Fps -> FrameMs -> MemoryMb -> Off
    pub fn next(self) -> Self {
        match self {
            StatsMode::Off => StatsMode::Fps,
            StatsMode::Fps => StatsMode::FrameMs,
            StatsMode::FrameMs => StatsMode::MemoryMb,
            StatsMode::MemoryMb => StatsMode::Off,
        }
    }
}

/// UI overlay state (never read by generation or lifecycle code)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlay {
    pub stats: StatsMode,
    pub show_links: bool,
}

impl Default for Overlay {
    fn default() -> Self {
        Self {
            stats: StatsMode::Off,
            show_links: true,
        }
    }
}

/// Input for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Cycle the stats overlay ('s')
    pub cycle_stats: bool,
    /// Toggle the link panel ('l')
    pub toggle_links: bool,
}

/// Things the renderer must react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    /// Slot gained a streak: allocate its mesh
    StreakSpawned(SlotHandle),
    /// Slot lost its streak: free its mesh
    StreakRetired(SlotHandle),
}

/// Running counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub spawned: u64,
    pub skipped: u64,
    pub retired: u64,
    pub peak_live: usize,
}

/// Complete animated scene
#[derive(Debug)]
pub struct Scene<R: Rng = ThreadRng> {
    /// Scene clock (seconds)
    pub time: f64,
    pub rotation_driver: RotationDriver,
    /// Rotation published this tick
    pub rotation: RotationState,
    pub emitter: CurveEmitter<R>,
    pub lifecycle: LifecycleManager,
    pub pool: StreakPool,
    /// Seeded point cloud (unrotated)
    pub star_cloud: Vec<FieldElement>,
    pub sphere: WireSphere,
    pub camera_target: Vec3,
    pub background: [f32; 3],
    pub overlay: Overlay,
    /// Drained by the renderer each frame
    pub events: Vec<SceneEvent>,
    pub stats: SceneStats,
}

impl Scene<ThreadRng> {
    /// Build a scene whose star cloud is seeded from `seed_token`
    pub fn new(settings: &Settings, seed_token: &str) -> Result<Self, SettingsError> {
        Self::with_rng(settings, seed_token, rand::rng())
    }
}

impl<R: Rng> Scene<R> {
    /// Build a scene with an explicit streak RNG
    pub fn with_rng(settings: &Settings, seed_token: &str, rng: R) -> Result<Self, SettingsError> {
        settings.validate()?;
        let mut seq = SeededSequence::from_token(seed_token);
        let cloud = &settings.star_cloud;
        let star_cloud = generate_all(&cloud.classes, &cloud.domain, &mut seq)?;
        log::info!(
            "Scene star cloud: {} stars from seed `{}`",
            star_cloud.len(),
            seed_token
        );

        let [x, y, z] = settings.rotation_step;
        let mut scene = Self {
            time: 0.0,
            rotation_driver: RotationDriver::new(RotationState::new(x, y, z)),
            rotation: RotationState::default(),
            emitter: CurveEmitter::with_rng(settings.streaks.clone(), rng),
            lifecycle: LifecycleManager::new(settings.light),
            pool: StreakPool::with_capacity(settings.pool_capacity),
            star_cloud,
            sphere: WireSphere::new(settings.streaks.radius, settings.sphere_detail),
            camera_target: Vec3::ZERO,
            background: [0.0; 3],
            overlay: Overlay::default(),
            events: Vec::new(),
            stats: SceneStats::default(),
        };
        scene.update_camera_and_background();
        Ok(scene)
    }

    /// Take pending renderer events
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    /// Retire every live streak (scene shutdown)
    pub fn teardown(&mut self) {
        let released = self.lifecycle.teardown(&mut self.pool);
        self.stats.retired += released.len() as u64;
        self.events
            .extend(released.iter().map(|s| SceneEvent::StreakRetired(s.handle)));
    }

    fn update_camera_and_background(&mut self) {
        let t = self.time;
        self.camera_target = Vec3::new(
            ((t * CAMERA_SPEED).sin() * 2.0) as f32,
            ((t * CAMERA_SPEED * 0.7).cos() * 1.5) as f32,
            ((t * CAMERA_SPEED * 0.5).sin() * 2.0) as f32,
        );
        let hue = (t * BACKGROUND_HUE_RATE).rem_euclid(1.0) as f32;
        self.background = hsl_to_rgb(hue, BACKGROUND_SATURATION, BACKGROUND_LIGHTNESS);
    }
}

impl<R: Rng> Drop for Scene<R> {
    fn drop(&mut self) {
        if self.pool.live() > 0 {
            self.teardown();
        }
    }
}

/// Advance the scene by one frame of `delta` seconds
pub fn tick<R: Rng>(scene: &mut Scene<R>, input: &TickInput, delta: f32) {
    if input.cycle_stats {
        scene.overlay.stats = scene.overlay.stats.next();
    }
    if input.toggle_links {
        scene.overlay.show_links = !scene.overlay.show_links;
    }

    // Rotation steps once per tick regardless of delta
    scene.rotation = scene.rotation_driver.advance();

    let delta = delta.max(0.0);
    scene.time += f64::from(delta);

    match scene.emitter.update(delta, &mut scene.pool) {
        SpawnOutcome::Spawned(handle) => {
            scene.stats.spawned += 1;
            scene.events.push(SceneEvent::StreakSpawned(handle));
        }
        SpawnOutcome::PoolFull => scene.stats.skipped += 1,
        SpawnOutcome::Waiting => {}
    }

    let retired = scene.lifecycle.advance(scene.time, &mut scene.pool);
    scene.stats.retired += retired.len() as u64;
    scene
        .events
        .extend(retired.iter().map(|s| SceneEvent::StreakRetired(s.handle)));

    scene.stats.peak_live = scene.stats.peak_live.max(scene.pool.live());
    scene.update_camera_and_background();
}
