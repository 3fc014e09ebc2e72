//! Scene simulation module
//!
//! Everything here is renderer-independent:
//! - Star fields are a pure function of the seed and class order
//! - Streaks use a separate, unseeded RNG
//! - One tick runs to completion before the next (no locking)

pub mod emitter;
pub mod field;
pub mod lifecycle;
pub mod pool;
pub mod rotation;
pub mod sequence;
pub mod sphere;
pub mod streak;
pub mod tick;

pub use emitter::{CurveEmitter, EmitterConfig, SpawnOutcome};
pub use field::{ColorClass, FieldConfig, FieldDomain, FieldElement, FieldError, generate, generate_all};
pub use lifecycle::{LifecycleManager, LightProfile, intensity};
pub use pool::{SlotHandle, StreakPool};
pub use rotation::{RotationDriver, RotationState};
pub use sequence::SeededSequence;
pub use sphere::WireSphere;
pub use streak::{CubicBezier, Streak, StreakPhase, TubeShape};
pub use tick::{Overlay, Scene, SceneEvent, SceneStats, StatsMode, TickInput, tick};
