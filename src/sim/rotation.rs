//! Shared sphere rotation
//!
//! The sphere's updater owns the only mutable rotation. Each tick it adds a
//! fixed per-axis step (not scaled by frame time), then hands out a copy that
//! the star cloud and streaks apply verbatim.

use glam::{EulerRot, Mat4, Quat};
use serde::{Deserialize, Serialize};

use crate::consts::ROTATION_STEP;

/// Euler rotation in radians, applied in XYZ order
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.x, self.y, self.z)
    }

    /// Model matrix for consumers sharing this rotation
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_quat(self.quat())
    }
}

/// Owner of the authoritative rotation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotationDriver {
    state: RotationState,
    step: RotationState,
    ticks: u64,
}

impl Default for RotationDriver {
    fn default() -> Self {
        let [x, y, z] = ROTATION_STEP;
        Self::new(RotationState::new(x, y, z))
    }
}

impl RotationDriver {
    pub fn new(step: RotationState) -> Self {
        Self {
            state: RotationState::default(),
            step,
            ticks: 0,
        }
    }

    /// Advance one tick and return the value every consumer reads this tick
    pub fn advance(&mut self) -> RotationState {
        self.state.x += self.step.x;
        self.state.y += self.step.y;
        self.state.z += self.step.z;
        self.ticks += 1;
        self.state
    }

    /// Latest rotation (read-only copy)
    pub fn current(&self) -> RotationState {
        self.state
    }

    pub fn step(&self) -> RotationState {
        self.step
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_fixed_step_per_tick() {
        let mut driver = RotationDriver::default();
        for _ in 0..1000 {
            driver.advance();
        }
        let r = driver.current();
        assert!((r.x - 1.0).abs() < 1e-3);
        assert!((r.y - 2.0).abs() < 1e-3);
        assert!((r.z - 0.5).abs() < 1e-3);
        assert_eq!(driver.ticks(), 1000);
    }

    #[test]
    fn test_monotonic() {
        let mut driver = RotationDriver::default();
        let mut prev = driver.current();
        for _ in 0..100 {
            let next = driver.advance();
            assert!(next.x > prev.x && next.y > prev.y && next.z > prev.z);
            prev = next;
        }
    }

    #[test]
    fn test_matrix_matches_quat() {
        let r = RotationState::new(0.3, -0.2, 1.1);
        let v = Vec3::new(1.0, 2.0, 3.0);
        let a = r.matrix().transform_point3(v);
        let b = r.quat() * v;
        assert!((a - b).length() < 1e-5);
        assert_eq!(RotationState::default().matrix(), Mat4::IDENTITY);
    }
}
