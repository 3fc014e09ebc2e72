//! Light streak geometry
//!
//! A streak is a cubic Bézier between two points on the sphere, sampled at
//! `segments + 1` evenly spaced parameters. Each sample carries one intensity;
//! the tube mesh around the curve reuses that intensity for its whole ring.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::field::ColorClass;
use super::pool::SlotHandle;

/// Cubic Bézier curve (start, ctrl1, ctrl2, end)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub p0: Vec3,
    pub p1: Vec3,
    pub p2: Vec3,
    pub p3: Vec3,
}

impl CubicBezier {
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Point at parameter t in [0, 1]
    pub fn point(&self, t: f32) -> Vec3 {
        let u = 1.0 - t;
        self.p0 * (u * u * u)
            + self.p1 * (3.0 * u * u * t)
            + self.p2 * (3.0 * u * t * t)
            + self.p3 * (t * t * t)
    }

    /// First derivative at t (not normalized)
    pub fn derivative(&self, t: f32) -> Vec3 {
        let u = 1.0 - t;
        (self.p1 - self.p0) * (3.0 * u * u)
            + (self.p2 - self.p1) * (6.0 * u * t)
            + (self.p3 - self.p2) * (3.0 * t * t)
    }

    /// Unit tangent at t, falling back to the chord for degenerate curves
    pub fn tangent(&self, t: f32) -> Vec3 {
        let d = self.derivative(t);
        if d.length_squared() > 1e-12 {
            d.normalize()
        } else {
            (self.p3 - self.p0).try_normalize().unwrap_or(Vec3::X)
        }
    }

    /// `segments + 1` evenly spaced samples, t = i / segments
    pub fn sample(&self, segments: u32) -> Vec<Vec3> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point(i as f32 / segments as f32))
            .collect()
    }
}

/// Lifecycle phase of a streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreakPhase {
    /// Claimed a slot, not yet updated
    Spawned,
    /// Intensities are being recomputed every tick
    Animating,
    /// Slot released; terminal
    Retired,
}

/// Tube mesh parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TubeShape {
    pub radius: f32,
    pub radial_segments: u32,
}

/// A transient light streak
#[derive(Debug, Clone)]
pub struct Streak {
    pub handle: SlotHandle,
    pub curve: CubicBezier,
    pub color: ColorClass,
    /// Scene time at spawn (seconds)
    pub birth_time: f64,
    /// Total lifetime (seconds)
    pub lifetime: f32,
    pub phase: StreakPhase,
    /// Last computed progress
    pub progress: f32,
    /// Curve samples, ordered from start to end
    pub samples: Vec<Vec3>,
    /// One intensity per sample, in [0, 1]
    pub intensities: Vec<f32>,
    pub tube: TubeShape,
}

impl Streak {
    pub fn new(
        curve: CubicBezier,
        color: ColorClass,
        birth_time: f64,
        lifetime: f32,
        segments: u32,
        tube: TubeShape,
    ) -> Self {
        let samples = curve.sample(segments);
        let intensities = vec![0.0; samples.len()];
        Self {
            handle: SlotHandle::UNASSIGNED,
            curve,
            color,
            birth_time,
            lifetime,
            phase: StreakPhase::Spawned,
            progress: 0.0,
            samples,
            intensities,
            tube,
        }
    }

    /// Normalized position of sample `i` along the curve
    #[inline]
    pub fn sample_position(&self, i: usize) -> f32 {
        let last = self.samples.len().saturating_sub(1).max(1);
        i as f32 / last as f32
    }

    /// Tube vertices: one ring of `radial_segments + 1` vertices per sample.
    ///
    /// Frames are parallel-transported along the curve so rings do not twist.
    /// Returns (position, alpha) pairs, rings in sample order.
    pub fn tube_vertices(&self) -> Vec<(Vec3, f32)> {
        let ring = self.tube.radial_segments.max(3) as usize;
        let mut out = Vec::with_capacity(self.samples.len() * (ring + 1));

        let mut normal = Vec3::ZERO;
        for (i, (&center, &alpha)) in self.samples.iter().zip(&self.intensities).enumerate() {
            let tangent = self.curve.tangent(self.sample_position(i));
            normal = if i == 0 {
                tangent.any_orthonormal_vector()
            } else {
                // Remove the tangent component from the previous normal
                (normal - tangent * normal.dot(tangent))
                    .try_normalize()
                    .unwrap_or_else(|| tangent.any_orthonormal_vector())
            };
            let binormal = tangent.cross(normal);

            for j in 0..=ring {
                let angle = j as f32 / ring as f32 * std::f32::consts::TAU;
                let offset = normal * angle.cos() + binormal * angle.sin();
                out.push((center + offset * self.tube.radius, alpha));
            }
        }
        out
    }

    /// Triangle indices for `tube_vertices`
    pub fn tube_indices(&self) -> Vec<u32> {
        let ring = self.tube.radial_segments.max(3);
        let stride = ring + 1;
        let rings = self.samples.len() as u32;
        let mut indices = Vec::with_capacity((rings.saturating_sub(1) * ring * 6) as usize);
        for i in 0..rings.saturating_sub(1) {
            for j in 0..ring {
                let a = i * stride + j;
                let b = (i + 1) * stride + j;
                let c = (i + 1) * stride + j + 1;
                let d = i * stride + j + 1;
                indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight() -> CubicBezier {
        CubicBezier::new(
            Vec3::ZERO,
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
        )
    }

    fn tube() -> TubeShape {
        TubeShape {
            radius: 0.02,
            radial_segments: 8,
        }
    }

    #[test]
    fn test_bezier_endpoints() {
        let curve = CubicBezier::new(
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.4, 0.1, 0.0),
            Vec3::new(-0.3, 0.2, 0.5),
            Vec3::new(0.0, 0.0, 2.0),
        );
        assert!((curve.point(0.0) - curve.p0).length() < 1e-6);
        assert!((curve.point(1.0) - curve.p3).length() < 1e-6);
    }

    #[test]
    fn test_straight_curve_is_linear() {
        let curve = straight();
        assert!((curve.point(0.5) - Vec3::new(1.5, 0.0, 0.0)).length() < 1e-6);
        assert!((curve.tangent(0.3) - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn test_degenerate_tangent_falls_back() {
        let p = Vec3::new(1.0, 1.0, 1.0);
        let curve = CubicBezier::new(p, p, p, p);
        assert_eq!(curve.tangent(0.5), Vec3::X);
    }

    #[test]
    fn test_sample_count_and_positions() {
        let streak = Streak::new(straight(), ColorClass::Neon(0), 0.0, 1.5, 64, tube());
        assert_eq!(streak.samples.len(), 65);
        assert_eq!(streak.intensities.len(), 65);
        assert_eq!(streak.sample_position(0), 0.0);
        assert_eq!(streak.sample_position(64), 1.0);
        assert_eq!(streak.phase, StreakPhase::Spawned);
    }

    #[test]
    fn test_tube_rings_surround_curve() {
        let streak = Streak::new(straight(), ColorClass::White, 0.0, 1.5, 4, tube());
        let verts = streak.tube_vertices();
        assert_eq!(verts.len(), 5 * 9);
        for (ring, chunk) in verts.chunks(9).enumerate() {
            let center = streak.samples[ring];
            for (pos, _) in chunk {
                assert!(((*pos - center).length() - 0.02).abs() < 1e-5);
                // Ring plane is perpendicular to the x-axis tangent
                assert!((pos.x - center.x).abs() < 1e-5);
            }
        }
        assert_eq!(streak.tube_indices().len(), 4 * 8 * 6);
    }
}
