//! Per-frame vertex data for the external GPU backend
//!
//! Geometry is emitted unrotated: the shared sphere rotation travels once in
//! `Globals::model` and every draw applies it verbatim.

use glam::{Mat4, Vec3};
use rand::Rng;

use super::vertex::{Globals, SceneVertex, colors};
use crate::sim::{Scene, SlotHandle, Streak};

/// Camera vertical field of view (degrees)
pub const CAMERA_FOV_DEG: f32 = 75.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;

/// Tube mesh for one live streak
#[derive(Debug, Clone)]
pub struct StreakMesh {
    pub handle: SlotHandle,
    pub vertices: Vec<SceneVertex>,
    pub indices: Vec<u32>,
}

impl StreakMesh {
    pub fn build(streak: &Streak) -> Self {
        let color = streak.color.rgb();
        let vertices = streak
            .tube_vertices()
            .into_iter()
            .map(|(pos, alpha)| SceneVertex::new(pos.to_array(), color, alpha, 0.0))
            .collect();
        Self {
            handle: streak.handle,
            vertices,
            indices: streak.tube_indices(),
        }
    }
}

/// Everything the backend uploads for one frame
#[derive(Debug, Clone)]
pub struct FrameBuffers {
    pub globals: Globals,
    pub clear_color: [f32; 3],
    /// Point list
    pub stars: Vec<SceneVertex>,
    /// Line list
    pub sphere_wire: Vec<SceneVertex>,
    /// One indexed triangle mesh per live streak, in slot order
    pub streaks: Vec<StreakMesh>,
}

impl FrameBuffers {
    /// Assemble buffers from the scene state after a tick
    pub fn build<R: Rng>(scene: &Scene<R>, aspect: f32) -> Self {
        let stars = scene
            .star_cloud
            .iter()
            .map(|s| SceneVertex::new(s.position.to_array(), s.color.rgb(), s.opacity, s.size))
            .collect();

        let sphere_wire = scene
            .sphere
            .segments()
            .flat_map(|(a, b)| {
                [
                    SceneVertex::new(a.to_array(), colors::SPHERE_WIRE, 1.0, 0.0),
                    SceneVertex::new(b.to_array(), colors::SPHERE_WIRE, 1.0, 0.0),
                ]
            })
            .collect();

        let streaks = scene.pool.iter().map(StreakMesh::build).collect();

        Self {
            globals: Globals {
                view_proj: view_projection(scene.camera_target, aspect).to_cols_array_2d(),
                model: scene.rotation.matrix().to_cols_array_2d(),
            },
            clear_color: scene.background,
            stars,
            sphere_wire,
            streaks,
        }
    }

    /// Star vertices as raw bytes
    pub fn star_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.stars)
    }
}

/// Camera fixed at the origin looking at `target`
pub fn view_projection(target: Vec3, aspect: f32) -> Mat4 {
    let forward = target.try_normalize().unwrap_or(Vec3::NEG_Z);
    // Avoid a degenerate basis when looking straight up or down
    let up = if forward.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let view = Mat4::look_to_rh(Vec3::ZERO, forward, up);
    let proj = Mat4::perspective_rh(
        CAMERA_FOV_DEG.to_radians(),
        aspect.max(1e-3),
        CAMERA_NEAR,
        CAMERA_FAR,
    );
    proj * view
}
