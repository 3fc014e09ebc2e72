//! Vertex type shared by every scene draw call
//!
//! Stars, the sphere wire and streak tubes all use `SceneVertex`, so one fixed
//! shader covers the whole scene. Per-vertex `alpha` is the only value that
//! changes every frame for streaks.

use bytemuck::{Pod, Zeroable};

/// 3D vertex with colour, scalar alpha and point size
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub alpha: f32,
    /// Point size (stars only, 0 otherwise)
    pub size: f32,
}

impl SceneVertex {
    pub const fn new(position: [f32; 3], color: [f32; 3], alpha: f32, size: f32) -> Self {
        Self {
            position,
            color,
            alpha,
            size,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SceneVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 7]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32,
                },
            ],
        }
    }
}

/// Per-frame uniforms (must match `Globals` in scene.wgsl)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Globals {
    pub view_proj: [[f32; 4]; 4],
    /// Shared sphere rotation, applied to every draw
    pub model: [[f32; 4]; 4],
}

/// Scene colours
pub mod colors {
    pub const SPHERE_WIRE: [f32; 3] = [1.0, 0.0, 128.0 / 255.0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_struct() {
        let desc = SceneVertex::desc();
        assert_eq!(desc.array_stride, 32);
        let offsets: Vec<_> = desc.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, [0, 12, 24, 28]);
        assert_eq!(std::mem::size_of::<Globals>(), 128);
    }

    #[test]
    fn test_wire_color_is_palette_pink() {
        assert_eq!(crate::hex_to_rgb(crate::NEON_PALETTE[0]), Some(colors::SPHERE_WIRE));
    }

    #[test]
    fn test_shader_declares_alpha_input() {
        let src = super::super::SCENE_SHADER;
        assert!(src.contains("@location(2) alpha: f32"));
        assert!(src.contains("@location(3) size: f32"));
    }
}
