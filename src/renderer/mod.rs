//! Renderer boundary
//!
//! The GPU backend is external. This module fixes what it receives: one vertex
//! layout, one WGSL shader with a per-vertex alpha input, and per-frame buffers.

pub mod buffers;
pub mod vertex;

pub use buffers::{FrameBuffers, StreakMesh, view_projection};
pub use vertex::{Globals, SceneVertex};

/// The only shader the scene uses
pub const SCENE_SHADER: &str = include_str!("scene.wgsl");
