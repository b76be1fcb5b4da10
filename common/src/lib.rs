//! Common graphics plumbing for the planet renderer
//!
//! This crate provides the window and GPU context, camera math, and the thin
//! GPU resource wrappers (shader modules, meshes, textures, off-screen render
//! targets) that the renderer drives every frame.

pub mod graphics;
pub mod camera;
pub mod shader;
pub mod mesh;
pub mod texture;
pub mod target;

pub use graphics::*;
pub use camera::*;
pub use shader::*;
pub use mesh::*;
pub use texture::*;
pub use target::*;
