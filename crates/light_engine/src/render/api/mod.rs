//! Backend abstraction for the lighting subsystem

mod render_backend;

#[cfg(test)]
pub(crate) mod mock_backend;

pub use render_backend::{
    BackendResult, FramebufferHandle, MeshHandle, Rect, RenderBackend, ShaderHandle, ShaderKind,
    TextureHandle, UniformLocation, UniformValue,
};
