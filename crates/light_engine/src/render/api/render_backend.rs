//! Backend abstraction traits for the lighting subsystem
//!
//! This module defines the trait a rendering host must implement for the
//! lighting and shadow passes to drive it. The subsystem never talks to a
//! graphics API directly; everything GPU-facing (shader parameters, depth
//! targets, global raster state, draw submission) flows through
//! [`RenderBackend`].

use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};
use crate::render::LightingError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, LightingError>;

/// Handle to a texture resource stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Handle to a framebuffer resource stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferHandle(pub u64);

/// Handle to a compiled shader program stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u64);

/// Handle to a mesh resource stored in the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u64);

/// Resolved shader-parameter location
///
/// A value of `-1` means the parameter is absent from the program, matching
/// the convention of GL-style hosts; uploads to an absent location are
/// silently ignored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub i32);

impl UniformLocation {
    /// Location for a parameter the program does not declare
    pub const ABSENT: Self = Self(-1);

    /// Whether this location refers to a live parameter
    pub fn is_present(self) -> bool {
        self.0 >= 0
    }
}

/// The shader programs the subsystem requests from the host
///
/// Shader source and compilation are host concerns; the subsystem only
/// selects which of its three programs a pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    /// Main forward-shading program implementing the per-fragment algorithm
    ForwardLit,
    /// Depth-only program for shadow-map generation
    DepthOnly,
    /// Debug program that blits a depth texture into a screen rectangle
    ShadowMapDebug,
}

/// A typed shader-parameter value for write-through uploads
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Signed integer (also used for booleans as 0/1)
    Int(i32),
    /// Single float
    Float(f32),
    /// Two-component vector
    Vec2(Vec2),
    /// Three-component vector (positions, directions, colors)
    Vec3(Vec3),
    /// Four-component vector
    Vec4(Vec4),
    /// 4x4 matrix
    Mat4(Mat4),
    /// Texture sampler bound to the given texture unit
    Sampler(u32),
}

/// Screen-space rectangle in pixels, used by the debug visualization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

/// Main rendering backend trait
///
/// Implemented by the host renderer. All methods are synchronous with the
/// host's command-submission thread; the subsystem issues them in strict
/// order and never retains references into the backend.
pub trait RenderBackend {
    // --- Shader programs ---

    /// Create (or hand out) the compiled program of the given kind
    fn create_shader(&mut self, kind: ShaderKind) -> BackendResult<ShaderHandle>;

    /// Destroy a shader program
    fn destroy_shader(&mut self, shader: ShaderHandle);

    /// Make a program current for subsequent uniform uploads and draws
    fn use_shader(&mut self, shader: ShaderHandle);

    /// Resolve a named parameter in a program
    ///
    /// Returns [`UniformLocation::ABSENT`] when the program does not declare
    /// the parameter.
    fn uniform_location(&mut self, shader: ShaderHandle, name: &str) -> UniformLocation;

    /// Upload a parameter value to a program
    fn set_uniform(&mut self, shader: ShaderHandle, location: UniformLocation, value: UniformValue);

    // --- Render targets ---

    /// Create a square depth texture of `resolution` x `resolution` texels
    fn create_depth_texture(&mut self, resolution: u32) -> BackendResult<TextureHandle>;

    /// Destroy a texture
    fn destroy_texture(&mut self, texture: TextureHandle);

    /// Create a depth-only framebuffer attached to the given texture
    fn create_depth_framebuffer(&mut self, depth: TextureHandle)
        -> BackendResult<FramebufferHandle>;

    /// Destroy a framebuffer (the attached texture is destroyed separately)
    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle);

    /// Redirect rendering into a framebuffer, or back to the surface (`None`)
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>);

    // --- Global raster state (save/restore points for the shadow bracket) ---

    /// Current viewport as `(x, y, width, height)`
    fn viewport(&self) -> (i32, i32, u32, u32);

    /// Set the viewport
    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Current projection matrix
    fn projection(&self) -> Mat4;

    /// Replace the projection matrix
    fn set_projection(&mut self, projection: Mat4);

    /// Current view matrix
    fn view(&self) -> Mat4;

    /// Replace the view matrix
    fn set_view(&mut self, view: Mat4);

    /// Whether color blending is enabled
    fn blend_enabled(&self) -> bool;

    /// Toggle color blending
    fn set_blend_enabled(&mut self, enabled: bool);

    /// Toggle depth testing
    fn set_depth_test_enabled(&mut self, enabled: bool);

    /// Submit any batched draws still pending in the host's queue
    fn flush(&mut self);

    /// Size of the default render surface in pixels
    fn surface_size(&self) -> (u32, u32);

    /// Number of eyes rendered per draw (1, or 2 for stereo hosts)
    fn eye_count(&self) -> u32;

    /// Per-eye view-projection override, identity offsets for mono hosts
    ///
    /// The depth-only and lit draw paths compute one MVP per eye from this.
    fn eye_view_projection(&self, eye: u32) -> Mat4;

    // --- Draw submission ---

    /// Bind a texture to a texture unit
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);

    /// Draw a mesh with all of its vertex attributes bound
    fn draw_mesh(&mut self, mesh: MeshHandle);

    /// Draw a mesh binding only its position attribute (depth-only path)
    fn draw_mesh_positions_only(&mut self, mesh: MeshHandle);

    /// Fully unbind vertex state so it cannot leak into the next draw
    fn unbind_vertex_state(&mut self);

    /// Blit a texture into a screen rectangle using the current shader
    fn draw_texture_rect(&mut self, texture: TextureHandle, rect: Rect);
}
