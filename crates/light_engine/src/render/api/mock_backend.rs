//! Recording backend used by the unit and scenario tests
//!
//! Tracks every state mutation the subsystem performs so tests can assert
//! on save/restore pairing, write-through uploads, and resource lifecycles
//! without a GPU.

use std::collections::HashMap;

use crate::foundation::math::Mat4;

use super::{
    BackendResult, FramebufferHandle, MeshHandle, Rect, RenderBackend, ShaderHandle, ShaderKind,
    TextureHandle, UniformLocation, UniformValue,
};

/// One recorded submission-level event, in issue order
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    /// `flush()` call
    Flush,
    /// Full-attribute mesh draw
    Mesh(MeshHandle),
    /// Position-only mesh draw
    PositionsOnly(MeshHandle),
    /// Vertex state unbind
    UnbindVertexState,
    /// Debug rectangle blit
    TextureRect(TextureHandle, Rect),
}

/// Recording mock implementation of [`RenderBackend`]
pub struct MockBackend {
    next_id: u64,
    shaders: HashMap<u64, ShaderKind>,
    /// Per-shader uniform name -> location, allocated on first lookup
    locations: HashMap<(u64, String), UniformLocation>,
    location_names: HashMap<(u64, i32), String>,
    next_location: i32,
    /// Last uploaded value per (shader, uniform name)
    uniforms: HashMap<(u64, String), UniformValue>,
    /// Number of `uniform_location` calls, for resolve-once assertions
    pub location_lookups: usize,
    live_textures: Vec<TextureHandle>,
    live_framebuffers: Vec<FramebufferHandle>,
    /// Total depth textures ever created
    pub depth_textures_created: usize,
    bound_framebuffer: Option<FramebufferHandle>,
    current_shader: Option<ShaderHandle>,
    viewport: (i32, i32, u32, u32),
    projection: Mat4,
    view: Mat4,
    blend: bool,
    depth_test: bool,
    bound_textures: HashMap<u32, TextureHandle>,
    /// Recorded submission events in order
    pub events: Vec<DrawEvent>,
    /// Eyes per draw; tests set 2 to exercise the stereo path
    pub eyes: u32,
    /// When set, depth-texture creation fails (resource-exhaustion tests)
    pub fail_depth_textures: bool,
}

impl MockBackend {
    /// Create a mock with a 1920x1080 surface and mono rendering
    pub fn new() -> Self {
        Self {
            next_id: 1,
            shaders: HashMap::new(),
            locations: HashMap::new(),
            location_names: HashMap::new(),
            next_location: 0,
            uniforms: HashMap::new(),
            location_lookups: 0,
            live_textures: Vec::new(),
            live_framebuffers: Vec::new(),
            depth_textures_created: 0,
            bound_framebuffer: None,
            current_shader: None,
            viewport: (0, 0, 1920, 1080),
            projection: Mat4::identity(),
            view: Mat4::identity(),
            blend: true,
            depth_test: false,
            bound_textures: HashMap::new(),
            events: Vec::new(),
            eyes: 1,
            fail_depth_textures: false,
        }
    }

    fn fresh_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Last value uploaded to `name` in `shader`, if any
    pub fn uniform(&self, shader: ShaderHandle, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(&(shader.0, name.to_string()))
    }

    /// Whether a texture handle is still alive
    pub fn texture_alive(&self, texture: TextureHandle) -> bool {
        self.live_textures.contains(&texture)
    }

    /// Whether a framebuffer handle is still alive
    pub fn framebuffer_alive(&self, framebuffer: FramebufferHandle) -> bool {
        self.live_framebuffers.contains(&framebuffer)
    }

    /// Currently bound framebuffer, `None` for the surface
    pub fn bound_framebuffer(&self) -> Option<FramebufferHandle> {
        self.bound_framebuffer
    }

    /// Shader currently in use
    pub fn current_shader(&self) -> Option<ShaderHandle> {
        self.current_shader
    }

    /// Texture bound to a unit, if any
    pub fn texture_at_unit(&self, unit: u32) -> Option<TextureHandle> {
        self.bound_textures.get(&unit).copied()
    }

    /// Number of live (undestroyed) shader programs
    pub fn live_shader_count(&self) -> usize {
        self.shaders.len()
    }
}

impl RenderBackend for MockBackend {
    fn create_shader(&mut self, kind: ShaderKind) -> BackendResult<ShaderHandle> {
        let id = self.fresh_id();
        self.shaders.insert(id, kind);
        Ok(ShaderHandle(id))
    }

    fn destroy_shader(&mut self, shader: ShaderHandle) {
        self.shaders.remove(&shader.0);
    }

    fn use_shader(&mut self, shader: ShaderHandle) {
        self.current_shader = Some(shader);
    }

    fn uniform_location(&mut self, shader: ShaderHandle, name: &str) -> UniformLocation {
        self.location_lookups += 1;
        let key = (shader.0, name.to_string());
        if let Some(&location) = self.locations.get(&key) {
            return location;
        }
        let location = UniformLocation(self.next_location);
        self.next_location += 1;
        self.location_names
            .insert((shader.0, location.0), name.to_string());
        self.locations.insert(key, location);
        location
    }

    fn set_uniform(&mut self, shader: ShaderHandle, location: UniformLocation, value: UniformValue) {
        if !location.is_present() {
            return;
        }
        if let Some(name) = self.location_names.get(&(shader.0, location.0)) {
            self.uniforms.insert((shader.0, name.clone()), value);
        }
    }

    fn create_depth_texture(&mut self, _resolution: u32) -> BackendResult<TextureHandle> {
        if self.fail_depth_textures {
            return Err(crate::render::LightingError::ResourceCreationFailed(
                "mock depth-texture allocation failure".to_string(),
            ));
        }
        let handle = TextureHandle(self.fresh_id());
        self.live_textures.push(handle);
        self.depth_textures_created += 1;
        Ok(handle)
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.live_textures.retain(|&t| t != texture);
    }

    fn create_depth_framebuffer(
        &mut self,
        _depth: TextureHandle,
    ) -> BackendResult<FramebufferHandle> {
        let handle = FramebufferHandle(self.fresh_id());
        self.live_framebuffers.push(handle);
        Ok(handle)
    }

    fn destroy_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        self.live_framebuffers.retain(|&f| f != framebuffer);
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) {
        self.bound_framebuffer = framebuffer;
    }

    fn viewport(&self) -> (i32, i32, u32, u32) {
        self.viewport
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.viewport = (x, y, width, height);
    }

    fn projection(&self) -> Mat4 {
        self.projection
    }

    fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    fn view(&self) -> Mat4 {
        self.view
    }

    fn set_view(&mut self, view: Mat4) {
        self.view = view;
    }

    fn blend_enabled(&self) -> bool {
        self.blend
    }

    fn set_blend_enabled(&mut self, enabled: bool) {
        self.blend = enabled;
    }

    fn set_depth_test_enabled(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    fn flush(&mut self) {
        self.events.push(DrawEvent::Flush);
    }

    fn surface_size(&self) -> (u32, u32) {
        (1920, 1080)
    }

    fn eye_count(&self) -> u32 {
        self.eyes
    }

    fn eye_view_projection(&self, _eye: u32) -> Mat4 {
        self.projection * self.view
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        self.bound_textures.insert(unit, texture);
    }

    fn draw_mesh(&mut self, mesh: MeshHandle) {
        self.events.push(DrawEvent::Mesh(mesh));
    }

    fn draw_mesh_positions_only(&mut self, mesh: MeshHandle) {
        self.events.push(DrawEvent::PositionsOnly(mesh));
    }

    fn unbind_vertex_state(&mut self) {
        self.events.push(DrawEvent::UnbindVertexState);
    }

    fn draw_texture_rect(&mut self, texture: TextureHandle, rect: Rect) {
        self.events.push(DrawEvent::TextureRect(texture, rect));
    }
}
