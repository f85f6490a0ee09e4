//! Depth-only shadow pass orchestration
//!
//! [`ShadowPassController`] drives the per-light shadow pass: `begin_cast`
//! redirects rendering into one light's depth target, `cast_mesh`/`cast_model`
//! submit occluder geometry through the depth-only program, and `end_cast`
//! restores the exact raster state saved at begin. [`ShadowCastScope`] wraps
//! the pair so an early return cannot leave rendering redirected.
//!
//! Only spot-style frustums are built. An omni light with shadows enabled is
//! rendered with the same single-direction frustum (and a warning); coverage
//! outside that cone is simply missing.

use crate::core::config::ShadowConfig;
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::lighting::context::LightingContext;
use crate::lighting::light::LightType;
use crate::render::api::{Rect, RenderBackend, UniformValue};
use crate::render::primitives::{Mesh, Model};

/// Raster state captured at `begin_cast` and restored at `end_cast`
#[derive(Debug, Clone, Copy)]
struct SavedRasterState {
    viewport: (i32, i32, u32, u32),
    projection: Mat4,
    blend: bool,
}

#[derive(Debug, Clone, Copy)]
enum CastState {
    Idle,
    Casting {
        light: usize,
        saved: SavedRasterState,
    },
}

/// Drives depth-only rendering into per-light shadow targets
#[derive(Debug)]
pub struct ShadowPassController {
    state: CastState,
    near: f32,
    far: f32,
}

impl Default for ShadowPassController {
    fn default() -> Self {
        Self::from_config(&ShadowConfig::default())
    }
}

impl ShadowPassController {
    /// Create a controller with the given frustum clip planes
    pub fn from_config(config: &ShadowConfig) -> Self {
        Self {
            state: CastState::Idle,
            near: config.near,
            far: config.far,
        }
    }

    /// Whether a cast is currently open
    pub fn is_casting(&self) -> bool {
        matches!(self.state, CastState::Casting { .. })
    }

    /// Index of the light being cast, if a cast is open
    pub fn casting_light(&self) -> Option<usize> {
        match self.state {
            CastState::Casting { light, .. } => Some(light),
            CastState::Idle => None,
        }
    }

    /// Redirect rendering into `light`'s depth target
    ///
    /// Saves the viewport, projection, and blend state, binds the caster
    /// framebuffer, and installs the light's view and projection. The
    /// combined light-space transform is cached on the caster and uploaded
    /// for the subsequent lit pass. Calling with a cast already open, or for
    /// a light without shadows, logs an error and changes no state.
    pub fn begin_cast(
        &mut self,
        context: &mut LightingContext,
        backend: &mut dyn RenderBackend,
        index: usize,
    ) {
        if self.is_casting() {
            log::error!("begin_cast: a shadow cast is already open");
            return;
        }
        let Some(light) = context.lights().get(index) else {
            log::error!(
                "begin_cast: light index {index} out of range (context has {} lights)",
                context.light_count()
            );
            return;
        };
        let Some(caster) = &light.shadow else {
            log::error!("begin_cast: light {index} has no shadow caster");
            return;
        };
        if light.light_type != LightType::Spot {
            log::warn!(
                "begin_cast: light {index} is not a spot light; using a spot-style frustum"
            );
        }

        let resolution = caster.resolution();
        let framebuffer = caster.framebuffer();
        let projection = Self::light_projection(light.outer_cutoff, self.near, self.far);
        let view = Self::light_view(light.position, light.direction);
        let light_space = projection * view;

        backend.flush();
        let saved = SavedRasterState {
            viewport: backend.viewport(),
            projection: backend.projection(),
            blend: backend.blend_enabled(),
        };

        backend.bind_framebuffer(Some(framebuffer));
        backend.set_viewport(0, 0, resolution, resolution);
        backend.set_projection(projection);
        backend.set_view(view);
        backend.set_blend_enabled(false);
        backend.set_depth_test_enabled(true);

        if let Some(light) = context.light_mut(index) {
            if let Some(caster) = &mut light.shadow {
                caster.light_space = light_space;
            }
        }
        context
            .params()
            .upload_light_space(backend, index, UniformValue::Mat4(light_space));

        self.state = CastState::Casting { light: index, saved };
    }

    /// Close the open cast and restore the saved raster state
    ///
    /// Without an open cast this logs an error and changes no state.
    pub fn end_cast(&mut self, backend: &mut dyn RenderBackend) {
        let CastState::Casting { saved, .. } = self.state else {
            log::error!("end_cast: no shadow cast is open");
            return;
        };

        backend.flush();
        backend.set_blend_enabled(saved.blend);
        backend.set_projection(saved.projection);
        let (x, y, width, height) = saved.viewport;
        backend.set_viewport(x, y, width, height);
        backend.bind_framebuffer(None);
        backend.set_view(Mat4::identity());

        self.state = CastState::Idle;
    }

    /// Open a cast that closes itself when the returned scope drops
    pub fn cast_scope<'a>(
        &'a mut self,
        context: &mut LightingContext,
        backend: &'a mut dyn RenderBackend,
        index: usize,
    ) -> ShadowCastScope<'a> {
        self.begin_cast(context, backend, index);
        ShadowCastScope {
            controller: self,
            backend,
        }
    }

    /// Submit one occluder mesh through the depth-only program
    pub fn cast_mesh(
        &self,
        context: &LightingContext,
        backend: &mut dyn RenderBackend,
        mesh: &Mesh,
        transform: &Mat4,
    ) {
        if !self.is_casting() {
            log::error!("cast_mesh: no shadow cast is open");
            return;
        }
        backend.use_shader(context.depth_shader());
        for eye in 0..backend.eye_count() {
            let mvp = backend.eye_view_projection(eye) * transform;
            context
                .depth_params()
                .upload_mvp(backend, UniformValue::Mat4(mvp));
            backend.draw_mesh_positions_only(mesh.handle);
        }
        backend.unbind_vertex_state();
    }

    /// Submit every part of a model as occluder geometry
    pub fn cast_model(
        &self,
        context: &LightingContext,
        backend: &mut dyn RenderBackend,
        model: &Model,
    ) {
        for (mesh, _) in &model.parts {
            self.cast_mesh(context, backend, mesh, &model.transform);
        }
    }

    /// Blit a light's shadow map into a screen rectangle for inspection
    pub fn draw_shadow_map_debug(
        context: &LightingContext,
        backend: &mut dyn RenderBackend,
        index: usize,
        rect: Rect,
    ) {
        let Some(texture) = context.shadow_depth_texture(index) else {
            log::error!("draw_shadow_map_debug: light {index} has no shadow caster");
            return;
        };
        backend.use_shader(context.debug_shader());
        backend.draw_texture_rect(texture, rect);
    }

    fn light_projection(outer_cutoff_cos: f32, near: f32, far: f32) -> Mat4 {
        // Square frustum wide enough to cover the full outer cone.
        let fov = 2.0 * outer_cutoff_cos.clamp(-1.0, 1.0).acos();
        Mat4::perspective(fov, 1.0, near, far)
    }

    fn light_view(position: Vec3, direction: Vec3) -> Mat4 {
        let forward = direction.normalize();
        // World up degenerates when the light looks straight up or down.
        let up = if forward.y.abs() > 0.999 {
            Vec3::new(0.0, 0.0, 1.0)
        } else {
            Vec3::new(0.0, 1.0, 0.0)
        };
        Mat4::look_at(position, position + forward, up)
    }
}

/// RAII guard pairing `begin_cast` with `end_cast`
pub struct ShadowCastScope<'a> {
    controller: &'a mut ShadowPassController,
    backend: &'a mut dyn RenderBackend,
}

impl ShadowCastScope<'_> {
    /// Submit one occluder mesh inside this scope
    pub fn cast_mesh(&mut self, context: &LightingContext, mesh: &Mesh, transform: &Mat4) {
        self.controller.cast_mesh(context, self.backend, mesh, transform);
    }

    /// Submit a model's parts inside this scope
    pub fn cast_model(&mut self, context: &LightingContext, model: &Model) {
        self.controller.cast_model(context, self.backend, model);
    }
}

impl Drop for ShadowCastScope<'_> {
    fn drop(&mut self) {
        if self.controller.is_casting() {
            self.controller.end_cast(self.backend);
        }
    }
}
