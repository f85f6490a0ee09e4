//! Per-light shadow casters
//!
//! A [`ShadowCaster`] owns one light's private depth target: a square depth
//! texture, the framebuffer wrapping it, and the light-space transform cached
//! by the most recent shadow pass. Allocation is lazy (first shadow enable)
//! and reallocation happens only when the resolution changes.

use crate::foundation::math::Mat4;
use crate::render::api::{FramebufferHandle, RenderBackend, TextureHandle};
use crate::render::LightingResult;

/// Floor for the derived depth bias so tiny cones never reach zero bias
const MIN_DEPTH_BIAS: f32 = 1e-4;

/// One light's private depth target and cached light-space transform
#[derive(Debug, Clone)]
pub struct ShadowCaster {
    resolution: u32,
    depth_texture: TextureHandle,
    framebuffer: FramebufferHandle,
    /// Light-space transform cached by the most recent shadow pass
    pub light_space: Mat4,
    /// Depth comparison bias; slope-scaled at sample time
    pub depth_bias: f32,
    bias_overridden: bool,
}

impl ShadowCaster {
    /// Allocate a depth target of `resolution` x `resolution` texels
    ///
    /// The default depth bias is derived from the resolution and the light's
    /// outer cone angle (one texel of angular footprint at the cone edge).
    pub fn allocate(
        backend: &mut dyn RenderBackend,
        resolution: u32,
        outer_cutoff_cos: f32,
    ) -> LightingResult<Self> {
        let depth_texture = backend.create_depth_texture(resolution)?;
        let framebuffer = match backend.create_depth_framebuffer(depth_texture) {
            Ok(framebuffer) => framebuffer,
            Err(e) => {
                backend.destroy_texture(depth_texture);
                return Err(e);
            }
        };
        log::debug!("allocated {resolution}x{resolution} shadow depth target");
        Ok(Self {
            resolution,
            depth_texture,
            framebuffer,
            light_space: Mat4::identity(),
            depth_bias: Self::default_bias(resolution, outer_cutoff_cos),
            bias_overridden: false,
        })
    }

    /// Release the GPU resources owned by this caster
    pub fn release(&self, backend: &mut dyn RenderBackend) {
        backend.destroy_framebuffer(self.framebuffer);
        backend.destroy_texture(self.depth_texture);
        log::debug!("released {res}x{res} shadow depth target", res = self.resolution);
    }

    /// Derived default bias: one texel of angular footprint at the cone edge
    pub fn default_bias(resolution: u32, outer_cutoff_cos: f32) -> f32 {
        let half_angle = outer_cutoff_cos.clamp(-1.0, 1.0).acos();
        ((2.0 * half_angle) / resolution as f32).max(MIN_DEPTH_BIAS)
    }

    /// Override the derived depth bias
    pub fn set_bias(&mut self, bias: f32) {
        self.depth_bias = bias;
        self.bias_overridden = true;
    }

    /// Whether the caller replaced the derived bias
    pub fn bias_overridden(&self) -> bool {
        self.bias_overridden
    }

    /// Depth-target resolution (square)
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Size of one depth texel in UV space
    pub fn texel_size(&self) -> f32 {
        1.0 / self.resolution as f32
    }

    /// The depth texture the shadow test samples
    pub fn depth_texture(&self) -> TextureHandle {
        self.depth_texture
    }

    /// The framebuffer the shadow pass renders into
    pub fn framebuffer(&self) -> FramebufferHandle {
        self.framebuffer
    }
}
