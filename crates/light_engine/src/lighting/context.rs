//! Lighting contexts and their registry
//!
//! A [`LightingContext`] aggregates a fixed-size light array, context-wide
//! material defaults, and the three shader programs the subsystem drives
//! (forward shading, depth-only, shadow-map debug). [`LightingSystem`] owns
//! any number of contexts in a slotmap and tracks which one is active; it is
//! an explicit value the host threads through its calls, not a process-wide
//! global.
//!
//! Every property mutator is write-through: it updates the in-memory record
//! and immediately uploads the field to the forward program. Repeated writes
//! without a draw are safe but redundant; there is no dirty tracking.
//! Out-of-range light indices log an error and are no-ops; queries return a
//! zero-value sentinel.

use slotmap::{new_key_type, SlotMap};

use crate::core::config::{LightingConfig, ShadowConfig};
use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::lighting::light::{Attenuation, Light, LightType};
use crate::lighting::material::{MaterialDefaults, MaterialMaps};
use crate::lighting::params::{
    DepthParams, GpuLightBlock, LightProperty, MaterialProperty, ParamTable, TextureSlot,
    TextureUnits, MAX_LIGHTS,
};
use crate::lighting::shadow::ShadowCaster;
use crate::render::api::{
    RenderBackend, ShaderHandle, ShaderKind, TextureHandle, UniformValue,
};
use crate::render::primitives::{MaterialBindings, Mesh, Model};
use crate::render::LightingResult;
use crate::shading::ShadingModelKind;

new_key_type! {
    /// Key identifying a context inside a [`LightingSystem`]
    pub struct ContextKey;
}

/// The three shader programs a context drives
#[derive(Debug, Clone, Copy)]
struct ContextShaders {
    forward: ShaderHandle,
    depth: ShaderHandle,
    debug: ShaderHandle,
}

/// Aggregated light/material/shader state for one lighting setup
///
/// Not `Clone`: a context exclusively owns its shader programs and shadow
/// depth targets, and a copy would release them twice.
#[derive(Debug)]
pub struct LightingContext {
    lights: Vec<Light>,
    materials: MaterialDefaults,
    shaders: ContextShaders,
    params: ParamTable,
    depth_params: DepthParams,
    shading_model: ShadingModelKind,
    shadow_config: ShadowConfig,
}

impl LightingContext {
    fn create(
        backend: &mut dyn RenderBackend,
        light_count: usize,
        shading_model: ShadingModelKind,
        shadow_config: ShadowConfig,
    ) -> LightingResult<Self> {
        let forward = backend.create_shader(ShaderKind::ForwardLit)?;
        let depth = match backend.create_shader(ShaderKind::DepthOnly) {
            Ok(shader) => shader,
            Err(e) => {
                backend.destroy_shader(forward);
                return Err(e);
            }
        };
        let debug = match backend.create_shader(ShaderKind::ShadowMapDebug) {
            Ok(shader) => shader,
            Err(e) => {
                backend.destroy_shader(forward);
                backend.destroy_shader(depth);
                return Err(e);
            }
        };

        let params = ParamTable::resolve(backend, forward, light_count);
        let depth_params = DepthParams::resolve(backend, depth);
        let context = Self {
            lights: vec![Light::default(); light_count],
            materials: MaterialDefaults::default(),
            shaders: ContextShaders {
                forward,
                depth,
                debug,
            },
            params,
            depth_params,
            shading_model,
            shadow_config,
        };
        context.upload_all(backend);
        Ok(context)
    }

    fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        for light in &mut self.lights {
            if let Some(caster) = light.shadow.take() {
                caster.release(backend);
            }
        }
        backend.destroy_shader(self.shaders.forward);
        backend.destroy_shader(self.shaders.depth);
        backend.destroy_shader(self.shaders.debug);
    }

    /// Number of light slots in this context
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// All light records, for the shading pipeline
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Context-wide material defaults
    pub fn materials(&self) -> &MaterialDefaults {
        &self.materials
    }

    /// The shading model selected at creation
    pub fn shading_model(&self) -> ShadingModelKind {
        self.shading_model
    }

    /// Shadow frustum/bias defaults this context was created with
    pub fn shadow_config(&self) -> &ShadowConfig {
        &self.shadow_config
    }

    /// The forward shading program
    pub fn forward_shader(&self) -> ShaderHandle {
        self.shaders.forward
    }

    /// The depth-only program used by the shadow pass
    pub fn depth_shader(&self) -> ShaderHandle {
        self.shaders.depth
    }

    /// The shadow-map debug-visualization program
    pub fn debug_shader(&self) -> ShaderHandle {
        self.shaders.debug
    }

    /// The write-through parameter table
    pub(crate) fn params(&self) -> &ParamTable {
        &self.params
    }

    /// The depth-only program's parameter slots
    pub(crate) fn depth_params(&self) -> &DepthParams {
        &self.depth_params
    }

    /// Mutable access to one light record for the shadow pass
    pub(crate) fn light_mut(&mut self, index: usize) -> Option<&mut Light> {
        self.lights.get_mut(index)
    }

    fn checked(&self, index: usize, operation: &str) -> bool {
        if index >= self.lights.len() {
            log::error!(
                "{operation}: light index {index} out of range (context has {} lights)",
                self.lights.len()
            );
            return false;
        }
        true
    }

    /// Push every light and material field to the forward program
    pub fn upload_all(&self, backend: &mut dyn RenderBackend) {
        self.params.upload_light_count(backend, self.lights.len());
        self.params.upload_sampler_bindings(backend);
        for index in 0..self.lights.len() {
            self.upload_light_state(backend, index);
        }
        self.upload_material_state(backend);
    }

    fn upload_light_state(&self, backend: &mut dyn RenderBackend, index: usize) {
        let light = &self.lights[index];
        let uploads: [(LightProperty, UniformValue); 16] = [
            (
                LightProperty::Type,
                UniformValue::Int(match light.light_type {
                    LightType::Directional => 0,
                    LightType::Omni => 1,
                    LightType::Spot => 2,
                }),
            ),
            (LightProperty::Position, UniformValue::Vec3(light.position)),
            (LightProperty::Direction, UniformValue::Vec3(light.direction)),
            (LightProperty::Color, UniformValue::Vec3(light.color)),
            (LightProperty::Energy, UniformValue::Float(light.energy)),
            (
                LightProperty::SpecularStrength,
                UniformValue::Float(light.specular_strength),
            ),
            (LightProperty::Size, UniformValue::Float(light.size)),
            (
                LightProperty::InnerCutoff,
                UniformValue::Float(light.inner_cutoff),
            ),
            (
                LightProperty::OuterCutoff,
                UniformValue::Float(light.outer_cutoff),
            ),
            (
                LightProperty::AttenuationConstant,
                UniformValue::Float(light.attenuation.constant),
            ),
            (
                LightProperty::AttenuationLinear,
                UniformValue::Float(light.attenuation.linear),
            ),
            (
                LightProperty::AttenuationQuadratic,
                UniformValue::Float(light.attenuation.quadratic),
            ),
            (
                LightProperty::Enabled,
                UniformValue::Int(i32::from(light.enabled)),
            ),
            (
                LightProperty::ShadowEnabled,
                UniformValue::Int(i32::from(light.shadow.is_some())),
            ),
            (
                LightProperty::ShadowBias,
                UniformValue::Float(light.shadow.as_ref().map_or(0.0, |s| s.depth_bias)),
            ),
            (
                LightProperty::ShadowTexelSize,
                UniformValue::Float(light.shadow.as_ref().map_or(0.0, ShadowCaster::texel_size)),
            ),
        ];
        for (property, value) in uploads {
            self.params.upload_light(backend, index, property, value);
        }
        if let Some(caster) = &light.shadow {
            self.params
                .upload_light_space(backend, index, UniformValue::Mat4(caster.light_space));
            self.params.upload_shadow_sampler(backend, index);
        }
    }

    fn upload_material_state(&self, backend: &mut dyn RenderBackend) {
        let m = &self.materials;
        let uploads: [(MaterialProperty, UniformValue); 15] = [
            (MaterialProperty::AmbientColor, UniformValue::Vec3(m.ambient)),
            (MaterialProperty::EmissiveColor, UniformValue::Vec3(m.emissive)),
            (MaterialProperty::Metalness, UniformValue::Float(m.metalness)),
            (MaterialProperty::Roughness, UniformValue::Float(m.roughness)),
            (MaterialProperty::Specular, UniformValue::Float(m.specular)),
            (MaterialProperty::HeightScale, UniformValue::Float(m.height_scale)),
            (
                MaterialProperty::ParallaxMinLayers,
                UniformValue::Int(m.parallax_min_layers as i32),
            ),
            (
                MaterialProperty::ParallaxMaxLayers,
                UniformValue::Int(m.parallax_max_layers as i32),
            ),
            (
                MaterialProperty::UseNormalMap,
                UniformValue::Int(i32::from(m.maps.contains(MaterialMaps::NORMAL))),
            ),
            (
                MaterialProperty::UseMetalnessMap,
                UniformValue::Int(i32::from(m.maps.contains(MaterialMaps::METALNESS))),
            ),
            (
                MaterialProperty::UseRoughnessMap,
                UniformValue::Int(i32::from(m.maps.contains(MaterialMaps::ROUGHNESS))),
            ),
            (
                MaterialProperty::UseOcclusionMap,
                UniformValue::Int(i32::from(m.maps.contains(MaterialMaps::OCCLUSION))),
            ),
            (
                MaterialProperty::UseEmissiveMap,
                UniformValue::Int(i32::from(m.maps.contains(MaterialMaps::EMISSIVE))),
            ),
            (
                MaterialProperty::UseHeightMap,
                UniformValue::Int(i32::from(m.maps.contains(MaterialMaps::HEIGHT))),
            ),
            (
                MaterialProperty::OcclusionLightBlend,
                UniformValue::Float(m.occlusion_light_blend),
            ),
        ];
        for (property, value) in uploads {
            self.params.upload_material(backend, property, value);
        }
    }

    // --- Per-light mutators (write-through) ---------------------------------

    /// Set a light's type
    pub fn set_light_type(&mut self, backend: &mut dyn RenderBackend, index: usize, light_type: LightType) {
        if !self.checked(index, "set_light_type") {
            return;
        }
        self.lights[index].light_type = light_type;
        let value = UniformValue::Int(match light_type {
            LightType::Directional => 0,
            LightType::Omni => 1,
            LightType::Spot => 2,
        });
        self.params.upload_light(backend, index, LightProperty::Type, value);
    }

    /// Set a light's world-space position
    pub fn set_light_position(&mut self, backend: &mut dyn RenderBackend, index: usize, position: Vec3) {
        if !self.checked(index, "set_light_position") {
            return;
        }
        self.lights[index].position = position;
        self.params
            .upload_light(backend, index, LightProperty::Position, UniformValue::Vec3(position));
    }

    /// Set a light's direction (stored as given, not normalized)
    pub fn set_light_direction(&mut self, backend: &mut dyn RenderBackend, index: usize, direction: Vec3) {
        if !self.checked(index, "set_light_direction") {
            return;
        }
        self.lights[index].direction = direction;
        self.params
            .upload_light(backend, index, LightProperty::Direction, UniformValue::Vec3(direction));
    }

    /// Aim a light at a target; the stored direction is unit length
    pub fn set_light_target(&mut self, backend: &mut dyn RenderBackend, index: usize, target: Vec3) {
        if !self.checked(index, "set_light_target") {
            return;
        }
        self.lights[index].set_target(target);
        let direction = self.lights[index].direction;
        self.params
            .upload_light(backend, index, LightProperty::Direction, UniformValue::Vec3(direction));
    }

    /// Set a light's color
    pub fn set_light_color(&mut self, backend: &mut dyn RenderBackend, index: usize, color: Vec3) {
        if !self.checked(index, "set_light_color") {
            return;
        }
        self.lights[index].color = color;
        self.params
            .upload_light(backend, index, LightProperty::Color, UniformValue::Vec3(color));
    }

    /// Set a light's intensity multiplier
    pub fn set_light_energy(&mut self, backend: &mut dyn RenderBackend, index: usize, energy: f32) {
        if !self.checked(index, "set_light_energy") {
            return;
        }
        self.lights[index].energy = energy;
        self.params
            .upload_light(backend, index, LightProperty::Energy, UniformValue::Float(energy));
    }

    /// Set a light's specular contribution multiplier
    pub fn set_light_specular(&mut self, backend: &mut dyn RenderBackend, index: usize, strength: f32) {
        if !self.checked(index, "set_light_specular") {
            return;
        }
        self.lights[index].specular_strength = strength;
        self.params.upload_light(
            backend,
            index,
            LightProperty::SpecularStrength,
            UniformValue::Float(strength),
        );
    }

    /// Set a light's area-light softening radius
    pub fn set_light_size(&mut self, backend: &mut dyn RenderBackend, index: usize, size: f32) {
        if !self.checked(index, "set_light_size") {
            return;
        }
        self.lights[index].size = size;
        self.params
            .upload_light(backend, index, LightProperty::Size, UniformValue::Float(size));
    }

    /// Set a spot light's inner cone half-angle in degrees
    pub fn set_light_inner_cutoff(&mut self, backend: &mut dyn RenderBackend, index: usize, degrees: f32) {
        if !self.checked(index, "set_light_inner_cutoff") {
            return;
        }
        self.lights[index].set_inner_cutoff_degrees(degrees);
        let cutoff = self.lights[index].inner_cutoff;
        self.params
            .upload_light(backend, index, LightProperty::InnerCutoff, UniformValue::Float(cutoff));
    }

    /// Set a spot light's outer cone half-angle in degrees
    pub fn set_light_outer_cutoff(&mut self, backend: &mut dyn RenderBackend, index: usize, degrees: f32) {
        if !self.checked(index, "set_light_outer_cutoff") {
            return;
        }
        self.lights[index].set_outer_cutoff_degrees(degrees);
        let cutoff = self.lights[index].outer_cutoff;
        self.params
            .upload_light(backend, index, LightProperty::OuterCutoff, UniformValue::Float(cutoff));
    }

    /// Set a light's attenuation terms
    pub fn set_light_attenuation(
        &mut self,
        backend: &mut dyn RenderBackend,
        index: usize,
        attenuation: Attenuation,
    ) {
        if !self.checked(index, "set_light_attenuation") {
            return;
        }
        if attenuation.constant <= 0.0 {
            log::warn!("attenuation constant must stay above zero; falloff is undefined at distance 0");
        }
        self.lights[index].attenuation = attenuation;
        self.params.upload_light(
            backend,
            index,
            LightProperty::AttenuationConstant,
            UniformValue::Float(attenuation.constant),
        );
        self.params.upload_light(
            backend,
            index,
            LightProperty::AttenuationLinear,
            UniformValue::Float(attenuation.linear),
        );
        self.params.upload_light(
            backend,
            index,
            LightProperty::AttenuationQuadratic,
            UniformValue::Float(attenuation.quadratic),
        );
    }

    /// Enable a light
    pub fn enable_light(&mut self, backend: &mut dyn RenderBackend, index: usize) {
        self.set_light_enabled(backend, index, true);
    }

    /// Disable a light
    pub fn disable_light(&mut self, backend: &mut dyn RenderBackend, index: usize) {
        self.set_light_enabled(backend, index, false);
    }

    /// Flip a light's enablement
    pub fn toggle_light(&mut self, backend: &mut dyn RenderBackend, index: usize) {
        if !self.checked(index, "toggle_light") {
            return;
        }
        let enabled = !self.lights[index].enabled;
        self.set_light_enabled(backend, index, enabled);
    }

    /// Set a light's enablement
    pub fn set_light_enabled(&mut self, backend: &mut dyn RenderBackend, index: usize, enabled: bool) {
        if !self.checked(index, "set_light_enabled") {
            return;
        }
        self.lights[index].enabled = enabled;
        self.params.upload_light(
            backend,
            index,
            LightProperty::Enabled,
            UniformValue::Int(i32::from(enabled)),
        );
    }

    // --- Per-light queries (zero sentinel when out of range) ----------------

    /// Whether a light is enabled; `false` when out of range
    pub fn is_light_enabled(&self, index: usize) -> bool {
        if !self.checked(index, "is_light_enabled") {
            return false;
        }
        self.lights[index].enabled
    }

    /// A light's type; `Directional` when out of range
    pub fn light_type(&self, index: usize) -> LightType {
        if !self.checked(index, "light_type") {
            return LightType::Directional;
        }
        self.lights[index].light_type
    }

    /// A light's position; zeros when out of range
    pub fn light_position(&self, index: usize) -> Vec3 {
        if !self.checked(index, "light_position") {
            return Vec3::zeros();
        }
        self.lights[index].position
    }

    /// A light's direction; zeros when out of range
    pub fn light_direction(&self, index: usize) -> Vec3 {
        if !self.checked(index, "light_direction") {
            return Vec3::zeros();
        }
        self.lights[index].direction
    }

    /// A light's color; zeros when out of range
    pub fn light_color(&self, index: usize) -> Vec3 {
        if !self.checked(index, "light_color") {
            return Vec3::zeros();
        }
        self.lights[index].color
    }

    /// A light's energy; 0.0 when out of range
    pub fn light_energy(&self, index: usize) -> f32 {
        if !self.checked(index, "light_energy") {
            return 0.0;
        }
        self.lights[index].energy
    }

    /// A light's inner cone half-angle in degrees; 0.0 when out of range
    pub fn light_inner_cutoff(&self, index: usize) -> f32 {
        if !self.checked(index, "light_inner_cutoff") {
            return 0.0;
        }
        self.lights[index].inner_cutoff_degrees()
    }

    /// A light's outer cone half-angle in degrees; 0.0 when out of range
    pub fn light_outer_cutoff(&self, index: usize) -> f32 {
        if !self.checked(index, "light_outer_cutoff") {
            return 0.0;
        }
        self.lights[index].outer_cutoff_degrees()
    }

    /// A light's attenuation; defaults when out of range
    pub fn light_attenuation(&self, index: usize) -> Attenuation {
        if !self.checked(index, "light_attenuation") {
            return Attenuation::default();
        }
        self.lights[index].attenuation
    }

    // --- Shadow lifecycle ---------------------------------------------------

    /// Enable shadow casting for a light, allocating its depth target lazily
    ///
    /// Re-enabling at the same resolution is a no-op (the depth target is
    /// stable); a different resolution releases the old target first and
    /// allocates exactly once.
    pub fn enable_shadows(
        &mut self,
        backend: &mut dyn RenderBackend,
        index: usize,
        resolution: u32,
    ) -> LightingResult<()> {
        if !self.checked(index, "enable_shadows") {
            return Ok(());
        }
        if resolution == 0 {
            log::error!("enable_shadows: resolution must be positive");
            return Ok(());
        }
        if self.lights[index].light_type == LightType::Omni {
            log::warn!(
                "shadow casting for omni light {index} uses a spot-style frustum; results will be incomplete"
            );
        }

        if let Some(existing) = &self.lights[index].shadow {
            if existing.resolution() == resolution {
                return Ok(());
            }
            let old = self.lights[index].shadow.take();
            if let Some(old) = old {
                old.release(backend);
            }
        }

        let caster = ShadowCaster::allocate(backend, resolution, self.lights[index].outer_cutoff)?;
        self.lights[index].shadow = Some(caster);
        self.upload_shadow_state(backend, index);
        Ok(())
    }

    /// Disable shadow casting for a light, releasing its depth target
    pub fn disable_shadows(&mut self, backend: &mut dyn RenderBackend, index: usize) {
        if !self.checked(index, "disable_shadows") {
            return;
        }
        if let Some(caster) = self.lights[index].shadow.take() {
            caster.release(backend);
        }
        self.params.upload_light(
            backend,
            index,
            LightProperty::ShadowEnabled,
            UniformValue::Int(0),
        );
    }

    /// Override a light's shadow depth bias
    pub fn set_shadow_bias(&mut self, backend: &mut dyn RenderBackend, index: usize, bias: f32) {
        if !self.checked(index, "set_shadow_bias") {
            return;
        }
        match &mut self.lights[index].shadow {
            Some(caster) => {
                caster.set_bias(bias);
                self.params.upload_light(
                    backend,
                    index,
                    LightProperty::ShadowBias,
                    UniformValue::Float(bias),
                );
            }
            None => log::error!("set_shadow_bias: light {index} has no shadow caster"),
        }
    }

    /// A light's shadow depth texture, if shadows are enabled
    pub fn shadow_depth_texture(&self, index: usize) -> Option<TextureHandle> {
        if !self.checked(index, "shadow_depth_texture") {
            return None;
        }
        self.lights[index].shadow.as_ref().map(ShadowCaster::depth_texture)
    }

    fn upload_shadow_state(&self, backend: &mut dyn RenderBackend, index: usize) {
        let Some(caster) = &self.lights[index].shadow else {
            return;
        };
        self.params.upload_light(
            backend,
            index,
            LightProperty::ShadowEnabled,
            UniformValue::Int(1),
        );
        self.params.upload_light(
            backend,
            index,
            LightProperty::ShadowBias,
            UniformValue::Float(caster.depth_bias),
        );
        self.params.upload_light(
            backend,
            index,
            LightProperty::ShadowTexelSize,
            UniformValue::Float(caster.texel_size()),
        );
        self.params.upload_shadow_sampler(backend, index);
    }

    // --- Material mutators (write-through) ----------------------------------

    /// Set the ambient tint
    pub fn set_ambient_color(&mut self, backend: &mut dyn RenderBackend, color: Vec3) {
        self.materials.ambient = color;
        self.params
            .upload_material(backend, MaterialProperty::AmbientColor, UniformValue::Vec3(color));
    }

    /// Set the emissive tint
    pub fn set_emissive_color(&mut self, backend: &mut dyn RenderBackend, color: Vec3) {
        self.materials.emissive = color;
        self.params
            .upload_material(backend, MaterialProperty::EmissiveColor, UniformValue::Vec3(color));
    }

    /// Set the metalness fallback
    pub fn set_metalness(&mut self, backend: &mut dyn RenderBackend, metalness: f32) {
        self.materials.metalness = metalness;
        self.params
            .upload_material(backend, MaterialProperty::Metalness, UniformValue::Float(metalness));
    }

    /// Set the roughness fallback
    pub fn set_roughness(&mut self, backend: &mut dyn RenderBackend, roughness: f32) {
        self.materials.roughness = roughness;
        self.params
            .upload_material(backend, MaterialProperty::Roughness, UniformValue::Float(roughness));
    }

    /// Set the specular reflectance scalar
    pub fn set_specular(&mut self, backend: &mut dyn RenderBackend, specular: f32) {
        self.materials.specular = specular;
        self.params
            .upload_material(backend, MaterialProperty::Specular, UniformValue::Float(specular));
    }

    /// Set the parallax displacement scale
    pub fn set_height_scale(&mut self, backend: &mut dyn RenderBackend, scale: f32) {
        self.materials.height_scale = scale;
        self.params
            .upload_material(backend, MaterialProperty::HeightScale, UniformValue::Float(scale));
    }

    /// Set the parallax layer bounds; steep parallax needs `min > 0, max > 1`
    pub fn set_parallax_layers(&mut self, backend: &mut dyn RenderBackend, min: u32, max: u32) {
        self.materials.parallax_min_layers = min;
        self.materials.parallax_max_layers = max;
        self.params.upload_material(
            backend,
            MaterialProperty::ParallaxMinLayers,
            UniformValue::Int(min as i32),
        );
        self.params.upload_material(
            backend,
            MaterialProperty::ParallaxMaxLayers,
            UniformValue::Int(max as i32),
        );
    }

    /// Toggle one optional texture map
    pub fn set_map_enabled(&mut self, backend: &mut dyn RenderBackend, map: MaterialMaps, enabled: bool) {
        self.materials.maps.set(map, enabled);
        if let Some(property) = MaterialProperty::for_map(map) {
            self.params
                .upload_material(backend, property, UniformValue::Int(i32::from(enabled)));
        }
    }

    /// Set how strongly sampled occlusion dampens direct lighting
    pub fn set_occlusion_light_blend(&mut self, backend: &mut dyn RenderBackend, blend: f32) {
        self.materials.occlusion_light_blend = blend;
        self.params.upload_material(
            backend,
            MaterialProperty::OcclusionLightBlend,
            UniformValue::Float(blend),
        );
    }

    /// Upload the camera position used by the specular terms
    pub fn set_view_position(&mut self, backend: &mut dyn RenderBackend, position: Vec3) {
        self.params
            .upload_view_position(backend, UniformValue::Vec3(position));
    }

    // --- Lit draw submission ------------------------------------------------

    /// Draw a mesh through the forward shading program
    ///
    /// Binds material maps into their semantic texture units, shadow maps
    /// into the units following them, computes one MVP per eye, and fully
    /// unbinds vertex state afterward.
    pub fn draw_mesh(
        &self,
        backend: &mut dyn RenderBackend,
        mesh: &Mesh,
        material: &MaterialBindings,
        model: &Mat4,
    ) {
        backend.use_shader(self.shaders.forward);
        self.params
            .upload_model_matrix(backend, UniformValue::Mat4(*model));
        self.params.upload_base_color(
            backend,
            UniformValue::Vec4(material.base_color.unwrap_or_else(|| Vec4::new(1.0, 1.0, 1.0, 1.0))),
        );
        self.upload_scalar_overrides(backend, material);
        self.bind_material_textures(backend, material);
        self.bind_shadow_maps(backend);

        for eye in 0..backend.eye_count() {
            let mvp = backend.eye_view_projection(eye) * model;
            self.params.upload_mvp(backend, UniformValue::Mat4(mvp));
            backend.draw_mesh(mesh.handle);
        }
        backend.unbind_vertex_state();

        // Write-through means the overrides are now live on the GPU; put the
        // context defaults back so state and program stay in agreement.
        self.restore_scalar_defaults(backend, material);
    }

    /// Draw every part of a model through the forward shading program
    pub fn draw_model(&self, backend: &mut dyn RenderBackend, model: &Model) {
        for (mesh, material) in &model.parts {
            self.draw_mesh(backend, mesh, material, &model.transform);
        }
    }

    fn upload_scalar_overrides(&self, backend: &mut dyn RenderBackend, material: &MaterialBindings) {
        if let Some(metalness) = material.metalness_value {
            self.params
                .upload_material(backend, MaterialProperty::Metalness, UniformValue::Float(metalness));
        }
        if let Some(roughness) = material.roughness_value {
            self.params
                .upload_material(backend, MaterialProperty::Roughness, UniformValue::Float(roughness));
        }
        if let Some(specular) = material.specular_value {
            self.params
                .upload_material(backend, MaterialProperty::Specular, UniformValue::Float(specular));
        }
    }

    fn restore_scalar_defaults(&self, backend: &mut dyn RenderBackend, material: &MaterialBindings) {
        if material.metalness_value.is_some() {
            self.params.upload_material(
                backend,
                MaterialProperty::Metalness,
                UniformValue::Float(self.materials.metalness),
            );
        }
        if material.roughness_value.is_some() {
            self.params.upload_material(
                backend,
                MaterialProperty::Roughness,
                UniformValue::Float(self.materials.roughness),
            );
        }
        if material.specular_value.is_some() {
            self.params.upload_material(
                backend,
                MaterialProperty::Specular,
                UniformValue::Float(self.materials.specular),
            );
        }
    }

    fn bind_material_textures(&self, backend: &mut dyn RenderBackend, material: &MaterialBindings) {
        let bindings = [
            (TextureSlot::Albedo, material.albedo),
            (TextureSlot::Specular, material.specular),
            (TextureSlot::Metalness, material.metalness),
            (TextureSlot::Roughness, material.roughness),
            (TextureSlot::Normal, material.normal),
            (TextureSlot::Occlusion, material.occlusion),
            (TextureSlot::Emissive, material.emissive),
            (TextureSlot::Height, material.height),
        ];
        for (slot, texture) in bindings {
            if let Some(texture) = texture {
                backend.bind_texture(TextureUnits::unit(slot), texture);
            }
        }
    }

    fn bind_shadow_maps(&self, backend: &mut dyn RenderBackend) {
        for (index, light) in self.lights.iter().enumerate() {
            if let Some(caster) = &light.shadow {
                backend.bind_texture(
                    TextureUnits::unit(TextureSlot::ShadowMap(index)),
                    caster.depth_texture(),
                );
            }
        }
    }

    /// Pack the context for hosts that upload one uniform buffer instead of
    /// per-field parameters
    pub fn gpu_light_block(&self) -> GpuLightBlock {
        GpuLightBlock::pack(&self.lights, &self.materials)
    }
}

/// Registry of lighting contexts plus the active-context selector
///
/// An explicit value threaded through host calls; replaces the original
/// design's process-wide active-context pointer.
#[derive(Default)]
pub struct LightingSystem {
    contexts: SlotMap<ContextKey, LightingContext>,
    active: Option<ContextKey>,
}

impl LightingSystem {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with `light_count` default-initialized lights
    ///
    /// Counts above [`MAX_LIGHTS`] log an error and are clamped. Shader or
    /// depth-target allocation failure is fatal for the context and is
    /// returned as an error; no partial context is registered.
    pub fn create_context(
        &mut self,
        backend: &mut dyn RenderBackend,
        light_count: usize,
        shading_model: ShadingModelKind,
    ) -> LightingResult<ContextKey> {
        self.create_context_with_config(
            backend,
            light_count,
            shading_model,
            ShadowConfig::default(),
        )
    }

    /// Create a context taking light count and shadow defaults from a config
    pub fn create_context_from_config(
        &mut self,
        backend: &mut dyn RenderBackend,
        config: &LightingConfig,
    ) -> LightingResult<ContextKey> {
        self.create_context_with_config(
            backend,
            config.max_lights,
            config.shading_model,
            config.shadow.clone(),
        )
    }

    fn create_context_with_config(
        &mut self,
        backend: &mut dyn RenderBackend,
        light_count: usize,
        shading_model: ShadingModelKind,
        shadow_config: ShadowConfig,
    ) -> LightingResult<ContextKey> {
        let count = if light_count > MAX_LIGHTS {
            log::error!("light count {light_count} exceeds the {MAX_LIGHTS}-light limit, clamping");
            MAX_LIGHTS
        } else {
            light_count
        };
        let context = LightingContext::create(backend, count, shading_model, shadow_config)?;
        let key = self.contexts.insert(context);
        log::debug!("created lighting context with {count} light slots");
        Ok(key)
    }

    /// Destroy a context, releasing its shadow targets and shader programs
    ///
    /// Destroying an already-destroyed context logs an error and is a no-op.
    pub fn destroy_context(&mut self, backend: &mut dyn RenderBackend, key: ContextKey) {
        match self.contexts.remove(key) {
            Some(mut context) => {
                context.destroy(backend);
                if self.active == Some(key) {
                    self.active = None;
                }
                log::debug!("destroyed lighting context");
            }
            None => log::error!("destroy_context: context already destroyed or unknown"),
        }
    }

    /// Make a context the active one; unknown keys log an error and no-op
    pub fn activate(&mut self, key: ContextKey) {
        if self.contexts.contains_key(key) {
            self.active = Some(key);
        } else {
            log::error!("activate: context unknown or destroyed");
        }
    }

    /// Key of the active context, if any
    pub fn current(&self) -> Option<ContextKey> {
        self.active
    }

    /// The active context
    pub fn active(&self) -> Option<&LightingContext> {
        self.active.and_then(|key| self.contexts.get(key))
    }

    /// The active context, mutably
    pub fn active_mut(&mut self) -> Option<&mut LightingContext> {
        self.active.and_then(|key| self.contexts.get_mut(key))
    }

    /// Look up a context by key
    pub fn get(&self, key: ContextKey) -> Option<&LightingContext> {
        self.contexts.get(key)
    }

    /// Look up a context by key, mutably
    pub fn get_mut(&mut self, key: ContextKey) -> Option<&mut LightingContext> {
        self.contexts.get_mut(key)
    }

    /// Number of live contexts
    pub fn context_count(&self) -> usize {
        self.contexts.len()
    }
}
