//! Shader parameter table and texture-unit allocation
//!
//! Every write-through upload funnels through [`ParamTable`], which resolves
//! each named shader parameter exactly once at context creation. Per-field
//! uploads stay cheap and dumb (no dirty tracking); batching could be added
//! behind this table without touching the public mutators.
//!
//! Texture units are assigned by [`TextureUnits`] keyed on semantic slot, so
//! shadow maps always land after the material maps even if the material map
//! set changes.

use std::collections::HashMap;

use crate::lighting::light::{Light, LightType};
use crate::lighting::material::{MaterialDefaults, MaterialMaps};
use crate::render::api::{RenderBackend, ShaderHandle, UniformLocation, UniformValue};

/// Typed per-light property kinds exposed at the host boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightProperty {
    /// Light type as an integer
    Type,
    /// World-space position
    Position,
    /// World-space direction
    Direction,
    /// Diffuse color
    Color,
    /// Intensity multiplier
    Energy,
    /// Specular contribution multiplier
    SpecularStrength,
    /// Area-light softening radius
    Size,
    /// Cosine of the inner spot half-angle
    InnerCutoff,
    /// Cosine of the outer spot half-angle
    OuterCutoff,
    /// Constant attenuation term
    AttenuationConstant,
    /// Linear attenuation term
    AttenuationLinear,
    /// Quadratic attenuation term
    AttenuationQuadratic,
    /// Enablement flag
    Enabled,
    /// Shadow-test flag
    ShadowEnabled,
    /// Depth comparison bias
    ShadowBias,
    /// Size of one shadow texel in UV space
    ShadowTexelSize,
}

impl LightProperty {
    /// Field name inside the shader's per-light struct
    fn field_name(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Position => "position",
            Self::Direction => "direction",
            Self::Color => "color",
            Self::Energy => "energy",
            Self::SpecularStrength => "specular",
            Self::Size => "size",
            Self::InnerCutoff => "innerCutOff",
            Self::OuterCutoff => "outerCutOff",
            Self::AttenuationConstant => "constant",
            Self::AttenuationLinear => "linear",
            Self::AttenuationQuadratic => "quadratic",
            Self::Enabled => "enabled",
            Self::ShadowEnabled => "shadow",
            Self::ShadowBias => "depthBias",
            Self::ShadowTexelSize => "shadowTexelSize",
        }
    }

    const ALL: [Self; 16] = [
        Self::Type,
        Self::Position,
        Self::Direction,
        Self::Color,
        Self::Energy,
        Self::SpecularStrength,
        Self::Size,
        Self::InnerCutoff,
        Self::OuterCutoff,
        Self::AttenuationConstant,
        Self::AttenuationLinear,
        Self::AttenuationQuadratic,
        Self::Enabled,
        Self::ShadowEnabled,
        Self::ShadowBias,
        Self::ShadowTexelSize,
    ];
}

/// Context-global material parameter kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialProperty {
    /// Ambient tint
    AmbientColor,
    /// Emissive tint
    EmissiveColor,
    /// Metalness fallback
    Metalness,
    /// Roughness fallback
    Roughness,
    /// Specular reflectance scalar
    Specular,
    /// Parallax displacement scale
    HeightScale,
    /// Minimum parallax layer count
    ParallaxMinLayers,
    /// Maximum parallax layer count
    ParallaxMaxLayers,
    /// Normal-map toggle
    UseNormalMap,
    /// Metalness-map toggle
    UseMetalnessMap,
    /// Roughness-map toggle
    UseRoughnessMap,
    /// Occlusion-map toggle
    UseOcclusionMap,
    /// Emissive-map toggle
    UseEmissiveMap,
    /// Height-map toggle
    UseHeightMap,
    /// Occlusion dampening of direct light
    OcclusionLightBlend,
}

impl MaterialProperty {
    /// Shader parameter name
    fn uniform_name(self) -> &'static str {
        match self {
            Self::AmbientColor => "ambientColor",
            Self::EmissiveColor => "emissiveColor",
            Self::Metalness => "metalnessValue",
            Self::Roughness => "roughnessValue",
            Self::Specular => "specularValue",
            Self::HeightScale => "heightScale",
            Self::ParallaxMinLayers => "parallaxMinLayers",
            Self::ParallaxMaxLayers => "parallaxMaxLayers",
            Self::UseNormalMap => "useNormalMap",
            Self::UseMetalnessMap => "useMetalnessMap",
            Self::UseRoughnessMap => "useRoughnessMap",
            Self::UseOcclusionMap => "useOcclusionMap",
            Self::UseEmissiveMap => "useEmissiveMap",
            Self::UseHeightMap => "useHeightMap",
            Self::OcclusionLightBlend => "occlusionLightBlend",
        }
    }

    /// The toggle property controlling a given map flag, if any
    pub fn for_map(flag: MaterialMaps) -> Option<Self> {
        match flag {
            MaterialMaps::NORMAL => Some(Self::UseNormalMap),
            MaterialMaps::METALNESS => Some(Self::UseMetalnessMap),
            MaterialMaps::ROUGHNESS => Some(Self::UseRoughnessMap),
            MaterialMaps::OCCLUSION => Some(Self::UseOcclusionMap),
            MaterialMaps::EMISSIVE => Some(Self::UseEmissiveMap),
            MaterialMaps::HEIGHT => Some(Self::UseHeightMap),
            _ => None,
        }
    }

    const ALL: [Self; 15] = [
        Self::AmbientColor,
        Self::EmissiveColor,
        Self::Metalness,
        Self::Roughness,
        Self::Specular,
        Self::HeightScale,
        Self::ParallaxMinLayers,
        Self::ParallaxMaxLayers,
        Self::UseNormalMap,
        Self::UseMetalnessMap,
        Self::UseRoughnessMap,
        Self::UseOcclusionMap,
        Self::UseEmissiveMap,
        Self::UseHeightMap,
        Self::OcclusionLightBlend,
    ];
}

/// Semantic texture slots consumed by the forward shading program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    /// Albedo/diffuse map
    Albedo,
    /// Specular map
    Specular,
    /// Metalness map
    Metalness,
    /// Roughness map
    Roughness,
    /// Tangent-space normal map
    Normal,
    /// Ambient-occlusion map
    Occlusion,
    /// Emissive map
    Emissive,
    /// Height map
    Height,
    /// Irradiance cubemap
    Irradiance,
    /// Reflection cubemap
    Reflection,
    /// One light's shadow depth map
    ShadowMap(usize),
}

/// Explicit texture-unit allocator keyed by semantic slot
///
/// Material slots occupy a fixed prefix of units; shadow maps follow
/// immediately after, one unit per light slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextureUnits;

impl TextureUnits {
    const MATERIAL_SLOTS: [TextureSlot; 10] = [
        TextureSlot::Albedo,
        TextureSlot::Specular,
        TextureSlot::Metalness,
        TextureSlot::Roughness,
        TextureSlot::Normal,
        TextureSlot::Occlusion,
        TextureSlot::Emissive,
        TextureSlot::Height,
        TextureSlot::Irradiance,
        TextureSlot::Reflection,
    ];

    /// Texture unit for a semantic slot
    pub fn unit(slot: TextureSlot) -> u32 {
        match slot {
            TextureSlot::ShadowMap(index) => Self::MATERIAL_SLOTS.len() as u32 + index as u32,
            other => Self::MATERIAL_SLOTS
                .iter()
                .position(|&s| s == other)
                .map(|p| p as u32)
                .unwrap_or(0),
        }
    }

    /// First unit past the material maps (where shadow maps start)
    pub fn shadow_base() -> u32 {
        Self::MATERIAL_SLOTS.len() as u32
    }

    /// Sampler uniform name for a slot
    pub fn sampler_name(slot: TextureSlot) -> String {
        match slot {
            TextureSlot::Albedo => "albedoMap".to_string(),
            TextureSlot::Specular => "specularMap".to_string(),
            TextureSlot::Metalness => "metalnessMap".to_string(),
            TextureSlot::Roughness => "roughnessMap".to_string(),
            TextureSlot::Normal => "normalMap".to_string(),
            TextureSlot::Occlusion => "occlusionMap".to_string(),
            TextureSlot::Emissive => "emissiveMap".to_string(),
            TextureSlot::Height => "heightMap".to_string(),
            TextureSlot::Irradiance => "irradianceMap".to_string(),
            TextureSlot::Reflection => "reflectionMap".to_string(),
            TextureSlot::ShadowMap(index) => format!("shadowMap[{index}]"),
        }
    }
}

/// Resolved per-light parameter locations
#[derive(Debug, Clone)]
struct LightSlots {
    fields: HashMap<LightProperty, UniformLocation>,
    light_space: UniformLocation,
    shadow_sampler: UniformLocation,
}

/// Per-context cache of resolved shader-parameter locations
///
/// The single write-through upload path: mutators update the in-memory
/// record, then push the field here.
#[derive(Debug, Clone)]
pub struct ParamTable {
    shader: ShaderHandle,
    lights: Vec<LightSlots>,
    material: HashMap<MaterialProperty, UniformLocation>,
    material_samplers: Vec<(TextureSlot, UniformLocation)>,
    light_count: UniformLocation,
    view_position: UniformLocation,
    model_matrix: UniformLocation,
    mvp_matrix: UniformLocation,
    base_color: UniformLocation,
}

impl ParamTable {
    /// Resolve every parameter the forward program declares, once
    pub fn resolve(
        backend: &mut dyn RenderBackend,
        shader: ShaderHandle,
        light_count: usize,
    ) -> Self {
        let mut lights = Vec::with_capacity(light_count);
        for i in 0..light_count {
            let mut fields = HashMap::new();
            for property in LightProperty::ALL {
                let name = format!("lights[{i}].{}", property.field_name());
                fields.insert(property, backend.uniform_location(shader, &name));
            }
            lights.push(LightSlots {
                fields,
                light_space: backend.uniform_location(shader, &format!("lightVP[{i}]")),
                shadow_sampler: backend
                    .uniform_location(shader, &TextureUnits::sampler_name(TextureSlot::ShadowMap(i))),
            });
        }

        let mut material = HashMap::new();
        for property in MaterialProperty::ALL {
            material.insert(
                property,
                backend.uniform_location(shader, property.uniform_name()),
            );
        }

        let material_samplers = Self::MATERIAL_SLOT_LIST
            .iter()
            .map(|&slot| {
                let location =
                    backend.uniform_location(shader, &TextureUnits::sampler_name(slot));
                (slot, location)
            })
            .collect();

        Self {
            shader,
            lights,
            material,
            material_samplers,
            light_count: backend.uniform_location(shader, "lightCount"),
            view_position: backend.uniform_location(shader, "viewPos"),
            model_matrix: backend.uniform_location(shader, "matModel"),
            mvp_matrix: backend.uniform_location(shader, "mvp"),
            base_color: backend.uniform_location(shader, "baseColor"),
        }
    }

    const MATERIAL_SLOT_LIST: [TextureSlot; 10] = TextureUnits::MATERIAL_SLOTS;

    /// Point every material sampler at its semantic texture unit
    ///
    /// Units never move after creation, so this runs once per context.
    pub fn upload_sampler_bindings(&self, backend: &mut dyn RenderBackend) {
        for &(slot, location) in &self.material_samplers {
            backend.set_uniform(
                self.shader,
                location,
                UniformValue::Sampler(TextureUnits::unit(slot)),
            );
        }
    }

    /// The forward program this table uploads into
    pub fn shader(&self) -> ShaderHandle {
        self.shader
    }

    /// Upload one per-light field
    pub fn upload_light(
        &self,
        backend: &mut dyn RenderBackend,
        index: usize,
        property: LightProperty,
        value: UniformValue,
    ) {
        if let Some(slots) = self.lights.get(index) {
            if let Some(&location) = slots.fields.get(&property) {
                backend.set_uniform(self.shader, location, value);
            }
        }
    }

    /// Upload a light's cached light-space matrix
    pub fn upload_light_space(
        &self,
        backend: &mut dyn RenderBackend,
        index: usize,
        value: UniformValue,
    ) {
        if let Some(slots) = self.lights.get(index) {
            backend.set_uniform(self.shader, slots.light_space, value);
        }
    }

    /// Bind a light's shadow sampler to its texture unit
    pub fn upload_shadow_sampler(&self, backend: &mut dyn RenderBackend, index: usize) {
        if let Some(slots) = self.lights.get(index) {
            let unit = TextureUnits::unit(TextureSlot::ShadowMap(index));
            backend.set_uniform(self.shader, slots.shadow_sampler, UniformValue::Sampler(unit));
        }
    }

    /// Upload one material field
    pub fn upload_material(
        &self,
        backend: &mut dyn RenderBackend,
        property: MaterialProperty,
        value: UniformValue,
    ) {
        if let Some(&location) = self.material.get(&property) {
            backend.set_uniform(self.shader, location, value);
        }
    }

    /// Upload the active light count
    pub fn upload_light_count(&self, backend: &mut dyn RenderBackend, count: usize) {
        backend.set_uniform(self.shader, self.light_count, UniformValue::Int(count as i32));
    }

    /// Upload the camera position for specular math
    pub fn upload_view_position(&self, backend: &mut dyn RenderBackend, value: UniformValue) {
        backend.set_uniform(self.shader, self.view_position, value);
    }

    /// Upload the per-draw model matrix
    pub fn upload_model_matrix(&self, backend: &mut dyn RenderBackend, value: UniformValue) {
        backend.set_uniform(self.shader, self.model_matrix, value);
    }

    /// Upload the per-draw (per-eye) MVP matrix
    pub fn upload_mvp(&self, backend: &mut dyn RenderBackend, value: UniformValue) {
        backend.set_uniform(self.shader, self.mvp_matrix, value);
    }

    /// Upload the per-draw base color fallback
    pub fn upload_base_color(&self, backend: &mut dyn RenderBackend, value: UniformValue) {
        backend.set_uniform(self.shader, self.base_color, value);
    }
}

/// Resolved parameter slots for the depth-only program
///
/// The depth pass consumes only the per-eye MVP; everything else rides on
/// the forward program's [`ParamTable`].
#[derive(Debug, Clone)]
pub struct DepthParams {
    shader: ShaderHandle,
    mvp_matrix: UniformLocation,
}

impl DepthParams {
    /// Resolve the depth program's parameters, once
    pub fn resolve(backend: &mut dyn RenderBackend, shader: ShaderHandle) -> Self {
        Self {
            shader,
            mvp_matrix: backend.uniform_location(shader, "mvp"),
        }
    }

    /// The depth-only program this table uploads into
    pub fn shader(&self) -> ShaderHandle {
        self.shader
    }

    /// Upload the per-draw (per-eye) MVP matrix
    pub fn upload_mvp(&self, backend: &mut dyn RenderBackend, value: UniformValue) {
        backend.set_uniform(self.shader, self.mvp_matrix, value);
    }
}

// --- Packed GPU block -------------------------------------------------------
//
// Hosts that prefer a single uniform-buffer upload over per-field uniforms
// can pack the whole context into this std140-compatible block.

/// Hard upper bound on lights per context
pub const MAX_LIGHTS: usize = 99;

/// One light packed for a GPU uniform buffer (std140-compatible)
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct GpuLight {
    /// Position in xyz, energy in w
    pub position_energy: [f32; 4],
    /// Direction in xyz, area-light size in w
    pub direction_size: [f32; 4],
    /// Color in xyz, specular strength in w
    pub color_specular: [f32; 4],
    /// Attenuation constant/linear/quadratic, light type in w
    pub attenuation_type: [f32; 4],
    /// Inner cutoff, outer cutoff, enabled flag, shadow flag
    pub cutoffs_flags: [f32; 4],
}

// All fields are f32 arrays with no padding in a repr(C) layout.
unsafe impl bytemuck::Pod for GpuLight {}
unsafe impl bytemuck::Zeroable for GpuLight {}

impl GpuLight {
    /// Pack one light record
    pub fn pack(light: &Light) -> Self {
        let type_index = match light.light_type {
            LightType::Directional => 0.0,
            LightType::Omni => 1.0,
            LightType::Spot => 2.0,
        };
        Self {
            position_energy: [
                light.position.x,
                light.position.y,
                light.position.z,
                light.energy,
            ],
            direction_size: [
                light.direction.x,
                light.direction.y,
                light.direction.z,
                light.size,
            ],
            color_specular: [
                light.color.x,
                light.color.y,
                light.color.z,
                light.specular_strength,
            ],
            attenuation_type: [
                light.attenuation.constant,
                light.attenuation.linear,
                light.attenuation.quadratic,
                type_index,
            ],
            cutoffs_flags: [
                light.inner_cutoff,
                light.outer_cutoff,
                if light.enabled { 1.0 } else { 0.0 },
                if light.shadow.is_some() { 1.0 } else { 0.0 },
            ],
        }
    }
}

/// The whole context packed for a GPU uniform buffer
#[derive(Debug, Clone)]
pub struct GpuLightBlock {
    /// Ambient tint in xyz, active light count in w
    pub ambient_count: [f32; 4],
    /// Packed light array, one entry per context light slot
    pub lights: Vec<GpuLight>,
}

impl GpuLightBlock {
    /// Pack a context's light array and material ambient
    pub fn pack(lights: &[Light], materials: &MaterialDefaults) -> Self {
        Self {
            ambient_count: [
                materials.ambient.x,
                materials.ambient.y,
                materials.ambient.z,
                lights.len() as f32,
            ],
            lights: lights.iter().map(GpuLight::pack).collect(),
        }
    }

    /// Raw bytes suitable for a uniform-buffer upload
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes =
            Vec::with_capacity(16 + self.lights.len() * std::mem::size_of::<GpuLight>());
        bytes.extend_from_slice(bytemuck::bytes_of(&self.ambient_count));
        bytes.extend_from_slice(bytemuck::cast_slice(&self.lights));
        bytes
    }
}
