//! Light, material, and shadow state management
//!
//! The lighting module owns the CPU side of the subsystem: light records and
//! their shadow casters, context-wide material defaults, the write-through
//! parameter table, and the shadow-pass orchestration that fills per-light
//! depth targets before the lit pass samples them.

pub mod context;
pub mod light;
pub mod material;
pub mod params;
pub mod shadow;
pub mod shadow_pass;

pub use context::{ContextKey, LightingContext, LightingSystem};
pub use light::{Attenuation, Light, LightType};
pub use material::{MaterialDefaults, MaterialMaps};
pub use params::{
    DepthParams, GpuLight, GpuLightBlock, LightProperty, MaterialProperty, ParamTable,
    TextureSlot, TextureUnits, MAX_LIGHTS,
};
pub use shadow::ShadowCaster;
pub use shadow_pass::{ShadowCastScope, ShadowPassController};

#[cfg(test)]
mod scenario_tests;
