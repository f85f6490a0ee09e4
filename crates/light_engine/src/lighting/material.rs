//! Context-wide material defaults
//!
//! These values are shared by every draw call issued through a context,
//! a deliberate simplification over per-material state: the host's own
//! materials supply textures and scalar fallbacks, while tints, toggles,
//! and parallax tuning live here.

use bitflags::bitflags;

use crate::foundation::math::Vec3;

bitflags! {
    /// Which optional texture maps the shading program consumes
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MaterialMaps: u8 {
        /// Tangent-space normal map
        const NORMAL = 1 << 0;
        /// Metalness map
        const METALNESS = 1 << 1;
        /// Roughness map
        const ROUGHNESS = 1 << 2;
        /// Ambient-occlusion map
        const OCCLUSION = 1 << 3;
        /// Emissive map
        const EMISSIVE = 1 << 4;
        /// Height map (enables parallax)
        const HEIGHT = 1 << 5;
    }
}

/// Global, context-wide tint and toggle state shared by all draw calls
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDefaults {
    /// Ambient tint multiplied with albedo
    pub ambient: Vec3,
    /// Emissive tint added after lighting
    pub emissive: Vec3,
    /// Metalness fallback when no metalness map is sampled
    pub metalness: f32,
    /// Roughness fallback when no roughness map is sampled
    pub roughness: f32,
    /// Specular reflectance scalar
    pub specular: f32,
    /// Height-map displacement scale for parallax
    pub height_scale: f32,
    /// Minimum parallax layer count; steep parallax needs `> 0`
    pub parallax_min_layers: u32,
    /// Maximum parallax layer count; steep parallax needs `> 1`
    pub parallax_max_layers: u32,
    /// Enabled optional texture maps
    pub maps: MaterialMaps,
    /// How strongly sampled occlusion dampens direct lighting (0 = none)
    pub occlusion_light_blend: f32,
}

impl Default for MaterialDefaults {
    fn default() -> Self {
        Self {
            ambient: Vec3::new(0.1, 0.1, 0.1),
            emissive: Vec3::zeros(),
            metalness: 0.0,
            roughness: 0.5,
            specular: 1.0,
            height_scale: 0.05,
            parallax_min_layers: 0,
            parallax_max_layers: 1,
            maps: MaterialMaps::empty(),
            occlusion_light_blend: 0.6,
        }
    }
}

impl MaterialDefaults {
    /// Whether the steep (multi-layer) parallax variant is active
    pub fn steep_parallax(&self) -> bool {
        self.parallax_min_layers > 0 && self.parallax_max_layers > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_simple_parallax() {
        let defaults = MaterialDefaults::default();
        assert!(!defaults.steep_parallax());
        assert!(defaults.maps.is_empty());
    }

    #[test]
    fn steep_parallax_requires_both_layer_bounds() {
        let mut defaults = MaterialDefaults::default();
        defaults.parallax_min_layers = 8;
        assert!(!defaults.steep_parallax());
        defaults.parallax_max_layers = 32;
        assert!(defaults.steep_parallax());
    }
}
