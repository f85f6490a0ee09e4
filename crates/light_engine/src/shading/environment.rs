//! Image-based environment contributions

use crate::foundation::math::Vec3;

/// Environment cube maps sampled by the host
///
/// When present, the irradiance map replaces the flat ambient tint and the
/// reflection map adds a roughness-attenuated specular term.
pub trait EnvironmentMaps {
    /// Diffuse irradiance arriving from a direction
    fn irradiance(&self, direction: Vec3) -> Vec3;

    /// Pre-filtered reflection along a direction at a given roughness
    fn reflection(&self, direction: Vec3, roughness: f32) -> Vec3;
}
