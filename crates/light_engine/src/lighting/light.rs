//! Light records
//!
//! A [`Light`] is one slot in a context's fixed light array: its type,
//! placement, color/energy, falloff, spot cone, and optional shadow caster.
//! Spot cutoffs are stored as cosines of half-angles; the degree-based
//! accessors convert at the boundary.

use crate::foundation::math::{utils, Vec3};
use crate::lighting::shadow::ShadowCaster;

/// Light types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    /// Directional light (like sunlight); position is ignored
    Directional,
    /// Omnidirectional light from a point (like a lightbulb)
    Omni,
    /// Directional cone of light (like a flashlight)
    Spot,
}

/// Distance attenuation factors
///
/// `constant` must stay above zero or the factor is undefined at distance
/// zero; [`Attenuation::factor`] guards the degenerate case by returning 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Attenuation {
    /// Constant term
    pub constant: f32,
    /// Linear term
    pub linear: f32,
    /// Quadratic term
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.0,
            quadratic: 0.0,
        }
    }
}

impl Attenuation {
    /// Attenuation factor at the given distance
    pub fn factor(&self, distance: f32) -> f32 {
        let denom = self.constant + self.linear * distance + self.quadratic * distance * distance;
        if denom <= 0.0 {
            return 1.0;
        }
        1.0 / denom
    }
}

/// One light's parameters and enablement state
#[derive(Debug, Clone)]
pub struct Light {
    /// Light type
    pub light_type: LightType,
    /// Light position (for omni/spot lights)
    pub position: Vec3,
    /// Light direction (for directional/spot lights)
    pub direction: Vec3,
    /// Light color in 0..1
    pub color: Vec3,
    /// Intensity multiplier, >= 0
    pub energy: f32,
    /// Specular contribution multiplier
    pub specular_strength: f32,
    /// Soft-shadow/falloff radius (spot/omni only), >= 0
    pub size: f32,
    /// Cosine of the inner spot half-angle; must stay >= `outer_cutoff`
    pub inner_cutoff: f32,
    /// Cosine of the outer spot half-angle
    pub outer_cutoff: f32,
    /// Distance attenuation
    pub attenuation: Attenuation,
    /// Whether the light contributes to shading
    pub enabled: bool,
    /// Depth target and cached light-space transform, when shadows are on
    pub shadow: Option<ShadowCaster>,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            light_type: LightType::Directional,
            position: Vec3::zeros(),
            direction: Vec3::new(0.0, -1.0, 0.0),
            color: Vec3::new(1.0, 1.0, 1.0),
            energy: 1.0,
            specular_strength: 1.0,
            size: 0.0,
            inner_cutoff: utils::deg_to_rad(12.5).cos(),
            outer_cutoff: utils::deg_to_rad(17.5).cos(),
            attenuation: Attenuation::default(),
            enabled: false,
            shadow: None,
        }
    }
}

impl Light {
    /// Create a directional light
    pub fn directional(direction: Vec3, color: Vec3, energy: f32) -> Self {
        Self {
            light_type: LightType::Directional,
            direction: direction.normalize(),
            color,
            energy,
            enabled: true,
            ..Default::default()
        }
    }

    /// Create an omnidirectional light
    pub fn omni(position: Vec3, color: Vec3, energy: f32) -> Self {
        Self {
            light_type: LightType::Omni,
            position,
            color,
            energy,
            enabled: true,
            ..Default::default()
        }
    }

    /// Create a spot light with cone half-angles in degrees
    pub fn spot(
        position: Vec3,
        direction: Vec3,
        color: Vec3,
        energy: f32,
        inner_degrees: f32,
        outer_degrees: f32,
    ) -> Self {
        let mut light = Self {
            light_type: LightType::Spot,
            position,
            direction: direction.normalize(),
            color,
            energy,
            enabled: true,
            ..Default::default()
        };
        light.set_inner_cutoff_degrees(inner_degrees);
        light.set_outer_cutoff_degrees(outer_degrees);
        light
    }

    /// Aim the light at a world-space target
    ///
    /// The stored direction is the unit vector from `position` to `target`.
    pub fn set_target(&mut self, target: Vec3) {
        let to_target = target - self.position;
        if to_target.norm_squared() > 0.0 {
            self.direction = to_target.normalize();
        } else {
            log::warn!("set_target: target coincides with light position, direction unchanged");
        }
    }

    /// Inner cone half-angle in degrees
    pub fn inner_cutoff_degrees(&self) -> f32 {
        utils::rad_to_deg(self.inner_cutoff.clamp(-1.0, 1.0).acos())
    }

    /// Outer cone half-angle in degrees
    pub fn outer_cutoff_degrees(&self) -> f32 {
        utils::rad_to_deg(self.outer_cutoff.clamp(-1.0, 1.0).acos())
    }

    /// Set the inner cone half-angle in degrees
    pub fn set_inner_cutoff_degrees(&mut self, degrees: f32) {
        self.inner_cutoff = utils::deg_to_rad(degrees).cos();
        if self.inner_cutoff < self.outer_cutoff {
            log::warn!(
                "inner cutoff {degrees}° is wider than the outer cutoff; spot falloff is undefined"
            );
        }
    }

    /// Set the outer cone half-angle in degrees
    pub fn set_outer_cutoff_degrees(&mut self, degrees: f32) {
        self.outer_cutoff = utils::deg_to_rad(degrees).cos();
        if self.inner_cutoff < self.outer_cutoff {
            log::warn!(
                "outer cutoff {degrees}° is narrower than the inner cutoff; spot falloff is undefined"
            );
        }
    }

    /// Spotlight cone intensity for a given cosine of the angle to the axis
    ///
    /// Returns 1.0 for non-spot lights. Inside the inner cone the intensity
    /// is 1.0, beyond the outer cone it is 0.0, with a smoothstep ramp in
    /// between.
    pub fn spot_intensity(&self, cos_theta: f32) -> f32 {
        if self.light_type != LightType::Spot {
            return 1.0;
        }
        let range = self.inner_cutoff - self.outer_cutoff;
        if range <= f32::EPSILON {
            // Degenerate cone, hard edge at the outer cutoff.
            return if cos_theta >= self.outer_cutoff { 1.0 } else { 0.0 };
        }
        utils::smoothstep(0.0, 1.0, (cos_theta - self.outer_cutoff) / range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_light_matches_initialization_contract() {
        let light = Light::default();
        assert_eq!(light.light_type, LightType::Directional);
        assert_eq!(light.color, Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(light.specular_strength, 1.0);
        assert_relative_eq!(light.attenuation.constant, 1.0);
        assert_relative_eq!(light.attenuation.linear, 0.0);
        assert_relative_eq!(light.attenuation.quadratic, 0.0);
        assert!(!light.enabled);
        assert!(light.shadow.is_none());
    }

    #[test]
    fn set_target_yields_unit_direction() {
        let mut light = Light::omni(Vec3::new(-5.0, 5.0, -5.0), Vec3::new(1.0, 1.0, 1.0), 1.0);
        light.set_target(Vec3::zeros());
        assert_relative_eq!(light.direction.norm(), 1.0, epsilon = 1e-5);
        let expected = Vec3::new(5.0, -5.0, 5.0).normalize();
        assert_relative_eq!(light.direction.x, expected.x, epsilon = 1e-6);
        assert_relative_eq!(light.direction.y, expected.y, epsilon = 1e-6);
        assert_relative_eq!(light.direction.z, expected.z, epsilon = 1e-6);
    }

    #[test]
    fn set_target_on_own_position_keeps_direction() {
        let mut light = Light::default();
        light.position = Vec3::new(1.0, 2.0, 3.0);
        let before = light.direction;
        light.set_target(light.position);
        assert_eq!(light.direction, before);
    }

    #[test]
    fn cutoff_degrees_round_trip() {
        let mut light = Light::default();
        light.set_inner_cutoff_degrees(17.5);
        light.set_outer_cutoff_degrees(22.5);
        assert_relative_eq!(light.inner_cutoff_degrees(), 17.5, epsilon = 1e-3);
        assert_relative_eq!(light.outer_cutoff_degrees(), 22.5, epsilon = 1e-3);
    }

    #[test]
    fn constant_only_attenuation_has_no_falloff() {
        let attenuation = Attenuation::default();
        for distance in [0.0, 1.0, 10.0, 1000.0] {
            assert_relative_eq!(attenuation.factor(distance), 1.0);
        }
    }

    #[test]
    fn degenerate_attenuation_does_not_divide_by_zero() {
        let attenuation = Attenuation {
            constant: 0.0,
            linear: 0.0,
            quadratic: 0.0,
        };
        assert_relative_eq!(attenuation.factor(0.0), 1.0);
    }

    #[test]
    fn spot_intensity_is_one_on_axis_and_zero_outside() {
        let light = Light::spot(
            Vec3::zeros(),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            1.0,
            17.5,
            22.5,
        );
        // On the forward axis cos(theta) = 1.
        assert_relative_eq!(light.spot_intensity(1.0), 1.0);
        // Beyond the outer cone.
        let beyond = utils::deg_to_rad(30.0).cos();
        assert_relative_eq!(light.spot_intensity(beyond), 0.0);
    }

    #[test]
    fn spot_intensity_is_one_on_axis_with_zero_degree_inner() {
        let mut light = Light::spot(
            Vec3::zeros(),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            1.0,
            0.0,
            22.5,
        );
        light.set_inner_cutoff_degrees(0.0);
        assert_relative_eq!(light.spot_intensity(1.0), 1.0);
    }

    #[test]
    fn non_spot_lights_ignore_the_cone() {
        let light = Light::directional(Vec3::new(0.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 1.0), 1.0);
        assert_relative_eq!(light.spot_intensity(-1.0), 1.0);
    }
}
