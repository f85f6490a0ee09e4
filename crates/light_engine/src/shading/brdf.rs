//! Reflectance terms shared by the two shading models
//!
//! All angle arguments are cosines, already clamped to `[0, 1]` by the
//! caller unless noted. Roughness is perceptual roughness in `[0, 1]`;
//! the GGX terms square it internally (the common alpha remapping).

use crate::foundation::math::{utils, Vec3};

/// Lambertian diffuse term
pub fn lambert(n_dot_l: f32) -> f32 {
    n_dot_l.max(0.0)
}

/// Schlick's `(1 - cos)^5` weight
pub fn schlick_weight(cos_theta: f32) -> f32 {
    let m = (1.0 - cos_theta).clamp(0.0, 1.0);
    m * m * m * m * m
}

/// Burley diffuse term, including the `1/π` normalization and the
/// trailing `N·L` factor
///
/// Grazing retro-reflection is driven by `FD90 = 0.5 + 2·roughness·(L·H)²`;
/// at roughness 0 and normal incidence this reduces to `lambert / π`.
pub fn burley_diffuse(n_dot_l: f32, n_dot_v: f32, l_dot_h: f32, roughness: f32) -> f32 {
    let n_dot_l = n_dot_l.max(0.0);
    let fd90 = 0.5 + 2.0 * roughness * l_dot_h * l_dot_h;
    let light = 1.0 + (fd90 - 1.0) * schlick_weight(n_dot_l);
    let view = 1.0 + (fd90 - 1.0) * schlick_weight(n_dot_v);
    light * view * n_dot_l * std::f32::consts::FRAC_1_PI
}

/// Map perceptual roughness onto a Blinn-Phong exponent
pub fn shininess_from_roughness(roughness: f32) -> f32 {
    let alpha_sq = (roughness * roughness * roughness * roughness).max(1e-4);
    (2.0 / alpha_sq - 2.0).max(1.0)
}

/// Blinn-Phong specular lobe
pub fn blinn_phong(n_dot_h: f32, shininess: f32) -> f32 {
    n_dot_h.max(0.0).powf(shininess)
}

/// GGX (Trowbridge-Reitz) normal distribution
pub fn ggx_distribution(n_dot_h: f32, roughness: f32) -> f32 {
    let alpha = roughness * roughness;
    let alpha_sq = alpha * alpha;
    let d = n_dot_h * n_dot_h * (alpha_sq - 1.0) + 1.0;
    alpha_sq / (std::f32::consts::PI * d * d).max(1e-8)
}

/// Smith height-correlated visibility term (G divided by the
/// `4·(N·L)·(N·V)` denominator)
pub fn smith_visibility(n_dot_v: f32, n_dot_l: f32, roughness: f32) -> f32 {
    let alpha = roughness * roughness;
    let alpha_sq = alpha * alpha;
    let lambda_v = n_dot_l * (n_dot_v * n_dot_v * (1.0 - alpha_sq) + alpha_sq).sqrt();
    let lambda_l = n_dot_v * (n_dot_l * n_dot_l * (1.0 - alpha_sq) + alpha_sq).sqrt();
    0.5 / (lambda_v + lambda_l).max(1e-6)
}

/// Schlick Fresnel with a colored `F0`
pub fn fresnel_schlick(cos_theta: f32, f0: Vec3) -> Vec3 {
    f0 + (Vec3::new(1.0, 1.0, 1.0) - f0) * schlick_weight(cos_theta)
}

/// Normal-incidence reflectance blended between a dielectric base and the
/// albedo for metals
///
/// The dielectric base is `0.16·specular²`, so the default `specular = 1`
/// lands on the common 4 percent.
pub fn f0_blend(albedo: Vec3, metalness: f32, specular: f32) -> Vec3 {
    let dielectric = 0.16 * specular * specular;
    Vec3::new(
        utils::lerp(dielectric, albedo.x, metalness),
        utils::lerp(dielectric, albedo.y, metalness),
        utils::lerp(dielectric, albedo.z, metalness),
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn burley_matches_scaled_lambert_at_normal_incidence() {
        // roughness 0, all cosines 1: both Fresnel factors collapse to 1.
        let burley = burley_diffuse(1.0, 1.0, 1.0, 0.0);
        assert_relative_eq!(
            burley,
            lambert(1.0) * std::f32::consts::FRAC_1_PI,
            epsilon = 1e-6
        );
    }

    #[test]
    fn ggx_off_axis_response_grows_with_roughness() {
        let n_dot_h = 0.8;
        let mut previous = ggx_distribution(n_dot_h, 0.1);
        for roughness in [0.3, 0.5, 0.7, 0.9] {
            let current = ggx_distribution(n_dot_h, roughness);
            assert!(current > previous, "not monotonic at roughness {roughness}");
            previous = current;
        }
    }

    #[test]
    fn fresnel_reaches_unity_at_grazing() {
        let f0 = Vec3::new(0.04, 0.04, 0.04);
        let grazing = fresnel_schlick(0.0, f0);
        assert_relative_eq!(grazing.x, 1.0, epsilon = 1e-6);
        let head_on = fresnel_schlick(1.0, f0);
        assert_relative_eq!(head_on.x, 0.04, epsilon = 1e-6);
    }

    #[test]
    fn f0_blend_moves_from_dielectric_to_albedo() {
        let albedo = Vec3::new(0.9, 0.6, 0.2);
        let dielectric = f0_blend(albedo, 0.0, 1.0);
        assert_relative_eq!(dielectric.x, 0.16, epsilon = 1e-6);
        let metal = f0_blend(albedo, 1.0, 1.0);
        assert_relative_eq!(metal.y, 0.6, epsilon = 1e-6);
    }

    #[test]
    fn shininess_tightens_as_roughness_drops() {
        assert!(shininess_from_roughness(0.2) > shininess_from_roughness(0.8));
        assert!(shininess_from_roughness(1.0) >= 1.0);
    }
}
