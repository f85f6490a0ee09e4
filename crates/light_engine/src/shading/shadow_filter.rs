//! Percentage-closer shadow filtering
//!
//! Samples a light's depth map around the fragment's projected light-space
//! coordinate and averages the nine comparisons. The returned factor is a
//! light multiplier: 1.0 fully lit, 0.0 fully shadowed.

use crate::foundation::math::{Mat4, Vec3, Vec4};

/// Read-only view over one light's depth map, row-major from `v = 0`
#[derive(Debug, Clone, Copy)]
pub struct ShadowMapView<'a> {
    /// Stored depths in `[0, 1]`, `resolution * resolution` values
    pub depth: &'a [f32],
    /// Edge length in texels
    pub resolution: u32,
}

impl ShadowMapView<'_> {
    /// Depth at a texel, clamped to the map edge
    fn texel(&self, x: i64, y: i64) -> f32 {
        let max = i64::from(self.resolution) - 1;
        let x = x.clamp(0, max) as usize;
        let y = y.clamp(0, max) as usize;
        self.depth[y * self.resolution as usize + x]
    }

    /// Depth at a UV coordinate, nearest-texel
    pub fn sample(&self, u: f32, v: f32) -> f32 {
        let scale = self.resolution as f32;
        self.texel((u * scale) as i64, (v * scale) as i64)
    }
}

/// 3x3 PCF shadow factor for a world-space position
///
/// The depth bias is scaled by `max(1 - N·L, floor)` so steep incidence
/// angles get proportionally more bias. Projections falling outside the
/// `[0, 1]` range on any axis are outside the shadow frustum and count as
/// fully lit.
pub fn pcf_factor(
    map: &ShadowMapView<'_>,
    light_space: &Mat4,
    world_position: Vec3,
    n_dot_l: f32,
    depth_bias: f32,
    bias_floor: f32,
) -> f32 {
    let clip = light_space * Vec4::new(world_position.x, world_position.y, world_position.z, 1.0);
    if clip.w <= 0.0 {
        return 1.0;
    }
    let u = clip.x / clip.w * 0.5 + 0.5;
    let v = clip.y / clip.w * 0.5 + 0.5;
    let fragment_depth = clip.z / clip.w;
    if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) || !(0.0..=1.0).contains(&fragment_depth)
    {
        return 1.0;
    }

    let bias = depth_bias * (1.0 - n_dot_l).max(bias_floor);
    let texel = 1.0 / map.resolution as f32;
    let mut lit = 0.0;
    for dy in -1..=1 {
        for dx in -1..=1 {
            let stored = map.sample(u + dx as f32 * texel, v + dy as f32 * texel);
            if fragment_depth - bias <= stored {
                lit += 1.0;
            }
        }
    }
    lit / 9.0
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn uniform_map(depth: f32, resolution: u32) -> Vec<f32> {
        vec![depth; (resolution * resolution) as usize]
    }

    // Identity light-space: world x/y in [-1,1] map onto the texture and
    // world z is compared directly.
    #[test]
    fn fragment_behind_stored_depth_is_shadowed() {
        let data = uniform_map(0.3, 8);
        let map = ShadowMapView {
            depth: &data,
            resolution: 8,
        };
        let factor = pcf_factor(&map, &Mat4::identity(), Vec3::new(0.0, 0.0, 0.5), 1.0, 1e-3, 0.2);
        assert_relative_eq!(factor, 0.0);
    }

    #[test]
    fn fragment_in_front_of_stored_depth_is_lit() {
        let data = uniform_map(0.8, 8);
        let map = ShadowMapView {
            depth: &data,
            resolution: 8,
        };
        let factor = pcf_factor(&map, &Mat4::identity(), Vec3::new(0.0, 0.0, 0.5), 1.0, 1e-3, 0.2);
        assert_relative_eq!(factor, 1.0);
    }

    #[test]
    fn projection_outside_the_frustum_is_fully_lit() {
        let data = uniform_map(0.0, 8);
        let map = ShadowMapView {
            depth: &data,
            resolution: 8,
        };
        let factor = pcf_factor(&map, &Mat4::identity(), Vec3::new(5.0, 0.0, 0.5), 1.0, 1e-3, 0.2);
        assert_relative_eq!(factor, 1.0);
    }

    #[test]
    fn edge_crossing_averages_partial_occlusion() {
        // Left half occluder (stored 0.2), right half empty (stored 1.0);
        // a fragment at depth 0.5 projected onto the boundary sees a mix.
        let resolution = 8_u32;
        let mut data = uniform_map(1.0, resolution);
        for y in 0..resolution {
            for x in 0..resolution / 2 {
                data[(y * resolution + x) as usize] = 0.2;
            }
        }
        let map = ShadowMapView {
            depth: &data,
            resolution,
        };
        let factor = pcf_factor(&map, &Mat4::identity(), Vec3::new(0.0, 0.0, 0.5), 1.0, 1e-3, 0.2);
        assert!(factor > 0.0 && factor < 1.0, "factor {factor}");
    }

    #[test]
    fn bias_scaling_uses_the_floor_at_normal_incidence() {
        // Stored depth sits just behind the fragment; only the floor-scaled
        // bias keeps it lit at N·L = 1.
        let data = uniform_map(0.4999, 8);
        let map = ShadowMapView {
            depth: &data,
            resolution: 8,
        };
        let lit = pcf_factor(&map, &Mat4::identity(), Vec3::new(0.0, 0.0, 0.5), 1.0, 1e-3, 0.2);
        assert_relative_eq!(lit, 1.0);
        let shadowed = pcf_factor(&map, &Mat4::identity(), Vec3::new(0.0, 0.0, 0.5), 1.0, 1e-3, 0.0);
        assert_relative_eq!(shadowed, 0.0);
    }
}
