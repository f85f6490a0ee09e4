//! Parallax UV displacement
//!
//! Height maps are depth maps here: a sample of 0 is the surface, 1 is the
//! deepest recess. The view vector is tangent-space, pointing from the
//! surface toward the camera, with `z > 0` for front-facing fragments.

use crate::foundation::math::{utils, Vec2, Vec3};

/// Height-map sampler supplied by the host
pub trait HeightField {
    /// Depth value at a UV coordinate, in `[0, 1]`
    fn height(&self, uv: Vec2) -> f32;
}

/// Whether a displaced UV still lies inside the texture
///
/// Fragments displaced outside `[0,1]²` are discarded by the pipeline.
pub fn in_bounds(uv: Vec2) -> bool {
    (0.0..=1.0).contains(&uv.x) && (0.0..=1.0).contains(&uv.y)
}

/// Single-sample parallax offset
pub fn simple_offset(heights: &dyn HeightField, uv: Vec2, view: Vec3, height_scale: f32) -> Vec2 {
    if view.z.abs() < 1e-4 {
        return uv;
    }
    let depth = heights.height(uv);
    uv - view.xy() / view.z * (depth * height_scale)
}

/// Steep parallax: fixed-layer march with crossing interpolation
///
/// The layer count interpolates from `max_layers` at grazing angles down to
/// `min_layers` head-on. After the march finds the first layer below the
/// sampled depth, the result is interpolated between that layer and the one
/// before it.
pub fn steep_offset(
    heights: &dyn HeightField,
    uv: Vec2,
    view: Vec3,
    height_scale: f32,
    min_layers: u32,
    max_layers: u32,
) -> Vec2 {
    if view.z.abs() < 1e-4 {
        return uv;
    }
    let layers = utils::lerp(max_layers as f32, min_layers as f32, view.z.abs())
        .round()
        .max(1.0);
    let layer_depth = 1.0 / layers;
    let step = view.xy() / view.z * (height_scale / layers);

    let mut current_uv = uv;
    let mut current_depth = heights.height(current_uv);
    let mut layer = 0.0_f32;
    // The march is bounded by the layer count; depth maps in [0,1] always
    // terminate within it.
    while layer < current_depth && layer < 1.0 {
        current_uv -= step;
        current_depth = heights.height(current_uv);
        layer += layer_depth;
    }

    let previous_uv = current_uv + step;
    let after = current_depth - layer;
    let before = heights.height(previous_uv) - (layer - layer_depth);
    let denominator = after - before;
    if denominator.abs() < 1e-6 {
        return current_uv;
    }
    let weight = (after / denominator).clamp(0.0, 1.0);
    previous_uv * weight + current_uv * (1.0 - weight)
}
