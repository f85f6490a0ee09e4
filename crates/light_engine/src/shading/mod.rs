//! Per-fragment shading algorithm
//!
//! A host-callable rendition of the forward shading stage: the same math the
//! shading program runs on the GPU, expressed over plain slices and traits so
//! it can be validated without a device. Texture sampling is abstracted
//! behind small traits ([`parallax::HeightField`],
//! [`environment::EnvironmentMaps`], [`shadow_filter::ShadowMapView`]); the
//! host samples, this module composes.

use serde::{Deserialize, Serialize};

pub mod brdf;
pub mod environment;
pub mod parallax;
pub mod pipeline;
pub mod shadow_filter;

pub use environment::EnvironmentMaps;
pub use parallax::HeightField;
pub use pipeline::{FragmentInput, ShadingPipeline, SurfaceSample};
pub use shadow_filter::ShadowMapView;

/// Which reflectance model the per-light loop evaluates
///
/// Selected once at context creation; the two models share the spotlight,
/// attenuation, and shadow stages and differ only in their diffuse and
/// specular terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadingModelKind {
    /// Lambert diffuse with a `pow(N·H, shininess)` specular lobe
    BlinnPhong,
    /// Burley diffuse with a GGX/Smith/Schlick specular lobe
    CookTorrance,
}

impl Default for ShadingModelKind {
    fn default() -> Self {
        Self::BlinnPhong
    }
}
