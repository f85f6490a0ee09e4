//! Per-fragment composition
//!
//! Shading is a two-step contract. The host first resolves the texture
//! coordinate with [`ShadingPipeline::displaced_uv`], which applies the
//! parallax search when a height map is bound; `None` means the fragment
//! is displaced off the texture and must be discarded. The host samples
//! every material texture at the returned coordinate, then
//! [`ShadingPipeline::shade`] composes the result: the per-light
//! accumulation loop (diffuse, specular, spotlight cone, attenuation,
//! shadow) followed by the ambient, occlusion, environment, and emissive
//! terms.

use crate::foundation::math::{utils, Vec2, Vec3, Vec4};
use crate::lighting::context::LightingContext;
use crate::lighting::light::{Light, LightType};
use crate::lighting::material::MaterialMaps;
use crate::shading::brdf;
use crate::shading::environment::EnvironmentMaps;
use crate::shading::parallax::{self, HeightField};
use crate::shading::shadow_filter::{self, ShadowMapView};
use crate::shading::ShadingModelKind;

/// Geometry-stage outputs for one fragment
#[derive(Debug, Clone, Copy)]
pub struct FragmentInput {
    /// World-space position
    pub world_position: Vec3,
    /// World-space normal, already perturbed by the normal map if any
    pub normal: Vec3,
    /// Interpolated texture coordinate
    pub uv: Vec2,
    /// Interpolated vertex color
    pub vertex_color: Vec4,
    /// World-space camera position
    pub view_position: Vec3,
    /// Tangent-space view direction, required for parallax
    pub tangent_view: Option<Vec3>,
}

/// Host-sampled texture data for one fragment
///
/// The host resolves texture bindings and sampling; the pipeline composes.
/// Every map is sampled at the coordinate
/// [`ShadingPipeline::displaced_uv`] returned for this fragment.
/// `shadow_maps` is indexed by light slot.
pub struct SurfaceSample<'a> {
    /// Albedo after base-color modulation
    pub albedo: Vec3,
    /// Metalness, from map or fallback
    pub metalness: f32,
    /// Roughness, from map or fallback
    pub roughness: f32,
    /// Specular reflectance scalar, from map or fallback
    pub specular: f32,
    /// Sampled ambient-occlusion factor, if an occlusion map is bound
    pub occlusion: Option<f32>,
    /// Sampled emissive color, multiplied by the emissive tint when mapped
    pub emissive: Vec3,
    /// Depth-map views per light slot
    pub shadow_maps: &'a [Option<ShadowMapView<'a>>],
    /// Environment maps, if the host provides them
    pub environment: Option<&'a dyn EnvironmentMaps>,
}

/// Softened clamp used by the area-light approximation
///
/// With `size_a = 0` this is an ordinary `clamp(x, 0, 1)`; larger angular
/// sizes pull grazing cosines up toward the lit side.
fn soften(x: f32, size_a: f32) -> f32 {
    ((x + size_a) / (1.0 + size_a)).clamp(0.0, 1.0)
}

/// The forward shading algorithm
pub struct ShadingPipeline;

impl ShadingPipeline {
    /// Resolve the texture coordinate for one fragment
    ///
    /// With a height map bound, runs the parallax search (steep when the
    /// layer range asks for it) and returns the displaced coordinate;
    /// `None` means the fragment left `[0,1]²` and must be discarded.
    /// Without a height map, or without a tangent-space view direction,
    /// the interpolated UV passes through unchanged. The host samples
    /// every material texture at the returned coordinate before calling
    /// [`Self::shade`].
    pub fn displaced_uv(
        context: &LightingContext,
        input: &FragmentInput,
        heights: &dyn HeightField,
    ) -> Option<Vec2> {
        let materials = context.materials();
        if !materials.maps.contains(MaterialMaps::HEIGHT) {
            return Some(input.uv);
        }
        let Some(view) = input.tangent_view else {
            return Some(input.uv);
        };
        let uv = if materials.steep_parallax() {
            parallax::steep_offset(
                heights,
                input.uv,
                view,
                materials.height_scale,
                materials.parallax_min_layers,
                materials.parallax_max_layers,
            )
        } else {
            parallax::simple_offset(heights, input.uv, view, materials.height_scale)
        };
        parallax::in_bounds(uv).then_some(uv)
    }

    /// Shade one fragment under a context's lights and material defaults
    ///
    /// `surface` carries texture data sampled at the coordinate
    /// [`Self::displaced_uv`] resolved for this fragment.
    pub fn shade(
        context: &LightingContext,
        input: &FragmentInput,
        surface: &SurfaceSample<'_>,
    ) -> Vec4 {
        let materials = context.materials();
        let model = context.shading_model();
        let bias_floor = context.shadow_config().bias_floor;

        let normal = input.normal.normalize();
        let view = (input.view_position - input.world_position).normalize();
        let n_dot_v = normal.dot(&view).max(1e-4);
        let albedo = Vec3::new(
            surface.albedo.x * input.vertex_color.x,
            surface.albedo.y * input.vertex_color.y,
            surface.albedo.z * input.vertex_color.z,
        );

        let mut direct_diffuse = Vec3::zeros();
        let mut direct_specular = Vec3::zeros();
        for (index, light) in context.lights().iter().enumerate() {
            if !light.enabled {
                continue;
            }
            let (light_dir, distance) = light_vector(light, input.world_position);
            let size_a = if light.size > 0.0 && distance > 0.0 {
                light.size / distance
            } else {
                0.0
            };
            let n_dot_l = soften(normal.dot(&light_dir), size_a);
            let half = (light_dir + view).normalize();
            let n_dot_h = soften(normal.dot(&half), size_a);
            let l_dot_h = light_dir.dot(&half).max(0.0);

            let diffuse = match model {
                ShadingModelKind::BlinnPhong => brdf::lambert(n_dot_l),
                ShadingModelKind::CookTorrance => {
                    brdf::burley_diffuse(n_dot_l, n_dot_v, l_dot_h, surface.roughness)
                        * (1.0 - surface.metalness)
                }
            };

            // Roughness 0 leaves the specular lobe off entirely.
            let specular = if surface.roughness == 0.0 {
                Vec3::zeros()
            } else {
                let lobe = match model {
                    ShadingModelKind::BlinnPhong => {
                        let shininess = brdf::shininess_from_roughness(surface.roughness);
                        Vec3::new(1.0, 1.0, 1.0)
                            * (brdf::blinn_phong(n_dot_h, shininess) * surface.specular)
                    }
                    ShadingModelKind::CookTorrance => {
                        let f0 = brdf::f0_blend(albedo, surface.metalness, surface.specular);
                        let d = brdf::ggx_distribution(n_dot_h, surface.roughness);
                        let vis = brdf::smith_visibility(n_dot_v, n_dot_l, surface.roughness);
                        brdf::fresnel_schlick(l_dot_h, f0) * (d * vis * n_dot_l)
                    }
                };
                lobe * light.specular_strength
            };

            let spot = spot_intensity(light, light_dir);
            let attenuation = light.attenuation.factor(distance);
            let shadow = shadow_factor(light, index, surface, input.world_position, n_dot_l, bias_floor);
            let radiance = light.color * (light.energy * spot * attenuation * shadow);

            direct_diffuse += radiance * diffuse;
            direct_specular += radiance.component_mul(&specular);
        }

        // Sampled occlusion dampens direct light by the configured blend.
        if let Some(occlusion) = surface.occlusion {
            let damp = utils::lerp(1.0, occlusion, materials.occlusion_light_blend);
            direct_diffuse *= damp;
            direct_specular *= damp;
        }

        let mut ambient = materials.ambient;
        if let Some(environment) = surface.environment {
            let fresnel = brdf::fresnel_schlick(
                n_dot_v,
                brdf::f0_blend(albedo, surface.metalness, surface.specular),
            );
            let energy = Vec3::new(1.0, 1.0, 1.0) - fresnel;
            ambient = environment.irradiance(normal).component_mul(&energy);
            let reflected = normal * (2.0 * view.dot(&normal)) - view;
            direct_specular += environment
                .reflection(reflected, surface.roughness)
                .component_mul(&fresnel)
                * (1.0 - surface.roughness);
        }
        if let Some(occlusion) = surface.occlusion {
            ambient *= occlusion;
        }

        let emissive = if materials.maps.contains(MaterialMaps::EMISSIVE) {
            surface.emissive.component_mul(&materials.emissive)
        } else {
            materials.emissive
        };

        let color = albedo.component_mul(&(ambient + direct_diffuse)) + direct_specular + emissive;
        Vec4::new(color.x, color.y, color.z, input.vertex_color.w)
    }
}

fn light_vector(light: &Light, fragment: Vec3) -> (Vec3, f32) {
    match light.light_type {
        LightType::Directional => (-light.direction.normalize(), 0.0),
        LightType::Omni | LightType::Spot => {
            let to_light = light.position - fragment;
            let distance = to_light.norm();
            if distance < 1e-6 {
                (Vec3::new(0.0, 1.0, 0.0), 0.0)
            } else {
                (to_light / distance, distance)
            }
        }
    }
}

fn spot_intensity(light: &Light, light_dir: Vec3) -> f32 {
    if light.light_type != LightType::Spot {
        return 1.0;
    }
    // Angle between the cone axis and the fragment, both unit length.
    let cos_theta = (-light_dir).dot(&light.direction.normalize());
    light.spot_intensity(cos_theta)
}

fn shadow_factor(
    light: &Light,
    index: usize,
    surface: &SurfaceSample<'_>,
    world_position: Vec3,
    n_dot_l: f32,
    bias_floor: f32,
) -> f32 {
    let Some(caster) = &light.shadow else {
        return 1.0;
    };
    let Some(Some(map)) = surface.shadow_maps.get(index) else {
        return 1.0;
    };
    shadow_filter::pcf_factor(
        map,
        &caster.light_space,
        world_position,
        n_dot_l,
        caster.depth_bias,
        bias_floor,
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::lighting::context::LightingSystem;
    use crate::render::api::mock_backend::MockBackend;
    use crate::shading::ShadingModelKind;

    /// Depth grows linearly with u, so displacement is predictable.
    struct Ramp;

    impl HeightField for Ramp {
        fn height(&self, uv: Vec2) -> f32 {
            uv.x.clamp(0.0, 1.0)
        }
    }

    /// Uniformly deep field, for pushing fragments off the texture.
    struct Deep;

    impl HeightField for Deep {
        fn height(&self, _uv: Vec2) -> f32 {
            1.0
        }
    }

    fn fragment(uv: Vec2, tangent_view: Option<Vec3>) -> FragmentInput {
        FragmentInput {
            world_position: Vec3::zeros(),
            normal: Vec3::new(0.0, 0.0, 1.0),
            uv,
            vertex_color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            view_position: Vec3::new(0.0, 0.0, 5.0),
            tangent_view,
        }
    }

    #[test]
    fn uv_passes_through_without_a_height_map() {
        let mut backend = MockBackend::new();
        let mut system = LightingSystem::new();
        let key = system
            .create_context(&mut backend, 1, ShadingModelKind::BlinnPhong)
            .unwrap();
        let context = system.get(key).unwrap();

        let uv = Vec2::new(0.25, 0.75);
        let input = fragment(uv, Some(Vec3::new(0.3, 0.0, 0.9)));
        assert_eq!(ShadingPipeline::displaced_uv(context, &input, &Ramp), Some(uv));
    }

    #[test]
    fn height_map_displacement_reaches_the_sampling_coordinate() {
        let mut backend = MockBackend::new();
        let mut system = LightingSystem::new();
        let key = system
            .create_context(&mut backend, 1, ShadingModelKind::BlinnPhong)
            .unwrap();
        let context = system.get_mut(key).unwrap();
        context.set_map_enabled(&mut backend, MaterialMaps::HEIGHT, true);

        // Depth 0.5 at the center, scale 0.05, view offset 0.6/0.8.
        let view = Vec3::new(0.6, 0.0, 0.8);
        let input = fragment(Vec2::new(0.5, 0.5), Some(view));
        let uv = ShadingPipeline::displaced_uv(context, &input, &Ramp).unwrap();
        assert_relative_eq!(uv.x, 0.48125, epsilon = 1e-6);
        assert_relative_eq!(uv.y, 0.5, epsilon = 1e-6);

        // A host following the contract now samples a different texel
        // than the interpolated coordinate would have hit.
        assert!((Ramp.height(uv) - Ramp.height(input.uv)).abs() > 1e-3);
    }

    #[test]
    fn displacement_off_the_texture_is_a_discard() {
        let mut backend = MockBackend::new();
        let mut system = LightingSystem::new();
        let key = system
            .create_context(&mut backend, 1, ShadingModelKind::BlinnPhong)
            .unwrap();
        let context = system.get_mut(key).unwrap();
        context.set_map_enabled(&mut backend, MaterialMaps::HEIGHT, true);

        let view = Vec3::new(0.9, 0.0, 0.2);
        let input = fragment(Vec2::new(0.01, 0.5), Some(view));
        assert_eq!(ShadingPipeline::displaced_uv(context, &input, &Deep), None);
    }

    #[test]
    fn missing_tangent_view_skips_displacement() {
        let mut backend = MockBackend::new();
        let mut system = LightingSystem::new();
        let key = system
            .create_context(&mut backend, 1, ShadingModelKind::BlinnPhong)
            .unwrap();
        let context = system.get_mut(key).unwrap();
        context.set_map_enabled(&mut backend, MaterialMaps::HEIGHT, true);

        let uv = Vec2::new(0.5, 0.5);
        let input = fragment(uv, None);
        assert_eq!(ShadingPipeline::displaced_uv(context, &input, &Ramp), Some(uv));
    }
}
