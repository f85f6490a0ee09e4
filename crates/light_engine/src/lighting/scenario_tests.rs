//! End-to-end spotlight and shadow scenario
//!
//! One spot light above and behind a unit cube at the origin, a ground plane
//! at `y = -0.5`. The shadow pass runs against the mock backend; the depth
//! map itself is synthesized by projecting the cube's lit faces through the
//! exact light-space transform the pass cached, so the shading pipeline is
//! exercised with geometrically consistent data.

use approx::assert_relative_eq;

use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};
use crate::lighting::context::{LightingContext, LightingSystem};
use crate::lighting::light::LightType;
use crate::lighting::shadow_pass::ShadowPassController;
use crate::render::api::mock_backend::{DrawEvent, MockBackend};
use crate::render::api::MeshHandle;
use crate::render::primitives::{Mesh, MeshAttributes};
use crate::shading::{FragmentInput, ShadingPipeline, ShadowMapView, SurfaceSample};

const RESOLUTION: u32 = 1024;

fn project(light_space: &Mat4, point: Vec3) -> Option<(f32, f32, f32)> {
    let clip = light_space * Vec4::new(point.x, point.y, point.z, 1.0);
    if clip.w <= 0.0 {
        return None;
    }
    Some((
        clip.x / clip.w * 0.5 + 0.5,
        clip.y / clip.w * 0.5 + 0.5,
        clip.z / clip.w,
    ))
}

/// Splat the unit cube's three lit faces into a depth map, min-depth per
/// texel, 1.0 where nothing was hit. Lit faces for a light at (-5, 5, -5)
/// are x = -0.5, y = +0.5, and z = -0.5.
fn rasterize_cube_depth(light_space: &Mat4) -> Vec<f32> {
    let mut depth = vec![1.0_f32; (RESOLUTION * RESOLUTION) as usize];
    let steps = 400;
    let mut splat = |point: Vec3| {
        if let Some((u, v, d)) = project(light_space, point) {
            if (0.0..1.0).contains(&u) && (0.0..1.0).contains(&v) {
                let x = (u * RESOLUTION as f32) as usize;
                let y = (v * RESOLUTION as f32) as usize;
                let cell = &mut depth[y * RESOLUTION as usize + x];
                *cell = cell.min(d);
            }
        }
    };
    for i in 0..=steps {
        for j in 0..=steps {
            let a = -0.5 + i as f32 / steps as f32;
            let b = -0.5 + j as f32 / steps as f32;
            splat(Vec3::new(-0.5, a, b));
            splat(Vec3::new(a, 0.5, b));
            splat(Vec3::new(a, b, -0.5));
        }
    }
    depth
}

fn scene(backend: &mut MockBackend) -> (LightingSystem, Vec<f32>) {
    let mut system = LightingSystem::new();
    let key = system
        .create_context(backend, 1, crate::shading::ShadingModelKind::BlinnPhong)
        .unwrap();
    system.activate(key);
    {
        let context = system.active_mut().unwrap();
        context.set_light_type(backend, 0, LightType::Spot);
        context.set_light_position(backend, 0, Vec3::new(-5.0, 5.0, -5.0));
        context.set_light_target(backend, 0, Vec3::zeros());
        context.set_light_inner_cutoff(backend, 0, 17.5);
        context.set_light_outer_cutoff(backend, 0, 22.5);
        context.enable_light(backend, 0);
        context.enable_shadows(backend, 0, RESOLUTION).unwrap();
    }

    let cube = Mesh {
        handle: MeshHandle(1),
        attributes: MeshAttributes::POSITION,
        index_count: 36,
    };
    let mut pass = ShadowPassController::default();
    {
        let context = system.active_mut().unwrap();
        pass.begin_cast(context, backend, 0);
        pass.cast_mesh(context, backend, &cube, &Mat4::identity());
        pass.end_cast(backend);
    }

    let context = system.active().unwrap();
    let light_space = context.lights()[0].shadow.as_ref().unwrap().light_space;
    let depth = rasterize_cube_depth(&light_space);
    (system, depth)
}

fn ground_fragment(position: Vec3) -> FragmentInput {
    FragmentInput {
        world_position: position,
        normal: Vec3::new(0.0, 1.0, 0.0),
        uv: Vec2::new(0.5, 0.5),
        vertex_color: Vec4::new(1.0, 1.0, 1.0, 1.0),
        view_position: Vec3::new(0.0, 3.0, 8.0),
        tangent_view: None,
    }
}

fn ground_surface<'a>(shadow_maps: &'a [Option<ShadowMapView<'a>>]) -> SurfaceSample<'a> {
    SurfaceSample {
        albedo: Vec3::new(1.0, 1.0, 1.0),
        metalness: 0.0,
        roughness: 0.5,
        specular: 1.0,
        occlusion: None,
        emissive: Vec3::zeros(),
        shadow_maps,
        environment: None,
    }
}

fn shade(
    context: &LightingContext,
    depth: &[f32],
    position: Vec3,
) -> Vec4 {
    let maps = [Some(ShadowMapView {
        depth,
        resolution: RESOLUTION,
    })];
    ShadingPipeline::shade(context, &ground_fragment(position), &ground_surface(&maps))
}

#[test]
fn shadow_pass_submits_depth_only_geometry() {
    let mut backend = MockBackend::new();
    let (system, _depth) = scene(&mut backend);
    let context = system.active().unwrap();

    assert!(backend
        .events
        .iter()
        .any(|e| matches!(e, DrawEvent::PositionsOnly(_))));
    assert_eq!(backend.bound_framebuffer(), None);
    assert!(backend
        .uniform(context.forward_shader(), "lightVP[0]")
        .is_some());
}

#[test]
fn fragment_under_the_cube_is_fully_shadowed() {
    let mut backend = MockBackend::new();
    let (system, depth) = scene(&mut backend);
    let context = system.active().unwrap();

    // Inside the cone, behind the cube as seen from the light.
    let shadowed = shade(context, &depth, Vec3::new(0.2, -0.5, 0.2));
    // Direct light fully removed: only the flat ambient term remains.
    let ambient = context.materials().ambient;
    assert_relative_eq!(shadowed.x, ambient.x, epsilon = 1e-4);
    assert_relative_eq!(shadowed.y, ambient.y, epsilon = 1e-4);
    assert_relative_eq!(shadowed.z, ambient.z, epsilon = 1e-4);
}

#[test]
fn unoccluded_fragment_in_the_cone_is_lit() {
    let mut backend = MockBackend::new();
    let (system, depth) = scene(&mut backend);
    let context = system.active().unwrap();

    // Between the light and the cube's silhouette edge, nothing in the way.
    let lit = shade(context, &depth, Vec3::new(-1.0, -0.5, -1.0));
    let ambient = context.materials().ambient;
    assert!(
        lit.x > ambient.x + 0.1,
        "expected direct light, got {}",
        lit.x
    );
}

#[test]
fn fragment_outside_the_outer_cone_gets_no_direct_light() {
    let mut backend = MockBackend::new();
    let (system, depth) = scene(&mut backend);
    let context = system.active().unwrap();
    let light = &context.lights()[0];

    // Well off-axis: cos(theta) of roughly 0.74 against an outer cutoff
    // cosine of about 0.924.
    let position = Vec3::new(10.0, -0.5, -5.0);
    let to_fragment = (position - light.position).normalize();
    let cos_theta = to_fragment.dot(&light.direction.normalize());
    assert_relative_eq!(light.spot_intensity(cos_theta), 0.0);

    let outside = shade(context, &depth, position);
    let ambient = context.materials().ambient;
    assert_relative_eq!(outside.x, ambient.x, epsilon = 1e-4);
}
