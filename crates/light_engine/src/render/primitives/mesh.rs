//! Mesh and material-binding descriptions at the host boundary

use bitflags::bitflags;

use crate::foundation::math::{Mat4, Vec4};
use crate::render::api::{MeshHandle, TextureHandle};

bitflags! {
    /// Vertex attributes a host mesh provides
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MeshAttributes: u8 {
        /// Object-space positions (always required)
        const POSITION = 1 << 0;
        /// Texture coordinates
        const UV = 1 << 1;
        /// Vertex normals
        const NORMAL = 1 << 2;
        /// Tangents for the TBN basis
        const TANGENT = 1 << 3;
        /// Per-vertex colors
        const COLOR = 1 << 4;
    }
}

/// A host-owned mesh as seen by the lighting subsystem
#[derive(Debug, Clone, Copy)]
pub struct Mesh {
    /// Backend handle to the vertex/index buffers
    pub handle: MeshHandle,
    /// Which attributes the buffers carry
    pub attributes: MeshAttributes,
    /// Number of indices to draw
    pub index_count: u32,
}

impl Mesh {
    /// Describe a host mesh
    pub fn new(handle: MeshHandle, attributes: MeshAttributes, index_count: u32) -> Self {
        Self {
            handle,
            attributes,
            index_count,
        }
    }
}

/// Per-submesh material texture bindings with scalar fallbacks
///
/// Every map is optional; the shading program falls back to the scalar
/// value when the corresponding texture is absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialBindings {
    /// Albedo/diffuse map
    pub albedo: Option<TextureHandle>,
    /// Specular map
    pub specular: Option<TextureHandle>,
    /// Metalness map
    pub metalness: Option<TextureHandle>,
    /// Roughness map
    pub roughness: Option<TextureHandle>,
    /// Tangent-space normal map
    pub normal: Option<TextureHandle>,
    /// Ambient-occlusion map
    pub occlusion: Option<TextureHandle>,
    /// Emissive map
    pub emissive: Option<TextureHandle>,
    /// Height map for parallax
    pub height: Option<TextureHandle>,
    /// Base color fallback (RGBA)
    pub base_color: Option<Vec4>,
    /// Specular scalar fallback
    pub specular_value: Option<f32>,
    /// Metalness scalar fallback
    pub metalness_value: Option<f32>,
    /// Roughness scalar fallback
    pub roughness_value: Option<f32>,
}

/// A model: a transform plus one or more mesh/material parts
#[derive(Debug, Clone)]
pub struct Model {
    /// Mesh/material pairs, one per submesh
    pub parts: Vec<(Mesh, MaterialBindings)>,
    /// World transform applied to every part
    pub transform: Mat4,
}

impl Model {
    /// Create a single-part model
    pub fn single(mesh: Mesh, material: MaterialBindings, transform: Mat4) -> Self {
        Self {
            parts: vec![(mesh, material)],
            transform,
        }
    }
}
