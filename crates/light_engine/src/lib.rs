//! # Light Engine
//!
//! A multi-light forward-shading and shadow-mapping subsystem designed to be
//! layered on top of an existing 3D rendering host. The host owns meshes,
//! materials, the camera, and the window; this crate owns per-fragment
//! illumination and shadow visibility for a bounded number of dynamic lights.
//!
//! ## Architecture
//!
//! - **Backend boundary**: everything GPU-facing goes through the
//!   [`render::api::RenderBackend`] trait so the subsystem stays independent
//!   of the host's graphics API.
//! - **Lighting state**: [`lighting::LightingSystem`] owns one or more
//!   [`lighting::LightingContext`] values, each holding a fixed array of
//!   lights plus context-wide material defaults. Property writes are pushed
//!   to the active shading program immediately (write-through).
//! - **Shadow pass**: [`lighting::ShadowPassController`] brackets a
//!   depth-only render into a light's private depth target, saving and
//!   restoring the host's viewport/projection/blend state.
//! - **Shading**: [`shading`] implements the per-fragment algorithm
//!   (Blinn-Phong or Cook-Torrance) as host-callable logic, mirroring what
//!   the forward shader stage computes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use light_engine::prelude::*;
//!
//! fn setup(backend: &mut dyn RenderBackend) -> LightingResult<()> {
//!     let mut system = LightingSystem::new();
//!     let key = system.create_context(backend, 4, ShadingModelKind::BlinnPhong)?;
//!     system.activate(key);
//!
//!     let ctx = system.active_mut().unwrap();
//!     ctx.set_light_type(backend, 0, LightType::Spot);
//!     ctx.set_light_position(backend, 0, Vec3::new(-5.0, 5.0, -5.0));
//!     ctx.set_light_target(backend, 0, Vec3::zeros());
//!     ctx.enable_light(backend, 0);
//!     ctx.enable_shadows(backend, 0, 1024)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod core;
pub mod foundation;
pub mod lighting;
pub mod render;
pub mod shading;

/// Common imports for subsystem users
pub mod prelude {
    pub use crate::core::config::{Config, ConfigError, LightingConfig, ShadowConfig};
    pub use crate::foundation::math::{Mat4, Mat4Ext, Vec2, Vec3, Vec4};
    pub use crate::lighting::{
        Light, LightProperty, LightType, LightingContext, LightingSystem, MaterialDefaults,
        MaterialMaps, ShadowCaster, ShadowPassController,
    };
    pub use crate::render::api::{RenderBackend, ShaderKind, TextureHandle};
    pub use crate::render::primitives::{MaterialBindings, Mesh, MeshAttributes, Model};
    pub use crate::render::{LightingError, LightingResult};
    pub use crate::shading::{FragmentInput, ShadingModelKind, ShadingPipeline, SurfaceSample};
}
