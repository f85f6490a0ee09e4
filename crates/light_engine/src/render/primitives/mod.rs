//! Interface-boundary geometry and material data
//!
//! Mesh storage lives in the host; these types carry just enough about a
//! mesh and its material bindings for the lit and depth-only draw paths.

mod mesh;

pub use mesh::{MaterialBindings, Mesh, MeshAttributes, Model};
