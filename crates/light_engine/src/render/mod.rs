//! # Render Boundary
//!
//! Types shared across the host-facing rendering boundary: the backend
//! abstraction ([`api`]), interface-level mesh/material data
//! ([`primitives`]), and the subsystem error taxonomy.
//!
//! ## Error Philosophy
//!
//! Only resource-level failures surface as [`LightingError`] values.
//! Configuration-class mistakes (an out-of-range light index, a shadow cast
//! requested on a light without shadows, a nested `begin_cast`) are logged
//! and treated as no-ops so a frame can always complete; they never abort
//! the caller.

pub mod api;
pub mod primitives;

use thiserror::Error;

/// Subsystem error types for resource and backend failures
#[derive(Error, Debug)]
pub enum LightingError {
    /// GPU resource (depth target, framebuffer, shader) creation failed
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// Backend-specific error wrapped in a generic form
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Result type for lighting operations
pub type LightingResult<T> = Result<T, LightingError>;
