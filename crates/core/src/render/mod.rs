//! Live GL backend.
//!
//! This module is only available when the `render` feature is enabled.
//! It executes the session's command stream on a `glow::Context`, which
//! wraps WebGL1 in the browser and desktop GL natively.
//!
//! # Module overview
//!
//! - [`shader`] -- Stage compilation and program linking.
//! - [`texture`] -- Bitmap upload and filter configuration.
//! - [`context`] -- [`GlowBackend`], the `Backend` implementation.

pub mod context;
pub mod shader;
pub mod texture;

pub use context::GlowBackend;
pub use shader::{compile_shader, gl_stage, link_program};
pub use texture::{gl_filter, set_filters, upload_bitmap};
