#![deny(unsafe_code)]
//! Core types for glsl-math: a procedural circle test pattern uploaded as a
//! texture and drawn on a full-screen quad.
//!
//! Provides the `CirclePattern` generator, the RGBA `Bitmap`, the explicit
//! GPU `Command` model, the `Backend` trait with a headless implementation,
//! `SessionConfig`, and the `RenderSession` that ties them together.

pub mod backend;
pub mod bitmap;
pub mod command;
pub mod config;
pub mod error;
pub mod pattern;
pub mod quad;
pub mod session;
pub mod shader;

#[cfg(feature = "render")]
pub mod render;

#[cfg(feature = "png")]
pub mod snapshot;

pub use backend::{Backend, HeadlessBackend};
pub use bitmap::Bitmap;
pub use command::{Command, TextureFilter};
pub use config::SessionConfig;
pub use error::{RenderError, ShaderError};
pub use pattern::{ChannelOverflow, CirclePattern, PatternConfig};
pub use session::RenderSession;
pub use shader::{ShaderSources, ShaderStage};
