//! WASM bindings for glsl-math.
//!
//! On load, [`start`] installs the console logger and panic hook, then draws
//! the circle test pattern on the `#result` canvas through WebGL1. Pages that
//! want a different setup call `run_with_config` with a JSON session config.
//!
//! Shader sources are read from the `#vertex-shader` and `#fragment-shader`
//! elements when present, otherwise the built-in pass-through pair is used.

use glsl_math_core::ShaderSources;

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{run_with_config, start, WebSession};

/// Picks page-provided shader text over the built-in sources, stage by stage.
///
/// Blank text counts as absent.
pub fn resolve_sources(vertex: Option<String>, fragment: Option<String>) -> ShaderSources {
    let defaults = ShaderSources::default();
    let pick = |text: Option<String>, fallback: String| {
        text.filter(|t| !t.trim().is_empty()).unwrap_or(fallback)
    };
    ShaderSources::new(
        pick(vertex, defaults.vertex),
        pick(fragment, defaults.fragment),
    )
}
