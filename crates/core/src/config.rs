//! Session configuration.
//!
//! Every field has a default matching the canonical demo (512x512 surface,
//! `position` attribute, `input_tex` sampler on unit 0), so a JSON config only
//! needs to name the values it changes.

use serde::{Deserialize, Serialize};

use crate::command::TextureFilter;
use crate::error::RenderError;
use crate::pattern::{CirclePattern, PatternConfig};

/// The drawing surface the quad is rendered to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
    pub clear_color: [f32; 4],
    pub depth_test: bool,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            depth_test: true,
        }
    }
}

/// How the generated bitmap is uploaded and exposed to the fragment shader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureSettings {
    pub unit: u32,
    pub sampler_uniform: String,
    pub mag_filter: TextureFilter,
    pub min_filter: TextureFilter,
    pub mipmaps: bool,
    pub flip_y: bool,
}

impl Default for TextureSettings {
    fn default() -> Self {
        Self {
            unit: 0,
            sampler_uniform: "input_tex".to_string(),
            mag_filter: TextureFilter::Linear,
            min_filter: TextureFilter::LinearMipmapNearest,
            mipmaps: true,
            flip_y: true,
        }
    }
}

/// Identifiers of the host page elements used by the browser entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementIds {
    pub canvas: String,
    pub vertex_shader: String,
    pub fragment_shader: String,
    pub scratch_canvas: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            canvas: "result".to_string(),
            vertex_shader: "vertex-shader".to_string(),
            fragment_shader: "fragment-shader".to_string(),
            scratch_canvas: "input_data".to_string(),
        }
    }
}

/// Complete configuration of a render session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub surface: SurfaceConfig,
    pub pattern: PatternConfig,
    pub texture: TextureSettings,
    /// Name of the `vec3` vertex attribute fed from the quad buffer.
    pub position_attribute: String,
    pub elements: ElementIds,
}

impl SessionConfig {
    /// Parses a JSON config and validates it.
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| RenderError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that serde cannot.
    pub fn validate(&self) -> Result<(), RenderError> {
        CirclePattern::from_config(&self.pattern)?;
        let surface = &self.surface;
        if surface.width == 0 || surface.height == 0 {
            return Err(RenderError::InvalidDimensions);
        }
        // glViewport takes signed sizes
        if i32::try_from(surface.width).is_err() || i32::try_from(surface.height).is_err() {
            return Err(RenderError::InvalidConfig(format!(
                "surface {}x{} exceeds the viewport range",
                surface.width, surface.height
            )));
        }
        if self.position_attribute.is_empty() {
            return Err(RenderError::InvalidConfig(
                "position_attribute must not be empty".into(),
            ));
        }
        if self.texture.sampler_uniform.is_empty() {
            return Err(RenderError::InvalidConfig(
                "texture.sampler_uniform must not be empty".into(),
            ));
        }
        if self.texture.min_filter.uses_mipmaps() && !self.texture.mipmaps {
            return Err(RenderError::InvalidConfig(format!(
                "min_filter {} samples mipmaps but mipmaps are disabled",
                self.texture.min_filter.as_str()
            )));
        }
        if self.texture.unit > i32::MAX as u32 {
            return Err(RenderError::InvalidConfig(format!(
                "texture unit {} out of range",
                self.texture.unit
            )));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            surface: SurfaceConfig::default(),
            pattern: PatternConfig::default(),
            texture: TextureSettings::default(),
            position_attribute: "position".to_string(),
            elements: ElementIds::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::ChannelOverflow;

    #[test]
    fn defaults_match_canonical_demo() {
        let config = SessionConfig::default();
        assert_eq!(config.surface.width, 512);
        assert_eq!(config.surface.height, 512);
        assert_eq!(config.pattern.size, 512);
        assert_eq!(config.position_attribute, "position");
        assert_eq!(config.texture.sampler_uniform, "input_tex");
        assert_eq!(config.texture.unit, 0);
        assert_eq!(config.texture.mag_filter, TextureFilter::Linear);
        assert_eq!(config.texture.min_filter, TextureFilter::LinearMipmapNearest);
        assert_eq!(config.elements.canvas, "result");
        assert_eq!(config.elements.scratch_canvas, "input_data");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_json_yields_defaults() {
        assert_eq!(SessionConfig::from_json("{}").unwrap(), SessionConfig::default());
    }

    #[test]
    fn partial_json_overrides_nested_fields() {
        let config = SessionConfig::from_json(
            r#"{"pattern": {"size": 256, "overflow": "wrap"}, "texture": {"unit": 2}}"#,
        )
        .unwrap();
        assert_eq!(config.pattern.size, 256);
        assert_eq!(config.pattern.overflow, ChannelOverflow::Wrap);
        assert_eq!(config.texture.unit, 2);
        assert_eq!(config.texture.sampler_uniform, "input_tex");
    }

    #[test]
    fn malformed_json_is_invalid_config() {
        let result = SessionConfig::from_json("{not json");
        assert!(matches!(result, Err(RenderError::InvalidConfig(_))));
    }

    #[test]
    fn zero_surface_rejected() {
        let result = SessionConfig::from_json(r#"{"surface": {"width": 0}}"#);
        assert!(matches!(result, Err(RenderError::InvalidDimensions)));
    }

    #[test]
    fn surface_beyond_viewport_range_rejected() {
        let mut config = SessionConfig::default();
        config.surface.height = i32::MAX as u32 + 1;
        assert!(matches!(config.validate(), Err(RenderError::InvalidConfig(_))));

        config.surface.height = i32::MAX as u32;
        config.validate().unwrap();
    }

    #[test]
    fn mipmap_filter_without_mipmaps_rejected() {
        let result = SessionConfig::from_json(r#"{"texture": {"mipmaps": false}}"#);
        assert!(matches!(result, Err(RenderError::InvalidConfig(_))));

        let ok = SessionConfig::from_json(r#"{"texture": {"mipmaps": false, "min_filter": "linear"}}"#);
        assert!(ok.is_ok());
    }

    #[test]
    fn invalid_pattern_rejected() {
        let result = SessionConfig::from_json(r#"{"pattern": {"radius_divisor": 0.0}}"#);
        assert!(matches!(result, Err(RenderError::InvalidConfig(_))));
        let result = SessionConfig::from_json(r#"{"pattern": {"size": 0}}"#);
        assert!(matches!(result, Err(RenderError::InvalidDimensions)));
    }

    #[test]
    fn empty_names_rejected() {
        assert!(SessionConfig::from_json(r#"{"position_attribute": ""}"#).is_err());
        assert!(SessionConfig::from_json(r#"{"texture": {"sampler_uniform": ""}}"#).is_err());
    }

    #[test]
    fn config_serializes_round_trip() {
        let config = SessionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(SessionConfig::from_json(&json).unwrap(), config);
    }
}
