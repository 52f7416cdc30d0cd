//! Explicit GPU state-machine commands.
//!
//! GL is a bind-then-act state machine: most calls operate on whatever object
//! is currently bound. Each [`Command`] documents which bindings it expects
//! and which it leaves behind, so a backend can check preconditions and a
//! test can inspect the sequence without a GPU.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bitmap::Bitmap;
use crate::shader::ShaderStage;

/// Texture sampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureFilter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl TextureFilter {
    /// Whether sampling with this filter reads mipmap levels.
    pub fn uses_mipmaps(self) -> bool {
        !matches!(self, TextureFilter::Nearest | TextureFilter::Linear)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TextureFilter::Nearest => "nearest",
            TextureFilter::Linear => "linear",
            TextureFilter::NearestMipmapNearest => "nearest_mipmap_nearest",
            TextureFilter::LinearMipmapNearest => "linear_mipmap_nearest",
            TextureFilter::NearestMipmapLinear => "nearest_mipmap_linear",
            TextureFilter::LinearMipmapLinear => "linear_mipmap_linear",
        }
    }
}

/// Depth comparison function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthFunc {
    Less,
    LessEqual,
    Always,
}

/// Primitive assembly mode for draw calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    TriangleStrip,
}

/// One step of GPU configuration or drawing.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Sets the clear color. No preconditions.
    ClearColor { rgba: [f32; 4] },
    /// Enables depth testing with the given comparison. No preconditions.
    EnableDepthTest { func: DepthFunc },
    /// Clears the selected buffers of the default framebuffer.
    Clear { color: bool, depth: bool },
    /// Creates an `ARRAY_BUFFER`, binds it, and fills it with `STATIC_DRAW`
    /// data. Leaves the buffer bound.
    UploadVertices { vertices: Vec<f32> },
    /// Creates an empty program object. Replaces any previous program.
    CreateProgram,
    /// Compiles `source` for `stage` and attaches it.
    /// Requires: a program created by [`Command::CreateProgram`].
    AttachShader { stage: ShaderStage, source: String },
    /// Links the attached stages.
    /// Requires: a program.
    LinkProgram,
    /// Makes the program current.
    /// Requires: a program.
    UseProgram,
    /// Enables the named attribute and points it at the bound vertex buffer
    /// as `components` tightly packed floats.
    /// Requires: a program in use and a bound vertex buffer.
    EnableAttribute { name: String, components: i32 },
    /// Creates a `TEXTURE_2D`, binds it, and uploads `bitmap` as
    /// RGBA/`UNSIGNED_BYTE` level 0, flipping rows first when `flip_y` is set.
    /// Leaves the texture bound.
    UploadTexture { bitmap: Bitmap, flip_y: bool },
    /// Sets magnification and minification filters.
    /// Requires: a bound texture.
    SetTextureFilter {
        mag: TextureFilter,
        min: TextureFilter,
    },
    /// Builds the full mipmap chain from level 0.
    /// Requires: a bound texture with power-of-two sides.
    GenerateMipmap,
    /// Selects texture unit `unit` and binds the current texture to it.
    /// Requires: a bound texture.
    ActiveTexture { unit: u32 },
    /// Writes `unit` to the named sampler uniform.
    /// Requires: a program in use.
    SetSamplerUniform { name: String, unit: i32 },
    /// Sets the viewport to `(0, 0, width, height)`. No preconditions.
    Viewport { width: u32, height: u32 },
    /// Draws `count` vertices starting at `first`.
    /// Requires: a program in use and a bound vertex buffer.
    DrawArrays {
        primitive: Primitive,
        first: i32,
        count: i32,
    },
}

impl Command {
    /// Short snake_case name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::ClearColor { .. } => "clear_color",
            Command::EnableDepthTest { .. } => "enable_depth_test",
            Command::Clear { .. } => "clear",
            Command::UploadVertices { .. } => "upload_vertices",
            Command::CreateProgram => "create_program",
            Command::AttachShader { .. } => "attach_shader",
            Command::LinkProgram => "link_program",
            Command::UseProgram => "use_program",
            Command::EnableAttribute { .. } => "enable_attribute",
            Command::UploadTexture { .. } => "upload_texture",
            Command::SetTextureFilter { .. } => "set_texture_filter",
            Command::GenerateMipmap => "generate_mipmap",
            Command::ActiveTexture { .. } => "active_texture",
            Command::SetSamplerUniform { .. } => "set_sampler_uniform",
            Command::Viewport { .. } => "viewport",
            Command::DrawArrays { .. } => "draw_arrays",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match self {
            Command::ClearColor { rgba: [r, g, b, a] } => write!(f, "{name} ({r}, {g}, {b}, {a})"),
            Command::EnableDepthTest { func } => write!(f, "{name} {func:?}"),
            Command::Clear { color, depth } => write!(f, "{name} color={color} depth={depth}"),
            Command::UploadVertices { vertices } => {
                write!(f, "{name} {} floats", vertices.len())
            }
            Command::AttachShader { stage, source } => {
                write!(f, "{name} {stage} ({} bytes)", source.len())
            }
            Command::EnableAttribute { name: attr, components } => {
                write!(f, "{name} {attr} x{components}")
            }
            Command::UploadTexture { bitmap, flip_y } => write!(
                f,
                "{name} {}x{} rgba8 flip_y={flip_y}",
                bitmap.width(),
                bitmap.height()
            ),
            Command::SetTextureFilter { mag, min } => {
                write!(f, "{name} mag={} min={}", mag.as_str(), min.as_str())
            }
            Command::ActiveTexture { unit } => write!(f, "{name} {unit}"),
            Command::SetSamplerUniform { name: uniform, unit } => {
                write!(f, "{name} {uniform}={unit}")
            }
            Command::Viewport { width, height } => write!(f, "{name} {width}x{height}"),
            Command::DrawArrays {
                primitive,
                first,
                count,
            } => write!(f, "{name} {primitive:?} first={first} count={count}"),
            Command::CreateProgram | Command::LinkProgram | Command::UseProgram
            | Command::GenerateMipmap => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mipmap_filters_are_detected() {
        assert!(TextureFilter::LinearMipmapNearest.uses_mipmaps());
        assert!(TextureFilter::NearestMipmapLinear.uses_mipmaps());
        assert!(!TextureFilter::Linear.uses_mipmaps());
        assert!(!TextureFilter::Nearest.uses_mipmaps());
    }

    #[test]
    fn filter_deserializes_from_snake_case() {
        let f: TextureFilter = serde_json::from_str("\"linear_mipmap_nearest\"").unwrap();
        assert_eq!(f, TextureFilter::LinearMipmapNearest);
        assert_eq!(f.as_str(), "linear_mipmap_nearest");
    }

    #[test]
    fn display_summarizes_texture_upload() {
        let cmd = Command::UploadTexture {
            bitmap: Bitmap::new(4, 2).unwrap(),
            flip_y: true,
        };
        assert_eq!(cmd.to_string(), "upload_texture 4x2 rgba8 flip_y=true");
    }

    #[test]
    fn display_omits_shader_source() {
        let cmd = Command::AttachShader {
            stage: ShaderStage::Vertex,
            source: "void main() {}".into(),
        };
        assert_eq!(cmd.to_string(), "attach_shader vertex (14 bytes)");
    }

    #[test]
    fn display_of_unit_commands_is_the_name() {
        for cmd in [
            Command::CreateProgram,
            Command::LinkProgram,
            Command::UseProgram,
            Command::GenerateMipmap,
        ] {
            assert_eq!(cmd.to_string(), cmd.name());
        }
    }

    #[test]
    fn display_draw_call() {
        let cmd = Command::DrawArrays {
            primitive: Primitive::TriangleStrip,
            first: 0,
            count: 4,
        };
        assert_eq!(cmd.to_string(), "draw_arrays TriangleStrip first=0 count=4");
    }
}
