//! Error types for glsl-math.

use thiserror::Error;

use crate::shader::ShaderStage;

/// Errors that can occur during shader compilation or program linking.
///
/// These are the only errors a [`RenderSession`](crate::session::RenderSession)
/// treats as recoverable: they are logged and execution continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShaderError {
    /// A shader stage failed to compile.
    #[error("shader compile error ({stage}):\n{log}")]
    CompileError {
        /// The shader stage that failed.
        stage: ShaderStage,
        /// The driver's info log, prefixed with the numbered source.
        log: String,
    },
    /// A program failed to link.
    #[error("shader link error:\n{0}")]
    LinkError(String),
}

/// Errors produced while generating bitmaps or driving a backend.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Width or height was zero, or the byte length would overflow `usize`.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// A raw pixel buffer did not match the declared dimensions.
    #[error("buffer length {got} does not match {width}x{height} RGBA (expected {expected})")]
    DimensionMismatch {
        width: usize,
        height: usize,
        expected: usize,
        got: usize,
    },

    /// An (x, y) coordinate was outside the bitmap bounds.
    #[error("pixel ({x}, {y}) out of bounds for bitmap of size ({width}, {height})")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// Shader compilation or linking failed.
    #[error(transparent)]
    Shader(#[from] ShaderError),

    /// A command ran before the object it operates on was created or bound.
    #[error("no {0} bound")]
    MissingResource(&'static str),

    /// The linked program has no active attribute with this name.
    #[error("attribute not found in program: {0}")]
    UnknownAttribute(String),

    /// The linked program has no active uniform with this name.
    #[error("uniform not found in program: {0}")]
    UnknownUniform(String),

    /// The GL driver refused to create or configure an object.
    #[error("gl error: {0}")]
    Gl(String),

    /// `render_frame` was called before `initialize`.
    #[error("render session is not initialized")]
    NotInitialized,

    /// A configuration value was out of range or unparseable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Reading or writing a file failed.
    #[error("io error: {0}")]
    Io(String),
}

impl RenderError {
    /// Returns true for errors the session logs instead of propagating.
    pub fn is_shader_diagnostic(&self) -> bool {
        matches!(self, RenderError::Shader(_))
    }
}
