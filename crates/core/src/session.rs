//! The render session: quad setup, pattern texture, and draw.
//!
//! A [`RenderSession`] owns its backend, configuration and shader sources.
//! [`RenderSession::initialize`] runs the one-shot setup (program, quad
//! buffer, pattern texture) and [`RenderSession::render_frame`] issues the
//! draw call.
//!
//! # Failure policy
//!
//! Shader compile and link failures are logged and recorded in
//! [`RenderSession::diagnostics`]; execution continues. Once such a failure
//! has happened the program has no usable interface, so missing attribute
//! and uniform locations are logged and skipped as well, and the draw call
//! is still issued. Every other error is returned to the caller.

use crate::backend::Backend;
use crate::bitmap::Bitmap;
use crate::command::{Command, DepthFunc, Primitive};
use crate::config::SessionConfig;
use crate::error::{RenderError, ShaderError};
use crate::pattern::CirclePattern;
use crate::quad::{POSITION_COMPONENTS, QUAD_VERTEX_COUNT, QUAD_VERTICES};
use crate::shader::{ShaderSources, ShaderStage};

/// A render session bound to one backend.
pub struct RenderSession<B: Backend> {
    backend: B,
    config: SessionConfig,
    sources: ShaderSources,
    diagnostics: Vec<ShaderError>,
    initialized: bool,
}

impl<B: Backend> RenderSession<B> {
    /// Creates a session after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns the first validation error of `config`.
    pub fn new(
        backend: B,
        config: SessionConfig,
        sources: ShaderSources,
    ) -> Result<Self, RenderError> {
        config.validate()?;
        Ok(Self {
            backend,
            config,
            sources,
            diagnostics: Vec::new(),
            initialized: false,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Consumes the session and returns its backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Shader failures logged so far, in the order they happened.
    pub fn diagnostics(&self) -> &[ShaderError] {
        &self.diagnostics
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Commands that clear the surface, upload the quad, build the program
    /// and bind the position attribute.
    pub fn setup_commands(&self) -> Vec<Command> {
        let surface = &self.config.surface;
        let mut commands = vec![Command::ClearColor {
            rgba: surface.clear_color,
        }];
        if surface.depth_test {
            commands.push(Command::EnableDepthTest {
                func: DepthFunc::LessEqual,
            });
        }
        commands.extend([
            Command::Clear {
                color: true,
                depth: surface.depth_test,
            },
            Command::UploadVertices {
                vertices: QUAD_VERTICES.to_vec(),
            },
            Command::CreateProgram,
        ]);
        commands.extend([ShaderStage::Vertex, ShaderStage::Fragment].map(|stage| {
            Command::AttachShader {
                stage,
                source: self.sources.get(stage).to_string(),
            }
        }));
        commands.extend([
            Command::LinkProgram,
            Command::UseProgram,
            Command::EnableAttribute {
                name: self.config.position_attribute.clone(),
                components: POSITION_COMPONENTS,
            },
        ]);
        commands
    }

    /// Generates the configured circle pattern.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern configuration is invalid.
    pub fn pattern_bitmap(&self) -> Result<Bitmap, RenderError> {
        let bitmap = CirclePattern::from_config(&self.config.pattern)?.generate()?;
        log::debug!(
            "generated {}x{} pattern ({} bytes)",
            bitmap.width(),
            bitmap.height(),
            bitmap.len()
        );
        Ok(bitmap)
    }

    /// Commands that generate the pattern bitmap, upload it and bind it to
    /// the sampler uniform.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern configuration is invalid.
    pub fn texture_commands(&self) -> Result<Vec<Command>, RenderError> {
        Ok(self.upload_commands(self.pattern_bitmap()?))
    }

    /// Commands that upload `bitmap` and bind it to the sampler uniform.
    pub fn upload_commands(&self, bitmap: Bitmap) -> Vec<Command> {
        let texture = &self.config.texture;
        let mut commands = vec![
            Command::UploadTexture {
                bitmap,
                flip_y: texture.flip_y,
            },
            Command::SetTextureFilter {
                mag: texture.mag_filter,
                min: texture.min_filter,
            },
        ];
        if texture.mipmaps {
            commands.push(Command::GenerateMipmap);
        }
        commands.extend([
            Command::ActiveTexture { unit: texture.unit },
            Command::SetSamplerUniform {
                name: texture.sampler_uniform.clone(),
                unit: texture.unit as i32,
            },
        ]);
        commands
    }

    /// Commands for one frame: viewport and the quad draw call.
    pub fn frame_commands(&self) -> Vec<Command> {
        vec![
            Command::Viewport {
                width: self.config.surface.width,
                height: self.config.surface.height,
            },
            Command::DrawArrays {
                primitive: Primitive::TriangleStrip,
                first: 0,
                count: QUAD_VERTEX_COUNT,
            },
        ]
    }

    /// Runs the setup and texture commands.
    ///
    /// Calling it again rebuilds program, buffer and texture from scratch.
    ///
    /// # Errors
    ///
    /// Returns any backend error other than a shader diagnostic.
    pub fn initialize(&mut self) -> Result<(), RenderError> {
        let bitmap = self.pattern_bitmap()?;
        self.initialize_with(bitmap)
    }

    /// Like [`initialize`](Self::initialize), but uploads `bitmap` instead of
    /// generating the pattern, for callers that already hold it.
    ///
    /// # Errors
    ///
    /// Returns any backend error other than a shader diagnostic.
    pub fn initialize_with(&mut self, bitmap: Bitmap) -> Result<(), RenderError> {
        let setup = self.setup_commands();
        self.apply(&setup)?;
        let texture = self.upload_commands(bitmap);
        self.apply(&texture)?;
        self.initialized = true;
        log::info!(
            "render session initialized ({} shader diagnostics)",
            self.diagnostics.len()
        );
        Ok(())
    }

    /// Draws one frame.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::NotInitialized` before [`initialize`](Self::initialize)
    /// and any backend error other than a shader diagnostic.
    pub fn render_frame(&mut self) -> Result<(), RenderError> {
        if !self.initialized {
            return Err(RenderError::NotInitialized);
        }
        let frame = self.frame_commands();
        self.apply(&frame)
    }

    fn apply(&mut self, commands: &[Command]) -> Result<(), RenderError> {
        for command in commands {
            log::trace!("{command}");
            match self.backend.execute(command) {
                Ok(()) => {}
                Err(RenderError::Shader(e)) => {
                    log::error!("{e}");
                    self.diagnostics.push(e);
                }
                Err(e @ (RenderError::UnknownAttribute(_) | RenderError::UnknownUniform(_)))
                    if !self.diagnostics.is_empty() =>
                {
                    log::warn!("skipping {}: {e}", command.name());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
