//! The seam between the render session and a graphics API.
//!
//! [`Backend`] executes one [`Command`] at a time. [`HeadlessBackend`] is a
//! GPU-free implementation that records every command it is given and
//! enforces the preconditions documented on each variant, so session logic
//! can be tested without a display.

use std::collections::HashSet;

use crate::command::Command;
use crate::error::{RenderError, ShaderError};
use crate::quad::POSITION_COMPONENTS;
use crate::shader::{declared_names, format_shader_error, ShaderStage};

/// Executes GPU commands against some context.
pub trait Backend {
    /// Applies `command` to the context.
    ///
    /// Shader compile and link failures are reported as
    /// `RenderError::Shader`; the caller decides whether to continue.
    fn execute(&mut self, command: &Command) -> Result<(), RenderError>;
}

impl<B: Backend + ?Sized> Backend for &mut B {
    fn execute(&mut self, command: &Command) -> Result<(), RenderError> {
        (**self).execute(command)
    }
}

#[derive(Debug, Default)]
struct ProgramState {
    stages: HashSet<ShaderStage>,
    attributes: HashSet<String>,
    uniforms: HashSet<String>,
    linked: bool,
}

/// A backend with no GPU behind it.
///
/// Tracks bindings well enough to reject commands issued out of order,
/// reflects attribute and uniform names from attached sources, and can be
/// told to fail a shader stage or the link step.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    history: Vec<Command>,
    program: Option<ProgramState>,
    in_use: bool,
    vertex_floats: Option<usize>,
    attribute_components: Option<i32>,
    texture: Option<(usize, usize)>,
    mipmaps_complete: bool,
    fail_stage: Option<ShaderStage>,
    fail_link: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes compilation of `stage` fail with a synthetic driver log.
    pub fn fail_compile(mut self, stage: ShaderStage) -> Self {
        self.fail_stage = Some(stage);
        self
    }

    /// Makes every link attempt fail.
    pub fn fail_link(mut self) -> Self {
        self.fail_link = true;
        self
    }

    /// Every command passed to `execute`, including ones that failed.
    pub fn history(&self) -> &[Command] {
        &self.history
    }

    /// Number of draw calls attempted so far.
    pub fn draw_calls(&self) -> usize {
        self.history
            .iter()
            .filter(|c| matches!(c, Command::DrawArrays { .. }))
            .count()
    }

    /// False once mipmaps were requested for a texture GL cannot mipmap.
    /// Sampling such a texture yields black, as on a real driver.
    pub fn texture_complete(&self) -> bool {
        self.texture.is_some() && self.mipmaps_complete
    }

    /// Whole vertices in the bound buffer, using the enabled attribute's
    /// size or the quad's position size when none is enabled.
    fn vertex_count(&self) -> Option<usize> {
        let components = self.attribute_components.unwrap_or(POSITION_COMPONENTS);
        self.vertex_floats
            .map(|floats| floats / components.max(1) as usize)
    }

    fn program(&mut self) -> Result<&mut ProgramState, RenderError> {
        self.program.as_mut().ok_or(RenderError::MissingResource("program"))
    }

    fn require_in_use(&self) -> Result<&ProgramState, RenderError> {
        match &self.program {
            Some(p) if self.in_use => Ok(p),
            _ => Err(RenderError::MissingResource("program in use")),
        }
    }

    fn compile(&mut self, stage: ShaderStage, source: &str) -> Result<(), RenderError> {
        let failed = self.fail_stage == Some(stage);
        let program = self.program()?;
        if failed || !source.contains("main") {
            return Err(ShaderError::CompileError {
                stage,
                log: format_shader_error(source, "ERROR: 0:0: 'main' : function not defined"),
            }
            .into());
        }
        program.stages.insert(stage);
        if stage == ShaderStage::Vertex {
            program.attributes.extend(declared_names(source, "attribute"));
        }
        program.uniforms.extend(declared_names(source, "uniform"));
        Ok(())
    }

    fn link(&mut self) -> Result<(), RenderError> {
        let fail_link = self.fail_link;
        let program = self.program()?;
        let missing = [ShaderStage::Vertex, ShaderStage::Fragment]
            .into_iter()
            .find(|s| !program.stages.contains(s));
        program.linked = false;
        if fail_link {
            return Err(ShaderError::LinkError("link failed".into()).into());
        }
        if let Some(stage) = missing {
            return Err(ShaderError::LinkError(format!("missing {stage} shader")).into());
        }
        program.linked = true;
        Ok(())
    }
}

impl Backend for HeadlessBackend {
    fn execute(&mut self, command: &Command) -> Result<(), RenderError> {
        self.history.push(command.clone());

        match command {
            Command::ClearColor { .. }
            | Command::EnableDepthTest { .. }
            | Command::Clear { .. }
            | Command::Viewport { .. } => Ok(()),
            Command::UploadVertices { vertices } => {
                if vertices.is_empty() {
                    return Err(RenderError::Gl("empty vertex buffer".into()));
                }
                self.vertex_floats = Some(vertices.len());
                self.attribute_components = None;
                Ok(())
            }
            Command::CreateProgram => {
                self.program = Some(ProgramState::default());
                self.in_use = false;
                Ok(())
            }
            Command::AttachShader { stage, source } => self.compile(*stage, source),
            Command::LinkProgram => self.link(),
            Command::UseProgram => {
                self.program()?;
                self.in_use = true;
                Ok(())
            }
            Command::EnableAttribute { name, components } => {
                let program = self.require_in_use()?;
                if self.vertex_floats.is_none() {
                    return Err(RenderError::MissingResource("vertex buffer"));
                }
                if !program.linked || !program.attributes.contains(name) {
                    return Err(RenderError::UnknownAttribute(name.clone()));
                }
                if !(1..=4).contains(components) {
                    return Err(RenderError::Gl(format!(
                        "attribute size {components} out of range"
                    )));
                }
                self.attribute_components = Some(*components);
                Ok(())
            }
            Command::UploadTexture { bitmap, .. } => {
                self.texture = Some((bitmap.width(), bitmap.height()));
                self.mipmaps_complete = true;
                Ok(())
            }
            Command::SetTextureFilter { .. } | Command::ActiveTexture { .. } => self
                .texture
                .map(|_| ())
                .ok_or(RenderError::MissingResource("texture")),
            Command::GenerateMipmap => {
                let (w, h) = self.texture.ok_or(RenderError::MissingResource("texture"))?;
                // WebGL1 raises INVALID_OPERATION here and leaves the texture
                // incomplete; nothing reaches the caller.
                if !(w.is_power_of_two() && h.is_power_of_two()) {
                    log::warn!("mipmaps require power-of-two sides, texture is {w}x{h}");
                    self.mipmaps_complete = false;
                }
                Ok(())
            }
            Command::SetSamplerUniform { name, .. } => {
                let program = self.require_in_use()?;
                if !program.linked || !program.uniforms.contains(name) {
                    return Err(RenderError::UnknownUniform(name.clone()));
                }
                Ok(())
            }
            Command::DrawArrays { first, count, .. } => {
                self.require_in_use()?;
                let vertices = self
                    .vertex_count()
                    .ok_or(RenderError::MissingResource("vertex buffer"))?;
                let end = first
                    .checked_add(*count)
                    .filter(|_| *first >= 0 && *count >= 0)
                    .and_then(|end| usize::try_from(end).ok());
                match end {
                    Some(end) if end <= vertices => Ok(()),
                    _ => Err(RenderError::Gl(format!(
                        "draw range {first}+{count} exceeds {vertices} vertices"
                    ))),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Bitmap;
    use crate::shader::ShaderSources;

    fn linked(backend: &mut HeadlessBackend) {
        let sources = ShaderSources::default();
        for cmd in [
            Command::UploadVertices {
                vertices: crate::quad::QUAD_VERTICES.to_vec(),
            },
            Command::CreateProgram,
            Command::AttachShader {
                stage: ShaderStage::Vertex,
                source: sources.vertex.clone(),
            },
            Command::AttachShader {
                stage: ShaderStage::Fragment,
                source: sources.fragment.clone(),
            },
            Command::LinkProgram,
            Command::UseProgram,
        ] {
            backend.execute(&cmd).unwrap();
        }
    }

    #[test]
    fn records_every_command() {
        let mut backend = HeadlessBackend::new();
        backend.execute(&Command::Clear { color: true, depth: true }).unwrap();
        let _ = backend.execute(&Command::LinkProgram);
        assert_eq!(backend.history().len(), 2);
    }

    #[test]
    fn attach_without_program_is_missing_resource() {
        let mut backend = HeadlessBackend::new();
        let result = backend.execute(&Command::AttachShader {
            stage: ShaderStage::Vertex,
            source: "void main() {}".into(),
        });
        assert!(matches!(result, Err(RenderError::MissingResource("program"))));
    }

    #[test]
    fn forced_compile_failure_reports_stage() {
        let mut backend = HeadlessBackend::new().fail_compile(ShaderStage::Fragment);
        backend.execute(&Command::CreateProgram).unwrap();
        let result = backend.execute(&Command::AttachShader {
            stage: ShaderStage::Fragment,
            source: "void main() {}".into(),
        });
        match result {
            Err(RenderError::Shader(ShaderError::CompileError { stage, log })) => {
                assert_eq!(stage, ShaderStage::Fragment);
                assert!(log.contains("1: void main() {}"), "got: {log}");
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[test]
    fn link_requires_both_stages() {
        let mut backend = HeadlessBackend::new();
        backend.execute(&Command::CreateProgram).unwrap();
        let result = backend.execute(&Command::LinkProgram);
        assert!(matches!(
            result,
            Err(RenderError::Shader(ShaderError::LinkError(msg))) if msg.contains("vertex")
        ));
    }

    #[test]
    fn reflected_names_gate_attribute_and_uniform() {
        let mut backend = HeadlessBackend::new();
        linked(&mut backend);
        backend
            .execute(&Command::EnableAttribute {
                name: "position".into(),
                components: 3,
            })
            .unwrap();
        let missing = backend.execute(&Command::EnableAttribute {
            name: "normal".into(),
            components: 3,
        });
        assert!(matches!(missing, Err(RenderError::UnknownAttribute(n)) if n == "normal"));

        backend
            .execute(&Command::SetSamplerUniform {
                name: "input_tex".into(),
                unit: 0,
            })
            .unwrap();
        let missing = backend.execute(&Command::SetSamplerUniform {
            name: "other_tex".into(),
            unit: 0,
        });
        assert!(matches!(missing, Err(RenderError::UnknownUniform(_))));
    }

    #[test]
    fn unlinked_program_has_no_active_attributes() {
        let mut backend = HeadlessBackend::new().fail_link();
        backend.execute(&Command::UploadVertices { vertices: vec![0.0; 12] }).unwrap();
        backend.execute(&Command::CreateProgram).unwrap();
        backend
            .execute(&Command::AttachShader {
                stage: ShaderStage::Vertex,
                source: ShaderSources::default().vertex,
            })
            .unwrap();
        assert!(backend.execute(&Command::LinkProgram).is_err());
        backend.execute(&Command::UseProgram).unwrap();
        let result = backend.execute(&Command::EnableAttribute {
            name: "position".into(),
            components: 3,
        });
        assert!(matches!(result, Err(RenderError::UnknownAttribute(_))));
    }

    #[test]
    fn texture_commands_require_bound_texture() {
        let mut backend = HeadlessBackend::new();
        for cmd in [Command::GenerateMipmap, Command::ActiveTexture { unit: 0 }] {
            assert!(matches!(
                backend.execute(&cmd),
                Err(RenderError::MissingResource("texture"))
            ));
        }
    }

    #[test]
    fn non_power_of_two_mipmaps_leave_texture_incomplete() {
        let mut backend = HeadlessBackend::new();
        backend
            .execute(&Command::UploadTexture {
                bitmap: Bitmap::new(6, 4).unwrap(),
                flip_y: true,
            })
            .unwrap();
        assert!(backend.texture_complete());
        backend.execute(&Command::GenerateMipmap).unwrap();
        assert!(!backend.texture_complete());

        backend
            .execute(&Command::UploadTexture {
                bitmap: Bitmap::new(8, 4).unwrap(),
                flip_y: true,
            })
            .unwrap();
        backend.execute(&Command::GenerateMipmap).unwrap();
        assert!(backend.texture_complete());
    }

    #[test]
    fn draw_range_counts_vertices_not_floats() {
        let mut backend = HeadlessBackend::new();
        linked(&mut backend);
        let draw = |first, count| Command::DrawArrays {
            primitive: crate::command::Primitive::TriangleStrip,
            first,
            count,
        };
        backend.execute(&draw(0, 4)).unwrap();
        backend.execute(&draw(1, 3)).unwrap();
        for (first, count) in [(0, 5), (0, 12), (2, 3), (-1, 2), (0, -1)] {
            assert!(
                matches!(backend.execute(&draw(first, count)), Err(RenderError::Gl(_))),
                "{first}+{count} accepted"
            );
        }
    }

    #[test]
    fn draw_range_uses_enabled_attribute_size() {
        let mut backend = HeadlessBackend::new();
        linked(&mut backend);
        backend
            .execute(&Command::EnableAttribute {
                name: "position".into(),
                components: 2,
            })
            .unwrap();
        // 12 floats read two at a time
        let draw = Command::DrawArrays {
            primitive: crate::command::Primitive::Triangles,
            first: 0,
            count: 6,
        };
        backend.execute(&draw).unwrap();
    }

    #[test]
    fn overflowing_draw_range_is_rejected() {
        let mut backend = HeadlessBackend::new();
        linked(&mut backend);
        for (first, count) in [(i32::MAX, 1), (1, i32::MAX), (i32::MAX, i32::MAX)] {
            let result = backend.execute(&Command::DrawArrays {
                primitive: crate::command::Primitive::TriangleStrip,
                first,
                count,
            });
            assert!(matches!(result, Err(RenderError::Gl(_))));
        }
    }

    #[test]
    fn draw_requires_program_and_buffer() {
        let draw = Command::DrawArrays {
            primitive: crate::command::Primitive::TriangleStrip,
            first: 0,
            count: 4,
        };
        let mut backend = HeadlessBackend::new();
        assert!(matches!(
            backend.execute(&draw),
            Err(RenderError::MissingResource("program in use"))
        ));

        linked(&mut backend);
        backend.execute(&draw).unwrap();
        assert_eq!(backend.draw_calls(), 2);
    }
}
