//! [`Backend`] implementation on a live `glow::Context`.
//!
//! `GlowBackend` wraps the context together with the objects the command
//! stream creates: one program, one vertex buffer, one texture. Creating a
//! new object of a kind deletes the previous one.

use crate::backend::Backend;
use crate::command::{Command, DepthFunc, Primitive};
use crate::error::RenderError;

use super::shader::{compile_shader, link_program};
use super::texture::{set_filters, upload_bitmap};

/// Executes commands on a GL or WebGL context.
pub struct GlowBackend {
    gl: glow::Context,
    program: Option<glow::Program>,
    vertex_buffer: Option<glow::Buffer>,
    texture: Option<glow::Texture>,
}

fn depth_func(func: DepthFunc) -> u32 {
    match func {
        DepthFunc::Less => glow::LESS,
        DepthFunc::LessEqual => glow::LEQUAL,
        DepthFunc::Always => glow::ALWAYS,
    }
}

fn primitive_mode(primitive: Primitive) -> u32 {
    match primitive {
        Primitive::Triangles => glow::TRIANGLES,
        Primitive::TriangleStrip => glow::TRIANGLE_STRIP,
    }
}

impl GlowBackend {
    /// Wraps `gl`. No GL calls are made until the first command.
    pub fn new(gl: glow::Context) -> Self {
        Self {
            gl,
            program: None,
            vertex_buffer: None,
            texture: None,
        }
    }

    /// Returns a reference to the underlying `glow::Context`.
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    /// Deletes the owned GL objects and returns the context.
    #[allow(unsafe_code)]
    pub fn into_gl(mut self) -> glow::Context {
        use glow::HasContext;

        // SAFETY: all handles were created on self.gl and are deleted once.
        unsafe {
            if let Some(program) = self.program.take() {
                self.gl.delete_program(program);
            }
            if let Some(buffer) = self.vertex_buffer.take() {
                self.gl.delete_buffer(buffer);
            }
            if let Some(texture) = self.texture.take() {
                self.gl.delete_texture(texture);
            }
        }
        self.gl
    }

    fn program(&self) -> Result<glow::Program, RenderError> {
        self.program.ok_or(RenderError::MissingResource("program"))
    }

    fn texture(&self) -> Result<glow::Texture, RenderError> {
        self.texture.ok_or(RenderError::MissingResource("texture"))
    }

    fn vertex_buffer(&self) -> Result<glow::Buffer, RenderError> {
        self.vertex_buffer
            .ok_or(RenderError::MissingResource("vertex buffer"))
    }
}

impl Backend for GlowBackend {
    #[allow(unsafe_code)]
    fn execute(&mut self, command: &Command) -> Result<(), RenderError> {
        use glow::HasContext;

        let gl = &self.gl;

        // SAFETY: glow wraps raw GL calls as unsafe. Every handle passed below
        // was created on this context and is checked for presence first.
        unsafe {
            match command {
                Command::ClearColor { rgba: [r, g, b, a] } => gl.clear_color(*r, *g, *b, *a),
                Command::EnableDepthTest { func } => {
                    gl.enable(glow::DEPTH_TEST);
                    gl.depth_func(depth_func(*func));
                }
                Command::Clear { color, depth } => {
                    let mut mask = 0;
                    if *color {
                        mask |= glow::COLOR_BUFFER_BIT;
                    }
                    if *depth {
                        mask |= glow::DEPTH_BUFFER_BIT;
                    }
                    gl.clear(mask);
                }
                Command::UploadVertices { vertices } => {
                    let buffer = gl.create_buffer().map_err(RenderError::Gl)?;
                    let bytes: Vec<u8> = vertices.iter().flat_map(|v| v.to_ne_bytes()).collect();
                    gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
                    gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, &bytes, glow::STATIC_DRAW);
                    if let Some(old) = self.vertex_buffer.replace(buffer) {
                        gl.delete_buffer(old);
                    }
                }
                Command::CreateProgram => {
                    let program = gl.create_program().map_err(RenderError::Gl)?;
                    if let Some(old) = self.program.replace(program) {
                        gl.delete_program(old);
                    }
                }
                Command::AttachShader { stage, source } => {
                    let program = self.program()?;
                    let shader = compile_shader(gl, *stage, source)?;
                    gl.attach_shader(program, shader);
                    // flagged for deletion, freed with the program
                    gl.delete_shader(shader);
                }
                Command::LinkProgram => link_program(gl, self.program()?)?,
                Command::UseProgram => gl.use_program(Some(self.program()?)),
                Command::EnableAttribute { name, components } => {
                    let program = self.program()?;
                    self.vertex_buffer()?;
                    let location = gl
                        .get_attrib_location(program, name)
                        .ok_or_else(|| RenderError::UnknownAttribute(name.clone()))?;
                    gl.enable_vertex_attrib_array(location);
                    gl.vertex_attrib_pointer_f32(location, *components, glow::FLOAT, false, 0, 0);
                }
                Command::UploadTexture { bitmap, flip_y } => {
                    let texture = upload_bitmap(gl, bitmap, *flip_y).map_err(RenderError::Gl)?;
                    if let Some(old) = self.texture.replace(texture) {
                        gl.delete_texture(old);
                    }
                }
                Command::SetTextureFilter { mag, min } => {
                    gl.bind_texture(glow::TEXTURE_2D, Some(self.texture()?));
                    set_filters(gl, *mag, *min);
                }
                Command::GenerateMipmap => {
                    gl.bind_texture(glow::TEXTURE_2D, Some(self.texture()?));
                    gl.generate_mipmap(glow::TEXTURE_2D);
                }
                Command::ActiveTexture { unit } => {
                    let texture = self.texture()?;
                    gl.active_texture(glow::TEXTURE0 + unit);
                    gl.bind_texture(glow::TEXTURE_2D, Some(texture));
                }
                Command::SetSamplerUniform { name, unit } => {
                    let program = self.program()?;
                    let location = gl
                        .get_uniform_location(program, name)
                        .ok_or_else(|| RenderError::UnknownUniform(name.clone()))?;
                    gl.uniform_1_i32(Some(&location), *unit);
                }
                Command::Viewport { width, height } => {
                    let size = |v: u32| {
                        i32::try_from(v)
                            .map_err(|_| RenderError::Gl(format!("viewport size {v} out of range")))
                    };
                    gl.viewport(0, 0, size(*width)?, size(*height)?);
                }
                Command::DrawArrays {
                    primitive,
                    first,
                    count,
                } => {
                    self.program()?;
                    self.vertex_buffer()?;
                    gl.draw_arrays(primitive_mode(*primitive), *first, *count);
                }
            }
        }

        // SAFETY: querying the error flag has no preconditions.
        let error = unsafe { gl.get_error() };
        if error != glow::NO_ERROR {
            log::debug!("{} left GL error 0x{error:04X}", command.name());
        }
        Ok(())
    }
}
