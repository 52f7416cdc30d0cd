//! Shader compilation and linking on a live `glow::Context`.
//!
//! Unlike a fail-fast pipeline, a failed link leaves the program object alive
//! so the caller can keep issuing commands against it.

use crate::error::ShaderError;
use crate::shader::{format_shader_error, ShaderStage};

/// GL enum for a shader stage.
pub fn gl_stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

/// Compiles a single shader stage.
///
/// Returns the compiled shader handle or a `ShaderError::CompileError` whose
/// log carries the numbered source followed by the driver's info log.
///
/// # Errors
///
/// Returns `ShaderError::CompileError` if the GLSL source fails to compile.
#[allow(unsafe_code)]
pub fn compile_shader(
    gl: &glow::Context,
    stage: ShaderStage,
    source: &str,
) -> Result<glow::Shader, ShaderError> {
    use glow::HasContext;

    // SAFETY: glow wraps raw GL calls as unsafe. We pass valid stage
    // constants and source strings, and delete the shader on failure.
    let shader = unsafe {
        gl.create_shader(gl_stage(stage))
            .map_err(|log| ShaderError::CompileError { stage, log })?
    };

    unsafe {
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
    }

    if unsafe { gl.get_shader_compile_status(shader) } {
        Ok(shader)
    } else {
        let info_log = unsafe { gl.get_shader_info_log(shader) };
        unsafe { gl.delete_shader(shader) };
        Err(ShaderError::CompileError {
            stage,
            log: format_shader_error(source, &info_log),
        })
    }
}

/// Links whatever stages are attached to `program`.
///
/// # Errors
///
/// Returns `ShaderError::LinkError` with the driver's info log if linking
/// fails. The program is not deleted.
#[allow(unsafe_code)]
pub fn link_program(gl: &glow::Context, program: glow::Program) -> Result<(), ShaderError> {
    use glow::HasContext;

    // SAFETY: program is a handle returned by create_program on this context.
    unsafe {
        gl.link_program(program);
        if gl.get_program_link_status(program) {
            Ok(())
        } else {
            Err(ShaderError::LinkError(gl.get_program_info_log(program)))
        }
    }
}
