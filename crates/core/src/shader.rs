//! Shader stages, default pass-through sources, and pure GLSL helpers.
//!
//! The compile and link calls themselves live in the backends; this module
//! holds what can be tested without a GPU: the default sources, error
//! formatting, and a lightweight scan of declared attributes and uniforms.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A programmable pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Lower-case stage name as used in logs and errors.
    pub fn as_str(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GLSL ES 1.0 vertex shader that passes the quad through untransformed.
///
/// Declares `attribute vec3 position` and derives texture coordinates from
/// the clip-space position.
pub const DEFAULT_VERTEX_SHADER: &str = r#"attribute vec3 position;
varying vec2 v_uv;
void main() {
    v_uv = position.xy * 0.5 + 0.5;
    gl_Position = vec4(position, 1.0);
}
"#;

/// GLSL ES 1.0 fragment shader that samples `input_tex` at the interpolated UV.
pub const DEFAULT_FRAGMENT_SHADER: &str = r#"precision mediump float;
uniform sampler2D input_tex;
varying vec2 v_uv;
void main() {
    gl_FragColor = texture2D(input_tex, v_uv);
}
"#;

/// Source text for the two stages of a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Returns the source for `stage`.
    pub fn get(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self::new(DEFAULT_VERTEX_SHADER, DEFAULT_FRAGMENT_SHADER)
    }
}

/// Formats a shader compilation error for human-readable debugging.
///
/// Prepends right-aligned line numbers to each line of `source`, then
/// appends the driver's error `log`, so that line references in the log can
/// be matched against the GLSL. Either input may be empty.
pub fn format_shader_error(source: &str, log: &str) -> String {
    let source_lines: Vec<&str> = source.lines().collect();
    let width = source_lines.len().max(1).to_string().len();

    let numbered: String = source_lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}: {line}", i + 1, width = width))
        .collect::<Vec<_>>()
        .join("\n");

    match (numbered.is_empty(), log.is_empty()) {
        (true, true) => String::new(),
        (true, false) => log.to_string(),
        (false, true) => numbered,
        (false, false) => format!("{numbered}\n\n{log}"),
    }
}

/// Returns the names declared with `qualifier` (e.g. `"attribute"`,
/// `"uniform"`) at global scope in `source`.
///
/// Handles `qualifier [precision] type a, b;` declarations and skips line
/// comments. Block comments and preprocessor conditionals are not evaluated.
pub fn declared_names(source: &str, qualifier: &str) -> Vec<String> {
    let mut names = Vec::new();
    for line in source.lines() {
        let code = line.split("//").next().unwrap_or_default();
        for statement in code.split(';') {
            let mut tokens = statement.split_whitespace();
            if tokens.next() != Some(qualifier) {
                continue;
            }
            let rest: Vec<&str> = tokens.collect();
            // drop precision qualifier and type, keep the declarator list
            let declarators = rest
                .iter()
                .skip_while(|t| matches!(**t, "lowp" | "mediump" | "highp"))
                .skip(1)
                .copied()
                .collect::<Vec<_>>()
                .join(" ");
            names.extend(
                declarators
                    .split(',')
                    .map(|d| d.split('[').next().unwrap_or_default().trim())
                    .filter(|d| !d.is_empty())
                    .map(String::from),
            );
        }
    }
    names
}
