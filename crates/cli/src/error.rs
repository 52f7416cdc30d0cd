//! Exit codes for `glsl-math`.
//!
//! - 0:  success
//! - 2:  clap arg parse error
//! - 10: the pattern or headless session failed: zero or oversized pattern
//!   dimensions, a command issued without its binding, or an undeclared
//!   attribute or sampler with an otherwise healthy program
//! - 11: a shader source or config file could not be read, or the PNG could
//!   not be written
//! - 12: the config JSON or a flag value was rejected
//! - 13: the `--json` report could not be serialized
//!
//! Shader compile and link failures during `plan` are not errors: they are
//! printed as diagnostics and the command exits 0.

use glsl_math_core::RenderError;
use std::fmt;

/// A failed `render` or `plan` run.
#[derive(Debug)]
pub enum CliError {
    /// Pattern generation or a backend precondition failed.
    Render(RenderError),
    /// Reading shaders/config or writing the PNG failed; carries the path.
    Io(String),
    /// Malformed config JSON, an invalid config value, or an unknown
    /// `--overflow` name.
    Input(String),
    /// The JSON report could not be produced.
    Serialization(String),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Render(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Render(e) => write!(f, "{e}"),
            CliError::Io(msg) => write!(f, "{msg}"),
            CliError::Input(msg) => write!(f, "{msg}"),
            CliError::Serialization(msg) => write!(f, "{msg}"),
        }
    }
}

// Config and file problems are the user's to fix, so they get their own
// codes instead of the generic render code.
impl From<RenderError> for CliError {
    fn from(e: RenderError) -> Self {
        match e {
            RenderError::Io(msg) => CliError::Io(msg),
            RenderError::InvalidConfig(msg) => CliError::Input(msg),
            other => CliError::Render(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_error_exit_code_is_10() {
        let err = CliError::Render(RenderError::InvalidDimensions);
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn io_error_exit_code_is_11() {
        assert_eq!(CliError::Io("write failed".into()).exit_code(), 11);
    }

    #[test]
    fn input_error_exit_code_is_12() {
        assert_eq!(CliError::Input("bad overflow".into()).exit_code(), 12);
    }

    #[test]
    fn serialization_error_exit_code_is_13() {
        assert_eq!(CliError::Serialization("json fail".into()).exit_code(), 13);
    }

    #[test]
    fn from_render_error_io_routes_to_cli_io() {
        let cli_err = CliError::from(RenderError::Io("disk full".into()));
        assert_eq!(cli_err.exit_code(), 11);
        assert!(cli_err.to_string().contains("disk full"));
    }

    #[test]
    fn from_render_error_config_routes_to_cli_input() {
        let cli_err = CliError::from(RenderError::InvalidConfig("radius".into()));
        assert_eq!(cli_err.exit_code(), 12);
    }

    #[test]
    fn from_render_error_other_routes_to_cli_render() {
        let cli_err = CliError::from(RenderError::UnknownUniform("input_tex".into()));
        assert_eq!(cli_err.exit_code(), 10);
        assert!(cli_err.to_string().contains("input_tex"));
    }

    #[test]
    fn pattern_dimension_errors_route_to_cli_render() {
        let cli_err = CliError::from(RenderError::InvalidDimensions);
        assert_eq!(cli_err.exit_code(), 10);
        let cli_err = CliError::from(RenderError::MissingResource("texture"));
        assert_eq!(cli_err.exit_code(), 10);
        assert!(cli_err.to_string().contains("texture"));
    }

    #[test]
    fn unknown_overflow_name_routes_to_cli_input() {
        let err = glsl_math_core::ChannelOverflow::from_name("clip").unwrap_err();
        assert_eq!(CliError::from(err).exit_code(), 12);
    }

    #[test]
    fn from_serde_json_error_routes_to_serialization() {
        let bad_json = serde_json::from_str::<serde_json::Value>("{invalid");
        let cli_err = CliError::from(bad_json.unwrap_err());
        assert_eq!(cli_err.exit_code(), 13);
    }
}
