#![deny(unsafe_code)]
//! CLI binary for glsl-math.
//!
//! Subcommands:
//! - `render`: generate the circle test pattern and write a PNG
//! - `plan`: run a headless render session and print the GPU command trace

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use glsl_math_core::{
    ChannelOverflow, CirclePattern, HeadlessBackend, RenderSession, SessionConfig,
    ShaderSources,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "glsl-math", about = "Circle test pattern and WebGL session tools")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Session config JSON file; flags override its values.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the circle test pattern and write it as a PNG.
    Render {
        /// Side length of the square pattern in pixels.
        #[arg(short, long)]
        size: Option<usize>,

        /// How the out-of-range green value is stored (saturate, wrap).
        #[arg(long)]
        overflow: Option<String>,

        /// Flip rows the way the texture upload does.
        #[arg(long)]
        flip: bool,

        /// Output file path.
        #[arg(short, long, default_value = "pattern.png")]
        output: PathBuf,
    },
    /// Run a headless session (initialize + one frame) and print the commands.
    Plan {
        /// Vertex shader source file (defaults to the built-in pass-through).
        #[arg(long)]
        vertex: Option<PathBuf>,

        /// Fragment shader source file (defaults to the built-in sampler).
        #[arg(long)]
        fragment: Option<PathBuf>,
    },
}

fn read_text(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|e| CliError::Io(format!("{}: {e}", path.display())))
}

fn load_config(path: Option<&Path>) -> Result<SessionConfig, CliError> {
    match path {
        Some(path) => Ok(SessionConfig::from_json(&read_text(path)?)?),
        None => Ok(SessionConfig::default()),
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Render {
            size,
            overflow,
            flip,
            output,
        } => {
            if let Some(size) = size {
                config.pattern.size = size;
            }
            if let Some(name) = overflow {
                config.pattern.overflow = ChannelOverflow::from_name(&name)?;
            }

            let pattern = CirclePattern::from_config(&config.pattern)?;
            let mut bitmap = pattern.generate()?;
            if flip {
                bitmap.flip_vertical();
            }
            glsl_math_core::snapshot::write_png(&bitmap, &output)?;

            if cli.json {
                let info = serde_json::json!({
                    "size": pattern.size(),
                    "radius": pattern.radius(),
                    "overflow": config.pattern.overflow,
                    "flipped": flip,
                    "bytes": bitmap.len(),
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {0}x{0} pattern (radius {1:.2}) -> {2}",
                    pattern.size(),
                    pattern.radius(),
                    output.display()
                );
            }
        }
        Command::Plan { vertex, fragment } => {
            let defaults = ShaderSources::default();
            let sources = ShaderSources::new(
                vertex.as_deref().map(read_text).transpose()?.unwrap_or(defaults.vertex),
                fragment
                    .as_deref()
                    .map(read_text)
                    .transpose()?
                    .unwrap_or(defaults.fragment),
            );

            let mut session = RenderSession::new(HeadlessBackend::new(), config, sources)?;
            session.initialize()?;
            session.render_frame()?;

            let trace: Vec<String> = session
                .backend()
                .history()
                .iter()
                .map(ToString::to_string)
                .collect();
            let diagnostics: Vec<String> =
                session.diagnostics().iter().map(ToString::to_string).collect();

            if cli.json {
                let info = serde_json::json!({
                    "commands": trace,
                    "diagnostics": diagnostics,
                    "draw_calls": session.backend().draw_calls(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                for (i, line) in trace.iter().enumerate() {
                    println!("{:>2}. {line}", i + 1);
                }
                if !diagnostics.is_empty() {
                    println!("Diagnostics:");
                    for d in &diagnostics {
                        println!("  {d}");
                    }
                }
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        log::debug!("exiting with {e:?}");
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
