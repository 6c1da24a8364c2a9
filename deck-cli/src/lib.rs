//! # Saorsa Deck CLI
//!
//! Headless tools for presentation files.
//!
//! ## Usage
//!
//! ```bash
//! deck new talk.json --slides 3
//! deck inspect talk.json
//! deck thumbnails talk.json --out previews/
//! deck normalize talk.json --output clean.json
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliConfig` - Editor configuration resolved from a config file and flags
//! - [`commands`] - One function per subcommand, writing reports to any
//!   `io::Write`

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use deck_core::{ConfigError, EditorConfig};

/// Command-line arguments for deck.
#[derive(Debug, Clone, Parser)]
#[command(name = "deck")]
#[command(about = "Create, inspect and normalize slide deck presentation files")]
#[command(version)]
pub struct CliArgs {
    /// Editor config file (JSON)
    #[arg(long, global = true, env = "DECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long, global = true, env = "DECK_WIDTH")]
    pub width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long, global = true, env = "DECK_HEIGHT")]
    pub height: Option<u32>,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Write a new presentation with empty slides
    New {
        /// File to create
        output: PathBuf,
        /// Number of slides
        #[arg(long, default_value = "1")]
        slides: usize,
    },

    /// Summarize the slides of a presentation
    Inspect {
        /// Presentation file
        input: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Render every slide to a PNG
    Thumbnails {
        /// Presentation file
        input: PathBuf,
        /// Directory for the PNG files
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Scale relative to the canvas size
        #[arg(long, default_value = "0.1")]
        scale: f32,
    },

    /// Re-import and re-export a presentation, regenerating thumbnails
    Normalize {
        /// Presentation file
        input: PathBuf,
        /// Output file (defaults to a timestamped name next to the input)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Resolved CLI configuration.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Editor settings used by every command.
    pub editor: EditorConfig,
}

impl CliConfig {
    /// Resolve the configuration: config file first, then size flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut editor = match &args.config {
            Some(path) => EditorConfig::load(path)?,
            None => EditorConfig::default(),
        };
        if let Some(width) = args.width {
            editor.canvas.width = width;
        }
        if let Some(height) = args.height {
            editor.canvas.height = height;
        }
        Ok(Self { editor })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn test_parse_subcommands() {
        let args = CliArgs::try_parse_from(["deck", "new", "a.json", "--slides", "3"])
            .expect("parse");
        assert!(matches!(args.command, Command::New { slides: 3, .. }));

        let args = CliArgs::try_parse_from(["deck", "thumbnails", "a.json", "--width", "640"])
            .expect("parse");
        assert_eq!(args.width, Some(640));
        match args.command {
            Command::Thumbnails { scale, out, .. } => {
                assert!((scale - 0.1).abs() < f32::EPSILON);
                assert_eq!(out, PathBuf::from("."));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r##"{{"canvas": {{"width": 800, "height": 600, "background": "#000000"}}, "load_timeout_ms": 50}}"##)
            .expect("write");

        let args = CliArgs::try_parse_from([
            "deck",
            "inspect",
            "a.json",
            "--config",
            file.path().to_str().expect("utf-8 path"),
            "--height",
            "450",
        ])
        .expect("parse");
        let config = CliConfig::from_args(&args).expect("config");

        assert_eq!(config.editor.canvas.width, 800);
        assert_eq!(config.editor.canvas.height, 450);
        assert_eq!(config.editor.canvas.background, "#000000");
        assert_eq!(config.editor.load_timeout_ms, 50);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let args = CliArgs::try_parse_from([
            "deck",
            "inspect",
            "a.json",
            "--config",
            "/nonexistent/deck.json",
        ])
        .expect("parse");
        assert!(matches!(
            CliConfig::from_args(&args),
            Err(ConfigError::Read { .. })
        ));
    }
}
