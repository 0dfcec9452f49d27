//! Command-line argument definitions for the Merfolk CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the input documents, the output
//! directory, configuration file selection and logging verbosity.

use clap::Parser;

/// Transpile Mermaid class and sequence diagrams into Java
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Markdown file, or directory whose `*.md` files are read
    #[arg(help = "Path to a Markdown file or a directory of Markdown files")]
    pub input: String,

    /// Directory the Java sources are written to
    #[arg(short, long, default_value = "out")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Also write the code model as JSON to this path
    #[arg(short, long)]
    pub model: Option<String>,
}
