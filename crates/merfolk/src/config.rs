//! Configuration types for Merfolk transpilation.
//!
//! All types implement [`serde::Deserialize`] so the CLI can load them from a
//! TOML file. Every section and every key is optional and falls back to its
//! default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`InputConfig`] - How invalid blocks and documents are treated.
//! - [`InterpreterSettings`] - Sequence interpretation options.
//! - [`EmitConfig`] - Java output options.
//!
//! # Example
//!
//! ```
//! # use merfolk::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.input().skip_invalid_blocks());
//! assert_eq!(config.interpreter().entry_method(), "run");
//! assert_eq!(config.emit().indent(), 4);
//! ```

use serde::Deserialize;

use merfolk_parser::InterpreterConfig;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Input handling section.
    #[serde(default)]
    input: InputConfig,

    /// Sequence interpreter section.
    #[serde(default)]
    interpreter: InterpreterSettings,

    /// Java emitter section.
    #[serde(default)]
    emit: EmitConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(input: InputConfig, interpreter: InterpreterSettings, emit: EmitConfig) -> Self {
        Self {
            input,
            interpreter,
            emit,
        }
    }

    /// Returns the input configuration.
    pub fn input(&self) -> &InputConfig {
        &self.input
    }

    /// Returns the interpreter configuration.
    pub fn interpreter(&self) -> &InterpreterSettings {
        &self.interpreter
    }

    /// Returns the emitter configuration.
    pub fn emit(&self) -> &EmitConfig {
        &self.emit
    }
}

/// How blocks that fail to parse are treated.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Report invalid blocks and documents and continue instead of aborting.
    skip_invalid_blocks: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            skip_invalid_blocks: true,
        }
    }
}

impl InputConfig {
    pub fn new(skip_invalid_blocks: bool) -> Self {
        Self {
            skip_invalid_blocks,
        }
    }

    pub fn skip_invalid_blocks(&self) -> bool {
        self.skip_invalid_blocks
    }
}

/// Sequence interpretation options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InterpreterSettings {
    /// Method synthesized on a sender that has no active context.
    entry_method: String,
}

impl Default for InterpreterSettings {
    fn default() -> Self {
        Self {
            entry_method: InterpreterConfig::default().entry_method,
        }
    }
}

impl InterpreterSettings {
    pub fn new(entry_method: impl Into<String>) -> Self {
        Self {
            entry_method: entry_method.into(),
        }
    }

    pub fn entry_method(&self) -> &str {
        &self.entry_method
    }

    /// The parser-level configuration for one interpretation run.
    pub fn to_interpreter_config(&self) -> InterpreterConfig {
        InterpreterConfig {
            entry_method: self.entry_method.clone(),
        }
    }
}

/// Java output options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmitConfig {
    /// Package declared at the top of every file, if any.
    package: Option<String>,

    /// Prefix prepended to interface names, e.g. `I`.
    interface_prefix: String,

    /// Spaces per indentation level.
    indent: usize,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            package: None,
            interface_prefix: String::new(),
            indent: 4,
        }
    }
}

impl EmitConfig {
    /// Creates a new [`EmitConfig`].
    ///
    /// # Arguments
    ///
    /// * `package` - Package name, or `None` for the default package.
    /// * `interface_prefix` - Prefix for interface names; may be empty.
    /// * `indent` - Spaces per indentation level.
    pub fn new(package: Option<String>, interface_prefix: impl Into<String>, indent: usize) -> Self {
        Self {
            package,
            interface_prefix: interface_prefix.into(),
            indent,
        }
    }

    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub fn interface_prefix(&self) -> &str {
        &self.interface_prefix
    }

    pub fn indent(&self) -> usize {
        self.indent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [emit]
            package = "com.shop"

            [input]
            skip_invalid_blocks = false
            "#,
        )
        .unwrap();

        assert!(!config.input().skip_invalid_blocks());
        assert_eq!(config.interpreter().entry_method(), "run");
        assert_eq!(config.emit().package(), Some("com.shop"));
        assert_eq!(config.emit().interface_prefix(), "");
        assert_eq!(config.emit().indent(), 4);
    }

    #[test]
    fn test_interpreter_config_conversion() {
        let settings = InterpreterSettings::new("main");
        assert_eq!(settings.to_interpreter_config().entry_method, "main");
    }
}
