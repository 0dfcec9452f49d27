//! Source emission for Merfolk code models.
//!
//! This module provides the [`Emitter`] trait that defines the interface for
//! turning a finished [`CodeModel`] into source files. It is the final stage
//! of the pipeline and only ever reads the model.
//!
//! # Pipeline Position
//!
//! ```text
//! Markdown documents
//!     ↓ extract blocks
//! Diagram blocks
//!     ↓ parse
//! Class / sequence ASTs
//!     ↓ build + interpret
//! CodeModel
//!     ↓ emit (this module)
//! Source files
//! ```
//!
//! # Available Backends
//!
//! - [`java`] - Java classes and interfaces via [`java::JavaEmitter`]

/// Java source backend.
pub mod java;

use merfolk_core::model::CodeModel;

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// File name relative to the output directory, e.g. `Shop.java`.
    pub file_name: String,
    pub contents: String,
}

/// Abstraction for source emission backends.
pub trait Emitter {
    /// Render every entity of `model` into a source file, in model order.
    fn emit_model(&self, model: &CodeModel) -> Vec<GeneratedFile>;
}

/// Line-oriented text builder with indentation.
#[derive(Debug)]
pub(crate) struct CodeWriter {
    out: String,
    unit: String,
    level: usize,
}

impl CodeWriter {
    pub(crate) fn new(indent: usize) -> Self {
        Self {
            out: String::new(),
            unit: " ".repeat(indent),
            level: 0,
        }
    }

    /// Write one line at the current indentation.
    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.level {
                self.out.push_str(&self.unit);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub(crate) fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Write `header {` and indent.
    pub(crate) fn open(&mut self, header: impl AsRef<str>) {
        self.line(format!("{} {{", header.as_ref()));
        self.level += 1;
    }

    /// Dedent and write `}` followed by `suffix`.
    pub(crate) fn close(&mut self, suffix: &str) {
        self.level = self.level.saturating_sub(1);
        self.line(format!("}}{suffix}"));
    }

    /// Dedent, write `} keyword {` and indent again.
    pub(crate) fn reopen(&mut self, keyword: &str) {
        self.level = self.level.saturating_sub(1);
        self.line(format!("}} {keyword} {{"));
        self.level += 1;
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_writer_indents_blocks() {
        let mut writer = CodeWriter::new(2);
        writer.open("class A");
        writer.line("int x;");
        writer.blank();
        writer.open("void f()");
        writer.line("");
        writer.close("");
        writer.close("");

        assert_eq!(
            writer.finish(),
            "class A {\n  int x;\n\n  void f() {\n\n  }\n}\n"
        );
    }
}
