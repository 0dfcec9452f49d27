//! Merfolk - transpile Mermaid class and sequence diagrams into Java.
//!
//! Class diagrams contribute entities, fields and method signatures; sequence
//! diagrams contribute method bodies reconstructed from their messages. All
//! diagram blocks of one run feed a single [`CodeModel`] which is then
//! rendered to Java sources.

pub mod config;
pub mod document;
pub mod emit;

mod error;

pub use merfolk_core::{model, naming, types};
pub use merfolk_parser::{Diagnostic, ErrorCode, Label, ParseError, Severity, Span};

pub use emit::GeneratedFile;
pub use error::MerfolkError;

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, trace, warn};

use merfolk_parser::{ClassBuilder, Diagram, interpret};

use config::AppConfig;
use document::{DiagramBlock, extract_blocks};
use emit::{Emitter, java::JavaEmitter};
use model::CodeModel;

/// A named Markdown document holding Mermaid blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    name: String,
    text: String,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Read a document from disk, naming it after its path.
    ///
    /// # Errors
    ///
    /// Returns [`MerfolkError::Io`] if the file cannot be read.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, MerfolkError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Ok(Self::new(path.display().to_string(), text))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Diagnostics for one block (or one malformed document) of a run.
#[derive(Debug, Clone)]
pub struct BlockReport {
    document: String,
    line: usize,
    source: String,
    skipped: bool,
    diagnostics: Vec<Diagnostic>,
}

impl BlockReport {
    /// Name of the document the block belongs to.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// 1-based document line the block text starts on.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Block text the diagnostic spans refer to.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns `true` when the block contributed nothing to the model.
    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

/// Result of transpiling a set of documents.
#[derive(Debug, Clone)]
pub struct Transpilation {
    pub model: CodeModel,
    /// Warnings and skipped blocks, in the order they were found.
    pub reports: Vec<BlockReport>,
}

/// Driver for parsing diagram blocks and emitting Java.
///
/// # Examples
///
/// ```
/// use merfolk::{Document, Transpiler};
///
/// let text = "```mermaid\nclassDiagram\nShop : +open() boolean\n```\n";
/// let transpiler = Transpiler::default();
///
/// let result = transpiler
///     .transpile(&[Document::new("shop.md", text)])
///     .expect("transpilation failed");
/// let files = transpiler.render_java(&result.model);
///
/// assert_eq!(files[0].file_name, "Shop.java");
/// assert!(files[0].contents.contains("public boolean open()"));
/// ```
#[derive(Debug, Default)]
pub struct Transpiler {
    config: AppConfig,
}

impl Transpiler {
    /// Create a new transpiler with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse one diagram block.
    ///
    /// # Errors
    ///
    /// Returns [`MerfolkError::Parse`] carrying the block source for an
    /// unknown header, a lexical error or a grammar error.
    pub fn parse_block(&self, source: &str) -> Result<Diagram, MerfolkError> {
        let diagram = merfolk_parser::parse(source)
            .map_err(|err| MerfolkError::new_parse_error(err, source))?;
        debug!(kind:% = diagram.kind(); "Block parsed successfully");
        Ok(diagram)
    }

    /// Transpile `documents` into one shared model.
    ///
    /// Class blocks of every document are built before any sequence block is
    /// interpreted, so message receivers see all declared signatures.
    /// Sequence blocks are then interpreted in document order.
    ///
    /// # Errors
    ///
    /// With `skip_invalid_blocks` disabled, the first malformed document or
    /// unparsable block aborts the run. Otherwise they are reported in
    /// [`Transpilation::reports`] and skipped.
    pub fn transpile(&self, documents: &[Document]) -> Result<Transpilation, MerfolkError> {
        info!(documents = documents.len(); "Transpiling documents");

        let skip_invalid = self.config.input().skip_invalid_blocks();
        let mut model = CodeModel::new();
        let mut reports = Vec::new();
        let mut sequences = Vec::new();

        for document in documents {
            let blocks = match extract_blocks(document.text()) {
                Ok(blocks) => blocks,
                Err(err) if skip_invalid => {
                    warn!(document = document.name(), line = err.line(); "Skipping document: {err}");
                    reports.push(BlockReport {
                        document: document.name().to_string(),
                        line: err.line(),
                        source: String::new(),
                        skipped: true,
                        diagnostics: vec![Diagnostic::error(err.to_string())],
                    });
                    continue;
                }
                Err(err) => {
                    return Err(MerfolkError::Document {
                        document: document.name().to_string(),
                        err,
                    });
                }
            };
            debug!(document = document.name(), blocks = blocks.len(); "Extracted mermaid blocks");

            for block in blocks {
                match self.parse_block(block.source()) {
                    Ok(Diagram::Class(diagram)) => {
                        ClassBuilder::new(&mut model).build(&diagram);
                    }
                    Ok(Diagram::Sequence(diagram)) => sequences.push((document, block, diagram)),
                    Err(MerfolkError::Parse { err, src }) if skip_invalid => {
                        warn!(document = document.name(), line = block.line(); "Skipping block: {err}");
                        reports.push(BlockReport {
                            document: document.name().to_string(),
                            line: block.line(),
                            source: src,
                            skipped: true,
                            diagnostics: err.into_diagnostics(),
                        });
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        info!(entities = model.len(), sequences = sequences.len(); "Class diagrams built");

        let interpreter_config = self.config.interpreter().to_interpreter_config();
        for (document, block, diagram) in sequences {
            let diagnostics = interpret(&mut model, &diagram, interpreter_config.clone());
            if diagnostics.is_empty() {
                continue;
            }
            reports.push(Self::warnings(document, &block, diagnostics));
        }

        info!(entities = model.len(), reports = reports.len(); "Transpilation finished");
        trace!(model:?; "Final code model");

        Ok(Transpilation { model, reports })
    }

    fn warnings(
        document: &Document,
        block: &DiagramBlock,
        diagnostics: Vec<Diagnostic>,
    ) -> BlockReport {
        warn!(
            document = document.name(),
            line = block.line(),
            warnings = diagnostics.len();
            "Sequence diagram interpreted with warnings"
        );
        BlockReport {
            document: document.name().to_string(),
            line: block.line(),
            source: block.source().to_string(),
            skipped: false,
            diagnostics,
        }
    }

    /// Render every entity of `model` as a Java source file.
    pub fn render_java(&self, model: &CodeModel) -> Vec<GeneratedFile> {
        JavaEmitter::new(self.config.emit()).emit_model(model)
    }

    /// Render `model` and write one `.java` file per entity into `dir`.
    ///
    /// The directory is created if needed. Returns the written paths.
    ///
    /// # Errors
    ///
    /// Returns [`MerfolkError::Io`] if the directory or a file cannot be written.
    pub fn write_java(
        &self,
        model: &CodeModel,
        dir: impl AsRef<Path>,
    ) -> Result<Vec<PathBuf>, MerfolkError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let mut written = Vec::new();
        for file in self.render_java(model) {
            let path = dir.join(&file.file_name);
            fs::write(&path, file.contents)?;
            debug!(path:? = path; "Wrote Java source");
            written.push(path);
        }

        info!(files = written.len(), dir:? = dir; "Java sources written");
        Ok(written)
    }
}
