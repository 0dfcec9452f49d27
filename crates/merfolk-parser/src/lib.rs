//! # Merfolk Parser
//!
//! Front half of the Merfolk pipeline: Mermaid class and sequence diagram
//! blocks in, a populated [`CodeModel`](merfolk_core::model::CodeModel) out.
//!
//! 1. **Dispatch** - [`detect_kind`] reads the block header
//! 2. **Tokenize** - one lexer per grammar, recovering after bad characters
//! 3. **Parse** - winnow grammars build a [`Diagram`]
//! 4. **Build** - [`ClassBuilder`] folds class diagrams into the model
//! 5. **Interpret** - [`interpret`] synthesizes method bodies from sequence diagrams
//!
//! ## Usage
//!
//! ```
//! # use merfolk_core::model::CodeModel;
//! # use merfolk_parser::{parse, interpret, ClassBuilder, Diagram, InterpreterConfig, ParseError};
//! fn main() -> Result<(), ParseError> {
//!     let mut model = CodeModel::new();
//!
//!     if let Diagram::Class(diagram) = parse("classDiagram\nShop : +open() int\n")? {
//!         ClassBuilder::new(&mut model).build(&diagram);
//!     }
//!     if let Diagram::Sequence(diagram) = parse("sequenceDiagram\nactor U\nU->>Shop: open()\n")? {
//!         let warnings = interpret(&mut model, &diagram, InterpreterConfig::default());
//!         assert!(warnings.is_empty());
//!     }
//!
//!     assert_eq!(model.entity("Shop").unwrap().methods[0].return_type, "int");
//!     Ok(())
//! }
//! ```

pub mod ast;
mod elaborate;
pub mod error;
pub mod interpret;
mod lexer;
mod parser;
#[cfg(test)]
mod parser_tests;
mod span;
mod tokens;

pub use ast::{ClassDiagram, Diagram, DiagramKind, SequenceDiagram};
pub use elaborate::ClassBuilder;
pub use error::{Diagnostic, ErrorCode, Label, ParseError, Severity};
pub use interpret::{Interpreter, InterpreterConfig, InterpreterState, interpret};
pub use span::{Span, Spanned};

use log::{debug, info, trace};

/// Determine which grammar a block is written in.
///
/// Blank lines and `%%` comment lines before the header are skipped.
///
/// # Errors
///
/// Returns E102 labelled on the first word when it is neither
/// `classDiagram`, `classDiagram-v2` nor `sequenceDiagram`.
pub fn detect_kind(source: &str) -> Result<DiagramKind, ParseError> {
    let mut offset = 0;
    for line in source.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        let trimmed = line.trim_start();
        if trimmed.trim_end().is_empty() || trimmed.starts_with("%%") {
            continue;
        }

        let word_start = start + (line.len() - trimmed.len());
        let word = trimmed
            .split(|c: char| c.is_whitespace())
            .next()
            .unwrap_or_default();

        return match word {
            "classDiagram" | "classDiagram-v2" => Ok(DiagramKind::Class),
            "sequenceDiagram" => Ok(DiagramKind::Sequence),
            _ => Err(unknown_kind(
                format!("unknown diagram type `{word}`"),
                Span::new(word_start..word_start + word.len()),
            )),
        };
    }

    Err(unknown_kind(
        "unknown diagram type: empty block",
        Span::new(source.len()..source.len()),
    ))
}

fn unknown_kind(message: impl Into<String>, span: Span) -> ParseError {
    ParseError::new(vec![
        Diagnostic::error(message)
            .with_code(ErrorCode::E102)
            .with_label(span, "expected `classDiagram` or `sequenceDiagram`")
            .with_help("only class and sequence diagrams can be transpiled"),
    ])
}

/// Parse a block with the grammar its header names.
///
/// # Example
///
/// ```
/// # use merfolk_parser::{parse, DiagramKind};
/// let diagram = parse("sequenceDiagram\nA->>B: hello()\n").unwrap();
/// assert_eq!(diagram.kind(), DiagramKind::Sequence);
/// ```
pub fn parse(source: &str) -> Result<Diagram, ParseError> {
    match detect_kind(source)? {
        DiagramKind::Class => parse_class_diagram(source).map(Diagram::Class),
        DiagramKind::Sequence => parse_sequence_diagram(source).map(Diagram::Sequence),
    }
}

/// Lex and parse a class diagram block.
pub fn parse_class_diagram(source: &str) -> Result<ClassDiagram, ParseError> {
    // Step 1: Tokenize
    let tokens = lexer::tokenize_class(source)?;
    debug!(tokens = tokens.len(); "Tokenized class diagram");

    // Step 2: Parse
    let diagram =
        parser::build_class_diagram(&tokens).map_err(|diag| ParseError::new(vec![diag]))?;
    info!(instructions = diagram.instructions.len(); "Parsed class diagram");
    trace!(diagram:?; "Class diagram AST");

    Ok(diagram)
}

/// Lex and parse a sequence diagram block.
pub fn parse_sequence_diagram(source: &str) -> Result<SequenceDiagram, ParseError> {
    let tokens = lexer::tokenize_sequence(source)?;
    debug!(tokens = tokens.len(); "Tokenized sequence diagram");

    let diagram =
        parser::build_sequence_diagram(&tokens).map_err(|diag| ParseError::new(vec![diag]))?;
    info!(instructions = diagram.instructions.len(); "Parsed sequence diagram");
    trace!(diagram:?; "Sequence diagram AST");

    Ok(diagram)
}
