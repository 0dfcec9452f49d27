//! Diagnostics produced while lexing, parsing and interpreting diagrams.
//!
//! Every problem is a [`Diagnostic`] carrying a severity, an optional
//! [`ErrorCode`], labelled spans into the block source and optional help.
//! Grammar failures are returned as a [`ParseError`] wrapping one or more
//! error diagnostics. Interpretation problems are warnings: the offending
//! instruction is dropped and the diagnostic is handed back to the caller.
//!
//! # Example
//!
//! ```
//! # use merfolk_parser::error::{Diagnostic, ErrorCode};
//! # use merfolk_parser::Span;
//! let diag = Diagnostic::warning("return without matching call")
//!     .with_code(ErrorCode::W200)
//!     .with_label(Span::new(20..34), "no pending call from `B` to `A`")
//!     .with_help("add the call message before its return");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
