//! Error codes for the Merfolk diagnostic system.
//!
//! Codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Parser and dispatch errors
//! - `W2xx` - Sequence interpretation warnings

use std::fmt;

/// Stable identifiers for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unexpected character.
    ///
    /// A character was encountered that no token of the grammar starts with.
    E001,

    /// Unknown arrow.
    ///
    /// A run of arrow characters in a sequence diagram does not match any of
    /// the supported arrows (`->>`, `-->>`, `->`, `-->`, `<<->>`, `<<-->>`,
    /// `-x`, `--x`, `-)`, `--)`).
    E002,

    /// Unterminated quoted text.
    ///
    /// A cardinality string was opened with `"` but not closed on the same line.
    E003,

    // =========================================================================
    // Parser Errors (E1xx)
    // =========================================================================
    /// Unexpected token.
    ///
    /// The parser encountered a token it did not expect at this position.
    E100,

    /// Incomplete input.
    ///
    /// The input ended unexpectedly before a complete construct was parsed.
    E101,

    /// Unknown diagram type.
    ///
    /// The block does not start with `classDiagram` or `sequenceDiagram`.
    E102,

    // =========================================================================
    // Interpretation Warnings (W2xx)
    // =========================================================================
    /// Return without matching call.
    ///
    /// A return message arrived while no call from its receiver to its
    /// sender is pending.
    W200,

    /// End without open block.
    W201,

    /// No active method context.
    ///
    /// The instruction needs a method to append a statement to and none is active.
    W202,

    /// Unterminated block.
    ///
    /// A `loop`, `alt` or `opt` block was still open at the end of the diagram.
    W203,

    /// Call to an actor.
    ///
    /// Actors have no class, so no method can be synthesized for them.
    W204,

    /// Else without open conditional.
    W205,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::W200 => "W200",
            ErrorCode::W201 => "W201",
            ErrorCode::W202 => "W202",
            ErrorCode::W203 => "W203",
            ErrorCode::W204 => "W204",
            ErrorCode::W205 => "W205",
        }
    }

    /// Returns a short description of what this code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unexpected character",
            ErrorCode::E002 => "unknown arrow",
            ErrorCode::E003 => "unterminated quoted text",
            ErrorCode::E100 => "unexpected token",
            ErrorCode::E101 => "incomplete input",
            ErrorCode::E102 => "unknown diagram type",
            ErrorCode::W200 => "return without matching call",
            ErrorCode::W201 => "end without open block",
            ErrorCode::W202 => "no active method context",
            ErrorCode::W203 => "unterminated block",
            ErrorCode::W204 => "call to an actor",
            ErrorCode::W205 => "else without open conditional",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
