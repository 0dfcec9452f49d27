//! Extraction of Mermaid blocks from Markdown documents.
//!
//! A block is the text strictly between a line that trims to
//! ```` ```mermaid ```` and the next line that trims to ```` ``` ````.
//! Any other fenced code is left alone.

use log::debug;
use thiserror::Error;

const OPEN_FENCE: &str = "```mermaid";
const CLOSE_FENCE: &str = "```";

/// A Mermaid block found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    source: String,
    line: usize,
}

impl DiagramBlock {
    /// The block text without its fences.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 1-based line of the document on which the block text starts.
    pub fn line(&self) -> usize {
        self.line
    }
}

/// Malformed fencing in a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("line {line}: mermaid block opened inside another mermaid block")]
    Nested { line: usize },

    #[error("line {line}: mermaid block is never closed")]
    Unclosed { line: usize },
}

impl DocumentError {
    /// 1-based line the problem was found on.
    pub fn line(&self) -> usize {
        match self {
            DocumentError::Nested { line } | DocumentError::Unclosed { line } => *line,
        }
    }
}

/// Collect every Mermaid block of `text`, in document order.
///
/// # Errors
///
/// Returns [`DocumentError::Nested`] when an opening fence appears inside an
/// open block and [`DocumentError::Unclosed`] when the document ends inside one.
pub fn extract_blocks(text: &str) -> Result<Vec<DiagramBlock>, DocumentError> {
    let mut blocks = Vec::new();
    // (fence line, block lines)
    let mut open: Option<(usize, Vec<&str>)> = None;

    for (index, line) in text.lines().enumerate() {
        let number = index + 1;
        let trimmed = line.trim();

        match open.as_mut() {
            None if trimmed == OPEN_FENCE => open = Some((number, Vec::new())),
            None => {}
            Some(_) if trimmed == OPEN_FENCE => {
                return Err(DocumentError::Nested { line: number });
            }
            Some(_) if trimmed == CLOSE_FENCE => {
                if let Some((fence, lines)) = open.take() {
                    debug!(line = fence + 1, lines = lines.len(); "Found mermaid block");
                    let mut source = lines.join("\n");
                    source.push('\n');
                    blocks.push(DiagramBlock {
                        source,
                        line: fence + 1,
                    });
                }
            }
            Some((_, lines)) => lines.push(line),
        }
    }

    match open {
        Some((fence, _)) => Err(DocumentError::Unclosed { line: fence }),
        None => Ok(blocks),
    }
}
