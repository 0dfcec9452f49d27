//! Tokens shared by the class and sequence lexers.

use std::fmt;

use crate::{ast::ArrowKind, span::Span};

/// A lexical token.
///
/// One enum covers both grammars; each lexer only produces the variants
/// that belong to its grammar plus the shared trivia and identifiers.
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Trivia
    Whitespace,
    Newline,
    /// `%%` comment, text after the marker.
    Comment(&'src str),
    /// A `note ...` line in a sequence diagram, skipped like a comment.
    Note(&'src str),

    // Headers
    ClassDiagram,
    SequenceDiagram,

    Identifier(&'src str),

    // Class grammar
    Class,
    /// Quoted cardinality text without the quotes.
    Quoted(&'src str),
    /// Raw relationship marker such as `<|--` or `..>`.
    Relationship(&'src str),
    OpenClaw,
    CloseClaw,
    /// One of `+ - # ~`.
    Visibility(char),
    Dollar,
    Star,
    LeftBrace,
    RightBrace,

    // Sequence grammar
    Participant,
    Actor,
    /// `as` followed by the alias text.
    Alias(&'src str),
    Create,
    Destroy,
    Activate,
    Deactivate,
    /// `loop` and its label.
    Loop(&'src str),
    /// `alt` and its condition.
    Alt(&'src str),
    /// `else` and its condition, possibly empty.
    Else(&'src str),
    /// `opt` and its condition.
    Opt(&'src str),
    End,
    Arrow(ArrowKind),
    Number(&'src str),

    // Shared punctuation
    Colon,
    Comma,
    LeftParen,
    RightParen,
}

impl Token<'_> {
    /// Returns `true` for tokens the grammars skip between words.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            Token::Whitespace | Token::Comment(_) | Token::Note(_)
        )
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Whitespace => write!(f, "whitespace"),
            Token::Newline => write!(f, "newline"),
            Token::Comment(_) => write!(f, "comment"),
            Token::Note(_) => write!(f, "note"),
            Token::ClassDiagram => write!(f, "classDiagram"),
            Token::SequenceDiagram => write!(f, "sequenceDiagram"),
            Token::Identifier(name) => write!(f, "{name}"),
            Token::Class => write!(f, "class"),
            Token::Quoted(text) => write!(f, "\"{text}\""),
            Token::Relationship(marker) => write!(f, "{marker}"),
            Token::OpenClaw => write!(f, "<<"),
            Token::CloseClaw => write!(f, ">>"),
            Token::Visibility(marker) => write!(f, "{marker}"),
            Token::Dollar => write!(f, "$"),
            Token::Star => write!(f, "*"),
            Token::LeftBrace => write!(f, "{{"),
            Token::RightBrace => write!(f, "}}"),
            Token::Participant => write!(f, "participant"),
            Token::Actor => write!(f, "actor"),
            Token::Alias(alias) => write!(f, "as {alias}"),
            Token::Create => write!(f, "create"),
            Token::Destroy => write!(f, "destroy"),
            Token::Activate => write!(f, "activate"),
            Token::Deactivate => write!(f, "deactivate"),
            Token::Loop(label) => write!(f, "loop {label}"),
            Token::Alt(label) => write!(f, "alt {label}"),
            Token::Else(label) => write!(f, "else {label}"),
            Token::Opt(label) => write!(f, "opt {label}"),
            Token::End => write!(f, "end"),
            Token::Arrow(kind) => write!(f, "{kind}"),
            Token::Number(n) => write!(f, "{n}"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
        }
    }
}

/// A token with its position in the block source.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}

impl<'src> std::ops::Deref for PositionedToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

impl fmt::Display for PositionedToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.token.fmt(f)
    }
}
