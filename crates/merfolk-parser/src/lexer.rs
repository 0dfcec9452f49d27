//! Lexical analysis for class and sequence diagram blocks.
//!
//! The two grammars tokenize differently (relationship markers and
//! visibility in class diagrams, arrows and rest-of-line labels in sequence
//! diagrams), so there is one entry point per grammar: [`tokenize_class`]
//! and [`tokenize_sequence`]. Both recover from errors by reporting the
//! problem and continuing, so one pass reports every lexical error.

use winnow::{
    Parser as _,
    combinator::{alt, delimited, not, opt, peek, preceded, terminated},
    error::{ContextError, ErrMode},
    stream::Stream,
    token::{one_of, take_while},
};

use crate::{
    ast::ArrowKind,
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Diagnostic details attached to a committed lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// Remaining input length (`eof_offset()`) where the offending text starts.
    start_remaining: usize,
}

type Input<'src> = &'src str;
type IResult<O> = Result<O, ErrMode<ContextError<LexerDiagnostic>>>;

fn cut_error(diagnostic: LexerDiagnostic) -> ErrMode<ContextError<LexerDiagnostic>> {
    let mut e = ContextError::new();
    e.push(diagnostic);
    ErrMode::Cut(e)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// ---------------------------------------------------------------------------
// Shared tokens
// ---------------------------------------------------------------------------

/// `[A-Za-z][A-Za-z0-9_]*`
fn word<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    take_while(1.., is_word_char)
        .verify(|s: &str| s.starts_with(|c: char| c.is_ascii_alphabetic()))
        .parse_next(input)
}

/// `%%` up to the end of the line
fn comment<'src>(input: &mut Input<'src>) -> IResult<Token<'src>> {
    preceded("%%", take_while(0.., |c: char| c != '\n'))
        .map(Token::Comment)
        .parse_next(input)
}

fn whitespace<'src>(input: &mut Input<'src>) -> IResult<Token<'src>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

fn newline<'src>(input: &mut Input<'src>) -> IResult<Token<'src>> {
    '\n'.value(Token::Newline).parse_next(input)
}

/// Consume up to the end of the line and return it trimmed.
fn rest_of_line<'src>(input: &mut Input<'src>) -> &'src str {
    let remaining: &'src str = *input;
    let line_end = remaining.find('\n').unwrap_or(remaining.len());
    let (line, rest) = remaining.split_at(line_end);
    *input = rest;
    line.trim()
}

fn punctuation<'src>(input: &mut Input<'src>) -> IResult<Token<'src>> {
    alt((
        ':'.value(Token::Colon),
        ','.value(Token::Comma),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
    ))
    .parse_next(input)
}

// ---------------------------------------------------------------------------
// Class diagram tokens
// ---------------------------------------------------------------------------

fn class_header<'src>(input: &mut Input<'src>) -> IResult<Token<'src>> {
    terminated(
        alt(("classDiagram-v2", "classDiagram")),
        peek(not(one_of(is_word_char))),
    )
    .value(Token::ClassDiagram)
    .parse_next(input)
}

/// `(<\||\*|o|<)?(--|\.\.)(\|>|\*|o|>)?`
fn relationship<'src>(input: &mut Input<'src>) -> IResult<Token<'src>> {
    (
        opt(alt(("<|", "*", "o", "<"))),
        alt(("--", "..")),
        opt(alt(("|>", "*", "o", ">"))),
    )
        .take()
        .map(Token::Relationship)
        .parse_next(input)
}

fn claw<'src>(input: &mut Input<'src>) -> IResult<Token<'src>> {
    alt(("<<".value(Token::OpenClaw), ">>".value(Token::CloseClaw))).parse_next(input)
}

/// `~T~` directly after a type name.
fn generic_suffix<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    delimited('~', take_while(1.., |c: char| c != '~' && c != '\n'), '~').parse_next(input)
}

fn array_suffix<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    "[]".parse_next(input)
}

/// A word, the `class` keyword, or a type name with generic and array suffixes.
fn class_word<'src>(input: &mut Input<'src>) -> IResult<Token<'src>> {
    let start = *input;
    let name = word(input)?;
    opt(generic_suffix).parse_next(input)?;
    opt(array_suffix).parse_next(input)?;

    let len = start.len() - input.len();
    if len == name.len() && name == "class" {
        return Ok(Token::Class);
    }
    Ok(Token::Identifier(&start[..len]))
}

/// Opening quote and the text after it, up to a quote or the end of the line.
fn open_quote<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    preceded('"', take_while(0.., |c: char| c != '"' && c != '\n')).parse_next(input)
}

/// A quoted cardinality that must close on the same line.
fn quoted<'src>(input: &mut Input<'src>) -> IResult<Token<'src>> {
    let start_remaining = input.eof_offset();
    let text = open_quote(input)?;

    if input.starts_with('"') {
        let _ = input.next_token();
        Ok(Token::Quoted(text))
    } else {
        Err(cut_error(LexerDiagnostic {
            code: ErrorCode::E003,
            message: "unterminated quoted text",
            help: Some("add the closing `\"` before the end of the line"),
            start_remaining,
        }))
    }
}

fn visibility<'src>(input: &mut Input<'src>) -> IResult<Token<'src>> {
    one_of(['+', '-', '#', '~'])
        .map(Token::Visibility)
        .parse_next(input)
}

fn class_punctuation<'src>(input: &mut Input<'src>) -> IResult<Token<'src>> {
    alt((
        punctuation,
        '{'.value(Token::LeftBrace),
        '}'.value(Token::RightBrace),
        '$'.value(Token::Dollar),
        '*'.value(Token::Star),
    ))
    .parse_next(input)
}

fn class_token<'src>(input: &mut Input<'src>) -> IResult<Token<'src>> {
    alt((
        comment,           // Before anything starting with `%`
        newline,           // Before whitespace
        whitespace,
        quoted,
        class_header,      // Before class_word
        alt((
            relationship,  // Before class_word (`o--`), visibility (`--`) and `*`
            claw,
            class_word,
            visibility,
            class_punctuation,
        )),
    ))
    .parse_next(input)
}

// ---------------------------------------------------------------------------
// Sequence diagram tokens
// ---------------------------------------------------------------------------

/// Maximal run of arrow characters starting with `<` or `-`.
fn arrow_run<'src>(input: &mut Input<'src>) -> IResult<&'src str> {
    preceded(
        peek(one_of(['<', '-'])),
        take_while(1.., ['<', '-', '>', ')']),
    )
    .parse_next(input)
}

fn arrow<'src>(input: &mut Input<'src>) -> IResult<Token<'src>> {
    let start = *input;
    let start_remaining = input.eof_offset();
    let run = arrow_run(input)?;

    let mut len = run.len();
    if matches!(run, "-" | "--") && input.starts_with('x') {
        let _ = input.next_token();
        len += 1;
    }

    match ArrowKind::from_symbol(&start[..len]) {
        Some(kind) => Ok(Token::Arrow(kind)),
        None => Err(cut_error(LexerDiagnostic {
            code: ErrorCode::E002,
            message: "unknown arrow",
            help: Some(
                "supported arrows: `->>`, `-->>`, `->`, `-->`, `<<->>`, `<<-->>`, `-x`, `--x`, `-)`, `--)`",
            ),
            start_remaining,
        })),
    }
}

/// `[0-9]+(\.[0-9]+)?`
fn number<'src>(input: &mut Input<'src>) -> IResult<Token<'src>> {
    (
        take_while(1.., |c: char| c.is_ascii_digit()),
        opt(preceded('.', take_while(1.., |c: char| c.is_ascii_digit()))),
    )
        .take()
        .map(Token::Number)
        .parse_next(input)
}

/// Words and keywords. Keywords that carry a label consume the rest of the line.
fn sequence_word<'src>(input: &mut Input<'src>) -> IResult<Token<'src>> {
    let word = word(input)?;

    let token = match word {
        "sequenceDiagram" => Token::SequenceDiagram,
        "loop" => Token::Loop(rest_of_line(input)),
        "alt" => Token::Alt(rest_of_line(input)),
        "else" => Token::Else(rest_of_line(input)),
        "opt" => Token::Opt(rest_of_line(input)),
        "end" => Token::End,
        _ => match word.to_ascii_lowercase().as_str() {
            "participant" => Token::Participant,
            "actor" => Token::Actor,
            "as" => Token::Alias(rest_of_line(input)),
            "create" => Token::Create,
            "destroy" => Token::Destroy,
            "activate" => Token::Activate,
            "deactivate" => Token::Deactivate,
            "note" => Token::Note(rest_of_line(input)),
            _ => Token::Identifier(word),
        },
    };
    Ok(token)
}

fn sequence_token<'src>(input: &mut Input<'src>) -> IResult<Token<'src>> {
    alt((
        comment,
        newline,
        whitespace,
        arrow,
        number,
        sequence_word,
        punctuation,
    ))
    .parse_next(input)
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Accumulates tokens and diagnostics for one block.
struct Lexer<'src> {
    source: &'src str,
    tokens: Vec<PositionedToken<'src>>,
    diagnostics: DiagnosticCollector,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn offset(&self, input: &Input<'src>) -> usize {
        self.source.len() - input.eof_offset()
    }

    fn tokenize(&mut self, mut next: impl FnMut(&mut Input<'src>) -> IResult<Token<'src>>) {
        let mut input: Input<'src> = self.source;

        while !input.is_empty() {
            let before = input;
            let start = self.offset(&input);

            match next(&mut input) {
                Ok(token) => {
                    let end = self.offset(&input);
                    self.tokens
                        .push(PositionedToken::new(token, Span::new(start..end)));
                }
                Err(e) => {
                    let end = self.offset(&input);
                    // A committed error has consumed the offending text; resume after it.
                    let resume = matches!(e, ErrMode::Cut(_)) && end > start;
                    let diagnostic = self.convert_err_mode(e, start, end);
                    self.diagnostics.emit(diagnostic);

                    if !resume {
                        input = before;
                        let _ = input.next_token();
                    }
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<PositionedToken<'src>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Build a diagnostic from a failed token.
    ///
    /// Committed errors carry a [`LexerDiagnostic`]; anything else is an
    /// unexpected character at `start`.
    fn convert_err_mode(
        &self,
        err: ErrMode<ContextError<LexerDiagnostic>>,
        start: usize,
        end: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start_remaining,
        }) = context_error.context().next()
        {
            let from = self.source.len() - start_remaining;
            let span = Span::new(from..end.max(from));
            let text = self.source.get(from..span.end()).unwrap_or_default();

            let mut diag = Diagnostic::error(format!("{message} `{}`", text.trim_end()))
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let ch = self.source[start..].chars().next().unwrap_or(' ');
        let span = Span::new(start..start + ch.len_utf8());
        Diagnostic::error(format!("unexpected character `{ch}`"))
            .with_code(ErrorCode::E001)
            .with_label(span, ErrorCode::E001.description())
    }
}

/// Tokenize a class diagram block.
///
/// # Returns
///
/// - `Ok(tokens)` - every character belonged to a token
/// - `Err(ParseError)` - one diagnostic per lexical error in the block
pub fn tokenize_class(source: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new(source);
    lexer.tokenize(class_token);
    lexer.finish()
}

/// Tokenize a sequence diagram block.
pub fn tokenize_sequence(source: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new(source);
    lexer.tokenize(sequence_token);
    lexer.finish()
}
