//! Parsers for class and sequence diagram tokens.
//!
//! This module turns a token stream from the [`lexer`](super::lexer) into the
//! syntax trees defined in [`ast`](super::ast). The public entry points are
//! [`build_class_diagram`] and [`build_sequence_diagram`].

use winnow::{
    Parser as _,
    combinator::{alt, opt, preceded, repeat, separated},
    error::{ContextError, ErrMode},
    stream::{Offset, Stream, TokenSlice},
    token::any,
};

use merfolk_core::types;

use crate::{
    ast::{
        Annotation, ArrowKind, Attribute, ClassDeclaration, ClassDiagram, ClassInstruction,
        Classifier, Life, Member, MemberBody, MemberKind, Message, Operation, Parameter,
        Participant, ParticipantKind, Relationship, RelationshipMarker, SequenceDiagram,
        SequenceInstruction, Switch, SwitchKind,
    },
    error::{Diagnostic, ErrorCode},
    span::{Span, Spanned},
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// Description of what is currently being parsed
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) at error start position
    ///
    /// Used to calculate start_offset as: `tokens.len() - start_offset_value`
    StartOffset(usize),
}

type Input<'src> = TokenSlice<'src, PositionedToken<'src>>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;

/// Run `f`, turning any failure into a committed error that remembers where `f` started.
fn cut_err<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();

    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::StartOffset(start_remaining));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

fn backtrack_with_label(label: &'static str) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::Label(label));
    ErrMode::Backtrack(e)
}

/// Union of the first and last tokens that are not trivia or line breaks.
fn significant_span(tokens: &[PositionedToken<'_>]) -> Span {
    let mut significant = tokens
        .iter()
        .filter(|t| !t.is_trivia() && !matches!(t.token, Token::Newline));
    match significant.next() {
        Some(first) => significant
            .next_back()
            .map_or(first.span, |last| first.span.union(last.span)),
        None => Span::default(),
    }
}

/// Run `f` and attach the span of the tokens it consumed.
fn spanned<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<Spanned<O>>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start = input.checkpoint();
    let value = f(input)?;
    let consumed = input.offset_from(&start);

    let end = input.checkpoint();
    input.reset(&start);
    let span = significant_span(input.next_slice(consumed));
    input.reset(&end);

    Ok(Spanned::new(value, span))
}

// ---------------------------------------------------------------------------
// Shared building blocks
// ---------------------------------------------------------------------------

/// Whitespace, comments and notes
fn trivia<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| token.is_trivia())
        .void()
        .parse_next(input)
}

/// Zero or more trivia on the current line
fn ws0<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(0.., trivia).parse_next(input)
}

fn blank<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| {
        token.is_trivia() || matches!(token.token, Token::Newline)
    })
    .void()
    .parse_next(input)
}

/// Zero or more trivia or line breaks
fn blanks0<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(0.., blank).parse_next(input)
}

/// Match one token exactly.
fn expect<'src>(input: &mut Input<'src>, expected: &Token<'_>, label: &'static str) -> IResult<Span> {
    any.verify_map(|token: &PositionedToken<'_>| (token.token == *expected).then_some(token.span))
        .context(Context::Label(label))
        .parse_next(input)
}

fn colon<'src>(input: &mut Input<'src>) -> IResult<Span> {
    expect(input, &Token::Colon, "`:`")
}

fn comma<'src>(input: &mut Input<'src>) -> IResult<Span> {
    expect(input, &Token::Comma, "`,`")
}

fn left_paren<'src>(input: &mut Input<'src>) -> IResult<Span> {
    expect(input, &Token::LeftParen, "`(`")
}

fn right_paren<'src>(input: &mut Input<'src>) -> IResult<Span> {
    expect(input, &Token::RightParen, "`)`")
}

/// Separator in parameter and argument lists
fn list_separator<'src>(input: &mut Input<'src>) -> IResult<()> {
    (ws0, comma, ws0).void().parse_next(input)
}

fn identifier<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Identifier(name) => Some(Spanned::new(name.to_string(), token.span)),
        _ => None,
    })
    .context(Context::Label("identifier"))
    .parse_next(input)
}

/// End of input, allowing trailing blanks.
fn end_of_input<'src>(input: &mut Input<'src>, label: &'static str) -> IResult<()> {
    blanks0(input)?;
    if input.eof_offset() == 0 {
        Ok(())
    } else {
        Err(backtrack_with_label(label))
    }
}

/// Split a one- or two-word declaration into `(name, type)`.
///
/// With two words the order is `Type name` when the first word reads as a
/// type or the second does not, and `name Type` otherwise.
fn typed_name(first: String, second: Option<String>) -> (String, Option<String>) {
    match second {
        None => (first, None),
        Some(second) => {
            if types::is_recognized_type(&first) || !types::is_recognized_type(&second) {
                (second, Some(first))
            } else {
                (first, Some(second))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Class diagrams
// ---------------------------------------------------------------------------

fn quoted<'src>(input: &mut Input<'src>) -> IResult<String> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Quoted(text) => Some(text.to_string()),
        _ => None,
    })
    .context(Context::Label("cardinality"))
    .parse_next(input)
}

fn relationship_marker<'src>(input: &mut Input<'src>) -> IResult<RelationshipMarker> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Relationship(marker) => RelationshipMarker::parse(marker),
        _ => None,
    })
    .context(Context::Label("relationship marker"))
    .parse_next(input)
}

fn visibility_marker<'src>(input: &mut Input<'src>) -> IResult<char> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Visibility(marker) => Some(*marker),
        _ => None,
    })
    .parse_next(input)
}

fn classifier<'src>(input: &mut Input<'src>) -> IResult<Classifier> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Dollar => Some(Classifier::Static),
        Token::Star => Some(Classifier::Abstract),
        _ => None,
    })
    .parse_next(input)
}

/// Any word on the current line, as written.
fn label_word<'src>(input: &mut Input<'src>) -> IResult<String> {
    any.verify_map(|token: &PositionedToken<'_>| {
        (!token.is_trivia() && !matches!(token.token, Token::Newline))
            .then(|| token.token.to_string())
    })
    .parse_next(input)
}

/// `: some label words` up to the end of the line
fn relationship_label<'src>(input: &mut Input<'src>) -> IResult<Option<String>> {
    ws0(input)?;
    colon(input)?;
    let words: Vec<String> = repeat(0.., preceded(ws0, label_word)).parse_next(input)?;
    Ok((!words.is_empty()).then(|| words.join(" ")))
}

/// `Left "1" <|-- "*" Right : label`
fn relationship<'src>(input: &mut Input<'src>) -> IResult<ClassInstruction> {
    let left = identifier(input)?;
    ws0(input)?;
    let left_cardinality = opt(quoted).parse_next(input)?;
    ws0(input)?;
    let marker = relationship_marker(input)?;

    cut_err(input, |input| {
        ws0(input)?;
        let right_cardinality = opt(quoted).parse_next(input)?;
        ws0(input)?;
        let right = identifier(input)?;
        let label = opt(relationship_label).parse_next(input)?.flatten();

        Ok(ClassInstruction::Relationship(Relationship {
            left,
            left_cardinality,
            marker,
            right_cardinality,
            right,
            label,
        }))
    })
}

/// `name` or `Type name` / `name Type`
fn parameter<'src>(input: &mut Input<'src>) -> IResult<Parameter> {
    let first = identifier(input)?;
    let second = opt(preceded(ws0, identifier)).parse_next(input)?;
    let (name, type_name) = typed_name(first.into_inner(), second.map(Spanned::into_inner));
    Ok(Parameter { name, type_name })
}

/// `name(params)` with optional classifier and return type
fn operation<'src>(input: &mut Input<'src>) -> IResult<Operation> {
    let name = identifier(input)?.into_inner();
    ws0(input)?;
    left_paren(input)?;

    cut_err(input, |input| {
        ws0(input)?;
        let parameters: Vec<Parameter> =
            separated(0.., parameter, list_separator).parse_next(input)?;
        ws0(input)?;
        right_paren(input)?;

        ws0(input)?;
        let leading = opt(classifier).parse_next(input)?;
        ws0(input)?;
        let return_type = opt(identifier).parse_next(input)?.map(Spanned::into_inner);
        ws0(input)?;
        let trailing = opt(classifier).parse_next(input)?;

        Ok(Operation {
            name,
            parameters,
            classifier: leading.or(trailing),
            return_type,
        })
    })
}

/// `name`, `Type name` or `name Type`, with an optional classifier
fn attribute<'src>(input: &mut Input<'src>) -> IResult<Attribute> {
    let first = identifier(input)?;
    let second = opt(preceded(ws0, identifier)).parse_next(input)?;
    ws0(input)?;
    let classifier = opt(classifier).parse_next(input)?;

    let (name, type_name) = typed_name(first.into_inner(), second.map(Spanned::into_inner));
    Ok(Attribute {
        name,
        type_name,
        classifier,
    })
}

/// Everything after `Owner :` in a member line
fn member_body<'src>(input: &mut Input<'src>) -> IResult<MemberBody> {
    let visibility = opt(visibility_marker).parse_next(input)?;
    ws0(input)?;
    let kind = alt((
        operation.map(MemberKind::Operation),
        attribute.map(MemberKind::Attribute),
    ))
    .context(Context::Label("attribute or operation"))
    .parse_next(input)?;

    Ok(MemberBody { visibility, kind })
}

/// `Owner : +member`
fn member<'src>(input: &mut Input<'src>) -> IResult<ClassInstruction> {
    let owner = identifier(input)?;
    ws0(input)?;
    colon(input)?;

    cut_err(input, |input| {
        ws0(input)?;
        let body = member_body(input)?;
        Ok(ClassInstruction::Member(Member { owner, body }))
    })
}

/// `<<name>>`
fn annotation_marker<'src>(input: &mut Input<'src>) -> IResult<Spanned<String>> {
    expect(input, &Token::OpenClaw, "`<<`")?;
    cut_err(input, |input| {
        ws0(input)?;
        let name = identifier(input)?;
        ws0(input)?;
        expect(input, &Token::CloseClaw, "`>>`")?;
        Ok(name)
    })
}

/// `<<interface>> Shape`
fn annotation<'src>(input: &mut Input<'src>) -> IResult<ClassInstruction> {
    let name = annotation_marker(input)?;
    cut_err(input, |input| {
        ws0(input)?;
        let target = identifier(input)?;
        Ok(ClassInstruction::Annotation(Annotation { name, target }))
    })
}

enum ClassBodyItem {
    Annotation(Spanned<String>),
    Member(Spanned<MemberBody>),
}

fn class_body_item<'src>(input: &mut Input<'src>) -> IResult<ClassBodyItem> {
    if let Some(name) = opt(annotation_marker).parse_next(input)? {
        return Ok(ClassBodyItem::Annotation(name));
    }
    let body = spanned(input, member_body)?;
    Ok(ClassBodyItem::Member(body))
}

/// `class Name` with an optional `{ ... }` body
fn class_declaration<'src>(input: &mut Input<'src>) -> IResult<ClassInstruction> {
    expect(input, &Token::Class, "`class`")?;

    cut_err(input, |input| {
        ws0(input)?;
        let name = identifier(input)?;
        ws0(input)?;

        let mut annotations = Vec::new();
        let mut members = Vec::new();
        if opt(|input: &mut Input<'src>| expect(input, &Token::LeftBrace, "`{`"))
            .parse_next(input)?
            .is_some()
        {
            let items: Vec<ClassBodyItem> =
                repeat(0.., preceded(blanks0, class_body_item)).parse_next(input)?;
            blanks0(input)?;
            expect(input, &Token::RightBrace, "`}`")?;

            for item in items {
                match item {
                    ClassBodyItem::Annotation(name) => annotations.push(name),
                    ClassBodyItem::Member(body) => members.push(body),
                }
            }
        }

        Ok(ClassInstruction::Class(ClassDeclaration {
            name,
            annotations,
            members,
        }))
    })
}

fn class_instruction<'src>(input: &mut Input<'src>) -> IResult<Spanned<ClassInstruction>> {
    spanned(input, |input| {
        alt((annotation, class_declaration, relationship, member)).parse_next(input)
    })
}

fn class_diagram<'src>(input: &mut Input<'src>) -> IResult<ClassDiagram> {
    blanks0(input)?;
    expect(input, &Token::ClassDiagram, "`classDiagram`")?;

    let instructions: Vec<Spanned<ClassInstruction>> =
        repeat(0.., preceded(blanks0, class_instruction)).parse_next(input)?;
    end_of_input(input, "class diagram instruction")?;

    Ok(ClassDiagram { instructions })
}

// ---------------------------------------------------------------------------
// Sequence diagrams
// ---------------------------------------------------------------------------

/// A statement ends at a line break or at the end of input.
fn end_of_statement<'src>(input: &mut Input<'src>) -> IResult<()> {
    ws0(input)?;
    if input.eof_offset() == 0 {
        return Ok(());
    }
    expect(input, &Token::Newline, "end of line").map(|_| ())
}

fn alias<'src>(input: &mut Input<'src>) -> IResult<String> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Alias(alias) => Some(alias.to_string()),
        _ => None,
    })
    .parse_next(input)
}

fn participant_kind<'src>(input: &mut Input<'src>) -> IResult<ParticipantKind> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Participant => Some(ParticipantKind::Participant),
        Token::Actor => Some(ParticipantKind::Actor),
        _ => None,
    })
    .parse_next(input)
}

/// `Name [as Alias]` after the participant keyword
fn participant_rest<'src>(input: &mut Input<'src>, kind: ParticipantKind) -> IResult<Participant> {
    ws0(input)?;
    let name = identifier(input)?;
    ws0(input)?;
    let alias = opt(alias).parse_next(input)?;
    Ok(Participant { kind, name, alias })
}

/// `participant Name [as Alias]` or `actor Name [as Alias]`
fn participant<'src>(input: &mut Input<'src>) -> IResult<SequenceInstruction> {
    let kind = participant_kind(input)?;
    cut_err(input, |input| {
        participant_rest(input, kind).map(SequenceInstruction::Member)
    })
}

/// `create [participant|actor] Name [as Alias]` or `destroy Name`
fn life<'src>(input: &mut Input<'src>) -> IResult<SequenceInstruction> {
    if opt(|input: &mut Input<'src>| expect(input, &Token::Create, "`create`"))
        .parse_next(input)?
        .is_some()
    {
        return cut_err(input, |input| {
            ws0(input)?;
            let kind = opt(participant_kind)
                .parse_next(input)?
                .unwrap_or(ParticipantKind::Participant);
            let created = participant_rest(input, kind)?;
            Ok(SequenceInstruction::Life(Life::Create(created)))
        });
    }

    expect(input, &Token::Destroy, "`destroy`")?;
    cut_err(input, |input| {
        ws0(input)?;
        let name = identifier(input)?;
        Ok(SequenceInstruction::Life(Life::Destroy(name)))
    })
}

/// `activate Name` or `deactivate Name`
fn switch<'src>(input: &mut Input<'src>) -> IResult<SequenceInstruction> {
    let kind = any
        .verify_map(|token: &PositionedToken<'_>| match &token.token {
            Token::Activate => Some(SwitchKind::Activate),
            Token::Deactivate => Some(SwitchKind::Deactivate),
            _ => None,
        })
        .parse_next(input)?;

    cut_err(input, |input| {
        ws0(input)?;
        let name = identifier(input)?;
        Ok(SequenceInstruction::Switch(Switch { kind, name }))
    })
}

/// `loop`, `alt`, `else`, `opt` with their labels, and `end`
fn block<'src>(input: &mut Input<'src>) -> IResult<SequenceInstruction> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Loop(label) => Some(SequenceInstruction::Loop(label.to_string())),
        Token::Alt(label) => Some(SequenceInstruction::Alt(label.to_string())),
        Token::Else(label) => Some(SequenceInstruction::Else(label.to_string())),
        Token::Opt(label) => Some(SequenceInstruction::Opt(label.to_string())),
        Token::End => Some(SequenceInstruction::End),
        _ => None,
    })
    .parse_next(input)
}

fn arrow<'src>(input: &mut Input<'src>) -> IResult<ArrowKind> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Arrow(kind) => Some(*kind),
        _ => None,
    })
    .context(Context::Label("arrow"))
    .parse_next(input)
}

/// A message argument: a name or a number
fn argument<'src>(input: &mut Input<'src>) -> IResult<String> {
    any.verify_map(|token: &PositionedToken<'_>| match &token.token {
        Token::Identifier(text) | Token::Number(text) => Some(text.to_string()),
        _ => None,
    })
    .context(Context::Label("argument"))
    .parse_next(input)
}

fn arguments<'src>(input: &mut Input<'src>) -> IResult<Vec<String>> {
    ws0(input)?;
    left_paren(input)?;
    cut_err(input, |input| {
        ws0(input)?;
        let arguments: Vec<String> = separated(0.., argument, list_separator).parse_next(input)?;
        ws0(input)?;
        right_paren(input)?;
        Ok(arguments)
    })
}

/// `Left ->> Right : name(args)`
fn message<'src>(input: &mut Input<'src>) -> IResult<SequenceInstruction> {
    let left = identifier(input)?;
    ws0(input)?;
    let arrow = arrow(input)?;

    cut_err(input, |input| {
        ws0(input)?;
        let right = identifier(input)?;
        ws0(input)?;
        colon(input)?;
        ws0(input)?;
        let name = identifier(input)?;
        let arguments = opt(arguments).parse_next(input)?.unwrap_or_default();

        Ok(SequenceInstruction::Message(Message {
            left,
            arrow,
            right,
            name,
            arguments,
        }))
    })
}

fn statement<'src>(input: &mut Input<'src>) -> IResult<Spanned<SequenceInstruction>> {
    let instruction = spanned(input, |input| {
        alt((participant, life, switch, block, message))
            .context(Context::Label("sequence statement"))
            .parse_next(input)
    })?;
    cut_err(input, end_of_statement)?;
    Ok(instruction)
}

fn sequence_diagram<'src>(input: &mut Input<'src>) -> IResult<SequenceDiagram> {
    blanks0(input)?;
    expect(input, &Token::SequenceDiagram, "`sequenceDiagram`")?;
    end_of_statement(input)?;

    let instructions: Vec<Spanned<SequenceInstruction>> =
        repeat(0.., preceded(blanks0, statement)).parse_next(input)?;
    end_of_input(input, "sequence statement")?;

    Ok(SequenceDiagram { instructions })
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken],
    current_remaining: usize,
) -> Diagnostic {
    // Extract start offset from error context if available
    let start_remaining = match &error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.context().find_map(|ctx| match ctx {
            Context::StartOffset(n) => Some(*n),
            _ => None,
        }),
        _ => None,
    };

    let end_offset = tokens.len() - current_remaining;
    let start_offset = start_remaining.map(|r| tokens.len() - r).unwrap_or(end_offset);

    match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => {
            let mut contexts: Vec<String> = Vec::new();
            for ctx in e.context() {
                if let Context::Label(label) = ctx {
                    let expected = format!("expected {label}");
                    if !contexts.contains(&expected) {
                        contexts.push(expected);
                    }
                }
            }

            let message = if contexts.is_empty() {
                "unexpected token or end of input".to_string()
            } else {
                contexts.join(" → ")
            };

            // Cover what the failing construct consumed plus the offending token.
            let examine_end = (end_offset + 1).min(tokens.len());
            let error_span = if start_offset < examine_end {
                significant_span(&tokens[start_offset..examine_end])
            } else {
                significant_span(tokens)
            };

            let found = tokens
                .get(end_offset)
                .map_or_else(|| "end of input".to_string(), |t| format!("`{}`", t.token));

            Diagnostic::error(format!("unexpected token: {message}"))
                .with_code(ErrorCode::E100)
                .with_label(error_span, format!("found {found}"))
                .with_help("check the statement against the diagram grammar")
        }
        ErrMode::Incomplete(_) => {
            // Only reachable with streaming input.
            Diagnostic::error("incomplete input, more tokens expected")
                .with_code(ErrorCode::E101)
                .with_label(significant_span(tokens), "incomplete")
                .with_help("ensure input is complete")
        }
    }
}

fn build<'src, O>(
    tokens: &'src [PositionedToken<'src>],
    parser: fn(&mut Input<'src>) -> IResult<O>,
) -> Result<O, Diagnostic> {
    let mut token_slice = TokenSlice::new(tokens);

    parser(&mut token_slice).map_err(|e| {
        let current_remaining = token_slice.eof_offset();
        convert_error(e, tokens, current_remaining)
    })
}

/// Build a class diagram from tokens
pub fn build_class_diagram<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<ClassDiagram, Diagnostic> {
    build(tokens, class_diagram)
}

/// Build a sequence diagram from tokens
pub fn build_sequence_diagram<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<SequenceDiagram, Diagnostic> {
    build(tokens, sequence_diagram)
}
