//! Syntax trees produced by the class and sequence grammars.
//!
//! Nodes own their text so a parsed [`Diagram`] can outlive the block
//! source it came from. Positions are kept as [`Spanned`] values relative
//! to the block.

use std::fmt;

use crate::span::Spanned;

/// Which grammar a block is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagramKind {
    Class,
    Sequence,
}

impl fmt::Display for DiagramKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramKind::Class => write!(f, "classDiagram"),
            DiagramKind::Sequence => write!(f, "sequenceDiagram"),
        }
    }
}

/// A parsed diagram block.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagram {
    Class(ClassDiagram),
    Sequence(SequenceDiagram),
}

impl Diagram {
    pub fn kind(&self) -> DiagramKind {
        match self {
            Diagram::Class(_) => DiagramKind::Class,
            Diagram::Sequence(_) => DiagramKind::Sequence,
        }
    }
}

// ---------------------------------------------------------------------------
// Class diagrams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassDiagram {
    pub instructions: Vec<Spanned<ClassInstruction>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassInstruction {
    Relationship(Relationship),
    Member(Member),
    Annotation(Annotation),
    Class(ClassDeclaration),
}

/// `Left "1" <|-- "*" Right : label`
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub left: Spanned<String>,
    pub left_cardinality: Option<String>,
    pub marker: RelationshipMarker,
    pub right_cardinality: Option<String>,
    pub right: Spanned<String>,
    pub label: Option<String>,
}

impl Relationship {
    /// The end carrying the decoration and the other end, in that order.
    ///
    /// When both ends are decorated the left one wins.
    pub fn decorated_ends(&self) -> (&Spanned<String>, &Spanned<String>) {
        if self.marker.left.is_some() || self.marker.right.is_none() {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        }
    }
}

/// End decoration of a relationship line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoration {
    /// `<|` or `|>`
    Triangle,
    /// `*`
    Diamond,
    /// `o`
    Hollow,
    /// `<` or `>`
    Arrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dotted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    Inheritance,
    Realization,
    Composition,
    Aggregation,
    Association,
    Dependency,
    Link,
}

/// A decoded relationship marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipMarker {
    pub left: Option<Decoration>,
    pub line: LineStyle,
    pub right: Option<Decoration>,
}

impl RelationshipMarker {
    /// Decode a marker matching `(<\||\*|o|<)?(--|\.\.)(\|>|\*|o|>)?`.
    pub fn parse(marker: &str) -> Option<Self> {
        let (left, rest) = if let Some(rest) = marker.strip_prefix("<|") {
            (Some(Decoration::Triangle), rest)
        } else if let Some(rest) = marker.strip_prefix('*') {
            (Some(Decoration::Diamond), rest)
        } else if let Some(rest) = marker.strip_prefix('o') {
            (Some(Decoration::Hollow), rest)
        } else if let Some(rest) = marker.strip_prefix('<') {
            (Some(Decoration::Arrow), rest)
        } else {
            (None, marker)
        };

        let (line, rest) = if let Some(rest) = rest.strip_prefix("--") {
            (LineStyle::Solid, rest)
        } else if let Some(rest) = rest.strip_prefix("..") {
            (LineStyle::Dotted, rest)
        } else {
            return None;
        };

        let right = match rest {
            "" => None,
            "|>" => Some(Decoration::Triangle),
            "*" => Some(Decoration::Diamond),
            "o" => Some(Decoration::Hollow),
            ">" => Some(Decoration::Arrow),
            _ => return None,
        };

        Some(Self { left, line, right })
    }

    pub fn kind(&self) -> RelationshipKind {
        match (self.left.or(self.right), self.line) {
            (Some(Decoration::Triangle), LineStyle::Solid) => RelationshipKind::Inheritance,
            (Some(Decoration::Triangle), LineStyle::Dotted) => RelationshipKind::Realization,
            (Some(Decoration::Diamond), _) => RelationshipKind::Composition,
            (Some(Decoration::Hollow), _) => RelationshipKind::Aggregation,
            (Some(Decoration::Arrow), LineStyle::Solid) => RelationshipKind::Association,
            (Some(Decoration::Arrow), LineStyle::Dotted) => RelationshipKind::Dependency,
            (None, _) => RelationshipKind::Link,
        }
    }
}

/// `Owner : +member`
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub owner: Spanned<String>,
    pub body: MemberBody,
}

/// The part of a member after the owner, shared with `class X { ... }` bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberBody {
    pub visibility: Option<char>,
    pub kind: MemberKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberKind {
    Attribute(Attribute),
    Operation(Operation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classifier {
    /// `$`
    Static,
    /// `*`
    Abstract,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub type_name: Option<String>,
    pub classifier: Option<Classifier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub classifier: Option<Classifier>,
    pub return_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub type_name: Option<String>,
}

/// `<<interface>> Shape`
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: Spanned<String>,
    pub target: Spanned<String>,
}

/// `class Shape { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclaration {
    pub name: Spanned<String>,
    /// `<<annotation>>` lines inside the braces.
    pub annotations: Vec<Spanned<String>>,
    pub members: Vec<Spanned<MemberBody>>,
}

// ---------------------------------------------------------------------------
// Sequence diagrams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceDiagram {
    pub instructions: Vec<Spanned<SequenceInstruction>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SequenceInstruction {
    Message(Message),
    Member(Participant),
    Life(Life),
    Switch(Switch),
    Loop(String),
    Alt(String),
    Else(String),
    Opt(String),
    End,
}

/// `Left ->> Right : name(arg, ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub left: Spanned<String>,
    pub arrow: ArrowKind,
    pub right: Spanned<String>,
    pub name: Spanned<String>,
    pub arguments: Vec<String>,
}

/// What an arrow means to the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowSemantics {
    Call,
    Return,
    Signal,
}

/// Every arrow the sequence grammar accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowKind {
    /// `->>`
    SyncCall,
    /// `-->>`
    Reply,
    /// `->`
    Solid,
    /// `-->`
    Dotted,
    /// `<<->>`
    BiSync,
    /// `<<-->>`
    BiReply,
    /// `-x`
    Cross,
    /// `--x`
    DottedCross,
    /// `-)`
    Async,
    /// `--)`
    DottedAsync,
}

impl ArrowKind {
    pub const ALL: [ArrowKind; 10] = [
        ArrowKind::SyncCall,
        ArrowKind::Reply,
        ArrowKind::Solid,
        ArrowKind::Dotted,
        ArrowKind::BiSync,
        ArrowKind::BiReply,
        ArrowKind::Cross,
        ArrowKind::DottedCross,
        ArrowKind::Async,
        ArrowKind::DottedAsync,
    ];

    /// Look up the arrow written exactly as `symbol`.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.symbol() == symbol)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ArrowKind::SyncCall => "->>",
            ArrowKind::Reply => "-->>",
            ArrowKind::Solid => "->",
            ArrowKind::Dotted => "-->",
            ArrowKind::BiSync => "<<->>",
            ArrowKind::BiReply => "<<-->>",
            ArrowKind::Cross => "-x",
            ArrowKind::DottedCross => "--x",
            ArrowKind::Async => "-)",
            ArrowKind::DottedAsync => "--)",
        }
    }

    pub fn semantics(&self) -> ArrowSemantics {
        match self {
            ArrowKind::SyncCall | ArrowKind::Solid | ArrowKind::BiSync => ArrowSemantics::Call,
            ArrowKind::Reply | ArrowKind::Dotted | ArrowKind::BiReply => ArrowSemantics::Return,
            ArrowKind::Cross
            | ArrowKind::DottedCross
            | ArrowKind::Async
            | ArrowKind::DottedAsync => ArrowSemantics::Signal,
        }
    }
}

impl fmt::Display for ArrowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantKind {
    Participant,
    Actor,
}

/// `participant Name as Alias` or `actor Name`
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub kind: ParticipantKind,
    pub name: Spanned<String>,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Life {
    /// `create [participant|actor] Name [as Alias]`
    Create(Participant),
    /// `destroy Name`
    Destroy(Spanned<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchKind {
    Activate,
    Deactivate,
}

/// `activate Name` or `deactivate Name`
#[derive(Debug, Clone, PartialEq)]
pub struct Switch {
    pub kind: SwitchKind,
    pub name: Spanned<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    #[test]
    fn test_arrow_symbols_round_trip() {
        for kind in ArrowKind::ALL {
            assert_eq!(ArrowKind::from_symbol(kind.symbol()), Some(kind));
        }
        assert_eq!(ArrowKind::from_symbol("->>>"), None);
        assert_eq!(ArrowKind::from_symbol("<->"), None);
    }

    #[test]
    fn test_arrow_semantics() {
        assert_eq!(ArrowKind::SyncCall.semantics(), ArrowSemantics::Call);
        assert_eq!(ArrowKind::Solid.semantics(), ArrowSemantics::Call);
        assert_eq!(ArrowKind::Reply.semantics(), ArrowSemantics::Return);
        assert_eq!(ArrowKind::BiReply.semantics(), ArrowSemantics::Return);
        assert_eq!(ArrowKind::DottedCross.semantics(), ArrowSemantics::Signal);
        assert_eq!(ArrowKind::Async.semantics(), ArrowSemantics::Signal);
    }

    #[test]
    fn test_relationship_marker_kinds() {
        let kind = |m: &str| RelationshipMarker::parse(m).map(|marker| marker.kind());

        assert_eq!(kind("<|--"), Some(RelationshipKind::Inheritance));
        assert_eq!(kind("--|>"), Some(RelationshipKind::Inheritance));
        assert_eq!(kind("..|>"), Some(RelationshipKind::Realization));
        assert_eq!(kind("<|.."), Some(RelationshipKind::Realization));
        assert_eq!(kind("*--"), Some(RelationshipKind::Composition));
        assert_eq!(kind("--o"), Some(RelationshipKind::Aggregation));
        assert_eq!(kind("-->"), Some(RelationshipKind::Association));
        assert_eq!(kind("..>"), Some(RelationshipKind::Dependency));
        assert_eq!(kind("--"), Some(RelationshipKind::Link));
        assert_eq!(kind(".."), Some(RelationshipKind::Link));
        assert_eq!(kind("-"), None);
        assert_eq!(kind("--|"), None);
    }

    #[test]
    fn test_decorated_ends() {
        let name = |s: &str| Spanned::new(s.to_string(), Span::default());
        let relationship = |marker: &str| Relationship {
            left: name("Animal"),
            left_cardinality: None,
            marker: RelationshipMarker::parse(marker).unwrap(),
            right_cardinality: None,
            right: name("Dog"),
            label: None,
        };

        let parent_left = relationship("<|--");
        let (decorated, plain) = parent_left.decorated_ends();
        assert_eq!(decorated.inner(), "Animal");
        assert_eq!(plain.inner(), "Dog");

        let parent_right = relationship("--|>");
        let (decorated, plain) = parent_right.decorated_ends();
        assert_eq!(decorated.inner(), "Dog");
        assert_eq!(plain.inner(), "Animal");
    }
}
