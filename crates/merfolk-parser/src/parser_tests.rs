//! Grammar tests for the class and sequence diagram parsers
//!
//! These tests run the full lex and parse pipeline over small diagram blocks
//! and check both accepted syntax and rejected syntax.

use proptest::prelude::*;

use crate::{
    ast::{
        ArrowKind, ClassInstruction, Classifier, Life, MemberKind, ParticipantKind,
        RelationshipKind, SequenceInstruction, SwitchKind,
    },
    lexer, parser,
};

/// Parse a block with the grammar its header names and report the first failure
fn parse_source(source: &str) -> Result<usize, String> {
    let kind = crate::detect_kind(source).map_err(|err| format!("Dispatch error: {err}"))?;
    match kind {
        crate::DiagramKind::Class => {
            let tokens =
                lexer::tokenize_class(source).map_err(|err| format!("Lexer error: {err}"))?;
            let ast = parser::build_class_diagram(&tokens)
                .map_err(|err| format!("Parser error: {err}"))?;
            Ok(ast.instructions.len())
        }
        crate::DiagramKind::Sequence => {
            let tokens =
                lexer::tokenize_sequence(source).map_err(|err| format!("Lexer error: {err}"))?;
            let ast = parser::build_sequence_diagram(&tokens)
                .map_err(|err| format!("Parser error: {err}"))?;
            Ok(ast.instructions.len())
        }
    }
}

/// Helper function to parse a source string and assert success
fn assert_parses_successfully(source: &str) {
    if let Err(e) = parse_source(source) {
        panic!("Expected parsing to succeed, but got error: {e}\n{source}");
    }
}

/// Helper function to parse a source string and assert failure
fn assert_parse_fails(source: &str) {
    if parse_source(source).is_ok() {
        panic!("Expected parsing to fail, but it succeeded\n{source}");
    }
}

fn class_instructions(source: &str) -> Vec<ClassInstruction> {
    let tokens = lexer::tokenize_class(source).expect("lexing should succeed");
    parser::build_class_diagram(&tokens)
        .expect("parsing should succeed")
        .instructions
        .into_iter()
        .map(|i| i.into_inner())
        .collect()
}

fn sequence_instructions(source: &str) -> Vec<SequenceInstruction> {
    let tokens = lexer::tokenize_sequence(source).expect("lexing should succeed");
    parser::build_sequence_diagram(&tokens)
        .expect("parsing should succeed")
        .instructions
        .into_iter()
        .map(|i| i.into_inner())
        .collect()
}

// =============================================================================
// Class diagrams
// =============================================================================

#[test]
fn test_empty_class_diagrams() {
    assert_parses_successfully("classDiagram");
    assert_parses_successfully("classDiagram\n");
    assert_parses_successfully("classDiagram-v2\n\n%% nothing yet\n");
}

#[test]
fn test_member_operation() {
    let instructions = class_instructions("classDiagram\n  Foo : +bar(x int) int\n");
    assert_eq!(instructions.len(), 1);

    let ClassInstruction::Member(member) = &instructions[0] else {
        panic!("expected member, got {:?}", instructions[0]);
    };
    assert_eq!(member.owner.inner(), "Foo");
    assert_eq!(member.body.visibility, Some('+'));

    let MemberKind::Operation(operation) = &member.body.kind else {
        panic!("expected operation");
    };
    assert_eq!(operation.name, "bar");
    assert_eq!(operation.parameters.len(), 1);
    assert_eq!(operation.parameters[0].name, "x");
    assert_eq!(operation.parameters[0].type_name.as_deref(), Some("int"));
    assert_eq!(operation.return_type.as_deref(), Some("int"));
}

#[test]
fn test_member_attribute_orders() {
    let instructions = class_instructions(
        "classDiagram\n\
         Order : -String id\n\
         Order : +total double\n\
         Order : count int$\n\
         Order : notes\n",
    );

    let attributes: Vec<_> = instructions
        .iter()
        .map(|instruction| match instruction {
            ClassInstruction::Member(member) => match &member.body.kind {
                MemberKind::Attribute(attribute) => attribute.clone(),
                other => panic!("expected attribute, got {other:?}"),
            },
            other => panic!("expected member, got {other:?}"),
        })
        .collect();

    assert_eq!(attributes[0].name, "id");
    assert_eq!(attributes[0].type_name.as_deref(), Some("String"));
    assert_eq!(attributes[1].name, "total");
    assert_eq!(attributes[1].type_name.as_deref(), Some("double"));
    assert_eq!(attributes[2].name, "count");
    assert_eq!(attributes[2].classifier, Some(Classifier::Static));
    assert_eq!(attributes[3].name, "notes");
    assert_eq!(attributes[3].type_name, None);
}

#[test]
fn test_abstract_operation_without_return() {
    let instructions = class_instructions("classDiagram\nShape : +area()*\n");
    let ClassInstruction::Member(member) = &instructions[0] else {
        panic!("expected member");
    };
    let MemberKind::Operation(operation) = &member.body.kind else {
        panic!("expected operation");
    };
    assert_eq!(operation.classifier, Some(Classifier::Abstract));
    assert_eq!(operation.return_type, None);
}

#[test]
fn test_generic_types() {
    let instructions = class_instructions("classDiagram\nCart : +items() List~Item~\n");
    let ClassInstruction::Member(member) = &instructions[0] else {
        panic!("expected member");
    };
    let MemberKind::Operation(operation) = &member.body.kind else {
        panic!("expected operation");
    };
    assert_eq!(operation.return_type.as_deref(), Some("List~Item~"));
}

#[test]
fn test_relationship_kinds() {
    let cases = [
        ("Animal <|-- Dog", RelationshipKind::Inheritance),
        ("Dog --|> Animal", RelationshipKind::Inheritance),
        ("Shape <|.. Circle", RelationshipKind::Realization),
        ("Circle ..|> Shape", RelationshipKind::Realization),
        ("Car *-- Engine", RelationshipKind::Composition),
        ("Pond o-- Duck", RelationshipKind::Aggregation),
        ("Customer --> Order", RelationshipKind::Association),
        ("Client ..> Service", RelationshipKind::Dependency),
        ("A -- B", RelationshipKind::Link),
        ("A .. B", RelationshipKind::Link),
    ];

    for (line, expected) in cases {
        let source = format!("classDiagram\n{line}\n");
        let instructions = class_instructions(&source);
        let ClassInstruction::Relationship(relationship) = &instructions[0] else {
            panic!("expected relationship for {line}");
        };
        assert_eq!(relationship.marker.kind(), expected, "{line}");
    }
}

#[test]
fn test_relationship_label_words() {
    let instructions = class_instructions("classDiagram\nCustomer --> Order : places many\n");
    let ClassInstruction::Relationship(relationship) = &instructions[0] else {
        panic!("expected relationship");
    };
    assert_eq!(relationship.label.as_deref(), Some("places many"));
}

#[test]
fn test_annotation() {
    let instructions = class_instructions("classDiagram\n<<interface>> Shape\n");
    let ClassInstruction::Annotation(annotation) = &instructions[0] else {
        panic!("expected annotation");
    };
    assert_eq!(annotation.name.inner(), "interface");
    assert_eq!(annotation.target.inner(), "Shape");
}

#[test]
fn test_class_declaration_with_body() {
    let instructions = class_instructions(
        "classDiagram\n\
         class Account {\n\
           <<abstract>>\n\
           -long balance\n\
           +deposit(long amount) void\n\
         }\n\
         class Ledger\n",
    );
    assert_eq!(instructions.len(), 2);

    let ClassInstruction::Class(account) = &instructions[0] else {
        panic!("expected class declaration");
    };
    assert_eq!(account.name.inner(), "Account");
    assert_eq!(account.annotations.len(), 1);
    assert_eq!(account.annotations[0].inner(), "abstract");
    assert_eq!(account.members.len(), 2);

    let ClassInstruction::Class(ledger) = &instructions[1] else {
        panic!("expected class declaration");
    };
    assert!(ledger.members.is_empty());
}

#[test]
fn test_class_newlines_are_insignificant() {
    assert_parses_successfully("\n\nclassDiagram\n\n\n  A <|-- B\n\n\n  B : x\n\n");
    assert_parses_successfully("classDiagram A <|-- B B : x");
}

#[test]
fn test_class_errors() {
    // Missing header
    assert_parse_fails("A <|-- B\n");
    // Relationship without a right side
    assert_parse_fails("classDiagram\nA <|--\n");
    // Unclosed parameter list
    assert_parse_fails("classDiagram\nFoo : bar(x int\n");
    // Unclosed class body
    assert_parse_fails("classDiagram\nclass Foo {\n  +x int\n");
    // Annotation without a target
    assert_parse_fails("classDiagram\n<<interface>>\n");
    // Stray punctuation
    assert_parse_fails("classDiagram\nFoo : , bar\n");
}

// =============================================================================
// Sequence diagrams
// =============================================================================

#[test]
fn test_empty_sequence_diagram() {
    assert_parses_successfully("sequenceDiagram");
    assert_parses_successfully("sequenceDiagram\n\n%% comment\n");
}

#[test]
fn test_participants_and_aliases() {
    let instructions = sequence_instructions(
        "sequenceDiagram\n\
         participant Shop as Web shop\n\
         Actor Customer\n",
    );
    assert_eq!(instructions.len(), 2);

    let SequenceInstruction::Member(shop) = &instructions[0] else {
        panic!("expected participant");
    };
    assert_eq!(shop.kind, ParticipantKind::Participant);
    assert_eq!(shop.name.inner(), "Shop");
    assert_eq!(shop.alias.as_deref(), Some("Web shop"));

    let SequenceInstruction::Member(customer) = &instructions[1] else {
        panic!("expected actor");
    };
    assert_eq!(customer.kind, ParticipantKind::Actor);
}

#[test]
fn test_messages_with_all_arrows() {
    for kind in ArrowKind::ALL {
        let source = format!("sequenceDiagram\nA{}B: ping\n", kind.symbol());
        let instructions = sequence_instructions(&source);
        let SequenceInstruction::Message(message) = &instructions[0] else {
            panic!("expected message for {kind}");
        };
        assert_eq!(message.arrow, kind);
        assert_eq!(message.left.inner(), "A");
        assert_eq!(message.right.inner(), "B");
        assert_eq!(message.name.inner(), "ping");
        assert!(message.arguments.is_empty());
    }
}

#[test]
fn test_life_and_switch() {
    let instructions = sequence_instructions(
        "sequenceDiagram\n\
         create participant Cart\n\
         create Order as Pending order\n\
         activate Cart\n\
         deactivate Cart\n\
         destroy Cart\n",
    );
    assert_eq!(instructions.len(), 5);

    match &instructions[0] {
        SequenceInstruction::Life(Life::Create(created)) => {
            assert_eq!(created.name.inner(), "Cart");
        }
        other => panic!("expected create, got {other:?}"),
    }
    match &instructions[1] {
        SequenceInstruction::Life(Life::Create(created)) => {
            assert_eq!(created.kind, ParticipantKind::Participant);
            assert_eq!(created.alias.as_deref(), Some("Pending order"));
        }
        other => panic!("expected create, got {other:?}"),
    }
    assert!(matches!(
        &instructions[2],
        SequenceInstruction::Switch(switch) if switch.kind == SwitchKind::Activate
    ));
    assert!(matches!(
        &instructions[3],
        SequenceInstruction::Switch(switch) if switch.kind == SwitchKind::Deactivate
    ));
    assert!(matches!(&instructions[4], SequenceInstruction::Life(Life::Destroy(_))));
}

#[test]
fn test_blocks() {
    let instructions = sequence_instructions(
        "sequenceDiagram\n\
         alt stock available\n\
         A->>B: reserve\n\
         else\n\
         A->>B: backorder\n\
         end\n\
         loop every item\n\
         end\n\
         opt express\n\
         end\n",
    );

    assert_eq!(
        instructions[0],
        SequenceInstruction::Alt("stock available".to_string())
    );
    assert_eq!(instructions[2], SequenceInstruction::Else(String::new()));
    assert_eq!(instructions[4], SequenceInstruction::End);
    assert_eq!(instructions[5], SequenceInstruction::Loop("every item".to_string()));
    assert_eq!(instructions[7], SequenceInstruction::Opt("express".to_string()));
    assert_eq!(instructions.len(), 9);
}

#[test]
fn test_notes_are_skipped() {
    let instructions = sequence_instructions(
        "sequenceDiagram\n\
         note right of A: thinking\n\
         A->>B: ping\n",
    );
    assert_eq!(instructions.len(), 1);
}

#[test]
fn test_sequence_errors() {
    // Missing header
    assert_parse_fails("A->>B: ping\n");
    // Header must stand on its own line
    assert_parse_fails("sequenceDiagram A->>B: ping\n");
    // Message without a name
    assert_parse_fails("sequenceDiagram\nA->>B\n");
    // Two statements on one line
    assert_parse_fails("sequenceDiagram\nA->>B: ping B->>A: pong\n");
    // Unclosed argument list
    assert_parse_fails("sequenceDiagram\nA->>B: ping(x\n");
    // Unknown arrow is a lexer error
    assert_parse_fails("sequenceDiagram\nA-->>>B: ping\n");
}

#[test]
fn test_unknown_diagram_type() {
    assert_parse_fails("flowchart LR\nA --> B\n");
    assert_parse_fails("");
}

// =============================================================================
// Instruction count round trip
// =============================================================================

fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{0,6}".prop_filter("must not be a keyword", |name| {
        !matches!(
            name.to_ascii_lowercase().as_str(),
            "as" | "end"
                | "loop"
                | "alt"
                | "else"
                | "opt"
                | "actor"
                | "create"
                | "destroy"
                | "note"
                | "class"
        )
    })
}

fn class_line_strategy() -> impl Strategy<Value = String> {
    let markers = prop::sample::select(vec![
        "<|--", "--|>", "<|..", "..|>", "*--", "o--", "-->", "..>", "--", "..",
    ]);
    prop_oneof![
        (name_strategy(), markers, name_strategy()).prop_map(|(l, m, r)| format!("{l} {m} {r}")),
        (name_strategy(), name_strategy()).prop_map(|(owner, name)| {
            format!("{owner} : +{}(int x) String", name.to_ascii_lowercase())
        }),
        (name_strategy(), name_strategy())
            .prop_map(|(owner, name)| format!("{owner} : -{} int", name.to_ascii_lowercase())),
        name_strategy().prop_map(|target| format!("<<interface>> {target}")),
        name_strategy().prop_map(|name| format!("class {name}")),
    ]
}

fn sequence_line_strategy() -> impl Strategy<Value = String> {
    let arrows = prop::sample::select(ArrowKind::ALL.to_vec());
    prop_oneof![
        (name_strategy(), arrows, name_strategy(), name_strategy()).prop_map(
            |(l, arrow, r, name)| format!("{l}{}{r}: {}(a, 1)", arrow.symbol(), name.to_ascii_lowercase())
        ),
        name_strategy().prop_map(|name| format!("participant {name}")),
        name_strategy().prop_map(|name| format!("actor {name}")),
        name_strategy().prop_map(|name| format!("activate {name}")),
        Just("alt ready".to_string()),
        Just("else".to_string()),
        Just("end".to_string()),
    ]
}

fn check_class_round_trip(lines: &[String]) -> Result<(), TestCaseError> {
    let source = format!("classDiagram\n{}\n", lines.join("\n"));
    let count = parse_source(&source).map_err(TestCaseError::fail)?;
    prop_assert_eq!(count, lines.len());
    Ok(())
}

fn check_sequence_round_trip(lines: &[String]) -> Result<(), TestCaseError> {
    let source = format!("sequenceDiagram\n{}", lines.join("\n\n"));
    let count = parse_source(&source).map_err(TestCaseError::fail)?;
    prop_assert_eq!(count, lines.len());
    Ok(())
}

proptest! {
    #[test]
    fn class_instruction_count_round_trips(
        lines in prop::collection::vec(class_line_strategy(), 0..12)
    ) {
        check_class_round_trip(&lines)?;
    }

    #[test]
    fn sequence_instruction_count_round_trips(
        lines in prop::collection::vec(sequence_line_strategy(), 0..12)
    ) {
        check_sequence_round_trip(&lines)?;
    }
}
