//! Integration tests for the Transpiler API

use merfolk::{
    Document, ErrorCode, MerfolkError, Transpiler,
    config::{AppConfig, EmitConfig, InputConfig, InterpreterSettings},
    document::DocumentError,
};

const SHOP: &str = "# Shop\n\
                    \n\
                    ```mermaid\n\
                    classDiagram\n\
                    B : +doWork() int\n\
                    ```\n\
                    \n\
                    ```mermaid\n\
                    sequenceDiagram\n\
                    A->>B: doWork()\n\
                    B-->>A: result\n\
                    ```\n";

const BROKEN_BLOCK: &str = "```mermaid\nflowchart LR\n```\n";

fn strict() -> Transpiler {
    Transpiler::new(AppConfig::new(
        InputConfig::new(false),
        InterpreterSettings::default(),
        EmitConfig::default(),
    ))
}

#[test]
fn test_transpiler_api_exists() {
    let transpiler = Transpiler::default();
    assert!(transpiler.config().input().skip_invalid_blocks());
}

#[test]
fn test_transpile_class_and_sequence() {
    let transpiler = Transpiler::default();
    let result = transpiler
        .transpile(&[Document::new("shop.md", SHOP)])
        .expect("Failed to transpile");

    assert!(result.reports.is_empty(), "{:?}", result.reports);

    let caller = result.model.entity("A").expect("A exists");
    assert_eq!(caller.methods[0].name, "run");
    assert!(result.model.contains("B"));

    let files = transpiler.render_java(&result.model);
    let a = files
        .iter()
        .find(|file| file.file_name == "A.java")
        .expect("A.java rendered");
    assert!(a.contents.contains("int result = "), "{}", a.contents);
    assert!(a.contents.contains("doWork()"));
}

#[test]
fn test_sequences_see_classes_of_later_documents() {
    let sequence = "```mermaid\nsequenceDiagram\nA->>B: doWork()\nB-->>A: result\n```\n";
    let classes = "```mermaid\nclassDiagram\nB : +doWork() int\n```\n";

    let result = Transpiler::default()
        .transpile(&[
            Document::new("flow.md", sequence),
            Document::new("types.md", classes),
        ])
        .expect("Failed to transpile");

    let work = &result.model.entity("B").expect("B exists").methods[0];
    assert_eq!(work.return_type, "int");
    assert_eq!(result.model.entity("B").unwrap().methods.len(), 1);
}

#[test]
fn test_sequence_body_makes_abstract_method_concrete() {
    let text = "```mermaid\n\
                classDiagram\n\
                Shop : -int id\n\
                Shop : +open()\n\
                Repo : +load() int\n\
                ```\n\
                ```mermaid\n\
                sequenceDiagram\n\
                U->>Shop: open()\n\
                Shop->>Repo: load()\n\
                Repo-->>Shop: n\n\
                ```\n";

    let transpiler = Transpiler::default();
    let result = transpiler
        .transpile(&[Document::new("shop.md", text)])
        .expect("Failed to transpile");

    let open = &result.model.entity("Shop").expect("Shop exists").methods[0];
    assert!(!open.is_abstract);
    assert!(!open.body.is_empty());

    let files = transpiler.render_java(&result.model);
    let shop = files
        .iter()
        .find(|file| file.file_name == "Shop.java")
        .expect("Shop.java rendered");
    assert!(shop.contents.starts_with("public class Shop {\n"), "{}", shop.contents);
    assert!(shop.contents.contains("    public void open() {\n"));
    assert!(shop.contents.contains("int n = repo.load();"));
    assert!(!shop.contents.contains("abstract"));
}

#[test]
fn test_invalid_block_is_skipped() {
    let text = format!("{BROKEN_BLOCK}\n{SHOP}");
    let result = Transpiler::default()
        .transpile(&[Document::new("mixed.md", text)])
        .expect("Invalid blocks should be skipped");

    assert_eq!(result.reports.len(), 1);
    let report = &result.reports[0];
    assert!(report.is_skipped());
    assert_eq!(report.document(), "mixed.md");
    assert_eq!(report.line(), 2);
    assert_eq!(report.source(), "flowchart LR\n");
    assert_eq!(report.diagnostics()[0].code(), Some(ErrorCode::E102));

    assert!(result.model.contains("A"));
}

#[test]
fn test_invalid_block_aborts_in_strict_mode() {
    let err = strict()
        .transpile(&[Document::new("broken.md", BROKEN_BLOCK)])
        .unwrap_err();

    match err {
        MerfolkError::Parse { err, src } => {
            assert_eq!(src, "flowchart LR\n");
            assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E102));
        }
        other => panic!("Expected parse error, got {other:?}"),
    }
}

#[test]
fn test_unclosed_document() {
    let text = "intro\n```mermaid\nclassDiagram\n";

    let err = strict()
        .transpile(&[Document::new("open.md", text)])
        .unwrap_err();
    assert!(matches!(
        err,
        MerfolkError::Document {
            err: DocumentError::Unclosed { line: 2 },
            ..
        }
    ));

    let result = Transpiler::default()
        .transpile(&[Document::new("open.md", text)])
        .expect("Malformed documents should be skipped");
    assert_eq!(result.reports.len(), 1);
    assert!(result.reports[0].is_skipped());
    assert_eq!(result.reports[0].line(), 2);
    assert!(result.model.is_empty());
}

#[test]
fn test_interpreter_warnings_are_reported() {
    let text = "```mermaid\nclassDiagram\nA : +go() int\n```\n\
                ```mermaid\nsequenceDiagram\nB-->>A: result\n```\n";

    let result = Transpiler::default()
        .transpile(&[Document::new("warn.md", text)])
        .expect("Warnings do not fail the run");

    assert_eq!(result.reports.len(), 1);
    let report = &result.reports[0];
    assert!(!report.is_skipped());
    assert_eq!(report.line(), 6);
    assert_eq!(report.diagnostics()[0].code(), Some(ErrorCode::W200));
}

#[test]
fn test_parse_block_error_carries_source() {
    let err = Transpiler::default()
        .parse_block("sequenceDiagram\nA->>B\n")
        .unwrap_err();

    match err {
        MerfolkError::Parse { err, src } => {
            assert_eq!(src, "sequenceDiagram\nA->>B\n");
            assert!(!err.diagnostics().is_empty());
        }
        other => panic!("Expected parse error, got {other:?}"),
    }
}

#[test]
fn test_write_java() {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let out = dir.path().join("java");

    let transpiler = Transpiler::default();
    let result = transpiler
        .transpile(&[Document::new("shop.md", SHOP)])
        .expect("Failed to transpile");
    let written = transpiler
        .write_java(&result.model, &out)
        .expect("Failed to write");

    assert_eq!(written.len(), result.model.len());
    for path in &written {
        assert!(path.starts_with(&out));
        let contents = std::fs::read_to_string(path).expect("Written file readable");
        assert!(contents.ends_with("}\n"));
    }
    assert!(out.join("B.java").exists());
}

#[test]
fn test_emit_config_applies_package() {
    let config = AppConfig::new(
        InputConfig::default(),
        InterpreterSettings::new("main"),
        EmitConfig::new(Some("com.shop".to_string()), "", 2),
    );
    let transpiler = Transpiler::new(config);
    let result = transpiler
        .transpile(&[Document::new("shop.md", SHOP)])
        .expect("Failed to transpile");

    assert_eq!(result.model.entity("A").unwrap().methods[0].name, "main");

    let files = transpiler.render_java(&result.model);
    assert!(files.iter().all(|f| f.contents.starts_with("package com.shop;\n")));
}
