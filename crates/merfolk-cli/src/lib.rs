//! CLI logic for the Merfolk transpiler.
//!
//! Reads Markdown documents, transpiles their Mermaid blocks into one code
//! model and writes a Java source file per entity.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use merfolk::{BlockReport, Document, MerfolkError, Transpiler, model::CodeModel};

use error_adapter::report_reportables;

/// Run the Merfolk CLI application
///
/// Every document named by `args.input` is transpiled into a single model,
/// whose Java sources are written to `args.output`. Skipped blocks and
/// interpreter warnings are logged as warnings.
///
/// # Errors
///
/// Returns `MerfolkError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed documents or blocks when `skip_invalid_blocks` is off
/// - Model serialization errors
pub fn run(args: &Args) -> Result<(), MerfolkError> {
    info!(
        input_path = args.input,
        output_dir = args.output;
        "Processing documents"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let documents = collect_documents(Path::new(&args.input))?
        .iter()
        .map(Document::read)
        .collect::<Result<Vec<_>, _>>()?;

    let transpiler = Transpiler::new(app_config);
    let result = transpiler.transpile(&documents)?;

    for report in &result.reports {
        render_report(report);
    }

    let written = transpiler.write_java(&result.model, &args.output)?;

    if let Some(path) = &args.model {
        write_model(&result.model, path)?;
    }

    info!(files = written.len(), output_dir = args.output; "Java sources exported successfully");

    Ok(())
}

/// Resolve the input path to the Markdown files it names.
///
/// A directory contributes its `*.md` files (not recursively), sorted by
/// path; anything else is taken as a single document.
fn collect_documents(input: &Path) -> Result<Vec<PathBuf>, MerfolkError> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(input)? {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("md") {
            files.push(path);
        }
    }
    files.sort();

    debug!(dir:? = input, documents = files.len(); "Collected Markdown documents");
    Ok(files)
}

fn write_model(model: &CodeModel, path: &str) -> Result<(), MerfolkError> {
    let json =
        serde_json::to_string_pretty(model).map_err(|e| MerfolkError::Serialize(e.to_string()))?;
    fs::write(path, json)?;
    info!(path; "Code model written");
    Ok(())
}

fn render_report(report: &BlockReport) {
    let reporter = miette::GraphicalReportHandler::new();

    for reportable in report_reportables(report) {
        let mut writer = String::new();
        if reporter.render_report(&mut writer, &reportable).is_err() {
            writer = reportable.to_string();
        }

        warn!(
            document = report.document(),
            line = report.line(),
            skipped = report.is_skipped();
            "{writer}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_documents_filters_markdown() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.md"), "").unwrap();
        fs::write(dir.path().join("a.md"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::create_dir(dir.path().join("nested.md")).unwrap();

        let files = collect_documents(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.md", "b.md"]);
    }

    #[test]
    fn test_collect_single_file() {
        let files = collect_documents(Path::new("design.md")).unwrap();
        assert_eq!(files, [PathBuf::from("design.md")]);
    }

    #[test]
    fn test_run_writes_java_and_model() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("shop.md");
        fs::write(
            &input,
            "```mermaid\nclassDiagram\nShop : +open() boolean\n```\n",
        )
        .unwrap();
        let output = dir.path().join("java");
        let model = dir.path().join("model.json");

        let args = Args {
            input: input.to_string_lossy().to_string(),
            output: output.to_string_lossy().to_string(),
            config: None,
            log_level: "off".to_string(),
            model: Some(model.to_string_lossy().to_string()),
        };
        run(&args).unwrap();

        let java = fs::read_to_string(output.join("Shop.java")).unwrap();
        assert!(java.contains("public boolean open()"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(model).unwrap()).unwrap();
        assert!(json.to_string().contains("\"open\""));
    }

    #[test]
    fn test_run_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args {
            input: dir.path().join("missing.md").to_string_lossy().to_string(),
            output: dir.path().join("out").to_string_lossy().to_string(),
            config: None,
            log_level: "off".to_string(),
            model: None,
        };
        assert!(matches!(run(&args), Err(MerfolkError::Io(_))));
    }
}
