use std::{fs, path::PathBuf};

use tempfile::tempdir;

use merfolk_cli::{Args, run};

/// Collects all .md files from a directory
fn collect_md_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

/// Demos live at the workspace root, not in the crate
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args(input: &PathBuf, output: PathBuf, config: Option<String>) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config,
        log_level: "off".to_string(),
        model: None,
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let valid_demos = collect_md_files(demos_path());
    assert!(!valid_demos.is_empty(), "No demos found in demos/");

    let mut failed_demos = Vec::new();

    for demo_path in &valid_demos {
        let output_dir = temp_dir
            .path()
            .join(demo_path.file_stem().unwrap().to_string_lossy().to_string());

        match run(&args(demo_path, output_dir.clone(), None)) {
            Ok(()) => {
                let written = fs::read_dir(&output_dir)
                    .map(|entries| entries.count())
                    .unwrap_or(0);
                if written == 0 {
                    failed_demos.push((demo_path.clone(), "no Java files written".to_string()));
                }
            }
            Err(e) => failed_demos.push((demo_path.clone(), e.to_string())),
        }
    }

    if !failed_demos.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, err) in &failed_demos {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed_demos.len());
    }

    println!("✅ All {} demos passed", valid_demos.len());
}

#[test]
fn e2e_smoke_test_demo_directory() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output_dir = temp_dir.path().join("java");
    let model_path = temp_dir.path().join("model.json");

    let mut args = args(&demos_path(), output_dir.clone(), None);
    args.model = Some(model_path.to_string_lossy().to_string());
    run(&args).expect("Demo directory should transpile");

    assert!(output_dir.join("Shop.java").exists());
    assert!(output_dir.join("Catalogue.java").exists());

    let model = fs::read_to_string(model_path).expect("Model written");
    let model: serde_json::Value = serde_json::from_str(&model).expect("Model is JSON");
    assert!(model.is_object());
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    // Errors only abort the run when blocks are not skipped
    let config_path = temp_dir.path().join("strict.toml");
    fs::write(&config_path, "[input]\nskip_invalid_blocks = false\n")
        .expect("Failed to write config");
    let config = Some(config_path.to_string_lossy().to_string());

    let error_demos = collect_md_files(demos_path().join("errors"));
    assert!(
        !error_demos.is_empty(),
        "No error demos found in demos/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for demo_path in &error_demos {
        let output_dir = temp_dir.path().join(format!(
            "error_{}",
            demo_path.file_stem().unwrap().to_string_lossy()
        ));

        if run(&args(demo_path, output_dir, config.clone())).is_ok() {
            unexpectedly_succeeded.push(demo_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError demos that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error demo(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!(
        "✅ All {} error demos failed as expected",
        error_demos.len()
    );
}
