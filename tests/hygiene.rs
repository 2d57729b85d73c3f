//! Source hygiene budgets for the console library and binary.
//!
//! Each rule counts lines in non-test `src/` files that contain a pattern.
//! A budget can only go down: to add a hit, remove another one first.

use std::fs;
use std::path::Path;

struct Budget {
    pattern: &'static str,
    max: usize,
    hint: &'static str,
}

const BUDGETS: &[Budget] = &[
    Budget { pattern: ".unwrap()", max: 0, hint: "propagate with `?` or map into ApiError" },
    Budget { pattern: ".expect(", max: 0, hint: "propagate with `?` or map into ApiError" },
    Budget { pattern: "panic!(", max: 0, hint: "return an error instead" },
    Budget { pattern: "unreachable!(", max: 0, hint: "make the state unrepresentable" },
    Budget { pattern: "todo!(", max: 0, hint: "finish the stub" },
    Budget { pattern: "unimplemented!(", max: 0, hint: "finish the stub" },
    Budget { pattern: "let _ =", max: 0, hint: "log the discarded error" },
    // Optional env vars in config.rs (4) and missing storage keys (1).
    Budget { pattern: ".ok()", max: 5, hint: "inspect the error before dropping it" },
    Budget { pattern: "#[allow(dead_code)]", max: 0, hint: "delete the unused item" },
];

struct SourceFile {
    path: String,
    content: String,
}

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    walk(Path::new("src"), &mut files);
    files
}

fn walk(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            walk(&path, out);
            continue;
        }
        let name = path.to_string_lossy().into_owned();
        if !name.ends_with(".rs") || name.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: name, content });
        }
    }
}

/// Per-file line counts for `pattern`, files without hits omitted.
fn hits<'a>(files: impl IntoIterator<Item = &'a SourceFile>, pattern: &str) -> Vec<(&'a str, usize)> {
    files
        .into_iter()
        .map(|f| (f.path.as_str(), f.content.lines().filter(|l| l.contains(pattern)).count()))
        .filter(|(_, n)| *n > 0)
        .collect()
}

fn report(hits: &[(&str, usize)]) -> String {
    hits.iter().map(|(path, n)| format!("  {path}: {n}")).collect::<Vec<_>>().join("\n")
}

#[test]
fn sources_are_found() {
    assert!(source_files().iter().any(|f| f.path.ends_with("lib.rs")), "run from the crate root");
}

#[test]
fn pattern_budgets_hold() {
    let files = source_files();
    let mut failures = Vec::new();
    for budget in BUDGETS {
        let found = hits(&files, budget.pattern);
        let count: usize = found.iter().map(|(_, n)| n).sum();
        if count > budget.max {
            failures.push(format!(
                "`{}`: found {count}, max {} ({}).\n{}",
                budget.pattern,
                budget.max,
                budget.hint,
                report(&found)
            ));
        }
    }
    assert!(failures.is_empty(), "hygiene budgets exceeded:\n{}", failures.join("\n"));
}

#[test]
fn library_does_not_print() {
    let files = source_files();
    let library = files.iter().filter(|f| !f.path.ends_with("main.rs"));
    let found: Vec<_> = ["println!(", "eprintln!(", "dbg!("]
        .iter()
        .flat_map(|p| hits(library.clone(), p))
        .collect();
    assert!(found.is_empty(), "library code must log through tracing:\n{}", report(&found));
}

#[test]
fn env_is_read_only_in_config() {
    let files = source_files();
    let found = hits(files.iter().filter(|f| !f.path.ends_with("config.rs")), "std::env::var(");
    assert!(found.is_empty(), "environment must be read in config.rs:\n{}", report(&found));
}
