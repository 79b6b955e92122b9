//! Architecture enforcement tests.
//!
//! Command handlers go through the engine for every race operation: the
//! engine loads the race, applies the lifecycle rules and saves the result.
//! A handler that calls the lifecycle, lane assignment or ranking code
//! directly would skip persistence and the store's integrity checks.
//!
//! # Test Categories
//!
//! 1. **Rule Bypass Detection** - Handlers must not call race rules
//! 2. **Store Access** - Only the dispatcher opens the file store
//! 3. **Layering** - The core never depends on outer layers

use std::fs;
use std::path::{Path, PathBuf};

/// Handler files exempt from the rule bypass check.
///
/// - `mod.rs` - Dispatcher, builds the engine
/// - `completion.rs` - Shell completion generation
/// - `config_cmd.rs` - Config file I/O only
const EXCLUDED_COMMANDS: &[&str] = &["mod.rs", "completion.rs", "config_cmd.rs"];

/// Identifiers that only the engine may use.
const RULE_ENTRY_POINTS: &[&str] = &[
    "RaceLifecycle",
    "core::lanes",
    "validate_batch",
    "check_place",
    "check_assignable",
];

/// Outer layers the store must not import.
const OUTER_LAYERS: &[&str] = &["crate::cli", "crate::engine", "crate::ui"];

/// Layers the core must not import. Persistence adapts to the core, never
/// the other way round.
const CORE_FORBIDDEN: &[&str] = &["crate::cli", "crate::engine", "crate::ui", "crate::store"];

fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).expect("Failed to read directory") {
        let path = entry.expect("Failed to read entry").path();
        if path.is_dir() {
            files.extend(rust_files(&path));
        } else if path.extension().map(|e| e == "rs").unwrap_or(false) {
            files.push(path);
        }
    }
    files.sort();
    files
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or_default()
}

/// Source text before the unit test module, if any.
fn non_test_source(path: &Path) -> String {
    let content =
        fs::read_to_string(path).unwrap_or_else(|_| panic!("Failed to read {}", path.display()));
    match content.find("#[cfg(test)]") {
        Some(idx) => content[..idx].to_string(),
        None => content,
    }
}

// =============================================================================
// Rule Bypass Detection
// =============================================================================

#[test]
fn handlers_do_not_call_race_rules() {
    let mut violations = Vec::new();

    for path in rust_files(Path::new("src/cli/commands")) {
        let name = file_name(&path);
        if EXCLUDED_COMMANDS.contains(&name) {
            continue;
        }

        let content = non_test_source(&path);
        for ident in RULE_ENTRY_POINTS {
            if content.contains(ident) {
                violations.push(format!(
                    "{}: uses {} - call the engine instead",
                    name, ident
                ));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Architecture violations found:\n  {}",
        violations.join("\n  ")
    );
}

// =============================================================================
// Store Access
// =============================================================================

#[test]
fn only_dispatcher_opens_file_store() {
    let mut violations = Vec::new();

    for path in rust_files(Path::new("src/cli")) {
        if file_name(&path) == "mod.rs" {
            continue;
        }
        if non_test_source(&path).contains("FileStore::open") {
            violations.push(format!("{}: opens the store directly", path.display()));
        }
    }

    assert!(
        violations.is_empty(),
        "Handlers must use open_engine():\n  {}",
        violations.join("\n  ")
    );
}

// =============================================================================
// Layering
// =============================================================================

#[test]
fn core_does_not_depend_on_outer_layers() {
    let mut violations = Vec::new();

    for path in rust_files(Path::new("src/core")) {
        let content = non_test_source(&path);
        for layer in CORE_FORBIDDEN {
            if content.contains(layer) {
                violations.push(format!("{}: imports {}", path.display(), layer));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Core layering violations found:\n  {}",
        violations.join("\n  ")
    );
}

#[test]
fn store_does_not_depend_on_engine_or_cli() {
    let mut violations = Vec::new();

    for path in rust_files(Path::new("src/store")) {
        let content = non_test_source(&path);
        for layer in OUTER_LAYERS {
            if content.contains(layer) {
                violations.push(format!("{}: imports {}", path.display(), layer));
            }
        }
    }

    assert!(
        violations.is_empty(),
        "Store layering violations found:\n  {}",
        violations.join("\n  ")
    );
}
