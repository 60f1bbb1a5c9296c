//! Artifact layouts shared by the executors.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::ExecutionError;
use crate::runner::Capture;

/// Combined-output artifact for directory-level kinds.
pub const EXPECTED_OUT: &str = "expected_out.txt";

/// Concatenate captures as `=== <MODE> ===` sections separated by `gap`.
pub fn render_sections(captures: &[&Capture], gap: &str) -> String {
    let mut out = String::new();
    for (idx, capture) in captures.iter().enumerate() {
        if idx > 0 {
            out.push_str(gap);
        }
        out.push_str("=== ");
        out.push_str(capture.mode.section_title());
        out.push_str(" ===\n");
        out.push_str(&capture.output);
    }
    out
}

/// Itemized section listing fixtures that changed again on the second fix pass.
/// Empty when every fixture converged.
pub fn render_broken_fixes(broken: &BTreeSet<String>) -> String {
    if broken.is_empty() {
        return String::new();
    }
    let mut out = String::from("\n=== ! BROKEN FIXES ! ===\n");
    for fixture in broken {
        out.push_str("Fixing is not idempotent for ");
        out.push_str(fixture);
        out.push('\n');
    }
    out
}

pub fn write_artifact(path: &Path, contents: &str) -> Result<(), ExecutionError> {
    fs::write(path, contents).map_err(|err| ExecutionError::io(path, err))
}
