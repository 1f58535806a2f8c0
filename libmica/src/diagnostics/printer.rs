// Copyright 2025 Neil Henderson, Blue Tarp Media.
//
//! The `printer` module renders diagnostics to stderr for the driver.

use owo_colors::OwoColorize;

use super::SemanticError;

/// Prints a semantic error to stderr.
pub fn report(error: &SemanticError) {
    eprintln!("{} {error}", "error:".red().bold());
}

/// Prints a semantic error to stderr with the offending source text, when the parser
/// recorded it on the node.
pub fn report_with_source(error: &SemanticError, source_text: &str) {
    report(error);
    if !source_text.is_empty() {
        eprintln!("    {}", source_text.bright_black());
    }
}
