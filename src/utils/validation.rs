//! Validation utilities

use crate::types::*;

/// Validate that an account name can be written into a posting line
///
/// Only structural rules are enforced: the name must be non-empty, must not
/// contain tabs or double spaces (they separate the amount in a posting),
/// and every colon-separated segment must be non-empty.
pub fn validate_account_name(name: &str) -> ReconcileResult<()> {
    if name.trim().is_empty() {
        return Err(ReconcileError::Configuration(
            "Account name cannot be empty".to_string(),
        ));
    }

    if name != name.trim() {
        return Err(ReconcileError::Configuration(format!(
            "Account name '{}' has leading or trailing whitespace",
            name
        )));
    }

    if name.contains('\t') || name.contains("  ") {
        return Err(ReconcileError::Configuration(format!(
            "Account name '{}' cannot contain tabs or double spaces",
            name
        )));
    }

    if name.split(':').any(|segment| segment.trim().is_empty()) {
        return Err(ReconcileError::Configuration(format!(
            "Account name '{}' has an empty segment",
            name
        )));
    }

    Ok(())
}

/// Validate that a report command has a program to run
pub fn validate_command(command: &[String]) -> ReconcileResult<()> {
    match command.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(ReconcileError::Configuration(
            "Report command cannot be empty".to_string(),
        )),
    }
}
