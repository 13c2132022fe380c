//! Turning result records into errors for callers that only want success.

use sift_git::OperationOutcome;

use crate::error::{Error, Result};

/// Pass `record` through if it succeeded, otherwise map it to the most
/// specific [`Error`].
///
/// Conflicts win over remote refusals, which win over a generic failure.
///
/// # Errors
/// Returns [`Error::UnresolvedConflicts`], [`Error::AuthenticationFailed`],
/// [`Error::Rejected`] or [`Error::OperationFailed`].
pub fn require_success<T: OperationOutcome>(operation: &str, record: T) -> Result<T> {
    if record.succeeded() {
        return Ok(record);
    }

    let message = record
        .error_message()
        .unwrap_or("git reported a failure")
        .to_string();

    let conflicts = record.conflicting_files();
    if !conflicts.is_empty() {
        return Err(Error::UnresolvedConflicts(
            conflicts.into_iter().map(String::from).collect(),
        ));
    }
    if record.auth_failed() {
        return Err(Error::AuthenticationFailed(message));
    }
    if record.rejected() {
        return Err(Error::Rejected(message));
    }

    tracing::debug!(operation, %message, "operation failed");
    Err(Error::OperationFailed {
        operation: operation.to_string(),
        message,
    })
}
