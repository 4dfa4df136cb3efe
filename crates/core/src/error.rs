//! Host boundary error type

use crate::document::DocumentId;
use thiserror::Error;

/// Failures surfaced by host collaborators
///
/// None of these are fatal to the scheduler; they are logged and the
/// affected document is dropped from consideration.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("document is no longer open: {0}")]
    DocumentClosed(DocumentId),

    #[error("command not available: {0}")]
    CommandUnavailable(String),

    #[error("command {name} failed: {reason}")]
    CommandFailed { name: String, reason: String },

    #[error("could not restore focus")]
    Focus,
}
