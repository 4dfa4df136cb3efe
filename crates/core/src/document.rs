//! Document identity and the host document handle

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::HostError;

/// Stable identity for a host document, keyed by full path
///
/// The scheduler never touches the path on disk; the id exists so pending
/// entries can be deduplicated and compared cheaply.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(Arc<str>);

impl DocumentId {
    pub fn new(path: impl AsRef<str>) -> Self {
        Self(Arc::from(path.as_ref()))
    }

    /// Full path as reported by the host
    pub fn path(&self) -> &str {
        &self.0
    }

    /// Lowercased extension without the leading dot, if any
    pub fn extension(&self) -> Option<String> {
        Path::new(self.path())
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }

    /// Final path component, falling back to the full path
    pub fn file_name(&self) -> &str {
        Path::new(self.path())
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_else(|| self.path())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.path())
    }
}

/// Host-owned document handle
///
/// The host editor owns document lifecycle; the scheduler holds handles
/// only to query state and drive the reformat sequence. A handle whose
/// document has been closed must keep answering `is_open() == false`
/// rather than misbehave, and the scheduler drops such entries instead of
/// operating on them.
///
/// Implementations must be callable off the host's main thread; hosts that
/// require UI mutation on a particular thread marshal internally.
pub trait DocumentHandle: Send + Sync {
    fn id(&self) -> DocumentId;

    /// Unsaved-changes flag
    fn is_dirty(&self) -> bool;

    /// False once the document has been closed in the host
    fn is_open(&self) -> bool;

    /// Bring the document to the foreground in the host
    fn activate(&self) -> Result<(), HostError>;

    /// Persist the document
    fn save(&self) -> Result<(), HostError>;
}
