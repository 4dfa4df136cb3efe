//! Host application boundary: focus, execution mode, build notifications,
//! and named-command invocation

use crate::document::DocumentId;
use crate::error::HostError;

/// Whether the host is currently running code under a debugger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Normal,
    Debug,
}

/// Scope of a host build notification
///
/// Carried through from the host's notification shape; gating decisions
/// depend only on the [`BuildAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildScope {
    Solution,
    Project,
    Batch,
}

/// Action of a host build notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildAction {
    Build,
    RebuildAll,
    Deploy,
    Clean,
    Other,
}

impl BuildAction {
    /// Actions that suppress scheduling while in flight
    pub fn gates_scheduling(self) -> bool {
        matches!(self, Self::Build | Self::RebuildAll | Self::Deploy)
    }
}

/// Opaque handle to whatever window owned focus when a pass started
///
/// Issued by the host via [`WorkspaceHost::capture_focus`]; the scheduler
/// only carries it back to [`WorkspaceHost::restore_focus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusToken(pub u64);

/// Host application surface the scheduler consults
///
/// Implementations must be callable off the host's main thread; hosts that
/// require UI mutation on a particular thread marshal internally.
pub trait WorkspaceHost: Send + Sync {
    /// Does the hosting process currently own input focus
    fn has_focus(&self) -> bool;

    fn execution_mode(&self) -> ExecutionMode;

    /// Identity of the document the user is looking at, if any
    fn active_document(&self) -> Option<DocumentId>;

    /// Capture the currently focused window for later restoration
    fn capture_focus(&self) -> Option<FocusToken>;

    fn restore_focus(&self, token: FocusToken) -> Result<(), HostError>;
}

/// Named-command registry of the host
pub trait CommandInvoker: Send + Sync {
    /// Is the named command registered and currently invokable
    fn is_available(&self, name: &str) -> bool;

    /// Invoke the named command against the host's active document
    fn invoke(&self, name: &str) -> Result<(), HostError>;
}
