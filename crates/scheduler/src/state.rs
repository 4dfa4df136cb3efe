//! Shared scheduler state
//!
//! Everything the tick loop and incoming host notifications both touch
//! lives in one struct behind one lock.

use reflow_core::{DocumentHandle, DocumentId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::Instant;

/// One document awaiting a reformat pass
#[derive(Clone)]
pub(crate) struct PendingEntry {
    pub doc: Arc<dyn DocumentHandle>,
    /// When the document was last saved; a re-save overwrites this,
    /// refreshing the debounce window
    pub saved_at: Instant,
}

/// Whether a pass is currently in flight
///
/// The tick loop pauses while `Reformatting`, so no second pass can start
/// concurrently with the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    Idle,
    Reformatting,
}

/// Counters for completed work
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub passes_completed: u64,
    pub documents_reformatted: u64,
    pub command_failures: u64,
    pub saves_discarded_by_build: u64,
}

/// All mutable scheduler state, owned by a single lock
pub(crate) struct Shared {
    /// Documents awaiting a pass, keyed by identity; a document appears
    /// at most once
    pub pending: HashMap<DocumentId, PendingEntry>,

    /// Depth of in-flight gating builds; scheduling is suppressed and
    /// saves are discarded while above zero
    pub build_depth: u32,

    /// True between solution-opened and before-solution-closing. Starts
    /// true: the scheduler may attach after the host already has a
    /// solution open.
    pub workspace_open: bool,

    pub phase: SchedulerPhase,

    /// When the most recent pass launched; enforces the cooldown window
    pub last_pass_at: Option<Instant>,

    pub stats: PassStats,
}

impl Shared {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            build_depth: 0,
            workspace_open: true,
            phase: SchedulerPhase::Idle,
            last_pass_at: None,
            stats: PassStats::default(),
        }
    }
}
