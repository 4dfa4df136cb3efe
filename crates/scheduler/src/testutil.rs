//! In-memory host doubles shared by the scheduler tests

use crate::scheduler::{Inner, ReformatScheduler};
use crate::state::SchedulerPhase;
use parking_lot::Mutex;
use reflow_core::{
    CommandInvoker, DocumentHandle, DocumentId, ExecutionMode, FocusToken, HostError,
    ReflowConfig, WorkspaceHost,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

pub(crate) fn test_config(tick_interval_ms: u64, cooldown_secs: u64) -> ReflowConfig {
    let mut config = ReflowConfig::default();
    config.scheduler.tick_interval_ms = tick_interval_ms;
    config.scheduler.cooldown_secs = cooldown_secs;
    config
}

/// Scriptable workspace host double
pub(crate) struct TestHost {
    focused: AtomicBool,
    debugging: AtomicBool,
    active: Mutex<Option<DocumentId>>,
    documents: Mutex<HashMap<DocumentId, Arc<TestDocument>>>,
    restored: Mutex<Vec<FocusToken>>,
    next_token: AtomicU64,
}

impl TestHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            focused: AtomicBool::new(true),
            debugging: AtomicBool::new(false),
            active: Mutex::new(None),
            documents: Mutex::new(HashMap::new()),
            restored: Mutex::new(Vec::new()),
            next_token: AtomicU64::new(0),
        })
    }

    /// Create and register a clean, open document
    pub fn open_document(self: &Arc<Self>, path: &str) -> Arc<TestDocument> {
        let doc = Arc::new(TestDocument {
            id: DocumentId::new(path),
            dirty: AtomicBool::new(false),
            open: AtomicBool::new(true),
            host: Arc::downgrade(self),
        });
        self.documents.lock().insert(doc.id(), doc.clone());
        doc
    }

    pub fn document(&self, id: &DocumentId) -> Option<Arc<TestDocument>> {
        self.documents.lock().get(id).cloned()
    }

    pub fn set_focused(&self, focused: bool) {
        self.focused.store(focused, Ordering::SeqCst);
    }

    pub fn set_mode(&self, mode: ExecutionMode) {
        self.debugging
            .store(mode == ExecutionMode::Debug, Ordering::SeqCst);
    }

    pub fn set_active(&self, id: Option<DocumentId>) {
        *self.active.lock() = id;
    }

    pub fn restored_tokens(&self) -> Vec<FocusToken> {
        self.restored.lock().clone()
    }
}

impl WorkspaceHost for TestHost {
    fn has_focus(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }

    fn execution_mode(&self) -> ExecutionMode {
        if self.debugging.load(Ordering::SeqCst) {
            ExecutionMode::Debug
        } else {
            ExecutionMode::Normal
        }
    }

    fn active_document(&self) -> Option<DocumentId> {
        self.active.lock().clone()
    }

    fn capture_focus(&self) -> Option<FocusToken> {
        Some(FocusToken(self.next_token.fetch_add(1, Ordering::SeqCst)))
    }

    fn restore_focus(&self, token: FocusToken) -> Result<(), HostError> {
        self.restored.lock().push(token);
        Ok(())
    }
}

/// Host-owned document double
pub(crate) struct TestDocument {
    id: DocumentId,
    dirty: AtomicBool,
    open: AtomicBool,
    host: Weak<TestHost>,
}

impl TestDocument {
    pub fn set_dirty(&self, dirty: bool) {
        self.dirty.store(dirty, Ordering::SeqCst);
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

impl DocumentHandle for TestDocument {
    fn id(&self) -> DocumentId {
        self.id.clone()
    }

    fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn activate(&self) -> Result<(), HostError> {
        if !self.is_open() {
            return Err(HostError::DocumentClosed(self.id.clone()));
        }
        if let Some(host) = self.host.upgrade() {
            host.set_active(Some(self.id.clone()));
        }
        Ok(())
    }

    fn save(&self) -> Result<(), HostError> {
        if !self.is_open() {
            return Err(HostError::DocumentClosed(self.id.clone()));
        }
        self.set_dirty(false);
        Ok(())
    }
}

/// Command registry double recording every invocation
pub(crate) struct TestInvoker {
    available: Vec<String>,
    host: Arc<TestHost>,
    invocations: Mutex<Vec<DocumentId>>,
    fail_for: Mutex<HashSet<DocumentId>>,
    /// Reformatting re-dirties the active document's buffer when set
    redirty: AtomicBool,
    /// Optional probe into the scheduler for mutual-exclusion checks
    probe: Mutex<Option<Weak<Inner>>>,
    overlaps: AtomicU64,
    in_invoke: AtomicBool,
}

impl TestInvoker {
    pub fn new(host: &Arc<TestHost>, available: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            available: available.iter().map(|name| name.to_string()).collect(),
            host: host.clone(),
            invocations: Mutex::new(Vec::new()),
            fail_for: Mutex::new(HashSet::new()),
            redirty: AtomicBool::new(false),
            probe: Mutex::new(None),
            overlaps: AtomicU64::new(0),
            in_invoke: AtomicBool::new(false),
        })
    }

    /// Invoker advertising both default command names
    pub fn default_commands(host: &Arc<TestHost>) -> Arc<Self> {
        Self::new(host, &["Edit.RunCleanupProfile", "Edit.FormatDocument"])
    }

    pub fn invocations(&self) -> Vec<DocumentId> {
        self.invocations.lock().clone()
    }

    pub fn fail_for(&self, id: DocumentId) {
        self.fail_for.lock().insert(id);
    }

    pub fn set_redirty(&self, redirty: bool) {
        self.redirty.store(redirty, Ordering::SeqCst);
    }

    /// Start verifying that every invocation happens inside an exclusive
    /// reformat pass
    pub fn attach_probe(&self, scheduler: &ReformatScheduler) {
        *self.probe.lock() = Some(Arc::downgrade(&scheduler.inner));
    }

    /// Invocations observed outside an exclusive in-flight pass
    pub fn overlap_violations(&self) -> u64 {
        self.overlaps.load(Ordering::SeqCst)
    }
}

impl CommandInvoker for TestInvoker {
    fn is_available(&self, name: &str) -> bool {
        self.available.iter().any(|candidate| candidate == name)
    }

    fn invoke(&self, name: &str) -> Result<(), HostError> {
        if self.in_invoke.swap(true, Ordering::SeqCst) {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        if let Some(inner) = self.probe.lock().as_ref().and_then(Weak::upgrade) {
            if inner.shared.lock().phase != SchedulerPhase::Reformatting {
                self.overlaps.fetch_add(1, Ordering::SeqCst);
            }
        }

        let result = match self.host.active_document() {
            Some(active) if self.fail_for.lock().contains(&active) => {
                Err(HostError::CommandFailed {
                    name: name.to_string(),
                    reason: "scripted failure".to_string(),
                })
            }
            Some(active) => {
                if self.redirty.load(Ordering::SeqCst) {
                    if let Some(doc) = self.host.document(&active) {
                        doc.set_dirty(true);
                    }
                }
                self.invocations.lock().push(active);
                Ok(())
            }
            None => Err(HostError::CommandFailed {
                name: name.to_string(),
                reason: "no active document".to_string(),
            }),
        };

        self.in_invoke.store(false, Ordering::SeqCst);
        result
    }
}
