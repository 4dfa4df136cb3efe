//! Simulated host for replaying scripts through the scheduler
//!
//! Implements the core host traits over in-memory documents and records
//! every reformat invocation in order.

use crate::script::{ReplayScript, ScriptEvent};
use anyhow::Result;
use parking_lot::Mutex;
use reflow_core::{
    BuildScope, CommandInvoker, DocumentHandle, DocumentId, ExecutionMode, FocusToken, HostError,
    ReflowConfig, WorkspaceHost,
};
use reflow_scheduler::{EventBridge, HostEvent, PassStats, ReformatScheduler};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::debug;

/// In-memory workspace host
pub struct SimHost {
    focused: AtomicBool,
    debugging: AtomicBool,
    active: Mutex<Option<DocumentId>>,
    documents: Mutex<HashMap<DocumentId, Arc<SimDocument>>>,
    next_token: AtomicU64,
}

impl SimHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            focused: AtomicBool::new(true),
            debugging: AtomicBool::new(false),
            active: Mutex::new(None),
            documents: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(0),
        })
    }

    /// Fetch a document by path, opening it on first reference
    pub fn document(self: &Arc<Self>, path: &str) -> Arc<SimDocument> {
        let id = DocumentId::new(path);
        self.documents
            .lock()
            .entry(id.clone())
            .or_insert_with(|| {
                Arc::new(SimDocument {
                    id,
                    dirty: AtomicBool::new(false),
                    open: AtomicBool::new(true),
                    host: Arc::downgrade(self),
                })
            })
            .clone()
    }

    pub fn set_focused(&self, focused: bool) {
        self.focused.store(focused, Ordering::SeqCst);
    }

    pub fn set_debugging(&self, debugging: bool) {
        self.debugging.store(debugging, Ordering::SeqCst);
    }

    pub fn set_active(&self, id: Option<DocumentId>) {
        *self.active.lock() = id;
    }
}

impl WorkspaceHost for SimHost {
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
        debug!(?token, "focus restored");
        Ok(())
    }
}

/// In-memory document
pub struct SimDocument {
    id: DocumentId,
    dirty: AtomicBool,
    open: AtomicBool,
    host: Weak<SimHost>,
}

impl SimDocument {
    pub fn set_dirty(&self, dirty: bool) {
        self.dirty.store(dirty, Ordering::SeqCst);
    }

    pub fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }
}

impl DocumentHandle for SimDocument {
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

/// Command registry advertising the configured names and recording every
/// invocation against the then-active document
pub struct SimInvoker {
    available: Vec<String>,
    host: Arc<SimHost>,
    invocations: Mutex<Vec<DocumentId>>,
}

impl SimInvoker {
    pub fn new(host: &Arc<SimHost>, available: &[String]) -> Arc<Self> {
        Arc::new(Self {
            available: available.to_vec(),
            host: host.clone(),
            invocations: Mutex::new(Vec::new()),
        })
    }

    pub fn invocations(&self) -> Vec<DocumentId> {
        self.invocations.lock().clone()
    }
}

impl CommandInvoker for SimInvoker {
    fn is_available(&self, name: &str) -> bool {
        self.available.iter().any(|candidate| candidate == name)
    }

    fn invoke(&self, name: &str) -> Result<(), HostError> {
        match self.host.active_document() {
            Some(active) => {
                debug!(command = name, doc = %active, "reformat invoked");
                self.invocations.lock().push(active);
                Ok(())
            }
            None => Err(HostError::CommandFailed {
                name: name.to_string(),
                reason: "no active document".to_string(),
            }),
        }
    }
}

/// What a replay run observed
pub struct ReplayReport {
    pub enabled: bool,
    pub stats: PassStats,
    /// Documents the reformat command ran against, in order
    pub invocations: Vec<DocumentId>,
}

/// Drive a scripted session through a freshly spawned scheduler
pub async fn replay(config: ReflowConfig, script: ReplayScript) -> Result<ReplayReport> {
    let host = SimHost::new();
    let invoker = SimInvoker::new(&host, &config.command.names);
    let scheduler = ReformatScheduler::spawn(host.clone(), invoker.clone(), config);
    let enabled = scheduler.is_enabled();
    let mut bridge = EventBridge::attach(scheduler.clone());
    let sender = bridge.sender();

    let start = tokio::time::Instant::now();
    for step in &script.events {
        tokio::time::sleep_until(start + Duration::from_millis(step.at_ms)).await;
        apply(&step.event, &host, &sender);
    }
    tokio::time::sleep_until(start + Duration::from_millis(script.duration_ms)).await;

    bridge.detach().await;
    let stats = scheduler.stats();
    scheduler.shutdown().await;

    Ok(ReplayReport {
        enabled,
        stats,
        invocations: invoker.invocations(),
    })
}

fn apply(
    event: &ScriptEvent,
    host: &Arc<SimHost>,
    sender: &tokio::sync::mpsc::UnboundedSender<HostEvent>,
) {
    let send = |event: HostEvent| {
        // the bridge outlives the event loop; a send can only fail after
        // detach, which never happens mid-replay
        let _ = sender.send(event);
    };

    match event {
        ScriptEvent::Save { path } => {
            let doc = host.document(path);
            doc.set_dirty(false);
            send(HostEvent::DocumentSaved(doc));
        }
        ScriptEvent::Close { path } => {
            let doc = host.document(path);
            doc.close();
            send(HostEvent::DocumentClosing(doc));
        }
        ScriptEvent::Modify { path } => {
            host.document(path).set_dirty(true);
        }
        ScriptEvent::Activate { path } => {
            let doc = host.document(path);
            host.set_active(Some(doc.id()));
        }
        ScriptEvent::BuildBegin { action } => send(HostEvent::BuildBegin {
            scope: BuildScope::Solution,
            action: (*action).into(),
        }),
        ScriptEvent::BuildDone { action } => send(HostEvent::BuildDone {
            scope: BuildScope::Solution,
            action: (*action).into(),
        }),
        ScriptEvent::SolutionOpened => send(HostEvent::SolutionOpened),
        ScriptEvent::SolutionClosing => send(HostEvent::SolutionClosing),
        ScriptEvent::Focus { value } => host.set_focused(*value),
        ScriptEvent::Debug { value } => host.set_debugging(*value),
    }
}
