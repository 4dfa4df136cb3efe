//! Scheduler construction, event ingestion, and lifecycle

use crate::bridge::HostEvent;
use crate::state::{PassStats, PendingEntry, SchedulerPhase, Shared};
use crate::tick;
use parking_lot::Mutex;
use reflow_core::{
    BuildAction, BuildScope, CommandInvoker, DocumentHandle, ExtensionFilter, ReflowConfig,
    WorkspaceHost,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Everything the tick loop, the executor, and the ingestion methods share
pub(crate) struct Inner {
    pub host: Arc<dyn WorkspaceHost>,
    pub invoker: Arc<dyn CommandInvoker>,
    pub config: ReflowConfig,
    pub filter: ExtensionFilter,
    /// Reformat command resolved once at startup; `None` means the feature
    /// is unavailable and the scheduler never runs
    pub command: Option<String>,
    pub shared: Mutex<Shared>,
}

impl Inner {
    pub fn new(
        host: Arc<dyn WorkspaceHost>,
        invoker: Arc<dyn CommandInvoker>,
        config: ReflowConfig,
    ) -> Self {
        let filter = config.extension_filter();
        let command = resolve_command(&config, invoker.as_ref());
        Self {
            host,
            invoker,
            config,
            filter,
            command,
            shared: Mutex::new(Shared::new()),
        }
    }

    fn eligible(&self, doc: &dyn DocumentHandle) -> bool {
        match doc.id().extension() {
            Some(ext) => self.filter.is_eligible(&ext),
            None => false,
        }
    }

    pub fn on_document_saved(&self, doc: Arc<dyn DocumentHandle>) {
        // with no resolved command there is no tick loop to drain entries
        if self.command.is_none() {
            return;
        }
        if !self.eligible(doc.as_ref()) {
            return;
        }

        let id = doc.id();
        let mut shared = self.shared.lock();
        if shared.phase == SchedulerPhase::Reformatting {
            debug!(doc = %id, "save ignored: pass in flight");
            return;
        }
        if shared.build_depth > 0 {
            shared.stats.saves_discarded_by_build += 1;
            debug!(doc = %id, "save discarded: build in flight");
            return;
        }

        debug!(doc = %id, "queued for reformat");
        shared.pending.insert(
            id,
            PendingEntry {
                doc,
                saved_at: Instant::now(),
            },
        );
    }

    pub fn on_document_closing(&self, doc: Arc<dyn DocumentHandle>) {
        if !self.eligible(doc.as_ref()) {
            return;
        }
        let id = doc.id();
        if self.shared.lock().pending.remove(&id).is_some() {
            debug!(doc = %id, "dequeued: closing");
        }
    }

    pub fn on_build_begin(&self, _scope: BuildScope, action: BuildAction) {
        if !action.gates_scheduling() {
            return;
        }
        let mut shared = self.shared.lock();
        shared.build_depth += 1;
        if !shared.pending.is_empty() {
            debug!(
                dropped = shared.pending.len(),
                "build started, discarding pending saves"
            );
            shared.pending.clear();
        }
    }

    pub fn on_build_done(&self, _scope: BuildScope, action: BuildAction) {
        if !action.gates_scheduling() {
            return;
        }
        let mut shared = self.shared.lock();
        shared.build_depth = shared.build_depth.saturating_sub(1);
    }

    pub fn on_solution_opened(&self) {
        self.shared.lock().workspace_open = true;
    }

    pub fn on_solution_closing(&self) {
        self.shared.lock().workspace_open = false;
    }
}

/// Probe the configured command names in order; first available wins
fn resolve_command(config: &ReflowConfig, invoker: &dyn CommandInvoker) -> Option<String> {
    for name in &config.command.names {
        if invoker.is_available(name) {
            info!(command = %name, "reformat command resolved");
            return Some(name.clone());
        }
    }
    warn!(
        candidates = ?config.command.names,
        "no reformat command available; format-on-save disabled"
    );
    None
}

/// Handle to a running scheduler
///
/// Clones share the same scheduler instance. Dropping all handles does not
/// stop the tick loop; call [`ReformatScheduler::shutdown`] for teardown.
#[derive(Clone)]
pub struct ReformatScheduler {
    pub(crate) inner: Arc<Inner>,
    shutdown: watch::Sender<bool>,
    tick_task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl ReformatScheduler {
    /// Resolve the reformat command and start the debounce loop
    ///
    /// If no configured command is available in the host, the loop is not
    /// started and the returned handle is inert.
    pub fn spawn(
        host: Arc<dyn WorkspaceHost>,
        invoker: Arc<dyn CommandInvoker>,
        config: ReflowConfig,
    ) -> Self {
        let inner = Arc::new(Inner::new(host, invoker, config));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let tick_task = if inner.command.is_some() {
            Some(tokio::spawn(tick::run(inner.clone(), shutdown_rx)))
        } else {
            None
        };

        Self {
            inner,
            shutdown: shutdown_tx,
            tick_task: Arc::new(Mutex::new(tick_task)),
        }
    }

    /// Whether a reformat command was resolved at startup
    pub fn is_enabled(&self) -> bool {
        self.inner.command.is_some()
    }

    pub fn stats(&self) -> PassStats {
        self.inner.shared.lock().stats
    }

    pub fn document_saved(&self, doc: Arc<dyn DocumentHandle>) {
        self.inner.on_document_saved(doc);
    }

    pub fn document_closing(&self, doc: Arc<dyn DocumentHandle>) {
        self.inner.on_document_closing(doc);
    }

    pub fn build_begin(&self, scope: BuildScope, action: BuildAction) {
        self.inner.on_build_begin(scope, action);
    }

    pub fn build_done(&self, scope: BuildScope, action: BuildAction) {
        self.inner.on_build_done(scope, action);
    }

    pub fn solution_opened(&self) {
        self.inner.on_solution_opened();
    }

    pub fn solution_closing(&self) {
        self.inner.on_solution_closing();
    }

    /// Route a bridged host event to the matching ingestion method
    pub fn dispatch(&self, event: HostEvent) {
        match event {
            HostEvent::DocumentSaved(doc) => self.document_saved(doc),
            HostEvent::DocumentClosing(doc) => self.document_closing(doc),
            HostEvent::BuildBegin { scope, action } => self.build_begin(scope, action),
            HostEvent::BuildDone { scope, action } => self.build_done(scope, action),
            HostEvent::SolutionOpened => self.solution_opened(),
            HostEvent::SolutionClosing => self.solution_closing(),
        }
    }

    /// Stop the tick loop and wait for it to finish
    ///
    /// Idempotent and irrevocable: a second call finds nothing to stop,
    /// and the handle stays inert afterwards.
    pub async fn shutdown(&self) {
        let _ = self.shutdown.send(true);
        let task = self.tick_task.lock().take();
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}
