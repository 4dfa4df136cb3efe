//! Coalesced reformat pass execution
//!
//! A pass drains a frozen batch: each document is activated, the external
//! reformat command is invoked against it, and the entry is removed from
//! the pending set whether or not the command succeeded. The document the
//! user was looking at is processed last and focus is restored afterwards,
//! keeping the visible disruption as short as possible.

use crate::scheduler::Inner;
use crate::state::{PendingEntry, SchedulerPhase};
use reflow_core::{DocumentHandle, DocumentId};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub(crate) fn run_pass(inner: &Inner, batch: Vec<PendingEntry>) {
    let Some(command) = inner.command.as_deref() else {
        return;
    };

    {
        let mut shared = inner.shared.lock();
        shared.phase = SchedulerPhase::Reformatting;
        shared.last_pass_at = Some(Instant::now());
    }

    let batch_ids: Vec<DocumentId> = batch.iter().map(|entry| entry.doc.id()).collect();
    // pending drain and phase reset must happen even if a host handle
    // panics mid-pass; failed documents are not retried
    let _cleanup = PassCleanup {
        inner,
        ids: &batch_ids,
    };

    let focus = inner.host.capture_focus();
    let active = inner.host.active_document();
    let ordered = order_batch(batch, active.as_ref());

    info!(documents = ordered.len(), command, "reformat pass started");

    let mut processed: Vec<Arc<dyn DocumentHandle>> = Vec::new();
    for entry in ordered {
        let id = entry.doc.id();
        if !entry.doc.is_open() {
            debug!(doc = %id, "skipped: closed before the pass reached it");
            inner.shared.lock().pending.remove(&id);
            continue;
        }
        if let Err(error) = entry.doc.activate() {
            warn!(doc = %id, %error, "could not activate document");
            inner.shared.lock().pending.remove(&id);
            continue;
        }

        match inner.invoker.invoke(command) {
            Ok(()) => {
                debug!(doc = %id, "reformatted");
                inner.shared.lock().stats.documents_reformatted += 1;
                processed.push(entry.doc.clone());
            }
            Err(error) => {
                warn!(doc = %id, %error, "reformat command failed");
                inner.shared.lock().stats.command_failures += 1;
            }
        }
        inner.shared.lock().pending.remove(&id);
    }

    if inner.config.scheduler.save_after_reformat {
        for doc in &processed {
            if doc.is_dirty() {
                if let Err(error) = doc.save() {
                    warn!(doc = %doc.id(), %error, "could not save after reformat");
                }
            }
        }
    }

    if let Some(token) = focus {
        if let Err(error) = inner.host.restore_focus(token) {
            warn!(%error, "could not restore focus");
        }
    }

    inner.shared.lock().stats.passes_completed += 1;
    info!(reformatted = processed.len(), "reformat pass finished");
}

/// Background documents keep their save order; the originally active
/// document, if batched, moves to the end
fn order_batch(mut batch: Vec<PendingEntry>, active: Option<&DocumentId>) -> Vec<PendingEntry> {
    if let Some(active) = active {
        if let Some(position) = batch.iter().position(|entry| entry.doc.id() == *active) {
            let entry = batch.remove(position);
            batch.push(entry);
        }
    }
    batch
}

/// Guaranteed pass cleanup: drains every batched id from the pending set
/// and returns the scheduler to idle
struct PassCleanup<'a> {
    inner: &'a Inner,
    ids: &'a [DocumentId],
}

impl Drop for PassCleanup<'_> {
    fn drop(&mut self) {
        let mut shared = self.inner.shared.lock();
        for id in self.ids {
            shared.pending.remove(id);
        }
        shared.phase = SchedulerPhase::Idle;
    }
}
