//! Periodic debounce evaluation loop
//!
//! Runs on a fixed period, inspects the pending set and the gates, and
//! hands a frozen batch to the pass executor when conditions allow. The
//! pass runs inline on this task, so the timer is effectively stopped for
//! its duration; the interval is reset afterwards.

use crate::pass;
use crate::scheduler::Inner;
use crate::state::{PendingEntry, SchedulerPhase};
use reflow_core::ExecutionMode;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

pub(crate) async fn run(inner: Arc<Inner>, mut shutdown: watch::Receiver<bool>) {
    let period = inner.config.tick_interval();
    let mut tick = interval(period);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(interval = ?period, "debounce loop started");

    loop {
        tokio::select! {
            _ = tick.tick() => {}
            _ = shutdown.changed() => break,
        }
        if *shutdown.borrow() {
            break;
        }

        if let Some(batch) = evaluate(&inner) {
            pass::run_pass(&inner, batch);
            // shutdown may have been requested during the pass
            if *shutdown.borrow() {
                break;
            }
            tick.reset();
        }
    }

    info!("debounce loop stopped");
}

/// One tick's worth of decisions; returns the frozen batch when a pass
/// should fire, ordered ascending by save time
fn evaluate(inner: &Inner) -> Option<Vec<PendingEntry>> {
    let now = Instant::now();
    let mut shared = inner.shared.lock();

    // 1. builds discard pending saves, they are never deferred
    if shared.build_depth > 0 {
        if !shared.pending.is_empty() {
            debug!(
                dropped = shared.pending.len(),
                "build in flight, discarding pending saves"
            );
            shared.pending.clear();
        }
        return None;
    }

    // 2. nothing to do
    if shared.pending.is_empty() {
        return None;
    }

    // 3. gating conjunction; pending saves survive these checks
    if inner.host.execution_mode() == ExecutionMode::Debug {
        return None;
    }
    if shared.phase == SchedulerPhase::Reformatting {
        return None;
    }
    if !shared.workspace_open {
        return None;
    }
    if !inner.host.has_focus() {
        debug!("host unfocused, holding pending saves");
        return None;
    }

    // 4. drop closed documents and ones modified since their save
    shared.pending.retain(|id, entry| {
        if !entry.doc.is_open() {
            debug!(doc = %id, "dequeued: closed");
            return false;
        }
        if entry.doc.is_dirty() {
            debug!(doc = %id, "dequeued: modified since save");
            return false;
        }
        true
    });
    if shared.pending.is_empty() {
        return None;
    }

    // 5. cooldown right after a pass discards, it does not defer
    if let Some(last) = shared.last_pass_at {
        if now.duration_since(last) < inner.config.cooldown() {
            debug!(
                dropped = shared.pending.len(),
                "within cooldown, discarding pending saves"
            );
            shared.pending.clear();
            return None;
        }
    }

    // 6. fire only once at least one save has aged a full period; fresher
    // siblings ride along in the same batch
    let period = inner.config.tick_interval();
    if !shared
        .pending
        .values()
        .any(|entry| now.duration_since(entry.saved_at) >= period)
    {
        return None;
    }

    // 7. freeze, oldest save first
    let mut batch: Vec<PendingEntry> = shared.pending.values().cloned().collect();
    batch.sort_by_key(|entry| entry.saved_at);
    Some(batch)
}
