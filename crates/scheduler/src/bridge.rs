//! Host event bridge
//!
//! Hosts that deliver notifications as a stream rather than direct calls
//! push [`HostEvent`]s into the bridge; a pump task dispatches them to the
//! scheduler. Each attach owns a fresh channel, so re-initialization never
//! stacks subscriptions, and detaching is idempotent.

use crate::scheduler::ReformatScheduler;
use reflow_core::{BuildAction, BuildScope, DocumentHandle};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Inbound host notification
pub enum HostEvent {
    DocumentSaved(Arc<dyn DocumentHandle>),
    DocumentClosing(Arc<dyn DocumentHandle>),
    BuildBegin {
        scope: BuildScope,
        action: BuildAction,
    },
    BuildDone {
        scope: BuildScope,
        action: BuildAction,
    },
    SolutionOpened,
    SolutionClosing,
}

impl fmt::Debug for HostEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DocumentSaved(doc) => write!(f, "DocumentSaved({})", doc.id()),
            Self::DocumentClosing(doc) => write!(f, "DocumentClosing({})", doc.id()),
            Self::BuildBegin { scope, action } => {
                write!(f, "BuildBegin({scope:?}, {action:?})")
            }
            Self::BuildDone { scope, action } => write!(f, "BuildDone({scope:?}, {action:?})"),
            Self::SolutionOpened => write!(f, "SolutionOpened"),
            Self::SolutionClosing => write!(f, "SolutionClosing"),
        }
    }
}

/// Pump connecting a host's event stream to a scheduler
pub struct EventBridge {
    sender: mpsc::UnboundedSender<HostEvent>,
    pump: Option<JoinHandle<()>>,
}

impl EventBridge {
    /// Subscribe the scheduler to a fresh event channel
    pub fn attach(scheduler: ReformatScheduler) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let pump = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                scheduler.dispatch(event);
            }
            debug!("event bridge drained");
        });

        Self {
            sender,
            pump: Some(pump),
        }
    }

    /// Sender half for the host to push notifications into
    pub fn sender(&self) -> mpsc::UnboundedSender<HostEvent> {
        self.sender.clone()
    }

    /// Tear down the pump; safe to call more than once
    ///
    /// Senders handed out earlier go stale: further sends fail rather than
    /// queue into a subscription that no longer exists.
    pub async fn detach(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
            let _ = pump.await;
        }
    }
}
