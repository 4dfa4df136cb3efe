//! Save-event debounce scheduling and coalesced reformat execution
//!
//! This crate provides:
//! - Pending-set bookkeeping with per-document debounce windows
//! - Build and solution lifecycle gating
//! - A fixed-period evaluation loop with cooldown and freshness rules
//! - A focus-preserving, at-most-one-at-a-time reformat pass executor
//! - A host event bridge with idempotent teardown

pub mod bridge;
pub mod scheduler;
pub mod state;

mod pass;
mod tick;

#[cfg(test)]
pub(crate) mod testutil;

// Re-exports
pub use bridge::{EventBridge, HostEvent};
pub use scheduler::ReformatScheduler;
pub use state::{PassStats, SchedulerPhase};
