//! Domain types and host boundary for the reflow scheduler
//!
//! This crate provides:
//! - Document identity and the host document-handle trait
//! - Host application traits (focus oracle, execution mode, named commands)
//! - Build notification scopes and actions
//! - TOML configuration with the extension eligibility filter

pub mod config;
pub mod document;
pub mod error;
pub mod host;

// Re-exports
pub use config::{ExtensionFilter, ReflowConfig};
pub use document::{DocumentHandle, DocumentId};
pub use error::HostError;
pub use host::{
    BuildAction, BuildScope, CommandInvoker, ExecutionMode, FocusToken, WorkspaceHost,
};
