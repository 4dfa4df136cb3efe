//! Replay script model
//!
//! A script is a JSON timeline of host notifications and simulated host
//! state changes, each stamped with a millisecond offset from replay
//! start.

use anyhow::{Context, Result};
use reflow_core::BuildAction;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A scripted host session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayScript {
    /// How long the replay clock runs, from start; must cover the last
    /// event plus however many ticks the scenario needs
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,

    pub events: Vec<TimedEvent>,
}

fn default_duration_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Offset from replay start
    pub at_ms: u64,

    #[serde(flatten)]
    pub event: ScriptEvent,
}

/// One scripted step: a host notification or a simulated state change
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Document saved in the host (also marks the simulated buffer clean)
    Save { path: String },
    /// Document closed in the host
    Close { path: String },
    /// Simulated edit: marks the buffer dirty without a save notification
    Modify { path: String },
    /// Make this document the host's active one
    Activate { path: String },
    BuildBegin { action: ScriptBuildAction },
    BuildDone { action: ScriptBuildAction },
    SolutionOpened,
    SolutionClosing,
    /// Host input-focus change
    Focus { value: bool },
    /// Enter or leave debug execution mode
    Debug { value: bool },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptBuildAction {
    Build,
    RebuildAll,
    Deploy,
    Clean,
    Other,
}

impl From<ScriptBuildAction> for BuildAction {
    fn from(action: ScriptBuildAction) -> Self {
        match action {
            ScriptBuildAction::Build => BuildAction::Build,
            ScriptBuildAction::RebuildAll => BuildAction::RebuildAll,
            ScriptBuildAction::Deploy => BuildAction::Deploy,
            ScriptBuildAction::Clean => BuildAction::Clean,
            ScriptBuildAction::Other => BuildAction::Other,
        }
    }
}

/// Load a script, sorting events by offset
pub fn load(path: &Path) -> Result<ReplayScript> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let mut script: ReplayScript = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse script {}", path.display()))?;
    script.events.sort_by_key(|event| event.at_ms);
    Ok(script)
}
