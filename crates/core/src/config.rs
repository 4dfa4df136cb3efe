//! Scheduler configuration
//!
//! TOML file holding scheduler timings, the reformat command candidate
//! list, and the per-extension eligibility toggles. All fields have
//! defaults so a missing file or a partial file both work.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflowConfig {
    pub scheduler: SchedulerConfig,
    pub command: CommandConfig,
    pub extensions: ExtensionsConfig,
}

/// Debounce loop timings and pass behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Evaluation period in milliseconds
    pub tick_interval_ms: u64,

    /// Minimum quiet time after a pass before another may fire, in seconds
    pub cooldown_secs: u64,

    /// Save each processed document that is still dirty after the pass
    pub save_after_reformat: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            cooldown_secs: 5,
            save_after_reformat: true,
        }
    }
}

/// Reformat command resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Candidate command names, probed in order at startup; the first one
    /// the host reports available is used for every pass
    pub names: Vec<String>,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            names: vec![
                "Edit.RunCleanupProfile".to_string(),
                "Edit.FormatDocument".to_string(),
            ],
        }
    }
}

/// Per-extension eligibility toggles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionsConfig {
    pub cs: bool,
    pub xaml: bool,
    pub vb: bool,
    pub js: bool,
    pub ts: bool,
    pub css: bool,
    pub html: bool,
    pub xml: bool,
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            cs: true,
            xaml: true,
            vb: true,
            js: true,
            ts: true,
            css: true,
            html: true,
            xml: true,
        }
    }
}

impl ReflowConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.scheduler.tick_interval_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.scheduler.cooldown_secs)
    }

    /// Check all values against their valid ranges
    pub fn validate(&self) -> Result<()> {
        let tick = self.scheduler.tick_interval_ms;
        if !(100..=60_000).contains(&tick) {
            anyhow::bail!("scheduler.tick_interval_ms must be 100-60000, got {tick}");
        }
        let cooldown = self.scheduler.cooldown_secs;
        if cooldown > 300 {
            anyhow::bail!("scheduler.cooldown_secs must be 0-300, got {cooldown}");
        }
        if self.command.names.is_empty() {
            anyhow::bail!("command.names must list at least one command");
        }
        Ok(())
    }

    /// Eligibility predicate built from the `[extensions]` toggles
    pub fn extension_filter(&self) -> ExtensionFilter {
        ExtensionFilter::from_config(&self.extensions)
    }
}

/// Extension allow-list consulted for every save/close notification
///
/// Matching is case-insensitive and tolerates a leading dot.
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    allowed: HashSet<&'static str>,
}

impl ExtensionFilter {
    fn from_config(config: &ExtensionsConfig) -> Self {
        let toggles: [(&'static str, bool); 8] = [
            ("cs", config.cs),
            ("xaml", config.xaml),
            ("vb", config.vb),
            ("js", config.js),
            ("ts", config.ts),
            ("css", config.css),
            ("html", config.html),
            ("xml", config.xml),
        ];

        Self {
            allowed: toggles
                .into_iter()
                .filter(|(_, enabled)| *enabled)
                .map(|(ext, _)| ext)
                .collect(),
        }
    }

    /// Does a document with this extension participate in reformatting
    pub fn is_eligible(&self, extension: &str) -> bool {
        let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
        self.allowed.contains(normalized.as_str())
    }
}

/// Default location of the config file
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("reflow").join("config.toml"))
}

/// Load configuration from the default location, falling back to defaults
/// if no file exists
pub fn load() -> Result<ReflowConfig> {
    match config_file_path() {
        Some(path) if path.exists() => load_from(&path),
        _ => Ok(ReflowConfig::default()),
    }
}

/// Load and validate configuration from an explicit path
pub fn load_from(path: &Path) -> Result<ReflowConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: ReflowConfig = toml::from_str(&raw)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Write configuration to an explicit path, creating parent directories
pub fn save_to(config: &ReflowConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }
    let serialized =
        toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    std::fs::write(path, serialized)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(())
}

/// Create the default config file if it does not exist yet
pub fn init_if_missing() -> Result<PathBuf> {
    let path = config_file_path().context("Could not determine config file path")?;
    if !path.exists() {
        save_to(&ReflowConfig::default(), &path)?;
    }
    Ok(path)
}

/// Commented example configuration
pub fn example_config() -> &'static str {
    r#"# Reflow configuration

[scheduler]
# Evaluation period for the debounce loop (100-60000)
tick_interval_ms = 1000
# Quiet time after a pass before another may fire (0-300)
cooldown_secs = 5
# Save each processed document that is still dirty after the pass
save_after_reformat = true

[command]
# Candidate reformat commands, probed in order at startup
names = ["Edit.RunCleanupProfile", "Edit.FormatDocument"]

[extensions]
# File types that participate in reformatting
cs = true
xaml = true
vb = true
js = true
ts = true
css = true
html = true
xml = true
"#
}
