//! Helpers for driving the `reflow` binary in integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Command builder for the built binary
pub struct ReflowCommand {
    binary_path: PathBuf,
    working_dir: PathBuf,
    args: Vec<String>,
}

impl ReflowCommand {
    /// Create a new command in the given working directory
    pub fn new(working_dir: impl AsRef<Path>) -> Self {
        Self {
            binary_path: find_reflow_binary(),
            working_dir: working_dir.as_ref().to_path_buf(),
            args: Vec::new(),
        }
    }

    /// Add command arguments
    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|arg| arg.to_string()));
        self
    }

    /// Execute the command and capture its output
    pub fn execute(&self) -> Result<CommandResult> {
        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .output()
            .context("Failed to execute reflow binary")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;
        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }
        Ok(result)
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;
        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }
        Ok(result)
    }
}

/// Captured command output
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout.contains(text)
    }
}

/// Find the reflow binary in the target directory
fn find_reflow_binary() -> PathBuf {
    let mut path = std::env::current_exe().expect("Failed to get current exe path");

    path.pop(); // Remove test binary name
    path.pop(); // Remove deps/

    let debug_bin = path.join("reflow");
    if debug_bin.exists() {
        return debug_bin;
    }

    path.pop();
    let release_bin = path.join("release").join("reflow");
    if release_bin.exists() {
        return release_bin;
    }

    path.join("debug").join("reflow")
}
