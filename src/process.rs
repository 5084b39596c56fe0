//! Narrow seam around external process execution.
//!
//! Everything that shells out (git clone, git-cliff) goes through the
//! `ProcessRunner` trait so orchestration code depends on an abstract
//! capability instead of a concrete subprocess API. Tests substitute a
//! fake runner; production uses `TokioProcessRunner`.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Captured outcome of one external process invocation
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Exit code, if the process terminated normally
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// True when the process exited with status zero
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Abstract capability to run an external program with a hard timeout
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run `program` with `args`, capturing stdout/stderr.
    ///
    /// Returns `Err` when the process cannot be spawned or exceeds
    /// `limit`; a non-zero exit is reported through
    /// `ProcessOutput::exit_code`, not as an `Err`. On timeout the
    /// child must not be left running.
    async fn run(&self, program: &str, args: &[String], limit: Duration) -> Result<ProcessOutput>;
}

/// Production runner backed by `tokio::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, program: &str, args: &[String], limit: Duration) -> Result<ProcessOutput> {
        debug!("Running command: {} {}", program, args.join(" "));

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropping the wait future on timeout must take the child with it
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to spawn `{program}`"))?;

        let output = match timeout(limit, child.wait_with_output()).await {
            Ok(result) => result.with_context(|| format!("Failed to wait for `{program}`"))?,
            Err(_) => {
                return Err(anyhow!(
                    "`{program}` timed out after {} seconds",
                    limit.as_secs()
                ));
            }
        };

        Ok(ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
