//! git-cliff invocation.
//!
//! Builds the argument list for the external changelog generator and
//! runs it through the process seam. The generator only reads from the
//! workspace; it never mutates the repository.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::errors::ServiceError;
use crate::process::ProcessRunner;

/// Name of the changelog generator binary
const GIT_CLIFF_BIN: &str = "git-cliff";

/// Hard wall-clock limit for changelog generation
pub const GENERATE_TIMEOUT: Duration = Duration::from_secs(120);
/// Hard wall-clock limit for version-bump queries
pub const BUMP_TIMEOUT: Duration = Duration::from_secs(60);
/// Hard wall-clock limit for release-notes generation
pub const RELEASE_NOTES_TIMEOUT: Duration = Duration::from_secs(120);

/// Output representation requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

impl OutputFormat {
    /// Content type declared on the HTTP response
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "text/markdown",
            OutputFormat::Json => "application/json",
        }
    }
}

/// Flags controlling one changelog generation run
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Positional tag range, e.g. `v1.0.0..v2.0.0`
    pub tag_range: Option<String>,
    /// Include commits not yet tagged
    pub unreleased: bool,
    /// Restrict to the latest tag
    pub latest: bool,
    /// Requested output representation
    pub output_format: OutputFormat,
    /// Passthrough extra arguments
    pub extra_args: Vec<String>,
}

/// Assemble the git-cliff argument list for a generation run.
/// `--config` is passed only when the file actually exists on disk.
pub fn build_args(
    repo_path: &Path,
    config_path: Option<&Path>,
    options: &GenerateOptions,
) -> Vec<String> {
    let mut args = vec![
        "--repository".to_string(),
        repo_path.to_string_lossy().into_owned(),
    ];

    if let Some(config) = config_path {
        if config.exists() {
            args.push("--config".to_string());
            args.push(config.to_string_lossy().into_owned());
        }
    }

    if options.unreleased {
        args.push("--unreleased".to_string());
    }

    if options.latest {
        args.push("--latest".to_string());
    }

    if let Some(range) = &options.tag_range {
        args.push(range.clone());
    }

    // JSON callers get the raw context instead of rendered markdown
    if options.output_format == OutputFormat::Json {
        args.push("--context".to_string());
    }

    args.extend(options.extra_args.iter().cloned());

    args
}

async fn run_git_cliff(
    runner: &dyn ProcessRunner,
    args: &[String],
    limit: Duration,
) -> Result<String, ServiceError> {
    let output = runner
        .run(GIT_CLIFF_BIN, args, limit)
        .await
        .map_err(|e| ServiceError::Generation {
            stderr: e.to_string(),
        })?;

    if !output.success() {
        return Err(ServiceError::Generation {
            stderr: output.stderr,
        });
    }

    Ok(output.stdout)
}

/// Generate a changelog for the repository, returning generator stdout
pub async fn generate_changelog(
    runner: &dyn ProcessRunner,
    repo_path: &Path,
    config_path: Option<&Path>,
    options: &GenerateOptions,
) -> Result<String, ServiceError> {
    let args = build_args(repo_path, config_path, options);
    run_git_cliff(runner, &args, GENERATE_TIMEOUT).await
}

/// Compute the next semantic version from unreleased commits
pub async fn bumped_version(
    runner: &dyn ProcessRunner,
    repo_path: &Path,
    config_path: Option<&Path>,
) -> Result<String, ServiceError> {
    let mut args = vec![
        "--repository".to_string(),
        repo_path.to_string_lossy().into_owned(),
        "--bumped-version".to_string(),
    ];

    if let Some(config) = config_path {
        if config.exists() {
            args.push("--config".to_string());
            args.push(config.to_string_lossy().into_owned());
        }
    }

    let stdout = run_git_cliff(runner, &args, BUMP_TIMEOUT).await?;
    Ok(stdout.trim().to_string())
}

/// Generate release notes: always latest-tag mode, markdown only
pub async fn release_notes(
    runner: &dyn ProcessRunner,
    repo_path: &Path,
    config_path: &Path,
    tag: Option<&str>,
) -> Result<String, ServiceError> {
    let mut args = vec![
        "--repository".to_string(),
        repo_path.to_string_lossy().into_owned(),
        "--latest".to_string(),
        "--config".to_string(),
        config_path.to_string_lossy().into_owned(),
    ];

    if let Some(tag) = tag {
        args.push("--tag".to_string());
        args.push(tag.to_string());
    }

    run_git_cliff(runner, &args, RELEASE_NOTES_TIMEOUT).await
}
