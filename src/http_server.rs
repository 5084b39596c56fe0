// HTTP gateway for the changelog service
// Authenticates requests, coordinates workspace/clone/config/generator
// per request, and shapes the HTTP response

use anyhow::Result;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    auth_middleware::auth_middleware,
    cliff_config::render_cliff_config,
    config::ServiceConfig,
    errors::ServiceError,
    generator::{bumped_version, generate_changelog, release_notes, GenerateOptions, OutputFormat},
    observability::with_trace_id,
    process::ProcessRunner,
    repository::clone_repository,
    workspace::Workspace,
};

/// Service name reported by the health endpoint
const SERVICE_NAME: &str = "changelog-service";

/// Workspace prefix for remote-repository requests
const WORKSPACE_PREFIX: &str = "changelog-";
/// Workspace prefix for config-only (local repository) requests
const CONFIG_WORKSPACE_PREFIX: &str = "changelog-config-";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServiceConfig>,
    runner: Arc<dyn ProcessRunner>,
}

/// Request body for remote changelog generation
#[derive(Debug, Deserialize)]
pub struct ChangelogRequest {
    pub project_path: Option<String>,
    pub gitlab_token: Option<String>,
    #[serde(default)]
    pub tag_range: Option<String>,
    #[serde(default)]
    pub unreleased: bool,
    #[serde(default)]
    pub latest: bool,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub config: Option<String>,
}

/// Request body for version-bump queries
#[derive(Debug, Deserialize)]
pub struct BumpVersionRequest {
    pub project_path: Option<String>,
    pub gitlab_token: Option<String>,
}

/// Request body for changelog generation from a pre-mounted repository
#[derive(Debug, Deserialize)]
pub struct LocalChangelogRequest {
    pub repo_path: Option<String>,
    #[serde(default)]
    pub project_path: Option<String>,
    #[serde(default)]
    pub tag_range: Option<String>,
    #[serde(default)]
    pub unreleased: bool,
    #[serde(default)]
    pub latest: bool,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub config: Option<String>,
}

/// Request body for release-notes generation
#[derive(Debug, Deserialize)]
pub struct ReleaseNotesRequest {
    pub project_path: Option<String>,
    pub gitlab_token: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub config: Option<String>,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub gitlab_url: String,
}

/// Version-bump response
#[derive(Debug, Serialize)]
pub struct BumpVersionResponse {
    pub version: String,
    pub project: String,
}

/// Reject missing JSON bodies with the wire-compatible message
fn require_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ServiceError> {
    body.map(|Json(inner)| inner)
        .map_err(|_| ServiceError::BadRequest("JSON body required".to_string()))
}

/// Treat absent and empty strings alike, matching the original contract
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn require_field(value: Option<String>, name: &str) -> Result<String, ServiceError> {
    non_empty(value).ok_or_else(|| ServiceError::BadRequest(format!("{name} is required")))
}

/// Create the HTTP router with all routes configured
pub fn create_server(config: Arc<ServiceConfig>, runner: Arc<dyn ProcessRunner>) -> Router {
    let state = AppState {
        config: config.clone(),
        runner,
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/changelog", post(create_changelog))
        .route("/api/v1/bump-version", post(bump_version))
        .route("/api/v1/changelog/local", post(create_changelog_local))
        .route("/api/v1/release-notes", post(create_release_notes))
        .layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Start the HTTP server on the configured port
pub async fn start_server(config: Arc<ServiceConfig>, runner: Arc<dyn ProcessRunner>) -> Result<()> {
    let app = create_server(config.clone(), runner);
    let listener = TcpListener::bind(&format!("0.0.0.0:{}", config.port)).await?;

    info!("Changelog service starting on port {}", config.port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Health check endpoint (unauthenticated)
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        gitlab_url: state.config.gitlab_url.clone(),
    })
}

/// Generate a changelog for a remote repository
async fn create_changelog(
    State(state): State<AppState>,
    body: Result<Json<ChangelogRequest>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let request = require_body(body)?;
    let project_path = require_field(request.project_path, "project_path")?;
    let gitlab_token = require_field(request.gitlab_token, "gitlab_token")?;

    let workspace = Workspace::acquire(&state.config.work_root, WORKSPACE_PREFIX)?;

    let result = with_trace_id("create_changelog", async {
        let repo_path = clone_repository(
            state.runner.as_ref(),
            &state.config.gitlab_url,
            &project_path,
            &gitlab_token,
            workspace.path(),
        )
        .await?;

        let config_path = write_cliff_config(
            workspace.path(),
            request.config.as_deref(),
            &state.config.gitlab_url,
            &project_path,
        )
        .await?;

        let options = GenerateOptions {
            tag_range: request.tag_range.clone(),
            unreleased: request.unreleased,
            latest: request.latest,
            output_format: request.output_format,
            extra_args: Vec::new(),
        };

        generate_changelog(
            state.runner.as_ref(),
            &repo_path,
            Some(&config_path),
            &options,
        )
        .await
    })
    .await;

    workspace.release();

    let changelog = result?;
    Ok((
        [(header::CONTENT_TYPE, request.output_format.mime_type())],
        changelog,
    )
        .into_response())
}

/// Compute the next version from unreleased commits
async fn bump_version(
    State(state): State<AppState>,
    body: Result<Json<BumpVersionRequest>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let request = require_body(body)?;
    let (project_path, gitlab_token) = match (
        non_empty(request.project_path),
        non_empty(request.gitlab_token),
    ) {
        (Some(project), Some(token)) => (project, token),
        _ => {
            return Err(ServiceError::BadRequest(
                "project_path and gitlab_token are required".to_string(),
            ))
        }
    };

    let workspace = Workspace::acquire(&state.config.work_root, WORKSPACE_PREFIX)?;

    let result = with_trace_id("bump_version", async {
        let repo_path = clone_repository(
            state.runner.as_ref(),
            &state.config.gitlab_url,
            &project_path,
            &gitlab_token,
            workspace.path(),
        )
        .await?;

        let config_path = write_cliff_config(
            workspace.path(),
            None,
            &state.config.gitlab_url,
            &project_path,
        )
        .await?;

        bumped_version(state.runner.as_ref(), &repo_path, Some(&config_path)).await
    })
    .await;

    workspace.release();

    let version = result?;
    Ok(Json(BumpVersionResponse {
        version,
        project: project_path,
    })
    .into_response())
}

/// Generate a changelog from a repository already present on the host
async fn create_changelog_local(
    State(state): State<AppState>,
    body: Result<Json<LocalChangelogRequest>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let request = require_body(body)?;
    let repo_path_str = require_field(request.repo_path, "repo_path")?;

    // The config workspace is acquired before the existence check so
    // cleanup discipline is identical on the not-found path
    let workspace = Workspace::acquire(&state.config.work_root, CONFIG_WORKSPACE_PREFIX)?;

    let result = with_trace_id("create_changelog_local", async {
        let repo_path = PathBuf::from(&repo_path_str);
        if !repo_path.exists() {
            return Err(ServiceError::NotFound(format!(
                "Repository not found: {repo_path_str}"
            )));
        }

        // Fall back to the last path component when no project path is given
        let project_path = non_empty(request.project_path.clone()).unwrap_or_else(|| {
            repo_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| repo_path_str.clone())
        });

        let config_path = write_cliff_config(
            workspace.path(),
            request.config.as_deref(),
            &state.config.gitlab_url,
            &project_path,
        )
        .await?;

        let options = GenerateOptions {
            tag_range: request.tag_range.clone(),
            unreleased: request.unreleased,
            latest: request.latest,
            output_format: request.output_format,
            extra_args: Vec::new(),
        };

        generate_changelog(
            state.runner.as_ref(),
            &repo_path,
            Some(&config_path),
            &options,
        )
        .await
    })
    .await;

    workspace.release();

    let changelog = result?;
    Ok((
        [(header::CONTENT_TYPE, request.output_format.mime_type())],
        changelog,
    )
        .into_response())
}

/// Generate release notes for the latest (or a specific) tag
async fn create_release_notes(
    State(state): State<AppState>,
    body: Result<Json<ReleaseNotesRequest>, JsonRejection>,
) -> Result<Response, ServiceError> {
    let request = require_body(body)?;
    let (project_path, gitlab_token) = match (
        non_empty(request.project_path),
        non_empty(request.gitlab_token),
    ) {
        (Some(project), Some(token)) => (project, token),
        _ => {
            return Err(ServiceError::BadRequest(
                "project_path and gitlab_token are required".to_string(),
            ))
        }
    };

    let workspace = Workspace::acquire(&state.config.work_root, WORKSPACE_PREFIX)?;

    let result = with_trace_id("create_release_notes", async {
        let repo_path = clone_repository(
            state.runner.as_ref(),
            &state.config.gitlab_url,
            &project_path,
            &gitlab_token,
            workspace.path(),
        )
        .await?;

        let config_path = write_cliff_config(
            workspace.path(),
            request.config.as_deref(),
            &state.config.gitlab_url,
            &project_path,
        )
        .await?;

        release_notes(
            state.runner.as_ref(),
            &repo_path,
            &config_path,
            request.tag.as_deref(),
        )
        .await
    })
    .await;

    workspace.release();

    let notes = result?;
    // Release notes are always markdown; JSON context is not offered here
    Ok((
        [(header::CONTENT_TYPE, OutputFormat::Markdown.mime_type())],
        notes,
    )
        .into_response())
}

/// Write the cliff.toml for this request: the caller's inline config
/// verbatim when supplied, otherwise the rendered dynamic config
async fn write_cliff_config(
    workspace: &Path,
    custom: Option<&str>,
    gitlab_url: &str,
    project_path: &str,
) -> Result<PathBuf, ServiceError> {
    let config_path = workspace.join("cliff.toml");
    let contents = match custom {
        Some(text) => text.to_string(),
        None => render_cliff_config(gitlab_url, project_path),
    };
    tokio::fs::write(&config_path, contents).await?;
    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_filters_blank_strings() {
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_require_field_message_shape() {
        let err = require_field(None, "project_path").unwrap_err();
        match err {
            ServiceError::BadRequest(message) => {
                assert_eq!(message, "project_path is required")
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_changelog_request_deserializes_with_defaults() {
        let request: ChangelogRequest = serde_json::from_str(
            r#"{"project_path": "grp/proj", "gitlab_token": "tok"}"#,
        )
        .unwrap();

        assert_eq!(request.project_path.as_deref(), Some("grp/proj"));
        assert!(!request.unreleased);
        assert!(!request.latest);
        assert_eq!(request.output_format, OutputFormat::Markdown);
        assert!(request.tag_range.is_none());
        assert!(request.config.is_none());
    }
}
