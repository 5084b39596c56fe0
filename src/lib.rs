// Changelog Service - HTTP API for changelog generation via git-cliff
// Root library module

pub mod auth_middleware;
pub mod cliff_config;
pub mod config;
pub mod errors;
pub mod generator;
pub mod http_server;
pub mod http_types;
pub mod observability;
pub mod process;
pub mod repository;
pub mod workspace;

// Re-export key types
pub use observability::{init_logging, init_logging_with_level, with_trace_id};

pub use config::ServiceConfig;

pub use errors::ServiceError;

pub use http_types::ErrorResponse;

// Re-export the config templater
pub use cliff_config::render_cliff_config;

// Re-export the process invoker seam
pub use process::{ProcessOutput, ProcessRunner, TokioProcessRunner};

pub use workspace::Workspace;

pub use repository::clone_repository;

pub use generator::{
    bumped_version, generate_changelog, release_notes, GenerateOptions, OutputFormat,
};

pub use http_server::{create_server, start_server, AppState};
